use chrono::NaiveDate;

/// Every calendar day from `start` through `end`, inclusive.
///
/// This is the index-building primitive for daily series: a series is
/// complete when it has a value for each day this returns.
pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        days.push(current);
        if let Some(next) = current.succ_opt() {
            current = next;
        } else {
            break;
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, day).unwrap()
    }

    #[test]
    fn test_days_between_is_inclusive() {
        let days = get_days_between(d(1), d(4));
        assert_eq!(days, vec![d(1), d(2), d(3), d(4)]);
    }

    #[test]
    fn test_single_day_range() {
        assert_eq!(get_days_between(d(5), d(5)), vec![d(5)]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        assert!(get_days_between(d(5), d(1)).is_empty());
    }
}
