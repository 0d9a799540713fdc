//! Timestamped observations to daily values.
//!
//! Two reductions cover every series this crate derives: last value
//! within the day (balances, prices) and net sum within the day
//! (deposits, flows). Both take observations in any order.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::utils::time_utils::get_days_between;

use super::DailySeries;

/// Daily series of the last observation within each day, forward-filled
/// through days with no observation, out to `span_end`.
///
/// The result is defined for every calendar day from the first observed
/// day through `span_end` and undefined before that. Ties within a day
/// resolve to the latest timestamp; equal timestamps resolve to the
/// later observation in input order.
pub fn resample_daily_last(
    observations: &[(NaiveDateTime, Decimal)],
    span_end: NaiveDate,
) -> DailySeries {
    let mut sorted: Vec<&(NaiveDateTime, Decimal)> = observations.iter().collect();
    sorted.sort_by_key(|(ts, _)| *ts);

    let mut last_per_day = DailySeries::new();
    for (ts, value) in sorted {
        last_per_day.insert(ts.date(), *value);
    }

    let first = match last_per_day.first_date() {
        Some(first) => first,
        None => return DailySeries::new(),
    };

    let mut out = DailySeries::new();
    let mut carried = Decimal::ZERO;
    for day in get_days_between(first, span_end.max(first)) {
        if let Some(value) = last_per_day.value_on(day) {
            carried = value;
        }
        out.insert(day, carried);
    }
    out
}

/// Sparse daily series of the net sum of observations within each day.
/// Days with no observation get no entry.
pub fn resample_daily_sum(observations: &[(NaiveDateTime, Decimal)]) -> DailySeries {
    let mut out = DailySeries::new();
    for (ts, value) in observations {
        let day = ts.date();
        let next = out.value_on(day).unwrap_or(Decimal::ZERO) + *value;
        out.insert(day, next);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        d(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn test_last_within_day_wins() {
        let obs = vec![(at(1, 9), dec!(1)), (at(1, 17), dec!(3)), (at(1, 12), dec!(2))];
        let series = resample_daily_last(&obs, d(1));
        assert_eq!(series.value_on(d(1)), Some(dec!(3)));
    }

    #[test]
    fn test_gap_days_carry_previous_value() {
        let obs = vec![(at(1, 9), dec!(5)), (at(4, 9), dec!(8))];
        let series = resample_daily_last(&obs, d(6));

        assert_eq!(series.value_on(d(2)), Some(dec!(5)));
        assert_eq!(series.value_on(d(3)), Some(dec!(5)));
        assert_eq!(series.value_on(d(4)), Some(dec!(8)));
        assert_eq!(series.value_on(d(6)), Some(dec!(8)));
        // complete between first observation and span end
        assert_eq!(series.len(), 6);
    }

    #[test]
    fn test_undefined_before_first_observation() {
        let obs = vec![(at(3, 9), dec!(5))];
        let series = resample_daily_last(&obs, d(5));
        assert_eq!(series.value_on(d(2)), None);
        assert_eq!(series.first_date(), Some(d(3)));
    }

    #[test]
    fn test_no_observations_yield_empty_series() {
        assert!(resample_daily_last(&[], d(5)).is_empty());
        assert!(resample_daily_sum(&[]).is_empty());
    }

    #[test]
    fn test_daily_sum_nets_within_day_and_stays_sparse() {
        let obs = vec![
            (at(1, 9), dec!(100)),
            (at(1, 17), dec!(-30)),
            (at(3, 9), dec!(50)),
        ];
        let series = resample_daily_sum(&obs);

        assert_eq!(series.value_on(d(1)), Some(dec!(70)));
        assert_eq!(series.value_on(d(2)), None);
        assert_eq!(series.value_on(d(3)), Some(dec!(50)));
        assert_eq!(series.len(), 2);
    }
}
