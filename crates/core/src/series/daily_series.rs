use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::time_utils::get_days_between;

/// One decimal value per calendar day.
///
/// A series is undefined (no entry) before its first date. Builders in
/// this crate keep it calendar-complete between `first_date` and the
/// span end they were given, so `value_on` lookups inside that range
/// always hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries(BTreeMap<NaiveDate, Decimal>);

impl DailySeries {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_map(map: BTreeMap<NaiveDate, Decimal>) -> Self {
        Self(map)
    }

    pub fn insert(&mut self, date: NaiveDate, value: Decimal) {
        self.0.insert(date, value);
    }

    /// The value on exactly `date`, if defined.
    pub fn value_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.0.get(&date).copied()
    }

    /// The last value at or before `date`, if any.
    pub fn value_as_of(&self, date: NaiveDate) -> Option<Decimal> {
        self.0.range(..=date).next_back().map(|(_, v)| *v)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.0.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.0.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.0.iter().map(|(d, v)| (*d, *v))
    }

    /// Running sum of this series' values, forward-filled out to
    /// `span_end`. Days before the first defined day stay undefined;
    /// days without an entry carry the previous running total.
    pub fn cumulative_to(&self, span_end: NaiveDate) -> DailySeries {
        let first = match self.first_date() {
            Some(first) => first,
            None => return DailySeries::new(),
        };
        let mut out = BTreeMap::new();
        let mut running = Decimal::ZERO;
        for day in get_days_between(first, span_end.max(first)) {
            if let Some(value) = self.value_on(day) {
                running += value;
            }
            out.insert(day, running);
        }
        DailySeries(out)
    }
}

impl FromIterator<(NaiveDate, Decimal)> for DailySeries {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
