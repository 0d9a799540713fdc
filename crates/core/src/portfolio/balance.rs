//! Daily balance sheet.

use chrono::NaiveDate;

use crate::ledger::LedgerEntry;
use crate::series::{resample_daily_last, DailySeries};

/// Asset quantity held at each day's end, from the ledger's running
/// balances: last balance within the day, carried through days with no
/// activity, out to `span_end`.
pub fn balance_sheet(ledger: &[LedgerEntry], span_end: NaiveDate) -> DailySeries {
    let observations: Vec<_> = ledger.iter().map(|e| (e.timestamp, e.balance)).collect();
    resample_daily_last(&observations, span_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::EntryType;
    use chrono::NaiveDateTime;
    use coinfolio_exchange::ExchangeId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::Value;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, day).unwrap()
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        d(day).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn entry(day: u32, hour: u32, balance: Decimal) -> LedgerEntry {
        LedgerEntry {
            id: format!("{}-{}", day, hour),
            timestamp: at(day, hour),
            asset: "RNDR".to_string(),
            amount: dec!(0),
            balance,
            entry_type: EntryType::Trade,
            source: ExchangeId::Kucoin,
            metadata: Value::Null,
        }
    }

    #[test]
    fn test_last_balance_of_the_day_sticks() {
        let ledger = vec![entry(1, 9, dec!(5)), entry(1, 18, dec!(7))];
        let sheet = balance_sheet(&ledger, d(3));

        assert_eq!(sheet.value_on(d(1)), Some(dec!(7)));
        assert_eq!(sheet.value_on(d(3)), Some(dec!(7)));
    }

    #[test]
    fn test_empty_ledger_yields_empty_sheet() {
        assert!(balance_sheet(&[], d(3)).is_empty());
    }
}
