//! Portfolio-level aggregation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::accounts::Account;
use crate::series::DailySeries;

use super::PerformanceReport;

/// Summed daily series across every account with a performance report.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioAggregate {
    pub usd_deposits: DailySeries,
    pub coin_usd_value: DailySeries,
    pub performance: DailySeries,
}

/// All reconstructed accounts plus their aggregate.
#[derive(Debug, Serialize)]
pub struct Portfolio {
    pub accounts: Vec<Account>,
    pub aggregate: PortfolioAggregate,
}

/// Folds per-account reports into one portfolio view.
///
/// The aggregate calendar is the union of the accounts' calendars; an
/// account with no value on a day contributes zero for that day. The
/// aggregate performance is total value over total deposits, undefined
/// while total deposits are zero. Cash-only accounts carry no report
/// and do not contribute.
pub fn aggregate_portfolio(accounts: Vec<Account>) -> Portfolio {
    let aggregate = {
        let reports: Vec<&PerformanceReport> =
            accounts.iter().filter_map(|a| a.performance.as_ref()).collect();
        aggregate_reports(&reports)
    };
    Portfolio { accounts, aggregate }
}

fn aggregate_reports(reports: &[&PerformanceReport]) -> PortfolioAggregate {
    let calendar: BTreeSet<NaiveDate> = reports
        .iter()
        .flat_map(|r| {
            r.coin_usd_value
                .iter()
                .map(|(d, _)| d)
                .chain(r.usd_deposits.iter().map(|(d, _)| d))
        })
        .collect();

    let mut usd_deposits = DailySeries::new();
    let mut coin_usd_value = DailySeries::new();
    let mut performance = DailySeries::new();

    for &day in &calendar {
        let total_deposits: Decimal = reports
            .iter()
            .filter_map(|r| r.usd_deposits.value_on(day))
            .sum();
        let total_value: Decimal = reports
            .iter()
            .filter_map(|r| r.coin_usd_value.value_on(day))
            .sum();

        usd_deposits.insert(day, total_deposits);
        coin_usd_value.insert(day, total_value);
        if total_deposits > Decimal::ZERO {
            performance.insert(day, total_value / total_deposits);
        }
    }

    PortfolioAggregate {
        usd_deposits,
        coin_usd_value,
        performance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, day).unwrap()
    }

    fn report(days: &[(u32, Decimal, Decimal)]) -> PerformanceReport {
        let usd_deposits: DailySeries =
            days.iter().map(|(day, dep, _)| (d(*day), *dep)).collect();
        let coin_usd_value: DailySeries =
            days.iter().map(|(day, _, val)| (d(*day), *val)).collect();
        let mut performance = DailySeries::new();
        for (day, dep, val) in days {
            if *dep > Decimal::ZERO {
                performance.insert(d(*day), *val / *dep);
            }
        }
        PerformanceReport {
            usd_deposits,
            coin_price: DailySeries::new(),
            coin_usd_value,
            performance,
        }
    }

    #[test]
    fn test_overlapping_accounts_sum_per_day() {
        let a = report(&[(1, dec!(100), dec!(110)), (2, dec!(100), dec!(120))]);
        let b = report(&[(1, dec!(50), dec!(40)), (2, dec!(50), dec!(60))]);

        let aggregate = aggregate_reports(&[&a, &b]);

        assert_eq!(aggregate.usd_deposits.value_on(d(1)), Some(dec!(150)));
        assert_eq!(aggregate.coin_usd_value.value_on(d(1)), Some(dec!(150)));
        assert_eq!(aggregate.coin_usd_value.value_on(d(2)), Some(dec!(180)));
        assert_eq!(aggregate.performance.value_on(d(2)), Some(dec!(1.2)));
    }

    #[test]
    fn test_disjoint_ranges_contribute_zero_when_absent() {
        // account a is only defined through day 2, b only from day 5
        let a = report(&[(1, dec!(100), dec!(200)), (2, dec!(100), dec!(200))]);
        let b = report(&[(5, dec!(50), dec!(25)), (6, dec!(50), dec!(25))]);

        let aggregate = aggregate_reports(&[&a, &b]);

        // days from both ranges appear, each fed by one account
        assert_eq!(aggregate.coin_usd_value.value_on(d(2)), Some(dec!(200)));
        assert_eq!(aggregate.coin_usd_value.value_on(d(5)), Some(dec!(25)));
        assert_eq!(aggregate.performance.value_on(d(1)), Some(dec!(2)));
        assert_eq!(aggregate.performance.value_on(d(6)), Some(dec!(0.5)));
        // no entry for days neither account covers
        assert_eq!(aggregate.coin_usd_value.value_on(d(3)), None);
    }

    #[test]
    fn test_no_reports_yield_empty_aggregate() {
        let aggregate = aggregate_reports(&[]);
        assert!(aggregate.usd_deposits.is_empty());
        assert!(aggregate.performance.is_empty());
    }

    #[test]
    fn test_zero_deposit_days_have_no_performance() {
        let a = report(&[(1, dec!(0), dec!(10))]);
        let aggregate = aggregate_reports(&[&a]);
        assert_eq!(aggregate.coin_usd_value.value_on(d(1)), Some(dec!(10)));
        assert_eq!(aggregate.performance.value_on(d(1)), None);
    }
}
