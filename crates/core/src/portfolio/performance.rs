//! Daily performance of one account.
//!
//! Performance is the ratio of what the held coins are worth to what
//! was put in: `coin_usd_value / usd_deposits`, day by day on the
//! price calendar. It is undefined, not zero, before the account is
//! funded; a flat 1.0 means break-even.

use rust_decimal::Decimal;
use serde::Serialize;

use coinfolio_exchange::Candle;

use crate::series::DailySeries;

/// The derived daily series for one account.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceReport {
    pub usd_deposits: DailySeries,
    pub coin_price: DailySeries,
    pub coin_usd_value: DailySeries,
    pub performance: DailySeries,
}

/// Daily open price from candles: the open of each day's first candle.
/// Candles are expected ascending, as the connectors return them.
pub fn daily_open_prices(candles: &[Candle]) -> DailySeries {
    let mut prices = DailySeries::new();
    for candle in candles {
        let day = candle.timestamp.date();
        if prices.value_on(day).is_none() {
            prices.insert(day, candle.open);
        }
    }
    prices
}

/// Fuses balance, cumulative deposits, and the price series on the
/// price calendar.
///
/// For each priced day: `coin_usd_value = balance_as_of(day) * price`;
/// `performance = coin_usd_value / deposits_as_of(day)`. Days where
/// deposits are undefined or zero get no performance entry.
pub fn compute_performance(
    balance_sheet: &DailySeries,
    usd_deposits: &DailySeries,
    coin_price: &DailySeries,
) -> PerformanceReport {
    let mut coin_usd_value = DailySeries::new();
    let mut performance = DailySeries::new();

    for (day, price) in coin_price.iter() {
        let balance = balance_sheet.value_as_of(day).unwrap_or(Decimal::ZERO);
        let value = balance * price;
        coin_usd_value.insert(day, value);

        match usd_deposits.value_as_of(day) {
            Some(deposited) if deposited > Decimal::ZERO => {
                performance.insert(day, value / deposited);
            }
            _ => {}
        }
    }

    PerformanceReport {
        usd_deposits: usd_deposits.clone(),
        coin_price: coin_price.clone(),
        coin_usd_value,
        performance,
    }
}
