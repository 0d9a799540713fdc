//! Daily USD deposit reconstruction.
//!
//! "Deposits" here means cumulative external USD put into an account,
//! the denominator of the performance ratio. Exchanges do not report it
//! directly, so it is derived from one of two documented sources,
//! chosen per exchange.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use coinfolio_exchange::ExchangeId;

use crate::ledger::{EntryType, Fill, FillSide, LedgerEntry};
use crate::series::{resample_daily_sum, DailySeries};

/// Where an account's USD inflow is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositPolicy {
    /// Net USD volume of the asset's USD-pair fills: buys contribute
    /// `quote_volume`, sells subtract it. A day netting negative is
    /// excluded rather than subtracted, so the cumulative series never
    /// decreases.
    UsdFills,
    /// Sum of ledger entries whose type is in the set, e.g.
    /// `{Deposit}` or `{Deposit, Transfer}`.
    LedgerTypes(HashSet<EntryType>),
}

impl DepositPolicy {
    /// The policy the exchange's data quality calls for. Both supported
    /// exchanges report usable USD fill volumes.
    pub fn default_for(_exchange: ExchangeId) -> Self {
        DepositPolicy::UsdFills
    }

    /// The policy for USD-denominated accounts, where fills on a
    /// "USD-USD" pair do not exist: external transfers in the ledger
    /// are the inflow.
    pub fn for_usd_account() -> Self {
        DepositPolicy::LedgerTypes(HashSet::from([EntryType::Deposit, EntryType::Transfer]))
    }
}

/// Derives the cumulative daily USD deposit series, forward-filled out
/// to `span_end`. Non-decreasing by construction.
pub fn extract_deposits(
    policy: &DepositPolicy,
    ledger: &[LedgerEntry],
    fills: &[Fill],
    span_end: NaiveDate,
) -> DailySeries {
    let daily = match policy {
        DepositPolicy::UsdFills => {
            let signed: Vec<_> = fills
                .iter()
                .map(|f| {
                    let flow = match f.side {
                        FillSide::Buy => f.quote_volume,
                        FillSide::Sell => -f.quote_volume,
                    };
                    (f.timestamp, flow)
                })
                .collect();
            positive_days(resample_daily_sum(&signed))
        }
        DepositPolicy::LedgerTypes(types) => {
            let flows: Vec<_> = ledger
                .iter()
                .filter(|e| types.contains(&e.entry_type))
                .map(|e| (e.timestamp, e.amount))
                .collect();
            positive_days(resample_daily_sum(&flows))
        }
    };
    daily.cumulative_to(span_end)
}

/// Keeps only days whose net flow is strictly positive.
fn positive_days(series: DailySeries) -> DailySeries {
    series.iter().filter(|(_, v)| *v > Decimal::ZERO).collect()
}
