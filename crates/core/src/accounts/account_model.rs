use chrono::NaiveDateTime;
use serde::Serialize;

use coinfolio_exchange::{ExchangeId, WindowFailure};

use crate::ledger::{Fill, LedgerEntry};
use crate::portfolio::PerformanceReport;
use crate::series::DailySeries;

/// One reconstructed exchange account: the normalized records plus the
/// daily series derived from them.
///
/// Cash accounts (USD and USD-pegged assets) carry no fills and no
/// performance report; their balance already is a USD value.
#[derive(Debug, Serialize)]
pub struct Account {
    pub asset: String,
    pub exchange: ExchangeId,
    pub ledger: Vec<LedgerEntry>,
    pub fills: Vec<Fill>,
    pub deposits: DailySeries,
    pub balance_sheet: DailySeries,
    pub performance: Option<PerformanceReport>,
}

impl Account {
    /// An account with no activity in the requested range.
    pub fn empty(asset: &str, exchange: ExchangeId) -> Self {
        Self {
            asset: asset.to_string(),
            exchange,
            ledger: Vec::new(),
            fills: Vec::new(),
            deposits: DailySeries::new(),
            balance_sheet: DailySeries::new(),
            performance: None,
        }
    }
}

/// A fetch that did not complete, kept as context on the build.
#[derive(Debug, Clone, Serialize)]
pub struct FetchIssue {
    pub endpoint: String,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub message: String,
}

impl FetchIssue {
    pub fn from_failure(endpoint: &str, failure: &WindowFailure) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            window_start: failure.window.start,
            window_end: failure.window.end,
            message: failure.error.to_string(),
        }
    }
}

/// The result of building one account: the account itself plus any
/// windows that could not be fetched. Series derived from a partial
/// fetch are still internally consistent; the issues say from which
/// window onward data is missing.
#[derive(Debug, Serialize)]
pub struct AccountBuild {
    pub account: Account,
    pub fetch_issues: Vec<FetchIssue>,
}

impl AccountBuild {
    pub fn is_complete(&self) -> bool {
        self.fetch_issues.is_empty()
    }
}
