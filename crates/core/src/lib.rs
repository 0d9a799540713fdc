//! Portfolio reconstruction from raw exchange history.
//!
//! Takes the raw ledger entries, fills, and candles fetched by
//! `coinfolio-exchange` and rebuilds, day by day, what each account
//! held, what was paid in, and how the holding performed — then folds
//! the accounts into one portfolio view and snapshots everything to
//! CSV.
//!
//! The pipeline for one account: normalize raw records into the
//! canonical ledger model, resample running balances and USD inflows
//! into daily series, price the balance with daily candle opens, and
//! derive the performance ratio. [`accounts::AccountService`] wires the
//! stages together; [`portfolio::aggregate_portfolio`] sums accounts.

pub mod accounts;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod portfolio;
pub mod series;
pub mod utils;

pub use accounts::{Account, AccountBuild, AccountService, FetchIssue};
pub use errors::{CalculatorError, Error, ExportError, Result, ValidationError};
pub use export::SnapshotExporter;
pub use ledger::{EntryType, Fill, FillSide, LedgerEntry, LedgerNormalizer};
pub use portfolio::{
    aggregate_portfolio, balance_sheet, compute_performance, daily_open_prices, extract_deposits,
    DepositPolicy, PerformanceReport, Portfolio, PortfolioAggregate,
};
pub use series::{resample_daily_last, resample_daily_sum, DailySeries};
