//! Daily series derivation and portfolio aggregation.

mod aggregate;
mod balance;
mod deposits;
mod performance;

pub use aggregate::{aggregate_portfolio, Portfolio, PortfolioAggregate};
pub use balance::balance_sheet;
pub use deposits::{extract_deposits, DepositPolicy};
pub use performance::{compute_performance, daily_open_prices, PerformanceReport};
