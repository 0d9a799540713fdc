//! Exchange access layer.
//!
//! Fetches raw transaction history and market candles from supported
//! exchanges (Coinbase Pro, KuCoin) as typed but otherwise untouched
//! wire records. Windows an arbitrary date range into the request sizes
//! each endpoint allows, throttles through a shared token-bucket rate
//! limiter, retries transient failures with backoff, and hands partial
//! results back with the failure that stopped them.
//!
//! Interpreting the records (signs, balances, day bucketing) belongs to
//! the core crate; request signing belongs to whoever implements
//! [`QueryClient`].

pub mod client;
pub mod connector;
pub mod errors;
pub mod fetch;
pub mod models;
pub mod rate_limiter;
pub mod windows;

pub use client::{Credentials, HttpQueryClient, QueryClient};
pub use connector::{
    AccountRef, CoinbaseProConnector, EndpointLimits, ExchangeConnector, KucoinConnector,
};
pub use errors::{ExchangeError, RetryClass};
pub use fetch::{FetchOutcome, PaginatedFetcher, WindowFailure};
pub use models::{
    sort_candles, Candle, CoinbaseFillRecord, CoinbaseLedgerDetails, CoinbaseLedgerRecord,
    ExchangeId, KucoinFillRecord, KucoinLedgerRecord, RawFillRecord, RawLedgerRecord,
};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use windows::{plan_capped_windows, plan_step_windows, Window};
