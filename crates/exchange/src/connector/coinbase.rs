//! Coinbase Pro connector.
//!
//! Coinbase Pro keeps one ledger per account and returns it from a
//! single request, so no window planning applies there; fills likewise
//! come back from one product-filtered request. Only the candle
//! endpoint caps the span, at 300 candles per request. Responses are
//! bare JSON arrays with no envelope.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use tokio_util::sync::CancellationToken;

use crate::client::QueryClient;
use crate::fetch::{FetchOutcome, PaginatedFetcher};
use crate::models::{Candle, ExchangeId, RawFillRecord, RawLedgerRecord};
use crate::rate_limiter::RateLimiter;
use crate::windows::{plan_capped_windows, Window};

use super::{
    bare_array, finalize_candles, typed_items, AccountRef, EndpointLimits, ExchangeConnector,
};

const LEDGER_KEY: &str = "COINBASE_PRO:ledger";
const FILL_KEY: &str = "COINBASE_PRO:fills";
const CANDLE_KEY: &str = "COINBASE_PRO:candles";

const LEDGER_LIMITS: EndpointLimits = EndpointLimits {
    requests_per_second: 5.0,
    burst: 5.0,
    max_records: 1000,
    window_step: Duration::days(1),
};

const FILL_LIMITS: EndpointLimits = EndpointLimits {
    requests_per_second: 5.0,
    burst: 5.0,
    max_records: 1000,
    window_step: Duration::days(7),
};

const CANDLE_RATE: EndpointLimits = EndpointLimits {
    requests_per_second: 10.0,
    burst: 10.0,
    max_records: 300,
    window_step: Duration::days(1),
};

/// Most grid points one candle request may cover.
const MAX_CANDLE_POINTS: usize = 300;

pub struct CoinbaseProConnector {
    fetcher: PaginatedFetcher,
}

impl CoinbaseProConnector {
    pub fn new(client: Arc<dyn QueryClient>, limiter: Arc<RateLimiter>) -> Self {
        limiter.configure(LEDGER_KEY, LEDGER_LIMITS.rate());
        limiter.configure(FILL_KEY, FILL_LIMITS.rate());
        limiter.configure(CANDLE_KEY, CANDLE_RATE.rate());
        Self {
            fetcher: PaginatedFetcher::new(client, limiter),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.fetcher = self.fetcher.with_cancellation(cancel);
        self
    }
}

#[async_trait]
impl ExchangeConnector for CoinbaseProConnector {
    fn id(&self) -> ExchangeId {
        ExchangeId::CoinbasePro
    }

    fn usd_pair(&self, asset: &str) -> String {
        format!("{}-USD", asset)
    }

    fn ledger_limits(&self) -> EndpointLimits {
        LEDGER_LIMITS
    }

    fn fill_limits(&self) -> EndpointLimits {
        FILL_LIMITS
    }

    /// The ledger comes back whole from one request; `start`/`end`
    /// bound the span the caller cares about but are not sent.
    async fn fetch_ledger(
        &self,
        account: &AccountRef,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> FetchOutcome<RawLedgerRecord> {
        let windows = [Window { start, end }];
        self.fetcher
            .fetch_windows(
                LEDGER_KEY,
                &windows,
                |_| format!("/accounts/{}/ledger", account.account_id),
                |body| {
                    let items = bare_array(body, ExchangeId::CoinbasePro)?;
                    Ok(typed_items(items, ExchangeId::CoinbasePro)?
                        .into_iter()
                        .map(RawLedgerRecord::Coinbase)
                        .collect())
                },
            )
            .await
    }

    async fn fetch_fills(
        &self,
        asset: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> FetchOutcome<RawFillRecord> {
        let product_id = self.usd_pair(asset);
        let windows = [Window { start, end }];
        self.fetcher
            .fetch_windows(
                FILL_KEY,
                &windows,
                |_| format!("/fills?product_id={}", product_id),
                |body| {
                    let items = bare_array(body, ExchangeId::CoinbasePro)?;
                    Ok(typed_items(items, ExchangeId::CoinbasePro)?
                        .into_iter()
                        .map(RawFillRecord::Coinbase)
                        .collect())
                },
            )
            .await
    }

    async fn fetch_candles(
        &self,
        pair: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity_secs: u32,
    ) -> FetchOutcome<Candle> {
        let step = Duration::seconds(i64::from(granularity_secs));
        let windows = plan_capped_windows(start, end, step, MAX_CANDLE_POINTS);
        let mut outcome = self
            .fetcher
            .fetch_windows(
                CANDLE_KEY,
                &windows,
                |w| {
                    format!(
                        "/products/{}/candles?granularity={}&start={}&end={}",
                        pair,
                        granularity_secs,
                        w.start.format("%Y-%m-%dT%H:%M:%SZ"),
                        w.end.format("%Y-%m-%dT%H:%M:%SZ")
                    )
                },
                |body| {
                    let rows = bare_array(body, ExchangeId::CoinbasePro)?;
                    rows.iter().map(Candle::from_coinbase_row).collect()
                },
            )
            .await;
        finalize_candles(&mut outcome);
        outcome
    }
}
