//! Per-exchange connectors.
//!
//! A connector owns everything exchange-specific about fetching: request
//! paths, page envelopes, window geometry, and rate limits. Everything
//! above this module works against [`ExchangeConnector`] and the raw
//! record enums, so adding an exchange means adding one module here and
//! one normalizer in the core crate.

mod coinbase;
mod kucoin;

pub use coinbase::CoinbaseProConnector;
pub use kucoin::KucoinConnector;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ExchangeError;
use crate::fetch::FetchOutcome;
use crate::models::{Candle, ExchangeId, RawFillRecord, RawLedgerRecord};
use crate::rate_limiter::RateLimitConfig;

/// Identifies one exchange-side account to fetch a ledger for.
///
/// Coinbase Pro addresses ledgers by an opaque account id in the path;
/// KuCoin filters one shared ledger by currency. Both handles travel
/// together so a connector can pick the one it needs.
#[derive(Debug, Clone)]
pub struct AccountRef {
    /// Exchange-assigned account identifier.
    pub account_id: String,
    /// Asset symbol the account holds, e.g. "BTC".
    pub asset: String,
}

/// Request ceilings and window geometry for one history endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EndpointLimits {
    pub requests_per_second: f64,
    pub burst: f64,
    /// Most records one response may carry (page size cap).
    pub max_records: usize,
    /// Native span of one request window.
    pub window_step: Duration,
}

impl EndpointLimits {
    pub fn rate(&self) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: self.requests_per_second,
            burst: self.burst,
        }
    }
}

/// History access for one exchange.
///
/// All fetch methods return partial results on failure; see
/// [`FetchOutcome`].
#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    fn id(&self) -> ExchangeId;

    /// The exchange's USD-quoted product for an asset symbol
    /// ("BTC-USD" on Coinbase Pro, "BTC-USDT" on KuCoin).
    fn usd_pair(&self, asset: &str) -> String;

    fn ledger_limits(&self) -> EndpointLimits;

    fn fill_limits(&self) -> EndpointLimits;

    /// Fetches the account's ledger entries over `[start, end]`.
    async fn fetch_ledger(
        &self,
        account: &AccountRef,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> FetchOutcome<RawLedgerRecord>;

    /// Fetches the asset's USD-pair fills over `[start, end]`.
    async fn fetch_fills(
        &self,
        asset: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> FetchOutcome<RawFillRecord>;

    /// Fetches candles for a product pair at the given granularity.
    /// Candles come back ascending by period start with boundary
    /// duplicates removed, whatever order the exchange returned.
    async fn fetch_candles(
        &self,
        pair: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        granularity_secs: u32,
    ) -> FetchOutcome<Candle>;
}

/// Unwraps KuCoin's `{code, data}` envelope.
pub(crate) fn kucoin_data(body: &Value) -> Result<&Value, ExchangeError> {
    body.get("data").ok_or_else(|| ExchangeError::MalformedResponse {
        exchange: ExchangeId::Kucoin.to_string(),
        message: "response has no 'data' field".to_string(),
    })
}

/// Extracts the `items` array from a KuCoin paged response
/// (`{code, data: {totalNum, items: [...]}}`).
///
/// Only the first page of a window is read; the window geometry keeps
/// record counts under the page size, but if a window still overflows
/// the overflow is logged rather than fetched.
pub(crate) fn kucoin_page_items(body: &Value) -> Result<&Vec<Value>, ExchangeError> {
    let data = kucoin_data(body)?;
    let items = data
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| ExchangeError::MalformedResponse {
            exchange: ExchangeId::Kucoin.to_string(),
            message: "paged response has no 'data.items' array".to_string(),
        })?;
    let total = data.get("totalNum").and_then(Value::as_u64).unwrap_or(0) as usize;
    if total > items.len() {
        warn!(
            "kucoin page reports {} records but carries {}; {} dropped beyond the first page",
            total,
            items.len(),
            total - items.len()
        );
    }
    Ok(items)
}

/// Interprets a response body as a bare JSON array, the Coinbase Pro
/// page shape.
pub(crate) fn bare_array(body: &Value, exchange: ExchangeId) -> Result<&Vec<Value>, ExchangeError> {
    body.as_array().ok_or_else(|| ExchangeError::MalformedResponse {
        exchange: exchange.to_string(),
        message: "response body is not an array".to_string(),
    })
}

/// Deserializes each item of a page into the typed raw record.
pub(crate) fn typed_items<T: DeserializeOwned>(
    items: &[Value],
    exchange: ExchangeId,
) -> Result<Vec<T>, ExchangeError> {
    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone()).map_err(|e| ExchangeError::MalformedResponse {
                exchange: exchange.to_string(),
                message: format!("record does not match the expected shape: {}", e),
            })
        })
        .collect()
}

/// Sorts fetched candles ascending and drops window-boundary
/// duplicates (adjacent windows share their boundary instant).
pub(crate) fn finalize_candles(outcome: &mut FetchOutcome<Candle>) {
    crate::models::sort_candles(&mut outcome.records);
    outcome.records.dedup_by_key(|c| c.timestamp);
}

pub(crate) fn epoch_ms(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp_millis()
}

pub(crate) fn epoch_s(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kucoin_page_items_unwraps_envelope() {
        let body = json!({
            "code": "200000",
            "data": { "totalNum": 2, "totalPage": 1, "items": [{"a": 1}, {"a": 2}] }
        });
        let items = kucoin_page_items(&body).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_kucoin_overflowing_page_still_yields_its_items() {
        // totalNum beyond the page is logged, not fatal
        let body = json!({
            "code": "200000",
            "data": { "totalNum": 700, "totalPage": 2, "items": [{"a": 1}, {"a": 2}] }
        });
        let items = kucoin_page_items(&body).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_kucoin_missing_items_is_malformed() {
        let body = json!({ "code": "200000", "data": {} });
        let err = kucoin_page_items(&body).unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedResponse { .. }));
    }

    #[test]
    fn test_bare_array_rejects_objects() {
        let body = json!({ "message": "NotFound" });
        let err = bare_array(&body, ExchangeId::CoinbasePro).unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedResponse { .. }));
    }
}
