//! KuCoin connector.
//!
//! KuCoin serves one shared ledger filtered by currency, with every
//! paged response wrapped in a `{code, data: {totalNum, items}}`
//! envelope. History endpoints cap the queryable span per request, so
//! ledgers are fetched in one-day windows and fills in seven-day
//! windows, each window one request. Timestamps on ledger and fill
//! endpoints are epoch milliseconds; candle endpoints use epoch
//! seconds.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use tokio_util::sync::CancellationToken;

use crate::client::QueryClient;
use crate::errors::ExchangeError;
use crate::fetch::{FetchOutcome, PaginatedFetcher, WindowFailure};
use crate::models::{Candle, ExchangeId, RawFillRecord, RawLedgerRecord};
use crate::rate_limiter::RateLimiter;
use crate::windows::{plan_capped_windows, plan_step_windows, Window};

use super::{
    epoch_ms, epoch_s, finalize_candles, kucoin_data, kucoin_page_items, typed_items, AccountRef,
    EndpointLimits, ExchangeConnector,
};

const LEDGER_KEY: &str = "KUCOIN:ledgers";
const FILL_KEY: &str = "KUCOIN:fills";
const CANDLE_KEY: &str = "KUCOIN:candles";

const LEDGER_LIMITS: EndpointLimits = EndpointLimits {
    requests_per_second: 6.0,
    burst: 6.0,
    max_records: 500,
    window_step: Duration::days(1),
};

const FILL_LIMITS: EndpointLimits = EndpointLimits {
    requests_per_second: 3.0,
    burst: 3.0,
    max_records: 500,
    window_step: Duration::days(7),
};

const CANDLE_RATE: EndpointLimits = EndpointLimits {
    requests_per_second: 6.0,
    burst: 6.0,
    max_records: 1500,
    window_step: Duration::days(1),
};

/// Most grid points one candle request may cover.
const MAX_CANDLE_POINTS: usize = 1500;

pub struct KucoinConnector {
    fetcher: PaginatedFetcher,
}

impl KucoinConnector {
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
impl ExchangeConnector for KucoinConnector {
    fn id(&self) -> ExchangeId {
        ExchangeId::Kucoin
    }

    fn usd_pair(&self, asset: &str) -> String {
        format!("{}-USDT", asset)
    }

    fn ledger_limits(&self) -> EndpointLimits {
        LEDGER_LIMITS
    }

    fn fill_limits(&self) -> EndpointLimits {
        FILL_LIMITS
    }

    async fn fetch_ledger(
        &self,
        account: &AccountRef,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> FetchOutcome<RawLedgerRecord> {
        let windows = plan_step_windows(start, end, LEDGER_LIMITS.window_step);
        self.fetcher
            .fetch_windows(
                LEDGER_KEY,
                &windows,
                |w| {
                    format!(
                        "/api/v1/accounts/ledgers?currency={}&startAt={}&endAt={}&pageSize={}",
                        account.asset,
                        epoch_ms(w.start),
                        epoch_ms(w.end),
                        LEDGER_LIMITS.max_records
                    )
                },
                |body| {
                    let items = kucoin_page_items(body)?;
                    Ok(typed_items(items, ExchangeId::Kucoin)?
                        .into_iter()
                        .map(RawLedgerRecord::Kucoin)
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
        let symbol = self.usd_pair(asset);
        let windows = plan_step_windows(start, end, FILL_LIMITS.window_step);
        self.fetcher
            .fetch_windows(
                FILL_KEY,
                &windows,
                |w| {
                    format!(
                        "/api/v1/fills?symbol={}&startAt={}&endAt={}&pageSize={}",
                        symbol,
                        epoch_ms(w.start),
                        epoch_ms(w.end),
                        FILL_LIMITS.max_records
                    )
                },
                |body| {
                    let items = kucoin_page_items(body)?;
                    Ok(typed_items(items, ExchangeId::Kucoin)?
                        .into_iter()
                        .map(RawFillRecord::Kucoin)
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
        let candle_type = match candle_type(granularity_secs) {
            Some(t) => t,
            None => {
                return FetchOutcome {
                    records: Vec::new(),
                    failure: Some(WindowFailure {
                        window: Window { start, end },
                        error: ExchangeError::MalformedResponse {
                            exchange: ExchangeId::Kucoin.to_string(),
                            message: format!(
                                "no KuCoin candle type for granularity {}s",
                                granularity_secs
                            ),
                        },
                    }),
                }
            }
        };

        let step = Duration::seconds(i64::from(granularity_secs));
        let windows = plan_capped_windows(start, end, step, MAX_CANDLE_POINTS);
        let mut outcome = self
            .fetcher
            .fetch_windows(
                CANDLE_KEY,
                &windows,
                |w| {
                    format!(
                        "/api/v1/market/candles?symbol={}&type={}&startAt={}&endAt={}",
                        pair,
                        candle_type,
                        epoch_s(w.start),
                        epoch_s(w.end)
                    )
                },
                |body| {
                    let rows = kucoin_data(body)?.as_array().ok_or_else(|| {
                        ExchangeError::MalformedResponse {
                            exchange: ExchangeId::Kucoin.to_string(),
                            message: "candle 'data' is not an array".to_string(),
                        }
                    })?;
                    rows.iter().map(Candle::from_kucoin_row).collect()
                },
            )
            .await;
        finalize_candles(&mut outcome);
        outcome
    }
}

/// Maps a granularity in seconds to KuCoin's candle `type` parameter.
fn candle_type(granularity_secs: u32) -> Option<&'static str> {
    match granularity_secs {
        60 => Some("1min"),
        300 => Some("5min"),
        900 => Some("15min"),
        3600 => Some("1hour"),
        21_600 => Some("6hour"),
        86_400 => Some("1day"),
        604_800 => Some("1week"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedClient {
        responses: Mutex<VecDeque<Value>>,
        paths: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                paths: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl QueryClient for ScriptedClient {
        async fn get(&self, path: &str) -> Result<Value, ExchangeError> {
            self.paths.lock().unwrap().push(path.to_string());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted"))
        }
    }

    fn connector(client: Arc<ScriptedClient>) -> KucoinConnector {
        KucoinConnector::new(client, Arc::new(RateLimiter::new()))
    }

    fn day(d: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2021, 11, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn empty_page() -> Value {
        json!({ "code": "200000", "data": { "totalNum": 0, "items": [] } })
    }

    #[tokio::test]
    async fn test_ledger_fetch_uses_one_day_windows() {
        let client = ScriptedClient::new(vec![empty_page(), empty_page(), empty_page()]);
        let account = AccountRef {
            account_id: "ignored".to_string(),
            asset: "RNDR".to_string(),
        };
        let outcome = connector(client.clone())
            .fetch_ledger(&account, day(1), day(4))
            .await;

        assert!(outcome.is_empty_result());
        let paths = client.paths.lock().unwrap();
        // three day-long windows, one request each
        assert_eq!(paths.len(), 3);
        assert!(paths[0].starts_with("/api/v1/accounts/ledgers?currency=RNDR&startAt="));
        assert!(paths[0].contains("pageSize=500"));
    }

    #[tokio::test]
    async fn test_ledger_fetch_covers_a_mid_day_end() {
        // an end between day boundaries still gets its own request
        let client = ScriptedClient::new(vec![empty_page(), empty_page()]);
        let account = AccountRef {
            account_id: String::new(),
            asset: "RNDR".to_string(),
        };
        let end = day(2) + Duration::hours(12);
        connector(client.clone())
            .fetch_ledger(&account, day(1), end)
            .await;

        let paths = client.paths.lock().unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[1].contains(&format!("endAt={}", epoch_ms(end))));
    }

    #[tokio::test]
    async fn test_ledger_records_come_back_typed() {
        let page = json!({
            "code": "200000",
            "data": {
                "totalNum": 1,
                "items": [{
                    "id": "a1",
                    "currency": "RNDR",
                    "amount": "12.5",
                    "balance": "12.5",
                    "accountType": "TRADE",
                    "direction": "in",
                    "createdAt": 1636243200000i64
                }]
            }
        });
        let client = ScriptedClient::new(vec![page]);
        let account = AccountRef {
            account_id: String::new(),
            asset: "RNDR".to_string(),
        };
        let outcome = connector(client).fetch_ledger(&account, day(1), day(2)).await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.records.len(), 1);
        assert!(matches!(outcome.records[0], RawLedgerRecord::Kucoin(_)));
    }

    #[tokio::test]
    async fn test_fill_fetch_uses_seven_day_windows_and_usdt_pair() {
        let client = ScriptedClient::new(vec![empty_page(), empty_page(), empty_page()]);
        let outcome = connector(client.clone())
            .fetch_fills("RNDR", day(1), day(16))
            .await;

        assert!(outcome.is_empty_result());
        let paths = client.paths.lock().unwrap();
        // week windows from days 1 and 8, plus the one-day tail from 15
        assert_eq!(paths.len(), 3);
        assert!(paths[0].starts_with("/api/v1/fills?symbol=RNDR-USDT&startAt="));
    }

    #[tokio::test]
    async fn test_candles_are_sorted_ascending() {
        // kucoin returns newest first
        let body = json!({
            "code": "200000",
            "data": [
                ["1636329600", "2.1", "2.2", "2.3", "2.0", "10", "21"],
                ["1636243200", "2.0", "2.1", "2.2", "1.9", "11", "22"]
            ]
        });
        let client = ScriptedClient::new(vec![body]);
        let outcome = connector(client)
            .fetch_candles("RNDR-USDT", day(6), day(8), 86_400)
            .await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records[0].timestamp < outcome.records[1].timestamp);
    }

    #[tokio::test]
    async fn test_unsupported_granularity_fails_without_requests() {
        let client = ScriptedClient::new(vec![]);
        let outcome = connector(client.clone())
            .fetch_candles("RNDR-USDT", day(1), day(2), 1234)
            .await;

        assert!(outcome.records.is_empty());
        assert!(outcome.failure.is_some());
        assert!(client.paths.lock().unwrap().is_empty());
    }
}
