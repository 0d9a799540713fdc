//! Paginated window fetching.
//!
//! One request per planned window, in order, throttled by the shared
//! rate limiter. Window order matters: later windows' running-balance
//! reconstruction depends on earlier windows' records, so windows for
//! one account are never fetched concurrently.
//!
//! Failure policy: a transient error (rate limit, timeout) retries the
//! same window with exponential backoff; anything else abandons the
//! fetch but keeps every record already accumulated, so the caller can
//! decide whether a partial series is acceptable. An account with no
//! records at all is a normal outcome, not an error.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::client::QueryClient;
use crate::errors::{ExchangeError, RetryClass};
use crate::rate_limiter::RateLimiter;
use crate::windows::Window;

/// Bounded retry for transient errors on one window.
const MAX_ATTEMPTS: u32 = 4;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// A window that could not be fetched, with the error that stopped it.
#[derive(Debug)]
pub struct WindowFailure {
    pub window: Window,
    pub error: ExchangeError,
}

/// The result of fetching a window sequence.
///
/// `records` always holds everything fetched before `failure` (if any)
/// occurred. Empty records with no failure means the account simply had
/// no activity in the requested range.
#[derive(Debug)]
pub struct FetchOutcome<T> {
    pub records: Vec<T>,
    pub failure: Option<WindowFailure>,
}

impl<T> FetchOutcome<T> {
    /// True when every window was fetched.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// True for the empty-ledger outcome: no records and no failure.
    pub fn is_empty_result(&self) -> bool {
        self.records.is_empty() && self.failure.is_none()
    }

    /// Converts to a `Result`, discarding partial records on failure.
    /// Use the fields directly when a partial series is acceptable.
    pub fn into_complete(self) -> Result<Vec<T>, ExchangeError> {
        match self.failure {
            None => Ok(self.records),
            Some(failure) => Err(failure.error),
        }
    }
}

/// Issues one request per window against a [`QueryClient`].
pub struct PaginatedFetcher {
    client: Arc<dyn QueryClient>,
    limiter: Arc<RateLimiter>,
    cancel: CancellationToken,
}

impl PaginatedFetcher {
    pub fn new(client: Arc<dyn QueryClient>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client,
            limiter,
            cancel: CancellationToken::new(),
        }
    }

    /// Attaches a caller-supplied cancellation token, checked between
    /// windows. Cancelling never discards windows already fetched.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetches every window in order.
    ///
    /// `build_path` renders the request path for one window;
    /// `parse_page` extracts the window's records from the decoded
    /// response body.
    pub async fn fetch_windows<T, B, P>(
        &self,
        limiter_key: &str,
        windows: &[Window],
        build_path: B,
        parse_page: P,
    ) -> FetchOutcome<T>
    where
        B: Fn(&Window) -> String,
        P: Fn(&Value) -> Result<Vec<T>, ExchangeError>,
    {
        let mut records = Vec::new();

        for (index, window) in windows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(
                    "Fetch cancelled before window {}/{} on '{}'",
                    index + 1,
                    windows.len(),
                    limiter_key
                );
                return FetchOutcome {
                    records,
                    failure: Some(WindowFailure {
                        window: *window,
                        error: ExchangeError::Cancelled,
                    }),
                };
            }

            let path = build_path(window);
            match self.fetch_one(limiter_key, &path).await {
                Ok(body) => match parse_page(&body) {
                    Ok(mut page) => {
                        debug!(
                            "Window {}/{} on '{}' returned {} records",
                            index + 1,
                            windows.len(),
                            limiter_key,
                            page.len()
                        );
                        records.append(&mut page);
                    }
                    Err(error) => {
                        warn!(
                            "Window {}/{} on '{}' returned an unparseable page: {}",
                            index + 1,
                            windows.len(),
                            limiter_key,
                            error
                        );
                        return FetchOutcome {
                            records,
                            failure: Some(WindowFailure {
                                window: *window,
                                error,
                            }),
                        };
                    }
                },
                Err(error) => {
                    warn!(
                        "Window {}/{} on '{}' failed: {}; keeping {} records from earlier windows",
                        index + 1,
                        windows.len(),
                        limiter_key,
                        error,
                        records.len()
                    );
                    return FetchOutcome {
                        records,
                        failure: Some(WindowFailure {
                            window: *window,
                            error,
                        }),
                    };
                }
            }
        }

        FetchOutcome {
            records,
            failure: None,
        }
    }

    /// One request with rate limiting and bounded backoff on transient
    /// errors.
    async fn fetch_one(&self, limiter_key: &str, path: &str) -> Result<Value, ExchangeError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 1;
        loop {
            self.limiter.acquire(limiter_key).await;
            match self.client.get(path).await {
                Ok(body) => return Ok(body),
                Err(error) => {
                    if error.retry_class() == RetryClass::WithBackoff && attempt < MAX_ATTEMPTS {
                        warn!(
                            "Transient error on '{}' (attempt {}/{}), backing off {:?}: {}",
                            path, attempt, MAX_ATTEMPTS, backoff, error
                        );
                        tokio::time::sleep(backoff).await;
                        backoff *= 2;
                        attempt += 1;
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }
}
