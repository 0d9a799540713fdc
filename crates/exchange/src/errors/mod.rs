//! Error types and retry classification for the exchange access layer.
//!
//! This module provides:
//! - [`ExchangeError`]: The main error enum for all exchange operations
//! - [`RetryClass`]: Classification for determining retry behavior
//!
//! Note that an account with zero transactions in the requested range is
//! *not* an error: the fetcher reports it as an empty record set (see
//! [`crate::fetch::FetchOutcome`]). Only transport, auth, and parse
//! failures surface here.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while talking to an exchange endpoint.
///
/// Each variant is classified into a [`RetryClass`] via the
/// [`retry_class`](Self::retry_class) method, which determines how the
/// paginated fetcher handles the error.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The exchange rejected the request credentials (HTTP 401/403).
    /// Fatal for the whole run - retrying with the same keys won't help.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The exchange rate limited the request (HTTP 429).
    /// Should be retried with exponential backoff.
    #[error("Rate limited: {exchange}")]
    RateLimited {
        /// The exchange that rate limited the request
        exchange: String,
    },

    /// The request to the exchange timed out.
    /// Should be retried with exponential backoff.
    #[error("Timeout: {exchange}")]
    Timeout {
        /// The exchange that timed out
        exchange: String,
    },

    /// The exchange returned a response whose JSON shape did not match
    /// the documented record format. Fatal for the window that produced
    /// it; records accumulated from earlier windows stay usable.
    #[error("Malformed response from {exchange}: {message}")]
    MalformedResponse {
        /// The exchange that returned the response
        exchange: String,
        /// What failed to decode
        message: String,
    },

    /// The fetch was cancelled by the caller between windows.
    #[error("Fetch cancelled")]
    Cancelled,

    /// A network error occurred while communicating with the exchange.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ExchangeError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Never`]: the window (or the run) is lost, don't re-issue
    /// - [`RetryClass::WithBackoff`]: re-issue the same window after a delay
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Authentication(_) | Self::MalformedResponse { .. } | Self::Cancelled => {
                RetryClass::Never
            }
            Self::RateLimited { .. } | Self::Timeout { .. } => RetryClass::WithBackoff,
            Self::Network(e) if e.is_timeout() => RetryClass::WithBackoff,
            Self::Network(_) => RetryClass::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_never_retries() {
        let error = ExchangeError::Authentication("bad api key".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_malformed_response_never_retries() {
        let error = ExchangeError::MalformedResponse {
            exchange: "KUCOIN".to_string(),
            message: "missing items field".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = ExchangeError::RateLimited {
            exchange: "KUCOIN".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = ExchangeError::Timeout {
            exchange: "COINBASE_PRO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_cancelled_never_retries() {
        assert_eq!(ExchangeError::Cancelled.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = ExchangeError::RateLimited {
            exchange: "KUCOIN".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: KUCOIN");

        let error = ExchangeError::MalformedResponse {
            exchange: "COINBASE_PRO".to_string(),
            message: "expected array".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Malformed response from COINBASE_PRO: expected array"
        );
    }
}
