//! Minimal reqwest-backed [`QueryClient`] for public endpoints.
//!
//! Candle endpoints on both exchanges are unauthenticated, so this
//! client covers them directly. For private endpoints (ledgers, fills)
//! callers wrap it, or replace it, with an implementation that signs
//! requests; signing is outside this crate.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::errors::ExchangeError;
use crate::models::ExchangeId;

use super::QueryClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP query client for one exchange host.
pub struct HttpQueryClient {
    client: Client,
    base_url: String,
    exchange: ExchangeId,
}

impl HttpQueryClient {
    /// Creates a client for the exchange's production host.
    pub fn new(exchange: ExchangeId) -> Result<Self, ExchangeError> {
        let base_url = match exchange {
            ExchangeId::CoinbasePro => "https://api.exchange.coinbase.com",
            ExchangeId::Kucoin => "https://api.kucoin.com",
        };
        Self::with_base_url(exchange, base_url)
    }

    /// Creates a client for a custom host (sandbox environments, tests).
    pub fn with_base_url(exchange: ExchangeId, base_url: &str) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ExchangeError::Network)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            exchange,
        })
    }
}

#[async_trait]
impl QueryClient for HttpQueryClient {
    async fn get(&self, path: &str) -> Result<Value, ExchangeError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExchangeError::Timeout {
                        exchange: self.exchange.to_string(),
                    }
                } else {
                    ExchangeError::Network(e)
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ExchangeError::Authentication(format!(
                    "{} rejected request to {}",
                    self.exchange, path
                )))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(ExchangeError::RateLimited {
                    exchange: self.exchange.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(ExchangeError::MalformedResponse {
                    exchange: self.exchange.to_string(),
                    message: format!("unexpected status {} for {}", status, path),
                })
            }
            _ => {}
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ExchangeError::MalformedResponse {
                exchange: self.exchange.to_string(),
                message: format!("body is not JSON: {}", e),
            })
    }
}
