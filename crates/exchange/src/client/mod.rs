//! Query collaborator abstraction.
//!
//! Everything above this module works against [`QueryClient`]: one
//! authenticated call in, parsed JSON out. Request signing lives with
//! whoever implements the trait; the fetch pipeline never sees raw
//! credentials, only the opaque query capability.

mod credentials;
mod http;

pub use credentials::Credentials;
pub use http::HttpQueryClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ExchangeError;

/// One authenticated exchange query.
///
/// Implementations must be idempotent for GET requests: the paginated
/// fetcher re-issues the same path when retrying a rate-limited window.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Issues a GET for `path` (path plus query string, no host) and
    /// returns the decoded JSON body.
    async fn get(&self, path: &str) -> Result<Value, ExchangeError>;
}
