//! Token bucket rate limiter for exchange endpoints.
//!
//! Exchange request ceilings apply per endpoint and per exchange, not
//! per account: two accounts fetched concurrently from the same
//! exchange must share one budget. The limiter is therefore keyed by an
//! `"EXCHANGE:endpoint"` string and handed around in an `Arc`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Fallback for endpoints with no registered limit: one request per
/// second with no burst headroom.
const DEFAULT_REQUESTS_PER_SECOND: f64 = 1.0;
const DEFAULT_BURST: f64 = 1.0;

/// Rate limit for one exchange endpoint.
#[derive(Clone, Copy, Debug)]
pub struct RateLimitConfig {
    /// Sustained request rate the endpoint allows.
    pub requests_per_second: f64,
    /// How many requests may be issued back-to-back before the
    /// sustained rate applies.
    pub burst: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            burst: DEFAULT_BURST,
        }
    }
}

/// Token bucket for a single endpoint.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
    rate: f64,
    capacity: f64,
}

impl TokenBucket {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            tokens: config.burst,
            last_update: Instant::now(),
            rate: config.requests_per_second,
            capacity: config.burst,
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_update = now;
    }

    fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn time_until_available(&mut self) -> Duration {
        self.refill();
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.rate)
        }
    }
}

/// Shared, thread-safe rate limiter keyed by `"EXCHANGE:endpoint"`.
///
/// Limits are registered up front by the connectors that own the
/// endpoints; an unregistered key falls back to a conservative default
/// rather than running unthrottled.
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the bucket map, recovering from poison if necessary.
    ///
    /// Worst case after recovery is slightly inaccurate throttling,
    /// which beats panicking mid-fetch.
    fn lock_buckets(&self) -> MutexGuard<'_, HashMap<String, TokenBucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Registers (or replaces) the limit for an endpoint key.
    pub fn configure(&self, key: &str, config: RateLimitConfig) {
        let mut buckets = self.lock_buckets();
        buckets.insert(key.to_string(), TokenBucket::new(config));
    }

    /// Acquires one request token for the endpoint, waiting as long as
    /// the endpoint's sustained rate requires.
    pub async fn acquire(&self, key: &str) {
        loop {
            let wait = {
                let mut buckets = self.lock_buckets();
                let bucket = buckets
                    .entry(key.to_string())
                    .or_insert_with(|| TokenBucket::new(RateLimitConfig::default()));
                if bucket.try_acquire() {
                    debug!("Rate limiter: acquired token for '{}'", key);
                    return;
                }
                bucket.time_until_available()
            };

            if wait > Duration::ZERO {
                debug!("Rate limiter: waiting {:?} for '{}'", wait, key);
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Acquires a token without waiting. Returns false if the endpoint
    /// is currently throttled.
    pub fn try_acquire(&self, key: &str) -> bool {
        let mut buckets = self.lock_buckets();
        buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(RateLimitConfig::default()))
            .try_acquire()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(rps: f64, burst: f64) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: rps,
            burst,
        }
    }

    #[test]
    fn test_bucket_exhausts_burst() {
        let mut bucket = TokenBucket::new(config(6.0, 3.0));
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let mut bucket = TokenBucket::new(config(1.0, 1.0));
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());

        // simulate two elapsed seconds
        bucket.last_update = Instant::now() - Duration::from_secs(2);
        assert!(bucket.try_acquire());
    }

    #[test]
    fn test_keys_are_isolated() {
        let limiter = RateLimiter::new();
        limiter.configure("KUCOIN:ledgers", config(6.0, 1.0));
        limiter.configure("KUCOIN:fills", config(3.0, 1.0));

        assert!(limiter.try_acquire("KUCOIN:ledgers"));
        assert!(!limiter.try_acquire("KUCOIN:ledgers"));
        // fills budget untouched
        assert!(limiter.try_acquire("KUCOIN:fills"));
    }

    #[test]
    fn test_unregistered_key_gets_default_budget() {
        let limiter = RateLimiter::new();
        assert!(limiter.try_acquire("COINBASE_PRO:unknown"));
        assert!(!limiter.try_acquire("COINBASE_PRO:unknown"));
    }

    #[tokio::test]
    async fn test_async_acquire_waits_for_refill() {
        let limiter = RateLimiter::new();
        limiter.configure("KUCOIN:candles", config(100.0, 1.0));

        limiter.acquire("KUCOIN:candles").await;
        let start = Instant::now();
        limiter.acquire("KUCOIN:candles").await;
        // second acquire had to wait roughly one refill interval (~10ms)
        assert!(start.elapsed().as_millis() >= 5);
    }
}
