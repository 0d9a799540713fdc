use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange identifiers
pub const EXCHANGE_COINBASE_PRO: &str = "COINBASE_PRO";
pub const EXCHANGE_KUCOIN: &str = "KUCOIN";

/// Identifies which exchange produced a record.
///
/// Used to key the normalization lookup table, the shared rate limiter,
/// and the per-exchange deposit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExchangeId {
    /// Coinbase Pro / Coinbase Exchange
    CoinbasePro,
    /// KuCoin
    Kucoin,
}

impl ExchangeId {
    /// Returns the string identifier for this exchange.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeId::CoinbasePro => EXCHANGE_COINBASE_PRO,
            ExchangeId::Kucoin => EXCHANGE_KUCOIN,
        }
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_id_serialization() {
        assert_eq!(
            serde_json::to_string(&ExchangeId::CoinbasePro).unwrap(),
            "\"COINBASE_PRO\""
        );
        assert_eq!(
            serde_json::to_string(&ExchangeId::Kucoin).unwrap(),
            "\"KUCOIN\""
        );
    }

    #[test]
    fn test_exchange_id_display() {
        assert_eq!(ExchangeId::Kucoin.to_string(), "KUCOIN");
        assert_eq!(ExchangeId::CoinbasePro.to_string(), "COINBASE_PRO");
    }
}
