use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use coinfolio_exchange::ExchangeId;

/// Canonical classification of a ledger entry.
///
/// Raw exchange type strings that do not map to a known variant are
/// carried through as `Other` rather than dropped; the original string
/// also stays in the entry's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryType {
    Deposit,
    Withdrawal,
    Trade,
    Fee,
    Transfer,
    Other(String),
}

impl EntryType {
    /// Maps a Coinbase Pro ledger `type` string.
    pub fn from_coinbase(raw: &str) -> Self {
        match raw {
            "deposit" => EntryType::Deposit,
            "withdrawal" => EntryType::Withdrawal,
            "match" => EntryType::Trade,
            "fee" => EntryType::Fee,
            "transfer" => EntryType::Transfer,
            other => EntryType::Other(other.to_string()),
        }
    }

    /// Maps a KuCoin ledger `bizType` string.
    pub fn from_kucoin(raw: &str) -> Self {
        match raw {
            "Deposit" => EntryType::Deposit,
            "Withdrawal" => EntryType::Withdrawal,
            "Exchange" | "Trade" => EntryType::Trade,
            "Fee" => EntryType::Fee,
            "Transfer" => EntryType::Transfer,
            other => EntryType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryType::Deposit => "deposit",
            EntryType::Withdrawal => "withdrawal",
            EntryType::Trade => "trade",
            EntryType::Fee => "fee",
            EntryType::Transfer => "transfer",
            EntryType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntryType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One normalized ledger entry.
///
/// `amount` is signed (outflows negative); `balance` is the asset
/// quantity held after this entry, recomputed by the normalizer when
/// the exchange's own balance field is not a usable running balance.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub asset: String,
    pub amount: Decimal,
    pub balance: Decimal,
    pub entry_type: EntryType,
    pub source: ExchangeId,
    /// Raw fields not consumed by normalization.
    pub metadata: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FillSide {
    Buy,
    Sell,
}

impl fmt::Display for FillSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FillSide::Buy => "buy",
            FillSide::Sell => "sell",
        })
    }
}

/// One normalized trade fill on the asset's USD-quoted pair.
#[derive(Debug, Clone, Serialize)]
pub struct Fill {
    pub timestamp: NaiveDateTime,
    pub side: FillSide,
    pub price: Decimal,
    pub size: Decimal,
    pub fee: Decimal,
    /// Total quote-currency (USD) volume moved by this fill, fee
    /// included.
    pub quote_volume: Decimal,
}
