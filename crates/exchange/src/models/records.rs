//! Raw ledger and fill record shapes, one family per exchange.
//!
//! The two exchanges report the same concepts with different field names,
//! types, and sign conventions. Rather than poking at loose JSON with
//! fallback lookups, each family is a typed struct and the pair is held
//! in a fixed tagged variant (`RawLedgerRecord` / `RawFillRecord`) that
//! downstream normalizers match on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ExchangeId;

/// Nested `details` object on a Coinbase Pro ledger entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoinbaseLedgerDetails {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub trade_id: Option<String>,
}

/// One entry from `GET /accounts/{id}/ledger`.
///
/// Amounts arrive as signed decimal strings; `created_at` is ISO-8601
/// with a timezone offset. The `balance` field is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinbaseLedgerRecord {
    pub id: String,
    pub amount: String,
    pub balance: String,
    pub created_at: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub details: CoinbaseLedgerDetails,
    /// Fields we don't consume, preserved for the canonical record's metadata.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One item from `GET /api/v1/accounts/ledgers`.
///
/// Amounts arrive as unsigned magnitude strings with a separate
/// `direction` flag; `createdAt` is epoch milliseconds. The reported
/// `balance` is per sub-account and not usable as a running balance,
/// so the normalizer recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KucoinLedgerRecord {
    pub id: String,
    pub currency: String,
    pub amount: String,
    #[serde(default)]
    pub fee: Option<String>,
    pub balance: String,
    pub account_type: String,
    #[serde(default)]
    pub biz_type: Option<String>,
    pub direction: String,
    pub created_at: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A raw ledger record from either supported exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawLedgerRecord {
    Coinbase(CoinbaseLedgerRecord),
    Kucoin(KucoinLedgerRecord),
}

impl RawLedgerRecord {
    /// The exchange that produced this record.
    pub fn exchange(&self) -> ExchangeId {
        match self {
            RawLedgerRecord::Coinbase(_) => ExchangeId::CoinbasePro,
            RawLedgerRecord::Kucoin(_) => ExchangeId::Kucoin,
        }
    }

    /// Source-provided identifier, used for deduplication.
    pub fn id(&self) -> &str {
        match self {
            RawLedgerRecord::Coinbase(r) => &r.id,
            RawLedgerRecord::Kucoin(r) => &r.id,
        }
    }
}

/// One fill from `GET /fills?product_id=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinbaseFillRecord {
    pub price: String,
    pub size: String,
    pub fee: String,
    pub side: String,
    pub created_at: String,
    /// Quote-currency volume of the fill.
    pub usd_volume: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One fill from `GET /api/v1/fills`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KucoinFillRecord {
    pub price: String,
    pub size: String,
    pub fee: String,
    pub side: String,
    pub created_at: i64,
    /// Quote-currency volume of the fill (fee not included).
    pub funds: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A raw fill record from either supported exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawFillRecord {
    Coinbase(CoinbaseFillRecord),
    Kucoin(KucoinFillRecord),
}

impl RawFillRecord {
    /// The exchange that produced this record.
    pub fn exchange(&self) -> ExchangeId {
        match self {
            RawFillRecord::Coinbase(_) => ExchangeId::CoinbasePro,
            RawFillRecord::Kucoin(_) => ExchangeId::Kucoin,
        }
    }
}
