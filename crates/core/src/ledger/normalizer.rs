//! Raw record normalization.
//!
//! Each exchange registers one set of rules in a lookup table keyed by
//! [`ExchangeId`]: how to turn its raw ledger record into a
//! [`LedgerEntry`], how to turn its raw fill into a [`Fill`], and
//! whether its reported balance survives as the running balance.
//! Adding an exchange touches this table and nothing downstream.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDateTime};
use log::debug;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use coinfolio_exchange::{
    CoinbaseFillRecord, CoinbaseLedgerRecord, ExchangeId, KucoinFillRecord, KucoinLedgerRecord,
    RawFillRecord, RawLedgerRecord,
};

use crate::errors::{Result, ValidationError};

use super::{EntryType, Fill, FillSide, LedgerEntry};

struct ExchangeRules {
    normalize_entry: fn(&RawLedgerRecord, &str) -> Result<LedgerEntry>,
    normalize_fill: fn(&RawFillRecord) -> Result<Fill>,
    /// True when the exchange's balance field is not a usable running
    /// balance and must be recomputed as the cumulative amount sum.
    recompute_balance: bool,
}

/// Turns raw exchange records into the canonical ledger model.
pub struct LedgerNormalizer {
    rules: HashMap<ExchangeId, ExchangeRules>,
}

impl LedgerNormalizer {
    pub fn new() -> Self {
        let mut rules = HashMap::new();
        rules.insert(
            ExchangeId::CoinbasePro,
            ExchangeRules {
                normalize_entry: coinbase_entry,
                normalize_fill: coinbase_fill,
                // cbpro reports the post-entry balance on every row
                recompute_balance: false,
            },
        );
        rules.insert(
            ExchangeId::Kucoin,
            ExchangeRules {
                normalize_entry: kucoin_entry,
                normalize_fill: kucoin_fill,
                // kucoin balances are per sub-account snapshots
                recompute_balance: true,
            },
        );
        Self { rules }
    }

    /// Normalizes one account's raw ledger: parse, sign, dedup by id,
    /// sort ascending by timestamp, and recompute the running balance
    /// where the exchange's own is unusable. Running this over already
    /// normalized data produces the same result.
    ///
    /// `asset` names the account's asset for exchanges whose ledger
    /// rows do not carry a currency field.
    pub fn normalize_ledger(
        &self,
        records: &[RawLedgerRecord],
        asset: &str,
    ) -> Result<Vec<LedgerEntry>> {
        let mut entries = Vec::with_capacity(records.len());
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        let mut exchange = None;

        for record in records {
            match exchange {
                None => exchange = Some(record.exchange()),
                Some(expected) if expected != record.exchange() => {
                    return Err(ValidationError::ExchangeMismatch {
                        expected: expected.to_string(),
                        found: record.exchange().to_string(),
                    }
                    .into())
                }
                Some(_) => {}
            }
            // window boundaries are inclusive on both sides, so a record
            // can arrive in two adjacent windows
            if !seen.insert(record.id()) {
                continue;
            }
            entries.push((self.rules_for(record.exchange())?.normalize_entry)(
                record, asset,
            )?);
        }

        let dropped = records.len() - entries.len();
        if dropped > 0 {
            debug!("Dropped {} duplicate ledger records for {}", dropped, asset);
        }

        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

        if let Some(exchange) = exchange {
            if self.rules_for(exchange)?.recompute_balance {
                let mut running = Decimal::ZERO;
                for entry in &mut entries {
                    running += entry.amount;
                    entry.balance = running;
                }
            }
        }

        Ok(entries)
    }

    /// Normalizes fills: parse and sort ascending by timestamp.
    pub fn normalize_fills(&self, records: &[RawFillRecord]) -> Result<Vec<Fill>> {
        let mut fills = records
            .iter()
            .map(|record| (self.rules_for(record.exchange())?.normalize_fill)(record))
            .collect::<Result<Vec<Fill>>>()?;
        fills.sort_by_key(|f| f.timestamp);
        Ok(fills)
    }

    fn rules_for(&self, exchange: ExchangeId) -> Result<&ExchangeRules> {
        self.rules.get(&exchange).ok_or_else(|| {
            ValidationError::InvalidInput(format!("no normalization rules for {}", exchange)).into()
        })
    }
}

impl Default for LedgerNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn coinbase_entry(record: &RawLedgerRecord, asset: &str) -> Result<LedgerEntry> {
    let r = expect_coinbase_ledger(record)?;
    Ok(LedgerEntry {
        id: r.id.clone(),
        timestamp: parse_rfc3339(&r.created_at)?,
        asset: asset.to_string(),
        amount: r.amount.parse::<Decimal>()?,
        balance: r.balance.parse::<Decimal>()?,
        entry_type: EntryType::from_coinbase(&r.entry_type),
        source: ExchangeId::CoinbasePro,
        metadata: coinbase_metadata(r),
    })
}

fn kucoin_entry(record: &RawLedgerRecord, _asset: &str) -> Result<LedgerEntry> {
    let r = expect_kucoin_ledger(record)?;
    let mut amount = r.amount.parse::<Decimal>()?;
    // kucoin reports magnitudes; trade-account outflows carry the sign
    // in the direction flag
    if r.direction == "out" && r.account_type == "TRADE" {
        amount = -amount;
    }
    Ok(LedgerEntry {
        id: r.id.clone(),
        timestamp: from_epoch_ms(r.created_at)?,
        asset: r.currency.clone(),
        amount,
        // recomputed by normalize_ledger once entries are ordered
        balance: Decimal::ZERO,
        entry_type: match r.biz_type.as_deref() {
            Some(biz) => EntryType::from_kucoin(biz),
            None => EntryType::Other("unknown".to_string()),
        },
        source: ExchangeId::Kucoin,
        metadata: kucoin_metadata(r),
    })
}

fn coinbase_fill(record: &RawFillRecord) -> Result<Fill> {
    let r = expect_coinbase_fill(record)?;
    Ok(Fill {
        timestamp: parse_rfc3339(&r.created_at)?,
        side: parse_side(&r.side)?,
        price: r.price.parse::<Decimal>()?,
        size: r.size.parse::<Decimal>()?,
        fee: r.fee.parse::<Decimal>()?,
        quote_volume: r.usd_volume.parse::<Decimal>()?,
    })
}

fn kucoin_fill(record: &RawFillRecord) -> Result<Fill> {
    let r = expect_kucoin_fill(record)?;
    let fee = r.fee.parse::<Decimal>()?;
    // `funds` excludes the fee; the USD actually spent includes it
    let quote_volume = r.funds.parse::<Decimal>()? + fee;
    Ok(Fill {
        timestamp: from_epoch_ms(r.created_at)?,
        side: parse_side(&r.side)?,
        price: r.price.parse::<Decimal>()?,
        size: r.size.parse::<Decimal>()?,
        fee,
        quote_volume,
    })
}

fn parse_side(raw: &str) -> Result<FillSide> {
    match raw {
        "buy" => Ok(FillSide::Buy),
        "sell" => Ok(FillSide::Sell),
        other => {
            Err(ValidationError::InvalidInput(format!("unknown fill side '{}'", other)).into())
        }
    }
}

fn parse_rfc3339(raw: &str) -> Result<NaiveDateTime> {
    Ok(DateTime::parse_from_rfc3339(raw)?.naive_utc())
}

fn from_epoch_ms(ms: i64) -> Result<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ValidationError::TimestampOutOfRange(ms).into())
}

fn coinbase_metadata(r: &CoinbaseLedgerRecord) -> Value {
    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(r.entry_type.clone()));
    if let Ok(details) = serde_json::to_value(&r.details) {
        map.insert("details".to_string(), details);
    }
    map.extend(r.extra.clone());
    Value::Object(map)
}

fn kucoin_metadata(r: &KucoinLedgerRecord) -> Value {
    let mut map = Map::new();
    map.insert(
        "accountType".to_string(),
        Value::String(r.account_type.clone()),
    );
    map.insert("direction".to_string(), Value::String(r.direction.clone()));
    if let Some(biz) = &r.biz_type {
        map.insert("bizType".to_string(), Value::String(biz.clone()));
    }
    if let Some(fee) = &r.fee {
        map.insert("fee".to_string(), Value::String(fee.clone()));
    }
    map.insert(
        "reportedBalance".to_string(),
        Value::String(r.balance.clone()),
    );
    map.extend(r.extra.clone());
    Value::Object(map)
}

fn expect_coinbase_ledger(record: &RawLedgerRecord) -> Result<&CoinbaseLedgerRecord> {
    match record {
        RawLedgerRecord::Coinbase(r) => Ok(r),
        RawLedgerRecord::Kucoin(_) => Err(mismatch(ExchangeId::CoinbasePro, record.exchange())),
    }
}

fn expect_kucoin_ledger(record: &RawLedgerRecord) -> Result<&KucoinLedgerRecord> {
    match record {
        RawLedgerRecord::Kucoin(r) => Ok(r),
        RawLedgerRecord::Coinbase(_) => Err(mismatch(ExchangeId::Kucoin, record.exchange())),
    }
}

fn expect_coinbase_fill(record: &RawFillRecord) -> Result<&CoinbaseFillRecord> {
    match record {
        RawFillRecord::Coinbase(r) => Ok(r),
        RawFillRecord::Kucoin(_) => Err(mismatch(ExchangeId::CoinbasePro, record.exchange())),
    }
}

fn expect_kucoin_fill(record: &RawFillRecord) -> Result<&KucoinFillRecord> {
    match record {
        RawFillRecord::Kucoin(r) => Ok(r),
        RawFillRecord::Coinbase(_) => Err(mismatch(ExchangeId::Kucoin, record.exchange())),
    }
}

fn mismatch(expected: ExchangeId, found: ExchangeId) -> crate::errors::Error {
    ValidationError::ExchangeMismatch {
        expected: expected.to_string(),
        found: found.to_string(),
    }
    .into()
}
