//! Market candle model.

use chrono::{DateTime, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ExchangeError;

use super::ExchangeId;

/// One OHLCV candle for a USD-quoted pair.
///
/// Both exchanges return candles as positional tuples rather than
/// objects, and neither guarantees ascending order, so rows are parsed
/// positionally and callers sort the collected vector by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the candle period, timezone-stripped.
    pub timestamp: NaiveDateTime,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Parses a Coinbase Pro candle row:
    /// `[period_start_epoch_seconds, low, high, open, close, volume]`,
    /// all numeric.
    pub fn from_coinbase_row(row: &Value) -> Result<Self, ExchangeError> {
        let fields = tuple_fields(row, 6, ExchangeId::CoinbasePro)?;
        Ok(Candle {
            timestamp: epoch_seconds(&fields[0], ExchangeId::CoinbasePro)?,
            low: decimal_field(&fields[1], "low", ExchangeId::CoinbasePro)?,
            high: decimal_field(&fields[2], "high", ExchangeId::CoinbasePro)?,
            open: decimal_field(&fields[3], "open", ExchangeId::CoinbasePro)?,
            close: decimal_field(&fields[4], "close", ExchangeId::CoinbasePro)?,
            volume: decimal_field(&fields[5], "volume", ExchangeId::CoinbasePro)?,
        })
    }

    /// Parses a KuCoin candle row:
    /// `[period_start_epoch_seconds, open, close, high, low, volume, turnover]`,
    /// all strings. The trailing turnover column is ignored.
    pub fn from_kucoin_row(row: &Value) -> Result<Self, ExchangeError> {
        let fields = tuple_fields(row, 6, ExchangeId::Kucoin)?;
        Ok(Candle {
            timestamp: epoch_seconds(&fields[0], ExchangeId::Kucoin)?,
            open: decimal_field(&fields[1], "open", ExchangeId::Kucoin)?,
            close: decimal_field(&fields[2], "close", ExchangeId::Kucoin)?,
            high: decimal_field(&fields[3], "high", ExchangeId::Kucoin)?,
            low: decimal_field(&fields[4], "low", ExchangeId::Kucoin)?,
            volume: decimal_field(&fields[5], "volume", ExchangeId::Kucoin)?,
        })
    }
}

/// Sorts candles ascending by period start. Exchanges do not guarantee
/// order (KuCoin returns newest first), and day-bucketing downstream
/// requires ascending timestamps.
pub fn sort_candles(candles: &mut [Candle]) {
    candles.sort_by_key(|c| c.timestamp);
}

fn tuple_fields(
    row: &Value,
    min_len: usize,
    exchange: ExchangeId,
) -> Result<&[Value], ExchangeError> {
    let fields = row
        .as_array()
        .ok_or_else(|| ExchangeError::MalformedResponse {
            exchange: exchange.to_string(),
            message: "candle row is not an array".to_string(),
        })?;
    if fields.len() < min_len {
        return Err(ExchangeError::MalformedResponse {
            exchange: exchange.to_string(),
            message: format!("candle row has {} fields, expected {}", fields.len(), min_len),
        });
    }
    Ok(fields)
}

/// Reads a decimal from a field that may be a JSON number or a string.
fn decimal_field(value: &Value, name: &str, exchange: ExchangeId) -> Result<Decimal, ExchangeError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(ExchangeError::MalformedResponse {
                exchange: exchange.to_string(),
                message: format!("candle field '{}' has unexpected type: {}", name, other),
            })
        }
    };
    text.parse::<Decimal>()
        .map_err(|e| ExchangeError::MalformedResponse {
            exchange: exchange.to_string(),
            message: format!("candle field '{}' is not a decimal: {}", name, e),
        })
}

fn epoch_seconds(value: &Value, exchange: ExchangeId) -> Result<NaiveDateTime, ExchangeError> {
    let secs = match value {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        _ => None,
    }
    .ok_or_else(|| ExchangeError::MalformedResponse {
        exchange: exchange.to_string(),
        message: "candle timestamp is not an epoch integer".to_string(),
    })?;
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| ExchangeError::MalformedResponse {
            exchange: exchange.to_string(),
            message: format!("candle timestamp out of range: {}", secs),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_coinbase_row_parses_numeric_tuple() {
        let row = json!([1636243200, 61000.5, 63500.0, 62000.0, 63000.0, 120.25]);
        let candle = Candle::from_coinbase_row(&row).unwrap();
        assert_eq!(candle.low, dec!(61000.5));
        assert_eq!(candle.high, dec!(63500.0));
        assert_eq!(candle.open, dec!(62000.0));
        assert_eq!(candle.close, dec!(63000.0));
        assert_eq!(candle.timestamp.and_utc().timestamp(), 1636243200);
    }

    #[test]
    fn test_kucoin_row_parses_string_tuple() {
        let row = json!(["1636243200", "2.05", "2.10", "2.15", "2.00", "1000.5", "2075.0"]);
        let candle = Candle::from_kucoin_row(&row).unwrap();
        assert_eq!(candle.open, dec!(2.05));
        assert_eq!(candle.close, dec!(2.10));
        assert_eq!(candle.high, dec!(2.15));
        assert_eq!(candle.low, dec!(2.00));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let row = json!([1636243200, 1.0, 2.0]);
        let err = Candle::from_coinbase_row(&row).unwrap_err();
        assert!(matches!(err, ExchangeError::MalformedResponse { .. }));
    }

    #[test]
    fn test_sort_candles_orders_descending_input() {
        let rows = vec![
            json!(["1636329600", "1", "1", "1", "1", "0", "0"]),
            json!(["1636243200", "2", "2", "2", "2", "0", "0"]),
        ];
        let mut candles: Vec<Candle> = rows
            .iter()
            .map(|r| Candle::from_kucoin_row(r).unwrap())
            .collect();
        sort_candles(&mut candles);
        assert!(candles[0].timestamp < candles[1].timestamp);
    }
}
