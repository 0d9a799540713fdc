//! Wire-level models for exchange responses.
//!
//! Raw records keep every numeric field as the string the exchange sent
//! it as; parsing to `Decimal` and sign normalization happen in the core
//! crate's ledger normalizer, so this crate stays a faithful transcript
//! of what each endpoint returned.

mod candle;
mod exchange_id;
mod records;

pub use candle::{sort_candles, Candle};
pub use exchange_id::ExchangeId;
pub use records::{
    CoinbaseFillRecord, CoinbaseLedgerDetails, CoinbaseLedgerRecord, KucoinFillRecord,
    KucoinLedgerRecord, RawFillRecord, RawLedgerRecord,
};
