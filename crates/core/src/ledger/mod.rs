//! Canonical ledger model and raw-record normalization.

mod model;
mod normalizer;


pub use model::{EntryType, Fill, FillSide, LedgerEntry};
pub use normalizer::LedgerNormalizer;
