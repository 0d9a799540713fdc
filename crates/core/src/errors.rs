//! Core error types.
//!
//! Exchange transport errors are defined in `coinfolio-exchange` and
//! wrapped here; everything downstream of fetching reports through this
//! module's types.

use chrono::ParseError as ChronoParseError;
use thiserror::Error;

use coinfolio_exchange::ExchangeError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for portfolio reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Exchange request failed: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Snapshot export failed: {0}")]
    Export(#[from] ExportError),
}

/// Validation errors for raw record parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),

    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    #[error("Record from {found} handed to the {expected} normalizer")]
    ExchangeMismatch { expected: String, found: String },
}

/// Errors that occur while deriving the daily series.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("No usable price series for {0}")]
    MissingPriceSeries(String),

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Errors from writing CSV snapshots.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
