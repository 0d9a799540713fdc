//! Daily value series.
//!
//! Every reconstructed quantity in this crate (balance, deposits,
//! price, value, performance) is a [`DailySeries`]: one decimal per
//! calendar day, complete from its first defined day to the end of the
//! span it was built over, undefined before that. The resampler is the
//! single place raw timestamped observations become daily values.

mod daily_series;
mod resampler;

pub use daily_series::DailySeries;
pub use resampler::{resample_daily_last, resample_daily_sum};
