//! Per-survey detection rate counters.
//!
//! A [`RateCounter`] partitions every simulated source seen by a survey into
//! one of four outcomes (detected, too faint, too late, outside the survey)
//! and carries the survey metadata needed to turn those tallies into rates.
//! [`scale`] and [`scale_time`] derive area/time corrected copies without ever
//! touching the counter they are given.

pub mod counter;
pub mod error;
pub mod scaling;

#[cfg(test)]
mod tests;

pub use counter::{DetectionOutcome, RateCounter, DAYS_PER_YEAR};
pub use error::{RateError, ScaleKind};
pub use scaling::{scale, scale_time};
