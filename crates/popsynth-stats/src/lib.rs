//! Histogramming and counting statistics for simulated survey populations.
//!
//! Binning turns a raw parameter sample (DM, S/N, fluence, ...) into bin
//! centers and values ready for a step plot. The Poisson module turns observed
//! event counts into exact two-sided confidence bounds.

pub mod binning;
pub mod cumulative;
pub mod poisson;

pub use binning::{adaptive_bin_count, hist, BinOptions, DEFAULT_BINS};
pub use cumulative::{cumulative_log_counts, CumulativeCounts};
pub use poisson::{
    poisson_interval, poisson_intervals, rate_interval, tail_probability, PoissonEstimator,
};
