use popsynth_core::sample::{finite_values, logspace, positive_extent};
use popsynth_core::{PopSynthError, Result};
use serde::{Deserialize, Serialize};

/// Reverse-cumulative counts on log-spaced edges, as used for log N - log S
/// plots: `counts[i]` is the number of sources in or above the bin starting
/// at `thresholds[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeCounts {
    pub thresholds: Vec<f64>,
    pub counts: Vec<u64>,
}

/// Build the N(>S) curve of a sample of peak fluxes (or any positive quantity).
///
/// `n_edges` log10-spaced edges are laid between the smallest and largest
/// positive values; non-positive and non-finite values are ignored.
pub fn cumulative_log_counts(sample: &[f64], n_edges: usize) -> Result<CumulativeCounts> {
    if n_edges < 2 {
        return Err(PopSynthError::InvalidBinCount(n_edges));
    }
    let data: Vec<f64> = finite_values(sample)
        .into_iter()
        .filter(|&x| x > 0.0)
        .collect();
    let (lo, hi) = positive_extent(&data).ok_or_else(|| {
        PopSynthError::InsufficientData("no positive values to accumulate".to_string())
    })?;

    let mut edges = logspace(lo.log10(), hi.log10(), n_edges, 10.0);
    edges[0] = lo;
    edges[n_edges - 1] = hi;

    let n_bins = n_edges - 1;
    let mut per_bin = vec![0u64; n_bins];
    for &x in &data {
        let idx = if x >= hi {
            n_bins - 1
        } else {
            edges.partition_point(|&e| e <= x).saturating_sub(1)
        };
        per_bin[idx.min(n_bins - 1)] += 1;
    }

    let mut counts = per_bin;
    for i in (0..n_bins.saturating_sub(1)).rev() {
        counts[i] += counts[i + 1];
    }

    edges.truncate(n_bins);
    Ok(CumulativeCounts {
        thresholds: edges,
        counts,
    })
}
