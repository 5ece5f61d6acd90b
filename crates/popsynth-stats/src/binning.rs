use popsynth_core::sample::{extent, finite_values, linspace, logspace, midpoints, positive_extent};
use popsynth_core::{BinType, Histogram, Normalization, PopSynthError, Result};
use serde::{Deserialize, Serialize};

/// Base bin count used when the caller does not ask for a specific one.
pub const DEFAULT_BINS: usize = 25;

const SMALL_SAMPLE: usize = 50;
const SMALL_SAMPLE_BINS: usize = 15;
const LARGE_SAMPLE: usize = 500;
const LARGE_SAMPLE_BINS: usize = 50;

/// Options controlling how a sample is binned.
///
/// The defaults match the common plotting case: linear bins, adaptive bin
/// count, max-normalised values and zero-valued padding bins at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinOptions {
    pub bin_type: BinType,
    /// `None` picks a count from the sample size; `Some(n)` is used as-is.
    /// For log spacing this is the number of edges, for linear the number of bins.
    pub bins: Option<usize>,
    pub norm: Normalization,
    /// Pad the histogram with one empty bin beyond each end.
    pub edges: bool,
    /// Explicit bin edges. Overrides `bin_type` and `bins` for edge construction.
    pub bin_edges: Option<Vec<f64>>,
}

impl Default for BinOptions {
    fn default() -> Self {
        Self {
            bin_type: BinType::Linear,
            bins: None,
            norm: Normalization::Max,
            edges: true,
            bin_edges: None,
        }
    }
}

impl BinOptions {
    pub fn new(bin_type: BinType) -> Self {
        Self {
            bin_type,
            ..Self::default()
        }
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    pub fn with_norm(mut self, norm: Normalization) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_edges(mut self, edges: bool) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_bin_edges(mut self, bin_edges: Vec<f64>) -> Self {
        self.bin_edges = Some(bin_edges);
        self
    }
}

/// Pick the bin count for a sample of `sample_len` finite values.
///
/// An explicit request is always honoured. Otherwise small samples (< 50)
/// get 15 bins, large ones (> 500) get 50, and everything else the default 25.
pub fn adaptive_bin_count(requested: Option<usize>, sample_len: usize) -> usize {
    match requested {
        Some(n) => n,
        None if sample_len < SMALL_SAMPLE => SMALL_SAMPLE_BINS,
        None if sample_len > LARGE_SAMPLE => LARGE_SAMPLE_BINS,
        None => DEFAULT_BINS,
    }
}

/// Bin up a sample in linear, log10 or natural-log space.
///
/// NaN and infinite entries are dropped first. If nothing is left the
/// [`Histogram::no_data`] sentinel is returned instead of an error, so plotting
/// code can skip the population.
pub fn hist(sample: &[f64], opts: &BinOptions) -> Result<Histogram> {
    let data = finite_values(sample);
    if data.is_empty() {
        tracing::debug!(
            dropped = sample.len(),
            "No finite values to bin, returning sentinel"
        );
        return Ok(Histogram::no_data());
    }

    let bin_edges = match &opts.bin_edges {
        Some(custom) => {
            validate_edges(custom)?;
            custom.clone()
        }
        None => {
            let n_bins = adaptive_bin_count(opts.bins, data.len());
            tracing::debug!(
                n_bins,
                bin_type = %opts.bin_type,
                samples = data.len(),
                "Constructing bin edges"
            );
            build_edges(&data, opts.bin_type, n_bins)?
        }
    };

    let weight = match opts.norm {
        Normalization::Probability => 1.0 / data.len() as f64,
        _ => 1.0,
    };
    let mut values = count(&data, &bin_edges, weight);

    if opts.norm == Normalization::Max {
        let peak = values.iter().copied().fold(0.0_f64, f64::max);
        if peak > 0.0 {
            values.iter_mut().for_each(|v| *v /= peak);
        }
    }

    let mut centers = midpoints(&bin_edges);

    if opts.edges {
        pad_edges(&mut centers, &mut values, &bin_edges, opts.bin_type);
    }

    Ok(Histogram::new(centers, values))
}

fn validate_edges(edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(PopSynthError::InvalidData(format!(
            "need at least 2 bin edges, got {}",
            edges.len()
        )));
    }
    if edges.iter().any(|e| !e.is_finite()) {
        return Err(PopSynthError::InvalidData(
            "bin edges must be finite".to_string(),
        ));
    }
    if edges.windows(2).any(|w| w[1] < w[0]) {
        return Err(PopSynthError::InvalidData(
            "bin edges must increase monotonically".to_string(),
        ));
    }
    Ok(())
}

fn build_edges(data: &[f64], bin_type: BinType, n_bins: usize) -> Result<Vec<f64>> {
    match bin_type {
        BinType::Linear => {
            if n_bins == 0 {
                return Err(PopSynthError::InvalidBinCount(n_bins));
            }
            let (mut lo, mut hi) = extent(data)
                .ok_or_else(|| PopSynthError::InsufficientData("empty sample".to_string()))?;
            if lo == hi {
                lo -= 0.5;
                hi += 0.5;
            }
            Ok(linspace(lo, hi, n_bins + 1))
        }
        BinType::Log10 => log_edges(data, n_bins, 10.0),
        BinType::NaturalLog => log_edges(data, n_bins, std::f64::consts::E),
    }
}

/// `n_edges` edges spaced evenly in log space between the smallest and largest
/// positive sample values.
fn log_edges(data: &[f64], n_edges: usize, base: f64) -> Result<Vec<f64>> {
    if n_edges < 2 {
        return Err(PopSynthError::InvalidBinCount(n_edges));
    }
    let (lo, hi) = positive_extent(data).ok_or_else(|| {
        PopSynthError::InsufficientData("log binning needs at least one positive value".to_string())
    })?;

    let (mut min_f, mut max_f) = (lo.log(base), hi.log(base));
    if lo == hi {
        // Half a decade either side, expressed in units of `base`
        let pad = 0.5 / base.log10();
        min_f -= pad;
        max_f += pad;
    }

    let mut edges = logspace(min_f, max_f, n_edges, base);
    if lo != hi {
        // Round-tripping through log/pow can nudge the outer edges inward and
        // lose the extreme samples.
        edges[0] = lo;
        edges[n_edges - 1] = hi;
    }
    Ok(edges)
}

/// Weighted counts per bin. Bins are half-open `[e_i, e_i+1)` except the last,
/// which also includes its right edge. Values outside the edges are ignored.
fn count(data: &[f64], edges: &[f64], weight: f64) -> Vec<f64> {
    let n_bins = edges.len() - 1;
    let (first, last) = (edges[0], edges[n_bins]);
    let mut counts = vec![0.0; n_bins];

    for &x in data {
        if x < first || x > last {
            continue;
        }
        let idx = if x == last {
            n_bins - 1
        } else {
            edges.partition_point(|&e| e <= x).saturating_sub(1)
        };
        counts[idx.min(n_bins - 1)] += weight;
    }

    counts
}

/// Append an empty bin beyond each end so a step plot drops to zero.
///
/// Spacing repeats the last center-to-center gap: additively for linear bins,
/// in log10 space for logarithmic ones. A single-bin histogram falls back to
/// the width of its own bin.
fn pad_edges(centers: &mut Vec<f64>, values: &mut Vec<f64>, edges: &[f64], bin_type: BinType) {
    let n = centers.len();
    if n == 0 {
        return;
    }

    if bin_type.is_logarithmic() {
        let gap = if n >= 2 {
            centers[n - 1].log10() - centers[n - 2].log10()
        } else {
            edges[1].log10() - edges[0].log10()
        };
        let below = 10f64.powf(centers[0].log10() - gap);
        let above = 10f64.powf(centers[n - 1].log10() + gap);
        centers.insert(0, below);
        centers.push(above);
    } else {
        let gap = if n >= 2 {
            centers[n - 1] - centers[n - 2]
        } else {
            edges[1] - edges[0]
        };
        let below = centers[0] - gap;
        let above = centers[n - 1] + gap;
        centers.insert(0, below);
        centers.push(above);
    }

    values.insert(0, 0.0);
    values.push(0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn raw(bin_type: BinType) -> BinOptions {
        BinOptions::new(bin_type)
            .with_norm(Normalization::None)
            .with_edges(false)
    }

    #[test]
    fn test_small_linear_sample() {
        let sample = vec![1.0, 2.0, 2.0, 3.0, 3.0, 3.0];
        let hist = hist(&sample, &raw(BinType::Linear).with_bins(3)).unwrap();

        assert_eq!(hist.centers.len(), 3);
        assert_eq!(hist.values, vec![1.0, 2.0, 3.0]);
        assert!(hist.centers.windows(2).all(|w| w[0] <= w[1]));
        assert_relative_eq!(hist.centers[0], 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(hist.centers[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hist.total(), 6.0);
    }

    #[test]
    fn test_empty_and_all_nan_samples_return_sentinel() {
        let opts = BinOptions::default();
        assert!(hist(&[], &opts).unwrap().is_no_data());
        assert!(hist(&[f64::NAN, f64::INFINITY], &opts).unwrap().is_no_data());
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let sample = vec![1.0, f64::NAN, 2.0, f64::NEG_INFINITY, 3.0];
        let hist = hist(&sample, &raw(BinType::Linear).with_bins(3)).unwrap();
        assert_abs_diff_eq!(hist.total(), 3.0);
    }

    #[test]
    fn test_adaptive_bin_count() {
        assert_eq!(adaptive_bin_count(None, 10), 15);
        assert_eq!(adaptive_bin_count(None, 50), 25);
        assert_eq!(adaptive_bin_count(None, 500), 25);
        assert_eq!(adaptive_bin_count(None, 501), 50);
        // Explicit requests are honoured, including the default value itself
        assert_eq!(adaptive_bin_count(Some(25), 10), 25);
        assert_eq!(adaptive_bin_count(Some(7), 1000), 7);
    }

    #[test]
    fn test_adaptive_bin_count_applied_to_histogram() {
        let small: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let medium: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let large: Vec<f64> = (0..600).map(|i| i as f64).collect();

        assert_eq!(hist(&small, &raw(BinType::Linear)).unwrap().len(), 15);
        assert_eq!(hist(&medium, &raw(BinType::Linear)).unwrap().len(), 25);
        assert_eq!(hist(&large, &raw(BinType::Linear)).unwrap().len(), 50);
        assert_eq!(
            hist(&small, &raw(BinType::Linear).with_bins(25)).unwrap().len(),
            25
        );
    }

    #[test]
    fn test_probability_normalisation_sums_to_one() {
        let sample: Vec<f64> = (1..=237).map(|i| (i as f64).sqrt() * 3.7).collect();
        for bin_type in [BinType::Linear, BinType::Log10, BinType::NaturalLog] {
            let opts = BinOptions::new(bin_type).with_norm(Normalization::Probability);
            let hist = hist(&sample, &opts).unwrap();
            assert_eq!(hist.centers.len(), hist.values.len());
            assert_relative_eq!(hist.total(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_max_normalisation_peaks_at_one() {
        let sample = vec![1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 3.0];
        let opts = BinOptions::new(BinType::Linear).with_bins(3).with_edges(false);
        let hist = hist(&sample, &opts).unwrap();
        let peak = hist.values.iter().copied().fold(f64::MIN, f64::max);
        assert_abs_diff_eq!(peak, 1.0);
        assert_relative_eq!(hist.values[0], 0.25);
    }

    #[test]
    fn test_max_normalisation_leaves_empty_histogram_at_zero() {
        let opts = BinOptions::default()
            .with_edges(false)
            .with_bin_edges(vec![100.0, 200.0, 300.0]);
        let hist = hist(&[1.0, 2.0], &opts).unwrap();
        assert_eq!(hist.values, vec![0.0, 0.0]);
    }

    #[test]
    fn test_linear_edge_padding() {
        let sample = vec![1.0, 2.0, 2.0, 3.0, 3.0, 3.0];
        let opts = BinOptions::new(BinType::Linear)
            .with_bins(3)
            .with_norm(Normalization::None);
        let hist = hist(&sample, &opts).unwrap();

        assert_eq!(hist.len(), 5);
        assert_eq!(hist.values, vec![0.0, 1.0, 2.0, 3.0, 0.0]);
        assert_relative_eq!(hist.centers[0], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(hist.centers[4], 10.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_log_edge_padding_is_proportional() {
        // Edges 1, 10, 100, 1000 give centers 5.5, 55, 550
        let sample = vec![1.0, 5.0, 20.0, 70.0, 300.0, 1000.0];
        let opts = BinOptions::new(BinType::Log10)
            .with_bins(4)
            .with_norm(Normalization::None);
        let hist = hist(&sample, &opts).unwrap();

        assert_eq!(hist.len(), 5);
        assert_relative_eq!(hist.centers[1], 5.5, max_relative = 1e-9);
        assert_relative_eq!(hist.centers[0], 0.55, max_relative = 1e-9);
        assert_relative_eq!(hist.centers[4], 5500.0, max_relative = 1e-9);
        assert_eq!(hist.values, vec![0.0, 2.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_log_binning_ignores_zero_when_building_edges() {
        let sample = vec![0.0, 1.0, 10.0, 100.0];
        let hist = hist(&sample, &raw(BinType::Log10).with_bins(3)).unwrap();

        assert_eq!(hist.len(), 2);
        assert_relative_eq!(hist.centers[0], 5.5, max_relative = 1e-9);
        // The zero falls below the first edge and is not counted
        assert_abs_diff_eq!(hist.total(), 3.0);
    }

    #[test]
    fn test_natural_log_matches_log10_edges() {
        let sample: Vec<f64> = (1..=80).map(|i| (i as f64).powf(1.7)).collect();
        let log10 = hist(&sample, &raw(BinType::Log10).with_bins(12)).unwrap();
        let ln = hist(&sample, &raw(BinType::NaturalLog).with_bins(12)).unwrap();

        assert_eq!(log10.len(), ln.len());
        for (a, b) in log10.centers.iter().zip(ln.centers.iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-9);
        }
        assert_eq!(log10.values, ln.values);
    }

    #[test]
    fn test_log_binning_without_positive_values_fails() {
        let err = hist(&[0.0, -2.0, -5.0], &BinOptions::new(BinType::Log10)).unwrap_err();
        assert!(matches!(err, PopSynthError::InsufficientData(_)));
    }

    #[test]
    fn test_explicit_edges_override_bin_type() {
        let sample = vec![1.0, 5.0, 15.0, 25.0];
        let opts = raw(BinType::Log10).with_bins(40).with_bin_edges(vec![0.0, 10.0, 20.0]);
        let hist = hist(&sample, &opts).unwrap();

        assert_eq!(hist.centers, vec![5.0, 15.0]);
        assert_eq!(hist.values, vec![2.0, 1.0]);
    }

    #[test]
    fn test_invalid_explicit_edges_are_rejected() {
        let sample = vec![1.0, 2.0];
        let too_few = BinOptions::default().with_bin_edges(vec![1.0]);
        let unordered = BinOptions::default().with_bin_edges(vec![3.0, 1.0, 2.0]);
        assert!(matches!(
            hist(&sample, &too_few),
            Err(PopSynthError::InvalidData(_))
        ));
        assert!(matches!(
            hist(&sample, &unordered),
            Err(PopSynthError::InvalidData(_))
        ));
    }

    #[test]
    fn test_zero_bins_is_rejected() {
        let err = hist(&[1.0, 2.0], &BinOptions::default().with_bins(0)).unwrap_err();
        assert_eq!(err, PopSynthError::InvalidBinCount(0));
    }

    #[test]
    fn test_constant_sample_gets_unit_wide_range() {
        let hist = hist(&[4.0, 4.0, 4.0], &raw(BinType::Linear).with_bins(1)).unwrap();
        assert_eq!(hist.centers, vec![4.0]);
        assert_eq!(hist.values, vec![3.0]);
    }

    #[test]
    fn test_constant_sample_log_range_spans_one_decade() {
        let sample = [5.0, 5.0, 5.0];
        let decimal = hist(&sample, &raw(BinType::Log10).with_bins(2)).unwrap();
        let natural = hist(&sample, &raw(BinType::NaturalLog).with_bins(2)).unwrap();

        let expected = (5.0 / 10f64.sqrt() + 5.0 * 10f64.sqrt()) / 2.0;
        assert_relative_eq!(decimal.centers[0], expected, max_relative = 1e-12);
        assert_relative_eq!(natural.centers[0], decimal.centers[0], max_relative = 1e-12);
        assert_eq!(decimal.values, vec![3.0]);
        assert_eq!(natural.values, vec![3.0]);
    }

    #[test]
    fn test_probability_excludes_non_positive_values_under_log_bins() {
        // Zeros have no logarithm; they keep their 1/N share out of the total
        let opts = BinOptions::new(BinType::Log10).with_norm(Normalization::Probability);
        let hist = hist(&[0.0, 0.0, 1.0, 10.0, 100.0], &opts).unwrap();
        assert_relative_eq!(hist.total(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_single_bin_padding_uses_bin_width() {
        let opts = BinOptions::new(BinType::Linear)
            .with_bins(1)
            .with_norm(Normalization::None);
        let hist = hist(&[2.0, 4.0], &opts).unwrap();
        assert_eq!(hist.centers, vec![1.0, 3.0, 5.0]);
        assert_eq!(hist.values, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_centers_and_values_have_equal_length() {
        let samples: Vec<Vec<f64>> = vec![
            vec![0.3],
            (0..49).map(|i| i as f64 * 0.1 + 0.01).collect(),
            (0..777).map(|i| ((i * 37) % 101) as f64 + 0.5).collect(),
        ];
        for sample in &samples {
            for bin_type in [BinType::Linear, BinType::Log10, BinType::NaturalLog] {
                for edges in [true, false] {
                    let opts = BinOptions::new(bin_type).with_edges(edges);
                    let hist = hist(sample, &opts).unwrap();
                    assert_eq!(hist.centers.len(), hist.values.len());
                    assert!(hist.centers.windows(2).all(|w| w[0] <= w[1]));
                }
            }
        }
    }
}
