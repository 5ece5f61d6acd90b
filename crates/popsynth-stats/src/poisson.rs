//! Exact Poisson confidence intervals.
//!
//! Given `k` observed events, the interval brackets the Poisson rates that
//! would have produced `k` with the two-sided probability implied by a
//! Gaussian significance of `sigma`. Bounds come from the chi-squared/Poisson
//! duality:
//!
//! ```text
//! a    = 1 - P(-sigma <= Z <= sigma)
//! low  = Q(a/2,     2k)     / 2
//! high = Q(1 - a/2, 2k + 2) / 2
//! ```
//!
//! where `Q(p, v)` is the chi-squared quantile with `v` degrees of freedom.

use popsynth_core::{PoissonInterval, PopSynthError, Result};
use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF, Normal};

/// Relative accuracy (in probability) the chi-squared quantiles are refined to.
const QUANTILE_TOLERANCE: f64 = 1e-12;
const MAX_REFINE_STEPS: usize = 200;

/// Two-sided tail probability of a standard normal outside `[-sigma, sigma]`.
pub fn tail_probability(sigma: f64) -> Result<f64> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PopSynthError::InvalidSignificance(sigma));
    }
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| PopSynthError::CalculationError(e.to_string()))?;
    let a = 2.0 * normal.cdf(-sigma);
    // Far enough out the tail either underflows or leaves 1 - a/2 == 1,
    // and the upper quantile is no longer finite
    if a <= 0.0 || 1.0 - a / 2.0 >= 1.0 {
        return Err(PopSynthError::InvalidSignificance(sigma));
    }
    Ok(a)
}

/// Chi-squared quantile at cumulative probability `lower` (with `upper = 1 - lower`
/// given separately so neither tail loses precision).
///
/// statrs only offers a coarse bisection `inverse_cdf` for this distribution, so
/// its answer is used as a starting point and polished with Newton steps on the
/// CDF, falling back to bisection whenever a step leaves the bracket.
fn chi_squared_quantile(lower: f64, upper: f64, freedom: f64) -> Result<f64> {
    let dist =
        ChiSquared::new(freedom).map_err(|e| PopSynthError::CalculationError(e.to_string()))?;
    let tail = lower.min(upper);
    // F(x) - p, evaluated through whichever of cdf/sf is small near the root
    let excess = |x: f64| {
        if lower <= upper {
            dist.cdf(x) - lower
        } else {
            upper - dist.sf(x)
        }
    };

    let (mut lo, mut hi) = (0.0_f64, f64::INFINITY);
    let mut x = dist.inverse_cdf(lower);
    if !(x.is_finite() && x > 0.0) {
        x = freedom;
    }

    for _ in 0..MAX_REFINE_STEPS {
        let err = excess(x);
        if err.abs() <= QUANTILE_TOLERANCE * tail {
            return Ok(x);
        }
        if err > 0.0 {
            hi = x;
        } else {
            lo = x;
        }
        if hi - lo <= f64::EPSILON * x {
            return Ok(x);
        }

        let step = x - err / dist.pdf(x);
        if step == x {
            return Ok(x);
        }
        x = if step.is_finite() && step > lo && step < hi {
            step
        } else if hi.is_finite() {
            0.5 * (lo + hi)
        } else {
            2.0 * x
        };
    }

    Err(PopSynthError::CalculationError(format!(
        "chi-squared quantile did not converge (p = {lower}, dof = {freedom})"
    )))
}

/// Poisson interval calculator for a fixed significance.
///
/// The tail probability only depends on `sigma`, so it is computed once and
/// reused for every count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonEstimator {
    sigma: f64,
    tail: f64,
}

impl PoissonEstimator {
    pub fn new(sigma: f64) -> Result<Self> {
        let tail = tail_probability(sigma)?;
        Ok(Self { sigma, tail })
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Probability mass outside the interval.
    pub fn tail(&self) -> f64 {
        self.tail
    }

    /// Interval for a single observed count.
    pub fn interval(&self, k: u64) -> Result<PoissonInterval> {
        let freedom = k
            .checked_mul(2)
            .and_then(|dof| dof.checked_add(2))
            .ok_or_else(|| PopSynthError::InvalidData(format!("count {k} is too large")))?;
        let half_tail = self.tail / 2.0;

        // Zero degrees of freedom has no meaningful quantile; nothing observed
        // means the rate can be arbitrarily close to zero.
        let low = if k == 0 {
            0.0
        } else {
            chi_squared_quantile(half_tail, 1.0 - half_tail, (freedom - 2) as f64)? / 2.0
        };
        let high = chi_squared_quantile(1.0 - half_tail, half_tail, freedom as f64)? / 2.0;
        Ok(PoissonInterval { low, high })
    }

    /// Element-wise intervals for a set of counts.
    pub fn intervals(&self, counts: &[u64]) -> Result<Vec<PoissonInterval>> {
        counts.iter().map(|&k| self.interval(k)).collect()
    }

    /// Interval on an event rate: the count interval divided by the exposure
    /// (hours, days, ... in whatever unit the caller measures it).
    pub fn rate_interval(&self, k: u64, exposure: f64) -> Result<PoissonInterval> {
        if !exposure.is_finite() || exposure <= 0.0 {
            return Err(PopSynthError::InvalidData(format!(
                "exposure must be positive, got {exposure}"
            )));
        }
        Ok(self.interval(k)?.per(exposure))
    }
}

/// Poisson interval for one observed count at `sigma` significance.
pub fn poisson_interval(k: u64, sigma: f64) -> Result<PoissonInterval> {
    PoissonEstimator::new(sigma)?.interval(k)
}

/// Poisson intervals for many observed counts at `sigma` significance.
pub fn poisson_intervals(counts: &[u64], sigma: f64) -> Result<Vec<PoissonInterval>> {
    PoissonEstimator::new(sigma)?.intervals(counts)
}

/// Rate interval for `k` events seen over `exposure`.
pub fn rate_interval(k: u64, exposure: f64, sigma: f64) -> Result<PoissonInterval> {
    PoissonEstimator::new(sigma)?.rate_interval(k, exposure)
}
