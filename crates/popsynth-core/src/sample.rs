//! Sample preprocessing utilities shared by the binning routines.
//!
//! Simulated populations routinely carry NaN or infinite entries (e.g. an
//! undefined signal-to-noise for a source outside the beam). Everything that
//! bins or summarises a sample goes through these helpers first so the rules
//! for what counts as "data" live in one place.

/// Keep only the finite values of a sample, preserving order.
pub fn finite_values(sample: &[f64]) -> Vec<f64> {
    sample.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Smallest and largest value of a slice. Returns `None` for an empty slice.
/// Callers are expected to pass finite values only.
pub fn extent(data: &[f64]) -> Option<(f64, f64)> {
    let mut iter = data.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
}

/// Smallest and largest strictly positive value of a slice.
/// Log-spaced edges can only be built from these.
pub fn positive_extent(data: &[f64]) -> Option<(f64, f64)> {
    let mut iter = data.iter().copied().filter(|&x| x > 0.0);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
}

/// `n` points evenly spaced over `[start, stop]`, endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut points: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            // Pin the endpoint so the largest sample always falls inside the last edge.
            points[n - 1] = stop;
            points
        }
    }
}

/// `n` points evenly spaced in log space: `base^linspace(start, stop, n)`.
pub fn logspace(start: f64, stop: f64, n: usize, base: f64) -> Vec<f64> {
    linspace(start, stop, n)
        .into_iter()
        .map(|exponent| base.powf(exponent))
        .collect()
}

/// Midpoints between consecutive edges.
pub fn midpoints(edges: &[f64]) -> Vec<f64> {
    edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_values_drops_nan_and_inf() {
        let data = vec![1.0, f64::NAN, 2.0, f64::INFINITY, f64::NEG_INFINITY, 3.0];
        assert_eq!(finite_values(&data), vec![1.0, 2.0, 3.0]);
        assert!(finite_values(&[f64::NAN]).is_empty());
    }

    #[test]
    fn test_extent() {
        assert_eq!(extent(&[3.0, -1.0, 7.5]), Some((-1.0, 7.5)));
        assert_eq!(extent(&[]), None);
    }

    #[test]
    fn test_positive_extent_ignores_zero_and_negative() {
        assert_eq!(positive_extent(&[0.0, -4.0, 0.5, 20.0]), Some((0.5, 20.0)));
        assert_eq!(positive_extent(&[0.0, -1.0]), None);
    }

    #[test]
    fn test_linspace_endpoints() {
        let points = linspace(1.0, 3.0, 4);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], 1.0);
        assert_eq!(points[3], 3.0);
        assert!((points[1] - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_logspace_base10() {
        let points = logspace(0.0, 2.0, 3, 10.0);
        assert!((points[0] - 1.0).abs() < 1e-12);
        assert!((points[1] - 10.0).abs() < 1e-9);
        assert!((points[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_midpoints() {
        assert_eq!(midpoints(&[0.0, 2.0, 6.0]), vec![1.0, 4.0]);
        assert!(midpoints(&[1.0]).is_empty());
    }
}
