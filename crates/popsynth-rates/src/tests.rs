#[cfg(test)]
mod scaling_tests {
    use approx::assert_relative_eq;

    use crate::{scale, scale_time, DetectionOutcome, RateCounter, RateError, ScaleKind};

    fn counter(det: f64, faint: f64, late: f64, out: f64, f_area: f64) -> RateCounter {
        let mut rates = RateCounter::new("TEST");
        rates.record_weighted(DetectionOutcome::Detected, det);
        rates.record_weighted(DetectionOutcome::TooFaint, faint);
        rates.record_weighted(DetectionOutcome::TooLate, late);
        rates.record_weighted(DetectionOutcome::OutsideSurvey, out);
        rates.set_area_factor(f_area).set_days(10.0);
        rates
    }

    #[test]
    fn test_area_scaling_absorbs_residual_into_out() {
        let rates = counter(10.0, 0.0, 0.0, 0.0, 2.0);
        let scaled = scale(&rates, true).unwrap();

        assert_eq!(scaled.det(), 20.0);
        assert_eq!(scaled.late(), 0.0);
        assert_eq!(scaled.faint(), 0.0);
        // |10 - 20|
        assert_eq!(scaled.out(), 10.0);
        assert!(scaled.scaled_area());
    }

    #[test]
    fn test_scaling_leaves_input_untouched() {
        let rates = counter(10.0, 0.0, 0.0, 0.0, 2.0);
        let before = rates.clone();
        let _scaled = scale(&rates, true).unwrap();

        assert_eq!(rates, before);
        assert_eq!(rates.det(), 10.0);
        assert!(!rates.scaled_area());
    }

    #[test]
    fn test_area_scaling_below_unity_preserves_total() {
        let rates = counter(10.0, 20.0, 5.0, 65.0, 0.5);
        let scaled = scale(&rates, true).unwrap();

        assert_relative_eq!(scaled.det(), 5.0);
        assert_relative_eq!(scaled.faint(), 10.0);
        assert_relative_eq!(scaled.late(), 2.5);
        // Residual is positive, so the total is conserved
        assert_relative_eq!(scaled.out(), 82.5);
        assert_relative_eq!(scaled.tot(), rates.tot());
    }

    #[test]
    fn test_scaling_keeps_metadata() {
        let mut rates = counter(3.0, 1.0, 0.0, 6.0, 0.25);
        rates.set_vol(42.0);
        let scaled = scale(&rates, true).unwrap();

        assert_eq!(scaled.name(), "TEST");
        assert_eq!(scaled.days(), 10.0);
        assert_eq!(scaled.vol(), 42.0);
        assert_eq!(scaled.f_area(), 0.25);
        assert_relative_eq!(scaled.exp(), 10.0 / 0.75);
    }

    #[test]
    fn test_no_area_scaling_returns_equal_copy() {
        let rates = counter(10.0, 1.0, 1.0, 1.0, 3.0);
        let copy = scale(&rates, false).unwrap();
        assert_eq!(copy, rates);
        assert!(!copy.scaled_area());
    }

    #[test]
    fn test_second_area_scaling_is_rejected() {
        let rates = counter(10.0, 0.0, 0.0, 0.0, 2.0);
        let once = scale(&rates, true).unwrap();

        let err = scale(&once, true).unwrap_err();
        assert_eq!(
            err,
            RateError::AlreadyScaled {
                name: "TEST".to_string(),
                kind: ScaleKind::Area,
            }
        );
        // The factor was applied exactly once
        assert_eq!(once.det(), 20.0);
        // Scaling the untouched original again is still fine
        assert_eq!(scale(&rates, true).unwrap(), once);
    }

    #[test]
    fn test_time_scaling_is_independent_of_area() {
        let mut rates = counter(8.0, 4.0, 0.0, 8.0, 0.5);
        rates.set_time_factor(0.25);

        let area = scale(&rates, true).unwrap();
        let both = scale_time(&area).unwrap();

        assert!(both.scaled_area());
        assert!(both.scaled_time());
        assert_relative_eq!(both.det(), 8.0 * 0.5 * 0.25);
        assert_relative_eq!(both.faint(), 4.0 * 0.5 * 0.25);
        assert_relative_eq!(both.tot(), rates.tot());

        assert!(matches!(
            scale_time(&both),
            Err(RateError::AlreadyScaled {
                kind: ScaleKind::Time,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_factor_is_rejected() {
        let negative = counter(1.0, 0.0, 0.0, 0.0, -2.0);
        let nan = counter(1.0, 0.0, 0.0, 0.0, f64::NAN);

        assert!(matches!(
            scale(&negative, true),
            Err(RateError::InvalidFactor {
                kind: ScaleKind::Area,
                ..
            })
        ));
        assert!(matches!(
            scale(&nan, true),
            Err(RateError::InvalidFactor { .. })
        ));
    }

    #[test]
    fn test_counter_round_trips_through_json() {
        let rates = scale(&counter(10.0, 2.0, 1.0, 7.0, 2.0), true).unwrap();
        let json = serde_json::to_string(&rates).unwrap();
        let back: RateCounter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rates);
        assert!(back.scaled_area());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let back: RateCounter =
            serde_json::from_str(r#"{"name": "CHIME", "det": 4, "days": 2.5}"#).unwrap();
        assert_eq!(back.name(), "CHIME");
        assert_eq!(back.det(), 4.0);
        assert_eq!(back.f_area(), 1.0);
        assert!(!back.scaled_area());
        assert_eq!(back.exp(), 0.625);
    }
}
