//! Property tests for nuspec-rate analyzer and window mapping.
//!
//! Convention: test_{module}_{function}_{scenario}
//!
//! Seed replay: `PROPTEST_CASES=1000 cargo test -p nuspec-rate --test property_tests`
//! Reproduce: `PROPTEST_SEED=<seed> cargo test -p nuspec-rate --test property_tests`

use std::f64::consts::PI;

use num_complex::Complex64;
use nuspec_nufft::Spectrum;
use nuspec_rate::{BpmScale, ObservationWindow, RateBand, RateError, find_dominant_rate};
use proptest::prelude::*;

// ═══════════════════════════════════════════════════════════════
// Property 1: an injected in-band peak is found exactly
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_analyzer_find_dominant_rate_injected_peak(
        half in 8usize..200,
        peak_seed in any::<usize>(),
        floor in prop::collection::vec(0.0f64..1.0, 400),
        span_seconds in 5.0f64..60.0,
    ) {
        let m = 2 * half;
        let scale = BpmScale::from_window(span_seconds).expect("scale");
        let band = RateBand::new(0.0, scale.rate(half as i64)).expect("band");
        // Non-negative frequencies 1 ..= half-1 are strictly inside the band.
        let frequency = 1 + (peak_seed % (half - 1)) as i64;
        let index = half + frequency as usize;

        let mut values: Vec<Complex64> =
            floor[..m].iter().map(|&v| Complex64::new(v, 0.0)).collect();
        values[index] = Complex64::new(0.0, 10.0);
        let spectrum = Spectrum::from_coefficients(values).expect("spectrum");

        let peak = find_dominant_rate(&spectrum, |f| scale.rate(f), &band).expect("peak");
        prop_assert_eq!(peak.index, index);
        prop_assert_eq!(peak.frequency, frequency);
        prop_assert!((peak.magnitude() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_analyzer_find_dominant_rate_empty_band_not_found(
        half in 2usize..100,
        values in prop::collection::vec(0.0f64..5.0, 200),
    ) {
        let m = 2 * half;
        let spectrum = Spectrum::from_coefficients(
            values[..m].iter().map(|&v| Complex64::new(v, v)).collect(),
        )
        .expect("spectrum");
        // Every folded frequency is below the band.
        let band = RateBand::new(half as f64 + 1.0, half as f64 + 2.0).expect("band");
        let result = find_dominant_rate(&spectrum, |f| f as f64, &band);
        prop_assert!(
            matches!(result, Err(RateError::NotFound { .. })),
            "expected NotFound, got {:?}",
            result
        );
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 2: window mapping keeps in-window timestamps inside [-π, π]
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn test_window_theta_stays_in_range(
        start in -1e3f64..1e3,
        span in 1e-1f64..1e6,
        fraction in 0.0f64..=1.0,
    ) {
        let window = ObservationWindow::new(start, span).expect("window");
        let theta = window.theta(start + fraction * span);
        prop_assert!(theta.abs() <= PI + 1e-9, "theta={}", theta);
        prop_assert!(window.theta(start) == -PI);
    }
}
