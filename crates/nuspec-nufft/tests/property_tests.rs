//! Property tests for nuspec-nufft planner, transforms and error metric.
//!
//! Convention: test_{module}_{function}_{scenario}
//!
//! Seed replay: `PROPTEST_CASES=1000 cargo test -p nuspec-nufft --test property_tests`
//! Reproduce: `PROPTEST_SEED=<seed> cargo test -p nuspec-nufft --test property_tests`

use std::f64::consts::PI;

use nuspec_fft::{frequency_to_index, index_to_frequency, is_smooth};
use nuspec_nufft::{
    Complex64, Direction, Sample, Spectrum, direct_nudft1, fast_nudft1, plan_length,
    relative_rms_error,
};
use proptest::prelude::*;

fn sample_strategy() -> impl Strategy<Value = Sample> {
    (-PI..PI, -10.0f64..10.0, -10.0f64..10.0)
        .prop_map(|(theta, re, im)| Sample::new(theta, Complex64::new(re, im)))
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Forward), Just(Direction::Inverse)]
}

// ═══════════════════════════════════════════════════════════════
// Property 1: plan_length is deterministic, doubled-smooth and monotone
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_planner_plan_length_deterministic_and_smooth(span in 1e-3f64..1e6) {
        let first = plan_length(span).expect("positive span plans");
        let second = plan_length(span).expect("positive span plans");
        prop_assert_eq!(first, second);
        prop_assert!(first % 2 == 0);
        prop_assert!(is_smooth(first / 2), "half length {} not smooth", first / 2);
        prop_assert!((first / 2) as f64 >= span.ceil());
    }

    #[test]
    fn test_planner_plan_length_monotone(a in 1e-3f64..1e5, b in 1e-3f64..1e5) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(plan_length(lo).expect("lo") <= plan_length(hi).expect("hi"));
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 2: one sample spreads its magnitude evenly over every bin
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn test_direct_single_sample_flat_magnitude(
        sample in sample_strategy(),
        direction in direction_strategy(),
        m in 1usize..300,
    ) {
        let spectrum = direct_nudft1(&[sample], direction, m).expect("direct");
        let expected = sample.amplitude.norm();
        for (k, value) in spectrum.as_slice().iter().enumerate() {
            prop_assert!(
                (value.norm() - expected).abs() <= 1e-12 * (1.0 + expected),
                "k={} |F|={} expected {}", k, value.norm(), expected
            );
        }
    }

    #[test]
    fn test_direct_unit_sample_at_origin_is_all_ones(m in 1usize..512) {
        let spectrum = direct_nudft1(&[Sample::real(0.0, 1.0)], Direction::Inverse, m)
            .expect("direct");
        for value in spectrum.as_slice() {
            prop_assert!((value - Complex64::new(1.0, 0.0)).norm() < 1e-15);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 3: the metric is exactly zero for identical spectra
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_metric_identical_spectra_zero(
        values in prop::collection::vec((-1e6f64..1e6, -1e6f64..1e6), 1..64),
    ) {
        prop_assume!(values.iter().any(|&(re, im)| re != 0.0 || im != 0.0));
        let spectrum = Spectrum::from_coefficients(
            values.iter().map(|&(re, im)| Complex64::new(re, im)).collect(),
        )
        .expect("non-empty");
        prop_assert_eq!(relative_rms_error(&spectrum, &spectrum).expect("metric"), 0.0);
    }

    #[test]
    fn test_metric_scale_invariant(
        values in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 2..32),
        scale in 1e-100f64..1e100,
    ) {
        prop_assume!(values.iter().any(|&(re, im)| re.abs() > 1e-3 || im.abs() > 1e-3));
        let reference: Vec<Complex64> =
            values.iter().map(|&(re, im)| Complex64::new(re, im)).collect();
        let mut candidate = reference.clone();
        candidate[0] += Complex64::new(0.5, -0.25);
        let base = relative_rms_error(
            &Spectrum::from_coefficients(reference.clone()).expect("r"),
            &Spectrum::from_coefficients(candidate.clone()).expect("c"),
        )
        .expect("metric");
        let scaled = relative_rms_error(
            &Spectrum::from_coefficients(reference.iter().map(|v| v * scale).collect())
                .expect("r"),
            &Spectrum::from_coefficients(candidate.iter().map(|v| v * scale).collect())
                .expect("c"),
        )
        .expect("metric");
        prop_assert!((base - scaled).abs() <= 1e-9 * base, "{} vs {}", base, scaled);
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 4: the fast transform tracks the direct sum within its precision
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_fast_matches_direct_within_precision(
        samples in prop::collection::vec(sample_strategy(), 1..120),
        direction in direction_strategy(),
        m in 16usize..96,
        exponent in 2i32..=10,
    ) {
        let eps = 10f64.powi(-exponent);
        let exact = direct_nudft1(&samples, direction, m).expect("direct");
        prop_assume!(exact.energy() > 1e-12);
        let fast = fast_nudft1(&samples, direction, eps, m)
            .expect("valid shape")
            .into_result()
            .expect("supported precision");
        let err = relative_rms_error(&exact, &fast).expect("metric");
        prop_assert!(err < 10.0 * eps, "eps={} err={}", eps, err);
    }
}

// ═══════════════════════════════════════════════════════════════
// Property 5: folded index and frequency are inverse maps
// ═══════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn test_helpers_index_frequency_bijection(m in 1usize..10_000, k_seed in any::<usize>()) {
        let k = k_seed % m;
        let f = index_to_frequency(k, m);
        prop_assert_eq!(frequency_to_index(f, m), Some(k));
        prop_assert!(f >= -((m / 2) as i64) && f <= ((m - 1) / 2) as i64);
    }
}
