//! End-to-end rate estimation on synthetic pulse traces.
//!
//! Traces use 100 ms ticks like the recorded heart-rate data: a 100-tick
//! window is 10 s, one bin is 6 bpm, and a 180 bpm ceiling plans M = 60.
//! A 72 bpm pulse therefore peaks at folded frequency 12, index 42.

use std::f64::consts::PI;
use std::fs;

use nuspec_nufft::Direction;
use nuspec_runtime::{RuntimeMode, TestLogEntry, TestResult};
use nuspec_rate::{
    EvidenceOutcome, FallbackPolicy, InMemoryTrace, JsonTraceFile, RateBand, RateConfig,
    RateError, RateEstimator, SpectrumSource, TimeSeries, TraceSource,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TICK_SECONDS: f64 = 0.1;

/// Jittered timestamps over `[0, ticks]` with both endpoints exact.
fn jittered_times(ticks: u32, rng: &mut StdRng) -> Vec<f64> {
    (0..=ticks)
        .map(|j| {
            if j == 0 || j == ticks {
                f64::from(j)
            } else {
                f64::from(j) + rng.gen_range(-0.3..0.3)
            }
        })
        .collect()
}

fn pulse(bpm: f64, ticks: u32, offset: f64, noise: f64, seed: u64) -> TimeSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let times = jittered_times(ticks, &mut rng);
    let hz = bpm / 60.0;
    let amplitudes = times
        .iter()
        .map(|&t| {
            offset + (2.0 * PI * hz * t * TICK_SECONDS).cos() + noise * rng.gen_range(-1.0..1.0)
        })
        .collect();
    TimeSeries::new(times, amplitudes).expect("series")
}

#[test]
fn e2e_72_bpm_pulse_peaks_at_index_42() {
    let series = pulse(72.0, 100, 2.0, 0.2, 17);
    let mut estimator = RateEstimator::new(RateConfig::default()).expect("estimator");
    let estimate = estimator.estimate(&series).expect("estimate");

    TestLogEntry::new("e2e_72_bpm_pulse_peaks_at_index_42", "nuspec_rate", "estimated")
        .with_seed(17)
        .with_result(TestResult::from_pass(estimate.peak.index == 42))
        .with_metric("rate_bpm", estimate.rate())
        .with_metric("relative_error", estimate.relative_error.unwrap_or(f64::NAN))
        .emit();

    assert_eq!(estimate.m, 60);
    assert!((estimate.bpm_per_bin - 6.0).abs() < 1e-9);
    assert_eq!(estimate.peak.index, 42);
    assert_eq!(estimate.peak.frequency, 12);
    assert!((estimate.rate() - 72.0).abs() < 1e-9);
    assert_eq!(estimate.source, SpectrumSource::Fast);
    assert!(estimate.relative_error.is_some_and(|err| err < 1e-4));
}

#[test]
fn e2e_direction_and_mean_removal_do_not_move_the_peak() {
    let series = pulse(96.0, 100, 5.0, 0.1, 3);
    let base = RateConfig::default();
    let mut inverse = base.clone();
    inverse.direction = Direction::Inverse;
    for config in [base.clone(), inverse, base.with_remove_mean(true)] {
        let mut estimator = RateEstimator::new(config).expect("estimator");
        let estimate = estimator.estimate(&series).expect("estimate");
        assert_eq!(estimate.peak.frequency, 16, "96 bpm is 16 bins of 6 bpm");
    }
}

#[test]
fn e2e_rate_outside_band_is_not_found() {
    // With 6 bpm bins no bin rate falls strictly inside (181, 185).
    let times: Vec<f64> = (0..=100).map(f64::from).collect();
    let amplitudes = times
        .iter()
        .map(|&t| (2.0 * PI * 0.5 * t * TICK_SECONDS).cos())
        .collect();
    let series = TimeSeries::new(times, amplitudes).expect("series");
    let config = RateConfig::default().with_band(RateBand::new(181.0, 185.0).expect("band"));
    let mut estimator = RateEstimator::new(config).expect("estimator");
    let err = estimator.estimate(&series).expect_err("out of band");
    assert!(matches!(err, RateError::NotFound { .. }));
    assert_eq!(err.kind(), nuspec_runtime::ErrorKind::NotFound);
}

#[test]
fn e2e_hardened_mode_accepts_normalized_window() {
    let series = pulse(120.0, 100, 0.0, 0.0, 9);
    let config = RateConfig::default().with_mode(RuntimeMode::Hardened);
    let mut estimator = RateEstimator::new(config).expect("estimator");
    let estimate = estimator.estimate(&series).expect("estimate");
    assert_eq!(estimate.peak.frequency, 20);
}

#[test]
fn e2e_sliding_windows_track_each_segment() {
    let series = pulse(90.0, 400, 1.0, 0.1, 23);
    let mut estimator = RateEstimator::new(RateConfig::default()).expect("estimator");
    let windows = estimator
        .estimate_windows(&series, 100.0, 50.0)
        .expect("windows");
    assert_eq!(windows.len(), 7);
    for window in &windows {
        let estimate = window.result.as_ref().expect("estimate");
        assert_eq!(estimate.peak.index, 45, "window at {}", window.window.start);
    }

    let ledger = estimator.ledger();
    assert_eq!(ledger.len(), 7);
    assert!(ledger.iter().all(|e| e.outcome == EvidenceOutcome::Estimated));
    let jsonl = ledger.serialize_jsonl();
    assert_eq!(jsonl.lines().count(), 7);
    assert!(jsonl.contains("\"source\":\"fast\""));
}

#[test]
fn e2e_sliding_windows_reject_bad_hop() {
    let series = pulse(90.0, 200, 0.0, 0.0, 1);
    let mut estimator = RateEstimator::new(RateConfig::default()).expect("estimator");
    assert!(estimator.estimate_windows(&series, 100.0, 0.0).is_err());
    assert!(estimator.estimate_windows(&series, -5.0, 10.0).is_err());
    assert!(
        estimator
            .estimate_windows(&series, 500.0, 10.0)
            .expect("no full window")
            .is_empty()
    );
}

#[test]
fn e2e_fail_policy_surfaces_rejection() {
    let mut config = RateConfig::default().with_fallback(FallbackPolicy::Fail);
    config.max_relative_error = 1e-300;
    let mut estimator = RateEstimator::new(config).expect("estimator");
    let err = estimator
        .estimate(&pulse(72.0, 100, 0.0, 0.0, 2))
        .expect_err("rejected");
    assert_eq!(err.kind(), nuspec_runtime::ErrorKind::NumericFailure);
}

#[test]
fn e2e_sources_feed_the_estimator() {
    let series = pulse(150.0, 100, 0.5, 0.05, 31);
    let memory = InMemoryTrace::new("synthetic-150", series.clone());

    let dir = std::env::temp_dir().join(format!("nuspec-rate-e2e-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("trace.json");
    fs::write(&path, serde_json::to_string(&series).expect("serialize")).expect("write");
    let file = JsonTraceFile::new(&path);

    let sources: [&dyn TraceSource; 2] = [&memory, &file];
    for source in sources {
        let loaded = source.load().expect("load");
        let mut estimator = RateEstimator::new(RateConfig::default()).expect("estimator");
        let estimate = estimator.estimate(&loaded).expect("estimate");
        assert_eq!(estimate.peak.frequency, 25, "source {}", source.describe());
    }
    let _ = fs::remove_dir_all(&dir);
}
