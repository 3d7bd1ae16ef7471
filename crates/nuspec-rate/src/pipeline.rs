use nuspec_fft::PlanCache;
use nuspec_nufft::{
    NufftError, Spectrum, TransformOptions, direct_nudft1_with_options, fast_nudft1_planned,
    plan_for_rate, relative_rms_error,
};
use nuspec_runtime::EvidenceLedger;
use serde::{Deserialize, Serialize};

use crate::RateError;
use crate::analyzer::{BpmScale, DominantPeak, find_dominant_rate};
use crate::config::{FallbackPolicy, RateConfig};
use crate::source::TimeSeries;
use crate::window::ObservationWindow;

/// Which spectrum the rate was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumSource {
    Fast,
    DirectFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEstimate {
    pub peak: DominantPeak,
    pub m: usize,
    pub span_seconds: f64,
    pub bpm_per_bin: f64,
    pub ier: i32,
    /// Fast vs direct; `None` when the fast transform failed.
    pub relative_error: Option<f64>,
    pub source: SpectrumSource,
    pub spectrum: Spectrum,
}

impl RateEstimate {
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.peak.rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceOutcome {
    Estimated,
    NotFound,
    FastRejected,
}

/// Audit record for one analyzed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEvidence {
    pub window_index: u64,
    pub start: f64,
    pub span_seconds: f64,
    pub samples: usize,
    pub m: usize,
    pub ier: i32,
    pub relative_error: Option<f64>,
    pub source: Option<SpectrumSource>,
    pub rate: Option<f64>,
    pub outcome: EvidenceOutcome,
}

/// Result for one window of [`RateEstimator::estimate_windows`].
#[derive(Debug)]
pub struct WindowEstimate {
    pub window: ObservationWindow,
    pub result: Result<RateEstimate, RateError>,
}

/// Trace → spectrum → rate, cross-checking the fast transform against the
/// direct sum on every window.
///
/// Owns its FFT plan cache and evidence ledger; estimators are not shared
/// between threads, each analysis gets its own.
#[derive(Debug)]
pub struct RateEstimator {
    config: RateConfig,
    plans: PlanCache,
    ledger: EvidenceLedger<WindowEvidence>,
    windows_seen: u64,
}

impl RateEstimator {
    pub fn new(config: RateConfig) -> Result<Self, RateError> {
        config.validate()?;
        let ledger = EvidenceLedger::new(config.ledger_capacity);
        Ok(Self {
            config,
            plans: PlanCache::new(),
            ledger,
            windows_seen: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    #[must_use]
    pub fn ledger(&self) -> &EvidenceLedger<WindowEvidence> {
        &self.ledger
    }

    #[must_use]
    pub fn plan_cache(&self) -> &PlanCache {
        &self.plans
    }

    /// Estimate the dominant rate over the whole series, first to last
    /// timestamp.
    pub fn estimate(&mut self, series: &TimeSeries) -> Result<RateEstimate, RateError> {
        let window = ObservationWindow::from_times(series.times())?;
        self.estimate_in(window, series)
    }

    /// Slide a `window_span` window forward by `hop` (both in timestamp
    /// units) and estimate each window independently. Windows holding fewer
    /// than two points are skipped.
    pub fn estimate_windows(
        &mut self,
        series: &TimeSeries,
        window_span: f64,
        hop: f64,
    ) -> Result<Vec<WindowEstimate>, RateError> {
        if !(hop.is_finite() && hop > 0.0) {
            return Err(RateError::InvalidWindow {
                detail: "hop must be finite and positive",
            });
        }
        let (Some(&first), Some(&last)) = (series.times().first(), series.times().last()) else {
            return Ok(Vec::new());
        };
        ObservationWindow::new(first, window_span)?;

        let mut estimates = Vec::new();
        let mut step: u64 = 0;
        loop {
            let start = first + step as f64 * hop;
            if start + window_span > last {
                break;
            }
            let window = ObservationWindow::new(start, window_span)?;
            let slice = series.between(window.start, window.end());
            if slice.len() >= 2 {
                let result = self.estimate_in(window, &slice);
                estimates.push(WindowEstimate { window, result });
            }
            step += 1;
        }
        Ok(estimates)
    }

    fn estimate_in(
        &mut self,
        window: ObservationWindow,
        series: &TimeSeries,
    ) -> Result<RateEstimate, RateError> {
        let config = &self.config;
        let span_seconds = window.span * config.time_unit_seconds;
        let scale = BpmScale::from_window(span_seconds)?;
        let m = plan_for_rate(config.band.high, scale.bpm_per_bin)?;
        let samples = window.to_samples(series.times(), series.amplitudes(), config.remove_mean)?;
        let options = TransformOptions::default().with_mode(config.mode);

        let direct = direct_nudft1_with_options(&samples, config.direction, m, &options)?;
        let fast = fast_nudft1_planned(
            &samples,
            config.direction,
            config.precision,
            m,
            &options,
            &mut self.plans,
        )?;

        let ier = fast.ier();
        let relative_error = match fast.spectrum_checked() {
            Ok(spectrum) => match relative_rms_error(&direct, spectrum) {
                Ok(err) => Some(err),
                Err(NufftError::UndefinedMetric { .. }) => None,
                Err(other) => return Err(other.into()),
            },
            Err(_) => None,
        };
        let trusted = relative_error.is_some_and(|err| err <= config.max_relative_error);

        let mut evidence = WindowEvidence {
            window_index: self.windows_seen,
            start: window.start,
            span_seconds,
            samples: samples.len(),
            m,
            ier,
            relative_error,
            source: None,
            rate: None,
            outcome: EvidenceOutcome::FastRejected,
        };
        self.windows_seen += 1;

        let (spectrum, source) = if trusted {
            (fast.into_result()?, SpectrumSource::Fast)
        } else {
            match config.fallback {
                FallbackPolicy::UseDirect => (direct, SpectrumSource::DirectFallback),
                FallbackPolicy::Fail => {
                    self.ledger.record(evidence);
                    return Err(RateError::FastRejected {
                        ier,
                        relative_error,
                    });
                }
            }
        };
        evidence.source = Some(source);

        let peak = match find_dominant_rate(&spectrum, |f| scale.rate(f), &config.band) {
            Ok(peak) => peak,
            Err(err) => {
                evidence.outcome = EvidenceOutcome::NotFound;
                self.ledger.record(evidence);
                return Err(err);
            }
        };
        evidence.rate = Some(peak.rate);
        evidence.outcome = EvidenceOutcome::Estimated;
        self.ledger.record(evidence);

        Ok(RateEstimate {
            peak,
            m,
            span_seconds,
            bpm_per_bin: scale.bpm_per_bin,
            ier,
            relative_error,
            source,
            spectrum,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::{EvidenceOutcome, RateEstimator, SpectrumSource};
    use crate::{FallbackPolicy, RateConfig, RateError, TimeSeries};

    /// 72 bpm cosine over 100 ticks of 100 ms.
    fn pulse() -> TimeSeries {
        let times: Vec<f64> = (0..=100).map(f64::from).collect();
        let amplitudes = times
            .iter()
            .map(|t| (2.0 * PI * 1.2 * t * 0.1).cos())
            .collect();
        TimeSeries::new(times, amplitudes).expect("series")
    }

    #[test]
    fn uniform_pulse_is_recovered() {
        let mut estimator = RateEstimator::new(RateConfig::default()).expect("estimator");
        let estimate = estimator.estimate(&pulse()).expect("estimate");
        assert_eq!(estimate.m, 60);
        assert_eq!(estimate.peak.index, 42);
        assert!((estimate.rate() - 72.0).abs() < 1e-9);
        assert_eq!(estimate.source, SpectrumSource::Fast);
        assert_eq!(estimator.ledger().len(), 1);
    }

    #[test]
    fn unreachable_threshold_falls_back_to_direct() {
        let mut config = RateConfig::default();
        config.max_relative_error = 1e-300;
        let mut estimator = RateEstimator::new(config.clone()).expect("estimator");
        let estimate = estimator.estimate(&pulse()).expect("estimate");
        assert_eq!(estimate.source, SpectrumSource::DirectFallback);
        assert_eq!(estimate.peak.index, 42);

        let mut strict =
            RateEstimator::new(config.with_fallback(FallbackPolicy::Fail)).expect("estimator");
        assert!(matches!(
            strict.estimate(&pulse()),
            Err(RateError::FastRejected { ier: 0, .. })
        ));
        let latest = strict.ledger().latest().expect("evidence");
        assert_eq!(latest.outcome, EvidenceOutcome::FastRejected);
    }

    #[test]
    fn flat_trace_has_no_rate() {
        let times: Vec<f64> = (0..=100).map(f64::from).collect();
        let series = TimeSeries::new(times, vec![0.0; 101]).expect("series");
        let mut estimator = RateEstimator::new(RateConfig::default()).expect("estimator");
        assert!(matches!(
            estimator.estimate(&series),
            Err(RateError::NotFound { .. })
        ));
        assert_eq!(
            estimator.ledger().latest().map(|e| e.outcome),
            Some(EvidenceOutcome::NotFound)
        );
    }
}
