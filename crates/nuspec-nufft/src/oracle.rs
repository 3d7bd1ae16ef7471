//! Reference-vs-candidate validation for Type-1 transform engines.
//!
//! The direct sum is the oracle: every fast engine is judged by the
//! relative RMS distance of its spectrum from the direct one.

use serde::Serialize;

use crate::fast::{FastStatus, fast_nudft1_with_options};
use crate::metric::{max_abs_error, relative_rms_error};
use crate::sample::{Direction, Sample, TransformOptions};
use crate::spectrum::Spectrum;
use crate::{NufftError, direct_nudft1_with_options};

#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub spectrum: Spectrum,
    pub status: FastStatus,
}

pub trait Nudft1Engine {
    fn name(&self) -> &'static str;

    fn transform(
        &self,
        samples: &[Sample],
        direction: Direction,
        m: usize,
        options: &TransformOptions,
    ) -> Result<EngineOutput, NufftError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DirectEngine;

impl Nudft1Engine for DirectEngine {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn transform(
        &self,
        samples: &[Sample],
        direction: Direction,
        m: usize,
        options: &TransformOptions,
    ) -> Result<EngineOutput, NufftError> {
        Ok(EngineOutput {
            spectrum: direct_nudft1_with_options(samples, direction, m, options)?,
            status: FastStatus::Success,
        })
    }
}

/// Gaussian-gridding fast transform at a fixed precision.
#[derive(Debug, Clone, Copy)]
pub struct GaussianGriddingEngine {
    pub precision: f64,
}

impl GaussianGriddingEngine {
    #[must_use]
    pub fn new(precision: f64) -> Self {
        Self { precision }
    }
}

impl Nudft1Engine for GaussianGriddingEngine {
    fn name(&self) -> &'static str {
        "gaussian_gridding"
    }

    fn transform(
        &self,
        samples: &[Sample],
        direction: Direction,
        m: usize,
        options: &TransformOptions,
    ) -> Result<EngineOutput, NufftError> {
        let outcome = fast_nudft1_with_options(samples, direction, self.precision, m, options)?;
        Ok(EngineOutput {
            status: outcome.status(),
            spectrum: outcome.raw_spectrum().clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OracleReport {
    pub oracle: &'static str,
    pub candidate: &'static str,
    pub direction: i8,
    pub samples: usize,
    pub m: usize,
    pub threshold: f64,
    /// `None` when the candidate reported a numeric failure.
    pub relative_error: Option<f64>,
    pub max_abs_error: Option<f64>,
    pub candidate_status: FastStatus,
    pub passed: bool,
}

impl OracleReport {
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Run both engines on the same input and compare.
///
/// Passes when the candidate succeeded and its relative RMS error is
/// strictly below `threshold`. Shape errors from either engine propagate,
/// as does a non-finite coefficient in a successful output.
pub fn cross_validate(
    oracle: &dyn Nudft1Engine,
    candidate: &dyn Nudft1Engine,
    samples: &[Sample],
    direction: Direction,
    m: usize,
    options: &TransformOptions,
    threshold: f64,
) -> Result<OracleReport, NufftError> {
    let reference = oracle.transform(samples, direction, m, options)?;
    let produced = candidate.transform(samples, direction, m, options)?;

    let (relative_error, max_abs) = match produced.status {
        FastStatus::Success => (
            Some(relative_rms_error(&reference.spectrum, &produced.spectrum)?),
            Some(max_abs_error(&reference.spectrum, &produced.spectrum)?),
        ),
        FastStatus::NumericFailure { .. } => (None, None),
    };

    Ok(OracleReport {
        oracle: oracle.name(),
        candidate: candidate.name(),
        direction: direction.flag(),
        samples: samples.len(),
        m,
        threshold,
        relative_error,
        max_abs_error: max_abs,
        candidate_status: produced.status,
        passed: relative_error.is_some_and(|err| err < threshold),
    })
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use nuspec_runtime::{ErrorKind, RuntimeMode};

    use super::{DirectEngine, GaussianGriddingEngine, Nudft1Engine, cross_validate};
    use crate::NufftError;
    use crate::sample::{Direction, Sample, TransformOptions};

    fn ramp_samples() -> Vec<Sample> {
        (0..24)
            .map(|j| Sample::real(-PI + 0.26 * j as f64, (j as f64 * 0.7).cos()))
            .collect()
    }

    #[test]
    fn direct_against_itself_is_exact() {
        let report = cross_validate(
            &DirectEngine,
            &DirectEngine,
            &ramp_samples(),
            Direction::Forward,
            16,
            &TransformOptions::default(),
            1e-12,
        )
        .expect("report");
        assert_eq!(report.relative_error, Some(0.0));
        assert!(report.passed);
    }

    #[test]
    fn non_finite_reference_is_an_error_not_a_pass() {
        let mut samples = ramp_samples();
        samples[3] = Sample::real(samples[3].theta, f64::NAN);
        let options = TransformOptions::default().with_mode(RuntimeMode::Strict);
        let result = cross_validate(
            &DirectEngine,
            &DirectEngine,
            &samples,
            Direction::Forward,
            16,
            &options,
            1e-12,
        );
        assert!(matches!(
            result,
            Err(NufftError::NonFiniteSpectrum {
                operand: "reference",
                ..
            })
        ));
        assert_eq!(result.map(|r| r.passed).map_err(|e| e.kind()), Err(ErrorKind::NumericFailure));
    }

    #[test]
    fn gridding_engine_passes_at_its_precision() {
        let engine = GaussianGriddingEngine::new(1e-7);
        assert_eq!(engine.name(), "gaussian_gridding");
        let report = cross_validate(
            &DirectEngine,
            &engine,
            &ramp_samples(),
            Direction::Inverse,
            20,
            &TransformOptions::default(),
            1e-6,
        )
        .expect("report");
        assert!(report.passed, "{}", report.to_json_line());
        assert_eq!(report.candidate_status.ier(), 0);
    }

    #[test]
    fn failed_candidate_never_passes() {
        let report = cross_validate(
            &DirectEngine,
            &GaussianGriddingEngine::new(0.5),
            &ramp_samples(),
            Direction::Forward,
            8,
            &TransformOptions::default(),
            1.0,
        )
        .expect("report");
        assert!(!report.passed);
        assert!(report.relative_error.is_none());
        let line = report.to_json_line();
        assert!(line.contains("\"numeric_failure\""));
    }
}
