#![forbid(unsafe_code)]

//! Differential conformance harness.
//!
//! Fixture files are JSON documents with a `family` tag:
//!
//! - `nudft_oracle`: sample sets transformed by the direct oracle and the
//!   Gaussian-gridding engine, compared with [`cross_validate`].
//! - `rate_estimate`: traces run through [`RateEstimator`] with an expected
//!   dominant frequency or an expected rejection.
//!
//! Each run produces a [`ConformanceReport`] carrying a blake3 digest of the
//! fixture bytes so a stored report can be matched to the exact input.

use std::f64::consts::PI;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blake3::hash;
use num_complex::Complex64;
use nuspec_nufft::{
    DirectEngine, Direction, GaussianGriddingEngine, Normalization, NufftError, Sample,
    TransformOptions, cross_validate, samples_from_parts,
};
use nuspec_rate::{RateConfig, RateError, RateEstimator, TimeSeries};
use nuspec_runtime::{
    ErrorKind, RuntimeMode, TestLogEntry, TestLogLevel, TestResult, now_unix_ms,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub fixture_root: PathBuf,
    /// When set, a transform error in a case that did not expect one aborts
    /// the run instead of being recorded as a failed case.
    pub strict_mode: bool,
}

impl HarnessConfig {
    #[must_use]
    pub fn default_paths() -> Self {
        Self {
            fixture_root: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures"),
            strict_mode: true,
        }
    }

    #[must_use]
    pub fn fixture_path(&self, file_name: &str) -> PathBuf {
        self.fixture_root.join(file_name)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("fixture load failed for {path}: {source}")]
    FixtureIo { path: PathBuf, source: io::Error },
    #[error("fixture parse failed for {path}: {source}")]
    FixtureParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unknown fixture family `{family}` in {path}")]
    UnknownFamily { path: PathBuf, family: String },
    #[error("case `{case_id}` is malformed: {detail}")]
    InvalidCase { case_id: String, detail: String },
    #[error("artifact write failed for {path}: {source}")]
    ArtifactIo { path: PathBuf, source: io::Error },
    #[error("transform failed: {0}")]
    Transform(#[from] NufftError),
    #[error("rate estimation failed: {0}")]
    Rate(#[from] RateError),
}

// ═══════════════════════════════════════════════════════════════════
// Fixture schema
// ═══════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
struct FixtureEnvelope {
    packet_id: String,
    family: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NudftFixture {
    pub packet_id: String,
    pub family: String,
    pub cases: Vec<NudftCase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NudftCase {
    pub case_id: String,
    pub direction: Direction,
    pub m: usize,
    pub precision: f64,
    pub threshold: f64,
    #[serde(default)]
    pub mode: RuntimeMode,
    #[serde(default)]
    pub normalization: Normalization,
    pub samples: SampleSpec,
    #[serde(default)]
    pub expect: NudftExpectation,
}

/// Where a case's samples come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleSpec {
    /// Literal positions and amplitudes; `im` defaults to zeros.
    Explicit {
        theta: Vec<f64>,
        re: Vec<f64>,
        #[serde(default)]
        im: Vec<f64>,
    },
    /// `count` points near `π·k/(count/2)`, each moved by up to one grid
    /// step, with amplitude `cos 5θ + cos θ + i·sin 2θ`.
    JitteredSine { count: usize, seed: u64 },
    /// Uniform positions in `[-π, π)` with complex amplitudes in the unit box.
    Random { count: usize, seed: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NudftExpectation {
    /// Fast engine succeeds with relative error strictly below the threshold.
    #[default]
    WithinThreshold,
    /// Fast engine reports this numeric failure code.
    NumericFailure { ier: i32 },
    /// The transforms refuse the input with an error of this kind.
    Rejected { kind: ErrorKind },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateFixture {
    pub packet_id: String,
    pub family: String,
    pub cases: Vec<RateCase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateCase {
    pub case_id: String,
    #[serde(default)]
    pub config: RateConfig,
    pub trace: TraceSpec,
    pub expect: RateExpectation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceSpec {
    Explicit {
        times: Vec<f64>,
        amplitudes: Vec<f64>,
    },
    /// `ticks + 1` timestamps `0..=ticks`, interior ones moved by up to
    /// `jitter`, carrying `offset + cos(2π·bpm/60·t·tick) + noise`.
    Pulse {
        bpm: f64,
        ticks: u32,
        seed: u64,
        #[serde(default)]
        jitter: f64,
        #[serde(default)]
        noise: f64,
        #[serde(default)]
        offset: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RateExpectation {
    Peak {
        frequency: i64,
        #[serde(default)]
        index: Option<usize>,
    },
    Rejected {
        kind: ErrorKind,
    },
}

// ═══════════════════════════════════════════════════════════════════
// Input generation
// ═══════════════════════════════════════════════════════════════════

impl SampleSpec {
    pub fn generate(&self, case_id: &str) -> Result<Vec<Sample>, HarnessError> {
        match self {
            Self::Explicit { theta, re, im } => {
                if !im.is_empty() && im.len() != re.len() {
                    return Err(invalid_case(case_id, "`im` must be empty or match `re`"));
                }
                let amplitudes: Vec<Complex64> = re
                    .iter()
                    .enumerate()
                    .map(|(j, &r)| Complex64::new(r, im.get(j).copied().unwrap_or(0.0)))
                    .collect();
                Ok(samples_from_parts(theta, &amplitudes)?)
            }
            Self::JitteredSine { count, seed } => {
                if *count < 2 {
                    return Err(invalid_case(case_id, "jittered_sine needs at least 2 points"));
                }
                let mut rng = StdRng::seed_from_u64(*seed);
                let n = *count as i64;
                let bin = 2.0 * PI / n as f64;
                Ok((-n / 2..=(n - 1) / 2)
                    .map(|k| {
                        let jitter = bin * (f64::from(rng.gen_range(0i32..10)) - 5.0) / 5.0;
                        let theta = PI * k as f64 / (n / 2) as f64 + jitter;
                        Sample::new(
                            theta,
                            Complex64::new((5.0 * theta).cos() + theta.cos(), (2.0 * theta).sin()),
                        )
                    })
                    .collect())
            }
            Self::Random { count, seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                Ok((0..*count)
                    .map(|_| {
                        let theta = rng.gen_range(-PI..PI);
                        let amplitude =
                            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
                        Sample::new(theta, amplitude)
                    })
                    .collect())
            }
        }
    }
}

impl TraceSpec {
    pub fn generate(&self, tick_seconds: f64) -> Result<TimeSeries, RateError> {
        match self {
            Self::Explicit { times, amplitudes } => {
                TimeSeries::new(times.clone(), amplitudes.clone())
            }
            Self::Pulse {
                bpm,
                ticks,
                seed,
                jitter,
                noise,
                offset,
            } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                let times: Vec<f64> = (0..=*ticks)
                    .map(|j| {
                        let t = f64::from(j);
                        if j == 0 || j == *ticks || *jitter <= 0.0 {
                            t
                        } else {
                            t + rng.gen_range(-*jitter..*jitter)
                        }
                    })
                    .collect();
                let hz = bpm / 60.0;
                let amplitudes = times
                    .iter()
                    .map(|&t| {
                        let wobble = if *noise > 0.0 {
                            noise * rng.gen_range(-1.0..1.0)
                        } else {
                            0.0
                        };
                        offset + (2.0 * PI * hz * t * tick_seconds).cos() + wobble
                    })
                    .collect();
                TimeSeries::new(times, amplitudes)
            }
        }
    }
}

fn invalid_case(case_id: &str, detail: &str) -> HarnessError {
    HarnessError::InvalidCase {
        case_id: case_id.to_owned(),
        detail: detail.to_owned(),
    }
}

// ═══════════════════════════════════════════════════════════════════
// Reports
// ═══════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DifferentialCaseResult {
    pub case_id: String,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_abs_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ier: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

impl DifferentialCaseResult {
    fn new(case_id: &str, passed: bool, message: String) -> Self {
        Self {
            case_id: case_id.to_owned(),
            passed,
            message,
            relative_error: None,
            max_abs_error: None,
            threshold: None,
            ier: None,
            rate: None,
        }
    }
}

/// Conformance report produced by [`run_differential_test`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConformanceReport {
    pub fixture_path: String,
    pub packet_id: String,
    pub family: String,
    /// blake3 hex digest of the fixture file bytes.
    pub fixture_blake3: String,
    pub pass_count: usize,
    pub fail_count: usize,
    pub per_case_results: Vec<DifferentialCaseResult>,
    pub generated_unix_ms: u64,
}

impl ConformanceReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.fail_count == 0
    }

    /// One structured log line per case.
    #[must_use]
    pub fn log_entries(&self) -> Vec<TestLogEntry> {
        self.per_case_results
            .iter()
            .map(|case| {
                let mut entry = TestLogEntry::new(
                    format!("{}::{}", self.packet_id, case.case_id),
                    "nuspec_conformance",
                    case.message.clone(),
                )
                .with_fixture(self.fixture_path.clone())
                .with_result(TestResult::from_pass(case.passed));
                if !case.passed {
                    entry = entry.with_level(TestLogLevel::Error);
                }
                if let Some(err) = case.relative_error {
                    entry = entry.with_metric("relative_error", err);
                }
                if let Some(rate) = case.rate {
                    entry = entry.with_metric("rate", rate);
                }
                entry
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Differential runner
// ═══════════════════════════════════════════════════════════════════

/// Run every case of one fixture file.
///
/// Families are matched on the `family` field; anything else is an
/// [`HarnessError::UnknownFamily`].
pub fn run_differential_test(
    fixture_path: &Path,
    config: &HarnessConfig,
) -> Result<ConformanceReport, HarnessError> {
    let raw = fs::read(fixture_path).map_err(|source| HarnessError::FixtureIo {
        path: fixture_path.to_path_buf(),
        source,
    })?;
    let parse_error = |source| HarnessError::FixtureParse {
        path: fixture_path.to_path_buf(),
        source,
    };
    let envelope: FixtureEnvelope = serde_json::from_slice(&raw).map_err(parse_error)?;

    let results = match envelope.family.as_str() {
        "nudft_oracle" => {
            let fixture: NudftFixture = serde_json::from_slice(&raw).map_err(parse_error)?;
            fixture
                .cases
                .iter()
                .map(|case| run_nudft_case(case, config.strict_mode))
                .collect::<Result<Vec<_>, _>>()?
        }
        "rate_estimate" => {
            let fixture: RateFixture = serde_json::from_slice(&raw).map_err(parse_error)?;
            fixture
                .cases
                .iter()
                .map(|case| run_rate_case(case, config.strict_mode))
                .collect::<Result<Vec<_>, _>>()?
        }
        other => {
            return Err(HarnessError::UnknownFamily {
                path: fixture_path.to_path_buf(),
                family: other.to_owned(),
            });
        }
    };

    let pass_count = results.iter().filter(|r| r.passed).count();
    Ok(ConformanceReport {
        fixture_path: fixture_path.display().to_string(),
        packet_id: envelope.packet_id,
        family: envelope.family,
        fixture_blake3: hash(&raw).to_hex().to_string(),
        pass_count,
        fail_count: results.len() - pass_count,
        per_case_results: results,
        generated_unix_ms: now_unix_ms(),
    })
}

/// Run every `*.json` fixture under `config.fixture_root`, sorted by name.
pub fn run_fixture_root(config: &HarnessConfig) -> Result<Vec<ConformanceReport>, HarnessError> {
    let entries = fs::read_dir(&config.fixture_root).map_err(|source| HarnessError::FixtureIo {
        path: config.fixture_root.clone(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| HarnessError::FixtureIo {
            path: config.fixture_root.clone(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();
    paths
        .iter()
        .map(|path| run_differential_test(path, config))
        .collect()
}

/// Write a report as pretty JSON, creating parent directories.
pub fn write_report(report: &ConformanceReport, path: &Path) -> Result<(), HarnessError> {
    let artifact_error = |source| HarnessError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(artifact_error)?;
    }
    let body = serde_json::to_vec_pretty(report).map_err(io::Error::other).map_err(artifact_error)?;
    fs::write(path, body).map_err(artifact_error)
}

fn run_nudft_case(case: &NudftCase, strict: bool) -> Result<DifferentialCaseResult, HarnessError> {
    let options = TransformOptions::default()
        .with_mode(case.mode)
        .with_normalization(case.normalization);
    let outcome = case.samples.generate(&case.case_id).and_then(|samples| {
        cross_validate(
            &DirectEngine,
            &GaussianGriddingEngine::new(case.precision),
            &samples,
            case.direction,
            case.m,
            &options,
            case.threshold,
        )
        .map_err(HarnessError::from)
    });

    let report = match outcome {
        Ok(report) => report,
        Err(HarnessError::Transform(err)) => {
            return match &case.expect {
                NudftExpectation::Rejected { kind } => Ok(DifferentialCaseResult::new(
                    &case.case_id,
                    err.kind() == *kind,
                    format!("rejected as {}: {err}", err.kind().as_str()),
                )),
                _ if strict => Err(HarnessError::Transform(err)),
                _ => Ok(DifferentialCaseResult::new(
                    &case.case_id,
                    false,
                    format!("unexpected error: {err}"),
                )),
            };
        }
        Err(other) => return Err(other),
    };

    let ier = report.candidate_status.ier();
    let (passed, message) = match &case.expect {
        NudftExpectation::WithinThreshold => match report.relative_error {
            Some(err) if report.passed => (true, format!("relative error {err:.3e}")),
            Some(err) => (
                false,
                format!("relative error {err:.3e} not below {:.3e}", case.threshold),
            ),
            None => (false, format!("fast engine failed with ier {ier}")),
        },
        NudftExpectation::NumericFailure { ier: expected } => (
            ier == *expected,
            format!("fast engine ier {ier}, expected {expected}"),
        ),
        NudftExpectation::Rejected { kind } => (
            false,
            format!("expected {} rejection, transform accepted input", kind.as_str()),
        ),
    };

    let mut result = DifferentialCaseResult::new(&case.case_id, passed, message);
    result.relative_error = report.relative_error;
    result.max_abs_error = report.max_abs_error;
    result.threshold = Some(case.threshold);
    result.ier = Some(ier);
    Ok(result)
}

fn run_rate_case(case: &RateCase, strict: bool) -> Result<DifferentialCaseResult, HarnessError> {
    // Malformed traces count as rejections so fixtures can exercise them.
    let outcome = case
        .trace
        .generate(case.config.time_unit_seconds)
        .and_then(|series| RateEstimator::new(case.config.clone())?.estimate(&series));

    match (outcome, &case.expect) {
        (Ok(estimate), RateExpectation::Peak { frequency, index }) => {
            let passed = estimate.peak.frequency == *frequency
                && index.is_none_or(|expected| estimate.peak.index == expected);
            let mut result = DifferentialCaseResult::new(
                &case.case_id,
                passed,
                format!(
                    "peak f={} index={} rate={:.3}, expected f={frequency}",
                    estimate.peak.frequency,
                    estimate.peak.index,
                    estimate.rate()
                ),
            );
            result.relative_error = estimate.relative_error;
            result.ier = Some(estimate.ier);
            result.rate = Some(estimate.rate());
            Ok(result)
        }
        (Ok(estimate), RateExpectation::Rejected { kind }) => Ok(DifferentialCaseResult::new(
            &case.case_id,
            false,
            format!(
                "expected {} rejection, estimated {:.3}",
                kind.as_str(),
                estimate.rate()
            ),
        )),
        (Err(err), RateExpectation::Rejected { kind }) => Ok(DifferentialCaseResult::new(
            &case.case_id,
            err.kind() == *kind,
            format!("rejected as {}: {err}", err.kind().as_str()),
        )),
        (Err(err), RateExpectation::Peak { .. }) if strict => Err(HarnessError::Rate(err)),
        (Err(err), RateExpectation::Peak { .. }) => Ok(DifferentialCaseResult::new(
            &case.case_id,
            false,
            format!("unexpected error: {err}"),
        )),
    }
}
