#![forbid(unsafe_code)]

//! nuspec runtime: modes, error taxonomy and structured logging shared by
//! the transform, rate and conformance crates.
//!
//! ## Module layout
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | `mode`      | [`RuntimeMode`] enum (Strict / Hardened)              |
//! | `evidence`  | [`EvidenceLedger`], bounded FIFO audit trail          |
//!
//! The crate root carries the [`ErrorKind`] taxonomy, [`TestLogEntry`] and
//! the tolerance assertion helpers used across the workspace test suites.

pub mod evidence;
pub mod mode;

pub use evidence::EvidenceLedger;
pub use mode::RuntimeMode;

use std::time::{SystemTime, UNIX_EPOCH};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════
// Error taxonomy
// ═══════════════════════════════════════════════════════════════════

/// Coarse classification shared by every crate-level error type.
///
/// - `InvalidParameter`: malformed input shape; surfaced immediately.
/// - `NumericFailure`: the fast transform could not produce a trustworthy
///   result for the requested precision; callers may retry or fall back.
/// - `NotFound`: no spectral peak inside the requested band. A normal
///   outcome, not an exceptional one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidParameter,
    NumericFailure,
    NotFound,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid_parameter",
            Self::NumericFailure => "numeric_failure",
            Self::NotFound => "not_found",
        }
    }
}

/// Milliseconds since the Unix epoch, `0` if the clock is before it.
#[must_use]
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

// ═══════════════════════════════════════════════════════════════════
// Structured logging and test helpers
// ═══════════════════════════════════════════════════════════════════

/// Structured log entry, serialized as one JSON object per line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLogEntry {
    pub test_id: String,
    pub timestamp_ms: u64,
    pub level: TestLogLevel,
    pub module: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<RuntimeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<TestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestLogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    Pass,
    Fail,
    Skip,
    Warn,
}

impl TestResult {
    #[must_use]
    pub fn from_pass(pass: bool) -> Self {
        if pass { Self::Pass } else { Self::Fail }
    }
}

impl TestLogEntry {
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        module: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            timestamp_ms: now_unix_ms(),
            level: TestLogLevel::Info,
            module: module.into(),
            message: message.into(),
            seed: None,
            fixture_id: None,
            mode: None,
            result: None,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: TestLogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_result(mut self, result: TestResult) -> Self {
        self.result = Some(result);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = Some(mode);
        self
    }

    #[must_use]
    pub fn with_fixture(mut self, fixture_id: impl Into<String>) -> Self {
        self.fixture_id = Some(fixture_id.into());
        self
    }

    /// Attach a numeric metric (relative error, rate, timing...).
    #[must_use]
    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        let metrics = self.metrics.get_or_insert_with(serde_json::Map::new);
        let value = serde_json::Number::from_f64(value)
            .map_or(serde_json::Value::Null, serde_json::Value::Number);
        metrics.insert(name.to_owned(), value);
        self
    }

    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Write the entry to stderr as a single JSON line.
    pub fn emit(&self) {
        eprintln!("{}", self.to_json_line());
    }
}

/// Assert two f64 values are close: `|actual - expected| <= atol + rtol * |expected|`.
pub fn assert_close(actual: f64, expected: f64, atol: f64, rtol: f64) {
    let tol = atol + rtol * expected.abs();
    assert!(
        (actual - expected).abs() <= tol,
        "assert_close failed: actual={actual} expected={expected} diff={} tol={tol} (atol={atol}, rtol={rtol})",
        (actual - expected).abs()
    );
}

/// Assert two complex slices are element-wise close, measuring `|a - e|`
/// against `atol + rtol * |e|`.
pub fn assert_close_complex_slice(actual: &[Complex64], expected: &[Complex64], atol: f64, rtol: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "assert_close_complex_slice: length mismatch: actual={} expected={}",
        actual.len(),
        expected.len()
    );
    for (idx, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        let tol = atol + rtol * e.norm();
        let diff = (a - e).norm();
        assert!(
            diff <= tol,
            "assert_close_complex_slice[{idx}]: actual={a} expected={e} diff={diff} tol={tol}"
        );
    }
}

#[must_use]
pub fn within_tolerance(actual: f64, expected: f64, atol: f64, rtol: f64) -> bool {
    let tol = atol + rtol * expected.abs();
    (actual - expected).abs() <= tol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_close_accepts_within_rtol() {
        assert_close(100.0 + 1e-10, 100.0, 0.0, 1e-11);
    }

    #[test]
    #[should_panic(expected = "assert_close failed")]
    fn assert_close_rejects_far() {
        assert_close(1.0, 2.0, 1e-12, 1e-12);
    }

    #[test]
    fn complex_slice_close_uses_modulus() {
        let a = [Complex64::new(1.0, 1e-13), Complex64::new(-2.0, 0.5)];
        let e = [Complex64::new(1.0, 0.0), Complex64::new(-2.0, 0.5)];
        assert_close_complex_slice(&a, &e, 1e-12, 0.0);
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn complex_slice_length_mismatch_panics() {
        assert_close_complex_slice(&[Complex64::new(0.0, 0.0)], &[], 1e-12, 0.0);
    }

    #[test]
    fn within_tolerance_is_symmetric_for_exact_match() {
        assert!(within_tolerance(1.0, 1.0, 0.0, 0.0));
        assert!(!within_tolerance(1.0, 2.0, 1e-12, 1e-12));
    }

    #[test]
    fn log_entry_serializes_optional_fields() {
        let entry = TestLogEntry::new("fast_vs_direct", "nuspec_nufft", "oracle passed")
            .with_result(TestResult::Pass)
            .with_seed(42)
            .with_mode(RuntimeMode::Strict)
            .with_metric("relative_error", 3.5e-6);
        let parsed: serde_json::Value =
            serde_json::from_str(&entry.to_json_line()).expect("valid JSON");
        assert_eq!(parsed["test_id"], "fast_vs_direct");
        assert_eq!(parsed["result"], "pass");
        assert_eq!(parsed["seed"], 42);
        assert_eq!(parsed["mode"], "Strict");
        assert_eq!(parsed["metrics"]["relative_error"], 3.5e-6);
    }

    #[test]
    fn log_entry_omits_none_fields() {
        let entry = TestLogEntry::new("plan", "nuspec_fft", "planned");
        let parsed: serde_json::Value =
            serde_json::from_str(&entry.to_json_line()).expect("valid JSON");
        assert!(parsed.get("seed").is_none());
        assert!(parsed.get("fixture_id").is_none());
        assert!(parsed.get("metrics").is_none());
    }

    #[test]
    fn non_finite_metric_serializes_as_null() {
        let entry = TestLogEntry::new("nan", "nuspec_nufft", "metric").with_metric("err", f64::NAN);
        let parsed: serde_json::Value =
            serde_json::from_str(&entry.to_json_line()).expect("valid JSON");
        assert!(parsed["metrics"]["err"].is_null());
    }

    #[test]
    fn error_kind_names_are_snake_case() {
        assert_eq!(ErrorKind::InvalidParameter.as_str(), "invalid_parameter");
        let json = serde_json::to_string(&ErrorKind::NotFound).expect("serialize");
        assert_eq!(json, "\"not_found\"");
    }
}
