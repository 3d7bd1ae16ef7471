use std::collections::VecDeque;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use num_complex::Complex64;
use nuspec_runtime::{ErrorKind, RuntimeMode};
use serde::Serialize;

use crate::plan::{FftPlan, PlanCache};
use crate::{Normalization, TransformKind};

/// Backends that can serve uniform FFT requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// `O(n^2)` reference DFT.
    NaiveDft,
    /// Mixed-radix decimation in time, fast for 2·3·5-smooth lengths.
    #[default]
    MixedRadix,
}

pub trait FftBackend {
    fn kind(&self) -> BackendKind;
    fn transform_1d_unscaled(
        &self,
        input: &[Complex64],
        inverse: bool,
    ) -> Result<Vec<Complex64>, FftError>;
}

#[derive(Debug, Default)]
pub struct NaiveDftBackend;

impl FftBackend for NaiveDftBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::NaiveDft
    }

    fn transform_1d_unscaled(
        &self,
        input: &[Complex64],
        inverse: bool,
    ) -> Result<Vec<Complex64>, FftError> {
        let n = input.len();
        let sign = if inverse { 1.0 } else { -1.0 };
        Ok((0..n)
            .map(|k| {
                input
                    .iter()
                    .enumerate()
                    .map(|(t, &value)| {
                        // Reduce k*t mod n first so the angle stays small.
                        let angle = sign * 2.0 * PI * ((k * t) % n) as f64 / n as f64;
                        value * Complex64::from_polar(1.0, angle)
                    })
                    .sum()
            })
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MixedRadixBackend;

impl FftBackend for MixedRadixBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::MixedRadix
    }

    fn transform_1d_unscaled(
        &self,
        input: &[Complex64],
        inverse: bool,
    ) -> Result<Vec<Complex64>, FftError> {
        FftPlan::new(input.len(), inverse)?.process(input)
    }
}

static NAIVE_BACKEND: NaiveDftBackend = NaiveDftBackend;
static MIXED_RADIX_BACKEND: MixedRadixBackend = MixedRadixBackend;

fn resolve_backend(kind: BackendKind) -> &'static dyn FftBackend {
    match kind {
        BackendKind::NaiveDft => &NAIVE_BACKEND,
        BackendKind::MixedRadix => &MIXED_RADIX_BACKEND,
    }
}

/// Options for [`fft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FftOptions {
    pub mode: RuntimeMode,
    pub normalization: Normalization,
    pub backend: BackendKind,
}

impl Default for FftOptions {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Strict,
            normalization: Normalization::Backward,
            backend: BackendKind::MixedRadix,
        }
    }
}

impl FftOptions {
    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FftError {
    InvalidShape { detail: &'static str },
    LengthMismatch { expected: usize, actual: usize },
    NonFiniteInput,
}

impl FftError {
    /// Every uniform-FFT failure is a malformed input.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidParameter
    }
}

impl Display for FftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidShape { detail } => write!(f, "invalid shape: {detail}"),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {expected}, got {actual}")
            }
            Self::NonFiniteInput => write!(f, "non-finite input rejected by policy"),
        }
    }
}

impl std::error::Error for FftError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformTrace {
    pub operation_id: String,
    pub kind: TransformKind,
    pub direction: &'static str,
    pub n: usize,
    pub backend: BackendKind,
    pub radix_path: Vec<usize>,
    pub mode: RuntimeMode,
    pub timing_ns: u128,
}

impl TransformTrace {
    #[must_use]
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

const TRACE_CAPACITY: usize = 4096;

static TRACE_LOG: OnceLock<Mutex<VecDeque<TransformTrace>>> = OnceLock::new();
static OPERATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn trace_log() -> &'static Mutex<VecDeque<TransformTrace>> {
    TRACE_LOG.get_or_init(|| Mutex::new(VecDeque::new()))
}

fn next_operation_id() -> String {
    let next = OPERATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("fft-op-{next:016x}")
}

fn record_trace(trace: TransformTrace) {
    if let Ok(mut log) = trace_log().lock() {
        if log.len() == TRACE_CAPACITY {
            let _ = log.pop_front();
        }
        log.push_back(trace);
    }
}

/// Drain the recorded transform traces, oldest first.
#[must_use]
pub fn take_transform_traces() -> Vec<TransformTrace> {
    trace_log()
        .lock()
        .map(|mut log| log.drain(..).collect())
        .unwrap_or_default()
}

/// 1D forward complex FFT on the backend named in `options`.
///
/// Hardened mode rejects non-finite input. The naive backend makes this the
/// uniform reference that the gridded transform is checked against.
pub fn fft(input: &[Complex64], options: &FftOptions) -> Result<Vec<Complex64>, FftError> {
    if input.is_empty() {
        return Err(FftError::InvalidShape {
            detail: "input length must be greater than zero",
        });
    }
    if options.mode.checks_finite() && input.iter().any(|value| !value.is_finite()) {
        return Err(FftError::NonFiniteInput);
    }

    let backend = resolve_backend(options.backend);
    let started = Instant::now();
    let mut output = backend.transform_1d_unscaled(input, false)?;
    let scale = options.normalization.scale(input.len(), false);
    if (scale - 1.0).abs() > f64::EPSILON {
        output.iter_mut().for_each(|value| *value *= scale);
    }

    record_trace(TransformTrace {
        operation_id: next_operation_id(),
        kind: TransformKind::Fft,
        direction: "forward",
        n: input.len(),
        backend: backend.kind(),
        radix_path: crate::plan::factorize_radix_path(input.len()),
        mode: options.mode,
        timing_ns: started.elapsed().as_nanos(),
    });

    Ok(output)
}

/// Unscaled transform through a plan from `plans`, traced like [`fft`].
///
/// Input is an internal grid, so no finiteness policy applies; `mode` is
/// only recorded in the trace. Repeated windows of one length share a plan.
pub fn fft_planned(
    input: &[Complex64],
    inverse: bool,
    mode: RuntimeMode,
    plans: &mut PlanCache,
) -> Result<Vec<Complex64>, FftError> {
    let started = Instant::now();
    let plan = plans.get_or_build(input.len(), inverse)?;
    let output = plan.process(input)?;
    record_trace(TransformTrace {
        operation_id: next_operation_id(),
        kind: if inverse {
            TransformKind::Ifft
        } else {
            TransformKind::Fft
        },
        direction: if inverse { "inverse" } else { "forward" },
        n: input.len(),
        backend: BackendKind::MixedRadix,
        radix_path: plan.radix_path().to_vec(),
        mode,
        timing_ns: started.elapsed().as_nanos(),
    });
    Ok(output)
}
