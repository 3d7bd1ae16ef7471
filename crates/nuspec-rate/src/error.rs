use std::io;
use std::path::PathBuf;

use nuspec_nufft::NufftError;
use nuspec_runtime::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("transform failed: {0}")]
    Transform(#[from] NufftError),
    #[error("rate band must be finite with low < high, got ({low}, {high})")]
    InvalidBand { low: f64, high: f64 },
    #[error("invalid observation window: {detail}")]
    InvalidWindow { detail: &'static str },
    #[error("invalid rate configuration: {detail}")]
    InvalidConfig { detail: &'static str },
    #[error("trace {field}[{index}] is not finite")]
    NonFiniteTrace { field: &'static str, index: usize },
    #[error("trace has {times} timestamps but {amplitudes} amplitudes")]
    TraceLength { times: usize, amplitudes: usize },
    #[error("no spectral peak strictly inside ({low}, {high})")]
    NotFound { low: f64, high: f64 },
    #[error("fast spectrum rejected (ier={ier}, relative error {relative_error:?}) and fallback is disabled")]
    FastRejected {
        ier: i32,
        relative_error: Option<f64>,
    },
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[source] serde_json::Error),
}

impl RateError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transform(inner) => inner.kind(),
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::FastRejected { .. } => ErrorKind::NumericFailure,
            _ => ErrorKind::InvalidParameter,
        }
    }
}
