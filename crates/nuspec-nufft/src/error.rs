use std::fmt::{Display, Formatter};

use nuspec_fft::FftError;
use nuspec_runtime::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum NufftError {
    EmptySamples,
    ZeroLength,
    InvalidSpan { value: f64 },
    InvalidPrecision { value: f64 },
    InvalidDirection { flag: i64 },
    LengthMismatch { expected: usize, actual: usize },
    NonFiniteSample { index: usize },
    PositionOutOfRange { index: usize, theta: f64 },
    /// Zero-energy reference compared against a non-zero candidate.
    UndefinedMetric { candidate_energy: f64 },
    /// `operand` is `"reference"` or `"candidate"`.
    NonFiniteSpectrum { operand: &'static str, index: usize },
    PlanOverflow,
    Fft(FftError),
    /// A fast-transform result was requested after a reported failure.
    NumericFailure { code: i32, detail: &'static str },
}

impl NufftError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NumericFailure { .. } | Self::NonFiniteSpectrum { .. } => {
                ErrorKind::NumericFailure
            }
            _ => ErrorKind::InvalidParameter,
        }
    }
}

impl Display for NufftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySamples => write!(f, "sample sequence must not be empty"),
            Self::ZeroLength => write!(f, "spectrum length must be greater than zero"),
            Self::InvalidSpan { value } => {
                write!(f, "planning span must be finite and positive, got {value}")
            }
            Self::InvalidPrecision { value } => {
                write!(f, "precision must be finite and positive, got {value}")
            }
            Self::InvalidDirection { flag } => {
                write!(f, "direction flag must be +1 or -1, got {flag}")
            }
            Self::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {expected}, got {actual}")
            }
            Self::NonFiniteSample { index } => write!(f, "sample {index} is not finite"),
            Self::PositionOutOfRange { index, theta } => {
                write!(f, "sample {index} position {theta} lies outside [-pi, pi]")
            }
            Self::UndefinedMetric { candidate_energy } => write!(
                f,
                "relative error undefined: reference has zero energy, candidate has {candidate_energy}"
            ),
            Self::NonFiniteSpectrum { operand, index } => {
                write!(f, "{operand} coefficient {index} is not finite")
            }
            Self::PlanOverflow => write!(f, "planned length does not fit in usize"),
            Self::Fft(inner) => write!(f, "uniform transform failed: {inner}"),
            Self::NumericFailure { code, detail } => {
                write!(f, "fast transform failed (ier={code}): {detail}")
            }
        }
    }
}

impl std::error::Error for NufftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fft(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<FftError> for NufftError {
    fn from(value: FftError) -> Self {
        Self::Fft(value)
    }
}
