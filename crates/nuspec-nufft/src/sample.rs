use std::f64::consts::PI;

use num_complex::Complex64;
use nuspec_fft::Normalization;
use nuspec_runtime::RuntimeMode;
use serde::{Deserialize, Serialize};

use crate::NufftError;

/// One non-uniform input point: angular position and complex amplitude.
///
/// Positions are expected in `[-π, π)`. Because the transform kernel is
/// 2π-periodic in θ for integer frequencies, `θ = π` is the same point as
/// `θ = -π`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub theta: f64,
    pub amplitude: Complex64,
}

impl Sample {
    #[must_use]
    pub fn new(theta: f64, amplitude: Complex64) -> Self {
        Self { theta, amplitude }
    }

    /// Sample with a purely real amplitude.
    #[must_use]
    pub fn real(theta: f64, value: f64) -> Self {
        Self::new(theta, Complex64::new(value, 0.0))
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.theta.is_finite() && self.amplitude.is_finite()
    }
}

/// Zip positions and amplitudes into samples.
pub fn samples_from_parts(
    thetas: &[f64],
    amplitudes: &[Complex64],
) -> Result<Vec<Sample>, NufftError> {
    if thetas.len() != amplitudes.len() {
        return Err(NufftError::LengthMismatch {
            expected: thetas.len(),
            actual: amplitudes.len(),
        });
    }
    Ok(thetas
        .iter()
        .zip(amplitudes)
        .map(|(&theta, &amplitude)| Sample::new(theta, amplitude))
        .collect())
}

/// Sign of the exponent in the transform kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Direction {
    /// `exp(-i f θ)`, flag `-1`.
    Forward,
    /// `exp(+i f θ)`, flag `+1`.
    Inverse,
}

impl Direction {
    pub fn from_flag(flag: i64) -> Result<Self, NufftError> {
        match flag {
            -1 => Ok(Self::Forward),
            1 => Ok(Self::Inverse),
            other => Err(NufftError::InvalidDirection { flag: other }),
        }
    }

    #[must_use]
    pub fn flag(self) -> i8 {
        match self {
            Self::Forward => -1,
            Self::Inverse => 1,
        }
    }

    #[must_use]
    pub fn sign(self) -> f64 {
        f64::from(self.flag())
    }

    /// Whether the uniform FFT behind the fast transform runs inverse.
    #[must_use]
    pub fn is_inverse(self) -> bool {
        matches!(self, Self::Inverse)
    }
}

impl TryFrom<i8> for Direction {
    type Error = NufftError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::from_flag(i64::from(value))
    }
}

impl From<Direction> for i8 {
    fn from(value: Direction) -> Self {
        value.flag()
    }
}

/// Options shared by the direct and fast transforms.
///
/// `normalization` scales the output by the sample count: `Backward` leaves
/// the plain sum, `Forward` divides by `N`, `Ortho` by `sqrt(N)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformOptions {
    pub mode: RuntimeMode,
    pub normalization: Normalization,
}

impl TransformOptions {
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

    pub(crate) fn output_scale(&self, sample_count: usize) -> f64 {
        self.normalization.scale(sample_count, false)
    }
}

pub(crate) fn validate_inputs(
    samples: &[Sample],
    m: usize,
    mode: RuntimeMode,
) -> Result<(), NufftError> {
    if samples.is_empty() {
        return Err(NufftError::EmptySamples);
    }
    if m == 0 {
        return Err(NufftError::ZeroLength);
    }
    if mode.checks_finite() {
        for (index, sample) in samples.iter().enumerate() {
            if !sample.is_finite() {
                return Err(NufftError::NonFiniteSample { index });
            }
            if sample.theta.abs() > PI {
                return Err(NufftError::PositionOutOfRange {
                    index,
                    theta: sample.theta,
                });
            }
        }
    }
    Ok(())
}
