use num_complex::Complex64;

use crate::NufftError;
use crate::spectrum::Spectrum;

/// Running `scale² · sumsq` accumulator over real components, rescaled so
/// that neither squaring step can overflow or underflow.
#[derive(Debug, Clone, Copy)]
struct ScaledSumSquares {
    scale: f64,
    sumsq: f64,
}

impl ScaledSumSquares {
    fn new() -> Self {
        Self {
            scale: 0.0,
            sumsq: 1.0,
        }
    }

    fn push(&mut self, x: f64) {
        if x == 0.0 {
            return;
        }
        let ax = x.abs();
        if self.scale < ax {
            let ratio = self.scale / ax;
            self.sumsq = 1.0 + self.sumsq * ratio * ratio;
            self.scale = ax;
        } else {
            let ratio = ax / self.scale;
            self.sumsq += ratio * ratio;
        }
    }

    fn push_complex(&mut self, z: Complex64) {
        self.push(z.re);
        self.push(z.im);
    }

    fn is_zero(&self) -> bool {
        self.scale == 0.0
    }

    fn energy(&self) -> f64 {
        self.scale * self.scale * self.sumsq
    }
}

fn check_lengths(reference: &Spectrum, candidate: &Spectrum) -> Result<(), NufftError> {
    if reference.len() != candidate.len() {
        return Err(NufftError::LengthMismatch {
            expected: reference.len(),
            actual: candidate.len(),
        });
    }
    Ok(())
}

/// `sqrt(Σ|c_k - r_k|² / Σ|r_k|²)`.
///
/// A non-finite coefficient on either side is
/// [`NufftError::NonFiniteSpectrum`]. A zero-energy reference yields `0.0`
/// against an all-zero candidate and [`NufftError::UndefinedMetric`]
/// otherwise, so an `Ok` value is never NaN.
pub fn relative_rms_error(reference: &Spectrum, candidate: &Spectrum) -> Result<f64, NufftError> {
    check_lengths(reference, candidate)?;
    let mut diff = ScaledSumSquares::new();
    let mut base = ScaledSumSquares::new();
    let mut cand = ScaledSumSquares::new();
    for (index, (&r, &c)) in reference.as_slice().iter().zip(candidate.as_slice()).enumerate() {
        if !r.is_finite() {
            return Err(NufftError::NonFiniteSpectrum {
                operand: "reference",
                index,
            });
        }
        if !c.is_finite() {
            return Err(NufftError::NonFiniteSpectrum {
                operand: "candidate",
                index,
            });
        }
        // Halved so that `c - r` cannot overflow.
        diff.push_complex(c * 0.5 - r * 0.5);
        base.push_complex(r);
        cand.push_complex(c);
    }

    if base.is_zero() {
        if cand.is_zero() {
            return Ok(0.0);
        }
        return Err(NufftError::UndefinedMetric {
            candidate_energy: cand.energy(),
        });
    }
    if diff.is_zero() {
        return Ok(0.0);
    }
    Ok((diff.scale / base.scale) * 2.0 * (diff.sumsq / base.sumsq).sqrt())
}

/// Largest coefficient-wise `|c_k - r_k|`.
pub fn max_abs_error(reference: &Spectrum, candidate: &Spectrum) -> Result<f64, NufftError> {
    check_lengths(reference, candidate)?;
    Ok(reference
        .as_slice()
        .iter()
        .zip(candidate.as_slice())
        .map(|(&r, &c)| (c - r).norm())
        .fold(0.0, f64::max))
}
