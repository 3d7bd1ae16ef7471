use num_complex::Complex64;
use nuspec_fft::{frequency_to_index, index_to_frequency};
use serde::{Deserialize, Serialize};

use crate::NufftError;

/// Centered spectrum of `M` complex coefficients.
///
/// Index `k` holds folded frequency `k - M/2`; see
/// [`nuspec_fft::index_to_frequency`]. A spectrum is written once by a
/// transform and only read afterwards, so there is no mutable access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    coefficients: Vec<Complex64>,
}

impl Spectrum {
    pub fn from_coefficients(coefficients: Vec<Complex64>) -> Result<Self, NufftError> {
        if coefficients.is_empty() {
            return Err(NufftError::ZeroLength);
        }
        Ok(Self { coefficients })
    }

    pub fn zeros(m: usize) -> Result<Self, NufftError> {
        Self::from_coefficients(vec![Complex64::new(0.0, 0.0); m])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Always `false`; construction rejects empty spectra.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.coefficients
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Complex64> {
        self.coefficients.get(index).copied()
    }

    /// Folded frequency of `index`.
    #[must_use]
    pub fn frequency(&self, index: usize) -> i64 {
        index_to_frequency(index, self.len())
    }

    /// Coefficient of folded frequency `frequency`, wrapping modulo `M`.
    #[must_use]
    pub fn at_frequency(&self, frequency: i64) -> Complex64 {
        frequency_to_index(frequency, self.len())
            .and_then(|index| self.get(index))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn zero_frequency_index(&self) -> usize {
        self.len() / 2
    }

    /// Sum of squared magnitudes.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.coefficients.iter().map(Complex64::norm_sqr).sum()
    }

    /// Squared magnitude per index.
    #[must_use]
    pub fn powers(&self) -> Vec<f64> {
        self.coefficients.iter().map(Complex64::norm_sqr).collect()
    }

    /// `(frequency, coefficient)` pairs in index order.
    pub fn iter_folded(&self) -> impl Iterator<Item = (i64, Complex64)> + '_ {
        let m = self.len();
        self.coefficients
            .iter()
            .enumerate()
            .map(move |(k, &value)| (index_to_frequency(k, m), value))
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Complex64> {
        self.coefficients
    }
}
