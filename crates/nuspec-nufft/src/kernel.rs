//! Gaussian spreading kernel and its precision-to-width mapping.
//!
//! A sample at grid coordinate `u` is spread onto the `2·nspread` nearest
//! fine-grid cells with weight `exp(-(π/λ)·d²)`, `d` the distance in cells.
//! After the uniform FFT, frequency `k` is divided by the kernel's Fourier
//! transform `sqrt(λ)·exp(-τ·k²)`, `τ = π·λ / Mr²`.

use std::f64::consts::PI;

use nuspec_fft::next_smooth;
use serde::Serialize;

/// Tightest precision the kernel construction supports.
pub const MIN_PRECISION: f64 = 1e-13;
/// Loosest precision the kernel construction supports.
pub const MAX_PRECISION: f64 = 1e-1;
/// At or below this precision the fine grid oversamples 3x instead of 2x.
pub const HIGH_ACCURACY_THRESHOLD: f64 = 1e-11;

/// Why the fast transform could not produce a trustworthy spectrum.
///
/// `code()` is the integer status reported alongside the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FastFailure {
    PrecisionOutOfRange,
    KernelWidthUnderflow,
    NonFiniteResult,
    GridOverflow,
}

impl FastFailure {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::PrecisionOutOfRange => 1,
            Self::KernelWidthUnderflow => 2,
            Self::NonFiniteResult => 3,
            Self::GridOverflow => 4,
        }
    }

    #[must_use]
    pub fn detail(self) -> &'static str {
        match self {
            Self::PrecisionOutOfRange => "precision outside the supported range [1e-13, 1e-1]",
            Self::KernelWidthUnderflow => "kernel half-width rounds to zero",
            Self::NonFiniteResult => "non-finite value in the computed spectrum",
            Self::GridOverflow => "fine grid length does not fit in usize",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GaussianKernel {
    pub precision: f64,
    /// Fine grid length over output length, 2 or 3.
    pub oversampling: usize,
    pub nspread: usize,
    pub grid_len: usize,
    pub lambda: f64,
    pub tau: f64,
}

impl GaussianKernel {
    /// Kernel for precision `eps` and output length `m`.
    ///
    /// The half-width is checked before the supported range so that
    /// degenerate precisions (`eps >= ~0.5`) report the width underflow.
    pub fn for_precision(eps: f64, m: usize) -> Result<Self, FastFailure> {
        let oversampling: usize = if eps <= HIGH_ACCURACY_THRESHOLD { 3 } else { 2 };
        let r = oversampling as f64;
        let width = (-eps.ln() * (r - 0.5) / (PI * (r - 1.0)) + 0.5).floor();
        if width.is_nan() || width < 1.0 {
            return Err(FastFailure::KernelWidthUnderflow);
        }
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&eps) {
            return Err(FastFailure::PrecisionOutOfRange);
        }
        let nspread = width as usize;

        let oversampled = m
            .checked_mul(oversampling)
            .ok_or(FastFailure::GridOverflow)?;
        let grid_len = next_smooth(oversampled.max(2 * nspread)).ok_or(FastFailure::GridOverflow)?;

        let lambda = r * nspread as f64 / (r - 0.5);
        let grid = grid_len as f64;
        Ok(Self {
            precision: eps,
            oversampling,
            nspread,
            grid_len,
            lambda,
            tau: PI * lambda / (grid * grid),
        })
    }

    /// Spreading weight for a distance of `d` fine-grid cells.
    #[must_use]
    pub fn spread_weight(&self, d: f64) -> f64 {
        (-(PI / self.lambda) * d * d).exp()
    }

    /// Factor that undoes the kernel's attenuation of frequency `k`.
    #[must_use]
    pub fn deconvolution(&self, k: i64) -> f64 {
        let k = k as f64;
        (self.tau * k * k).exp() / self.lambda.sqrt()
    }

    /// Nominal relative accuracy implied by the chosen half-width.
    #[must_use]
    pub fn predicted_error(&self) -> f64 {
        let r = self.oversampling as f64;
        (-PI * self.nspread as f64 * (r - 1.0) / (r - 0.5)).exp()
    }

    /// Weights of the `2·nspread` cells around fractional offset `frac`
    /// (in `[0, 1)`), for offsets `1 - nspread ..= nspread`.
    ///
    /// Uses `exp(-a(o-f)²) = exp(-af²) · exp(2af)^o · exp(-ao²)` so each
    /// sample costs two exponentials; `offset_table[o] = exp(-a·o²)`.
    pub(crate) fn fill_weights(&self, frac: f64, offset_table: &[f64], weights: &mut [f64]) {
        let a = PI / self.lambda;
        let base = (-a * frac * frac).exp();
        let step = (2.0 * a * frac).exp();
        let center = self.nspread - 1;

        // weights[center] is offset 0.
        let mut up = base;
        for o in 0..=self.nspread {
            weights[center + o] = up * offset_table[o];
            up *= step;
        }
        let inv_step = step.recip();
        let mut down = base;
        for o in 1..self.nspread {
            down *= inv_step;
            weights[center - o] = down * offset_table[o];
        }
    }

    pub(crate) fn offset_table(&self) -> Vec<f64> {
        let a = PI / self.lambda;
        (0..=self.nspread)
            .map(|o| {
                let o = o as f64;
                (-a * o * o).exp()
            })
            .collect()
    }
}
