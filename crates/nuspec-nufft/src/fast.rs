use std::f64::consts::PI;
use std::time::Instant;

use num_complex::Complex64;
use nuspec_fft::{PlanCache, fft_planned, frequency_to_fft_index, index_to_frequency};
use serde::Serialize;

use crate::kernel::{FastFailure, GaussianKernel};
use crate::sample::{Direction, Sample, TransformOptions, validate_inputs};
use crate::spectrum::Spectrum;
use crate::trace::{NufftKind, NufftTrace, next_operation_id, record_trace};
use crate::NufftError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FastStatus {
    Success,
    NumericFailure { reason: FastFailure },
}

impl FastStatus {
    /// `0` on success, otherwise the failure code.
    #[must_use]
    pub fn ier(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NumericFailure { reason } => reason.code(),
        }
    }
}

/// Result of a fast transform that passed input validation.
///
/// Numeric trouble is reported through `status` rather than as an error so
/// callers can decide whether to retry or fall back. On failure the stored
/// spectrum is all zeros and the checked accessors refuse to return it.
#[derive(Debug, Clone, PartialEq)]
pub struct FastOutcome {
    spectrum: Spectrum,
    status: FastStatus,
    kernel: Option<GaussianKernel>,
}

impl FastOutcome {
    #[must_use]
    pub fn status(&self) -> FastStatus {
        self.status
    }

    #[must_use]
    pub fn ier(&self) -> i32 {
        self.status.ier()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == FastStatus::Success
    }

    /// Kernel used, `None` if its construction was the failure.
    #[must_use]
    pub fn kernel(&self) -> Option<&GaussianKernel> {
        self.kernel.as_ref()
    }

    pub fn spectrum_checked(&self) -> Result<&Spectrum, NufftError> {
        match self.status {
            FastStatus::Success => Ok(&self.spectrum),
            FastStatus::NumericFailure { reason } => Err(failure_error(reason)),
        }
    }

    pub fn into_result(self) -> Result<Spectrum, NufftError> {
        match self.status {
            FastStatus::Success => Ok(self.spectrum),
            FastStatus::NumericFailure { reason } => Err(failure_error(reason)),
        }
    }

    /// Spectrum regardless of status: zero-filled after a failure.
    #[must_use]
    pub fn raw_spectrum(&self) -> &Spectrum {
        &self.spectrum
    }
}

fn failure_error(reason: FastFailure) -> NufftError {
    NufftError::NumericFailure {
        code: reason.code(),
        detail: reason.detail(),
    }
}

/// Approximate Type-1 NUDFT by Gaussian gridding.
///
/// Same sum as [`crate::direct_nudft1`], to relative accuracy about `eps`
/// for `1e-13 <= eps <= 1e-1`.
pub fn fast_nudft1(
    samples: &[Sample],
    direction: Direction,
    eps: f64,
    m: usize,
) -> Result<FastOutcome, NufftError> {
    fast_nudft1_with_options(samples, direction, eps, m, &TransformOptions::default())
}

pub fn fast_nudft1_with_options(
    samples: &[Sample],
    direction: Direction,
    eps: f64,
    m: usize,
    options: &TransformOptions,
) -> Result<FastOutcome, NufftError> {
    let mut plans = PlanCache::new();
    fast_nudft1_planned(samples, direction, eps, m, options, &mut plans)
}

/// [`fast_nudft1_with_options`] reusing FFT plans from a caller-owned cache.
pub fn fast_nudft1_planned(
    samples: &[Sample],
    direction: Direction,
    eps: f64,
    m: usize,
    options: &TransformOptions,
    plans: &mut PlanCache,
) -> Result<FastOutcome, NufftError> {
    validate_inputs(samples, m, options.mode)?;
    if !(eps.is_finite() && eps > 0.0) {
        return Err(NufftError::InvalidPrecision { value: eps });
    }
    let started = Instant::now();

    let outcome = match GaussianKernel::for_precision(eps, m) {
        Ok(kernel) => run_gridded(samples, direction, m, &kernel, options, plans)?,
        Err(reason) => failed(m, reason, None)?,
    };

    record_trace(NufftTrace {
        operation_id: next_operation_id(NufftKind::Fast),
        kind: NufftKind::Fast,
        direction: direction.flag(),
        samples: samples.len(),
        m,
        grid_len: outcome.kernel.map(|k| k.grid_len),
        nspread: outcome.kernel.map(|k| k.nspread),
        precision: Some(eps),
        ier: outcome.ier(),
        mode: options.mode,
        timing_ns: started.elapsed().as_nanos(),
    });

    Ok(outcome)
}

fn failed(
    m: usize,
    reason: FastFailure,
    kernel: Option<GaussianKernel>,
) -> Result<FastOutcome, NufftError> {
    Ok(FastOutcome {
        spectrum: Spectrum::zeros(m)?,
        status: FastStatus::NumericFailure { reason },
        kernel,
    })
}

fn run_gridded(
    samples: &[Sample],
    direction: Direction,
    m: usize,
    kernel: &GaussianKernel,
    options: &TransformOptions,
    plans: &mut PlanCache,
) -> Result<FastOutcome, NufftError> {
    let grid_len = kernel.grid_len;
    let grid = spread(samples, kernel);

    let grid_hat = fft_planned(&grid, direction.is_inverse(), options.mode, plans)?;

    let scale = options.output_scale(samples.len());
    let mut out = Vec::with_capacity(m);
    for k in 0..m {
        let frequency = index_to_frequency(k, m);
        let value = frequency_to_fft_index(frequency, grid_len)
            .and_then(|index| grid_hat.get(index).copied())
            .unwrap_or_default();
        out.push(value * (kernel.deconvolution(frequency) * scale));
    }

    if out.iter().any(|value| !value.is_finite()) {
        return failed(m, FastFailure::NonFiniteResult, Some(*kernel));
    }
    Ok(FastOutcome {
        spectrum: Spectrum::from_coefficients(out)?,
        status: FastStatus::Success,
        kernel: Some(*kernel),
    })
}

/// Spread every sample onto the periodic fine grid.
fn spread(samples: &[Sample], kernel: &GaussianKernel) -> Vec<Complex64> {
    let grid_len = kernel.grid_len;
    let cells = grid_len as f64;
    let cells_per_radian = cells / (2.0 * PI);
    let table = kernel.offset_table();
    let mut weights = vec![0.0; 2 * kernel.nspread];
    let mut grid = vec![Complex64::new(0.0, 0.0); grid_len];
    let first_offset = 1 - kernel.nspread as i64;

    for sample in samples {
        // Periodic reduction keeps the cell index small for any finite θ.
        let u = (sample.theta * cells_per_radian).rem_euclid(cells);
        let base = u.floor();
        kernel.fill_weights(u - base, &table, &mut weights);
        let base = base as i64;
        for (slot, &weight) in weights.iter().enumerate() {
            let cell = (base + first_offset + slot as i64).rem_euclid(grid_len as i64) as usize;
            grid[cell] += sample.amplitude * weight;
        }
    }
    grid
}
