use std::time::Instant;

use num_complex::Complex64;

use crate::sample::{Direction, Sample, TransformOptions, validate_inputs};
use crate::spectrum::Spectrum;
use crate::trace::{NufftKind, NufftTrace, next_operation_id, record_trace};
use crate::NufftError;

// The phase recurrence drifts by roughly one ulp per step; re-seed it from
// an exact exponential this often.
const REANCHOR_INTERVAL: usize = 128;

/// Exact Type-1 NUDFT by direct summation, `O(N·M)`.
///
/// `out[k] = Σ_j c_j · exp(dir · i · f_k · θ_j)` with `f_k = k - M/2`.
pub fn direct_nudft1(
    samples: &[Sample],
    direction: Direction,
    m: usize,
) -> Result<Spectrum, NufftError> {
    direct_nudft1_with_options(samples, direction, m, &TransformOptions::default())
}

pub fn direct_nudft1_with_options(
    samples: &[Sample],
    direction: Direction,
    m: usize,
    options: &TransformOptions,
) -> Result<Spectrum, NufftError> {
    validate_inputs(samples, m, options.mode)?;
    let started = Instant::now();

    let sign = direction.sign();
    let first_frequency = -((m / 2) as f64);
    let mut out = vec![Complex64::new(0.0, 0.0); m];
    for sample in samples {
        let step = Complex64::from_polar(1.0, sign * sample.theta);
        let mut phase = Complex64::new(0.0, 0.0);
        for (k, slot) in out.iter_mut().enumerate() {
            if k % REANCHOR_INTERVAL == 0 {
                let frequency = first_frequency + k as f64;
                phase = Complex64::from_polar(1.0, sign * frequency * sample.theta);
            }
            *slot += sample.amplitude * phase;
            phase *= step;
        }
    }

    let scale = options.output_scale(samples.len());
    if (scale - 1.0).abs() > f64::EPSILON {
        out.iter_mut().for_each(|value| *value *= scale);
    }

    record_trace(NufftTrace {
        operation_id: next_operation_id(NufftKind::Direct),
        kind: NufftKind::Direct,
        direction: direction.flag(),
        samples: samples.len(),
        m,
        grid_len: None,
        nspread: None,
        precision: None,
        ier: 0,
        mode: options.mode,
        timing_ns: started.elapsed().as_nanos(),
    });

    Spectrum::from_coefficients(out)
}
