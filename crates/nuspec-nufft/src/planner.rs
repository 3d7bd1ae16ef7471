//! Output-length planning for the centered spectrum.

use nuspec_fft::next_smooth;

use crate::NufftError;

/// Length `M` of a centered spectrum covering frequencies up to `min_span`.
///
/// Returns `2 * next_smooth(ceil(min_span))`: the smooth half keeps the
/// uniform FFT fast and the doubling holds the mirrored negative half.
/// Deterministic and non-decreasing in `min_span`.
pub fn plan_length(min_span: f64) -> Result<usize, NufftError> {
    if !(min_span.is_finite() && min_span > 0.0) {
        return Err(NufftError::InvalidSpan { value: min_span });
    }
    let half = min_span.ceil();
    if half >= usize::MAX as f64 {
        return Err(NufftError::PlanOverflow);
    }
    next_smooth(half as usize)
        .and_then(|smooth| smooth.checked_mul(2))
        .ok_or(NufftError::PlanOverflow)
}

/// Length needed to resolve rates up to `max_rate` when one bin spans
/// `rate_per_bin` rate units.
pub fn plan_for_rate(max_rate: f64, rate_per_bin: f64) -> Result<usize, NufftError> {
    if !(rate_per_bin.is_finite() && rate_per_bin > 0.0) {
        return Err(NufftError::InvalidSpan {
            value: rate_per_bin,
        });
    }
    plan_length((max_rate / rate_per_bin).ceil())
}
