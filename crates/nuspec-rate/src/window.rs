use std::f64::consts::PI;

use num_complex::Complex64;
use nuspec_nufft::Sample;
use serde::{Deserialize, Serialize};

use crate::RateError;

/// Time interval `[start, start + span]` mapped onto `[-π, π]`.
///
/// `θ(t) = (2π / span) · (t - start - span/2)`, so the window midpoint sits
/// at zero and the last timestamp of a window built by
/// [`ObservationWindow::from_times`] lands exactly on `+π`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationWindow {
    pub start: f64,
    pub span: f64,
}

impl ObservationWindow {
    pub fn new(start: f64, span: f64) -> Result<Self, RateError> {
        if !start.is_finite() {
            return Err(RateError::InvalidWindow {
                detail: "start must be finite",
            });
        }
        if !(span.is_finite() && span > 0.0) {
            return Err(RateError::InvalidWindow {
                detail: "span must be finite and positive",
            });
        }
        Ok(Self { start, span })
    }

    /// Window from the first to the last timestamp.
    pub fn from_times(times: &[f64]) -> Result<Self, RateError> {
        match (times.first(), times.last()) {
            (Some(&first), Some(&last)) => Self::new(first, last - first),
            _ => Err(RateError::InvalidWindow {
                detail: "no timestamps",
            }),
        }
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.span
    }

    #[must_use]
    pub fn theta(&self, t: f64) -> f64 {
        // Via the unit fraction so both endpoints land exactly on ±π.
        let fraction = (t - self.start) / self.span;
        PI * (2.0 * fraction - 1.0)
    }

    #[must_use]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end()
    }

    /// Pair each timestamp's angle with its real amplitude, optionally
    /// subtracting the amplitude mean first.
    pub fn to_samples(
        &self,
        times: &[f64],
        amplitudes: &[f64],
        remove_mean: bool,
    ) -> Result<Vec<Sample>, RateError> {
        if times.len() != amplitudes.len() {
            return Err(RateError::TraceLength {
                times: times.len(),
                amplitudes: amplitudes.len(),
            });
        }
        let offset = if remove_mean && !amplitudes.is_empty() {
            amplitudes.iter().sum::<f64>() / amplitudes.len() as f64
        } else {
            0.0
        };
        Ok(times
            .iter()
            .zip(amplitudes)
            .map(|(&t, &a)| Sample::new(self.theta(t), Complex64::new(a - offset, 0.0)))
            .collect())
    }
}
