//! Peak extraction: turn a centered spectrum into a dominant rate.

use nuspec_fft::index_to_frequency;
use nuspec_nufft::Spectrum;
use serde::{Deserialize, Serialize};

use crate::RateError;

/// Open interval `(low, high)` of acceptable rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBand {
    pub low: f64,
    pub high: f64,
}

impl RateBand {
    pub fn new(low: f64, high: f64) -> Result<Self, RateError> {
        let band = Self { low, high };
        band.validate()?;
        Ok(band)
    }

    pub(crate) fn validate(&self) -> Result<(), RateError> {
        if self.low.is_finite() && self.high.is_finite() && self.low < self.high {
            Ok(())
        } else {
            Err(RateError::InvalidBand {
                low: self.low,
                high: self.high,
            })
        }
    }

    /// Strict containment; the edges are excluded.
    #[must_use]
    pub fn contains(&self, rate: f64) -> bool {
        rate > self.low && rate < self.high
    }
}

/// Bin-to-rate conversion for an observation span of `T` seconds:
/// one bin is `1/T` Hz, i.e. `60/T` beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmScale {
    pub span_seconds: f64,
    pub hz_per_bin: f64,
    pub bpm_per_bin: f64,
}

impl BpmScale {
    pub fn from_window(span_seconds: f64) -> Result<Self, RateError> {
        if !(span_seconds.is_finite() && span_seconds > 0.0) {
            return Err(RateError::InvalidWindow {
                detail: "span must be finite and positive",
            });
        }
        let hz_per_bin = 1.0 / span_seconds;
        Ok(Self {
            span_seconds,
            hz_per_bin,
            bpm_per_bin: 60.0 * hz_per_bin,
        })
    }

    #[must_use]
    pub fn rate(&self, frequency: i64) -> f64 {
        frequency as f64 * self.bpm_per_bin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantPeak {
    pub index: usize,
    pub frequency: i64,
    pub rate: f64,
    /// Squared magnitude of the winning coefficient.
    pub power: f64,
}

impl DominantPeak {
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.power.sqrt()
    }
}

/// Strongest non-negative-frequency bin whose rate lies inside `band`.
///
/// Scans indices `M/2 .. M`. A bin wins only with power strictly greater
/// than every earlier candidate and than zero, so ties go to the lowest
/// index and zero or NaN power never qualifies.
pub fn find_dominant_rate<F>(
    spectrum: &Spectrum,
    bin_to_rate: F,
    band: &RateBand,
) -> Result<DominantPeak, RateError>
where
    F: Fn(i64) -> f64,
{
    band.validate()?;
    let m = spectrum.len();
    let mut best: Option<DominantPeak> = None;
    let mut best_power = 0.0;
    for (index, value) in spectrum.as_slice().iter().enumerate().skip(m / 2) {
        let frequency = index_to_frequency(index, m);
        let rate = bin_to_rate(frequency);
        let power = value.norm_sqr();
        if band.contains(rate) && power > best_power {
            best_power = power;
            best = Some(DominantPeak {
                index,
                frequency,
                rate,
                power,
            });
        }
    }
    best.ok_or(RateError::NotFound {
        low: band.low,
        high: band.high,
    })
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64;
    use nuspec_nufft::Spectrum;

    use super::{BpmScale, RateBand, find_dominant_rate};
    use crate::RateError;

    fn spectrum_with(m: usize, peaks: &[(usize, f64)]) -> Spectrum {
        let mut values = vec![Complex64::new(0.0, 0.0); m];
        for &(index, magnitude) in peaks {
            values[index] = Complex64::new(0.0, magnitude);
        }
        Spectrum::from_coefficients(values).expect("non-empty")
    }

    fn heart_rate_band() -> RateBand {
        RateBand::new(50.0, 180.0).expect("band")
    }

    #[test]
    fn scale_matches_ten_second_window() {
        let scale = BpmScale::from_window(10.0).expect("scale");
        assert!((scale.hz_per_bin - 0.1).abs() < 1e-15);
        assert!((scale.bpm_per_bin - 6.0).abs() < 1e-12);
        assert!((scale.rate(12) - 72.0).abs() < 1e-12);
        assert!(BpmScale::from_window(0.0).is_err());
    }

    #[test]
    fn band_rejects_inverted_and_non_finite() {
        assert!(RateBand::new(180.0, 50.0).is_err());
        assert!(RateBand::new(f64::NAN, 50.0).is_err());
        assert!(RateBand::new(50.0, 50.0).is_err());
        let band = heart_rate_band();
        assert!(!band.contains(50.0) && !band.contains(180.0) && band.contains(51.0));
    }

    #[test]
    fn injected_in_band_peak_is_found() {
        let scale = BpmScale::from_window(10.0).expect("scale");
        let spectrum = spectrum_with(60, &[(42, 5.0), (33, 2.0), (20, 50.0)]);
        let peak = find_dominant_rate(&spectrum, |f| scale.rate(f), &heart_rate_band())
            .expect("peak");
        assert_eq!(peak.index, 42);
        assert_eq!(peak.frequency, 12);
        assert!((peak.rate - 72.0).abs() < 1e-12);
        assert!((peak.magnitude() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_band_peak_is_not_found() {
        let scale = BpmScale::from_window(10.0).expect("scale");
        // f = 3 is 18 bpm.
        let spectrum = spectrum_with(60, &[(33, 9.0)]);
        let err = find_dominant_rate(&spectrum, |f| scale.rate(f), &heart_rate_band())
            .expect_err("nothing in band");
        assert!(matches!(err, RateError::NotFound { .. }));
    }

    #[test]
    fn ties_keep_lowest_index() {
        let spectrum = spectrum_with(20, &[(13, 1.0), (15, 1.0)]);
        let band = RateBand::new(0.5, 100.0).expect("band");
        let peak = find_dominant_rate(&spectrum, |f| f as f64, &band).expect("peak");
        assert_eq!(peak.index, 13);
    }

    #[test]
    fn nan_power_never_wins() {
        let mut values = vec![Complex64::new(0.0, 0.0); 8];
        values[5] = Complex64::new(f64::NAN, 0.0);
        values[6] = Complex64::new(0.5, 0.0);
        let spectrum = Spectrum::from_coefficients(values).expect("spectrum");
        let band = RateBand::new(0.0, 10.0).expect("band");
        let peak = find_dominant_rate(&spectrum, |f| f as f64, &band).expect("peak");
        assert_eq!(peak.index, 6);
    }
}
