/// Folded frequency represented by index `k` of a centered length-`m` spectrum.
///
/// Index `m / 2` is zero frequency; indices below it are negative
/// frequencies, so the axis runs `-(m / 2) ..= (m - 1) / 2`. `k` must be
/// less than `m`.
#[must_use]
pub fn index_to_frequency(k: usize, m: usize) -> i64 {
    k as i64 - (m / 2) as i64
}

/// Inverse of [`index_to_frequency`], wrapping modulo `m`.
///
/// Frequencies outside the centered band alias onto the index they would
/// occupy after periodic extension. Returns `None` for `m == 0`.
#[must_use]
pub fn frequency_to_index(frequency: i64, m: usize) -> Option<usize> {
    if m == 0 {
        return None;
    }
    let m = m as i64;
    Some((frequency + m / 2).rem_euclid(m) as usize)
}

/// Position of `frequency` in an unshifted length-`n` FFT output, where bin
/// 0 is zero frequency and negative frequencies occupy the upper half.
/// Returns `None` for `n == 0`.
#[must_use]
pub fn frequency_to_fft_index(frequency: i64, n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    Some(frequency.rem_euclid(n as i64) as usize)
}

#[cfg(test)]
mod tests {
    use super::{frequency_to_fft_index, frequency_to_index, index_to_frequency};

    fn axis(m: usize) -> Vec<i64> {
        (0..m).map(|k| index_to_frequency(k, m)).collect()
    }

    #[test]
    fn even_length_axis_is_centered() {
        assert_eq!(axis(8), vec![-4, -3, -2, -1, 0, 1, 2, 3]);
        assert_eq!(index_to_frequency(4, 8), 0);
    }

    #[test]
    fn odd_length_axis_is_centered() {
        assert_eq!(axis(5), vec![-2, -1, 0, 1, 2]);
    }

    #[test]
    fn index_frequency_bijection_holds() {
        for m in 1..40usize {
            for k in 0..m {
                let f = index_to_frequency(k, m);
                assert_eq!(frequency_to_index(f, m), Some(k), "m={m} k={k}");
            }
        }
    }

    #[test]
    fn out_of_band_frequencies_wrap() {
        assert_eq!(frequency_to_index(4, 8), Some(0));
        assert_eq!(frequency_to_index(-5, 8), Some(7));
        assert_eq!(frequency_to_index(12, 8), Some(0));
        assert_eq!(frequency_to_index(0, 0), None);
    }

    #[test]
    fn fft_index_places_negative_frequencies_last() {
        assert_eq!(frequency_to_fft_index(0, 8), Some(0));
        assert_eq!(frequency_to_fft_index(3, 8), Some(3));
        assert_eq!(frequency_to_fft_index(-1, 8), Some(7));
        assert_eq!(frequency_to_fft_index(-4, 8), Some(4));
        assert_eq!(frequency_to_fft_index(1, 0), None);
    }
}
