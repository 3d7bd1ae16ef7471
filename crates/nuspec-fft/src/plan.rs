use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::Arc;

use num_complex::Complex64;

use crate::transforms::FftError;

/// `true` if `n > 0` and its only prime factors are 2, 3 and 5.
#[must_use]
pub fn is_smooth(mut n: usize) -> bool {
    if n == 0 {
        return false;
    }
    for p in [2, 3, 5] {
        while n.is_multiple_of(p) {
            n /= p;
        }
    }
    n == 1
}

/// Smallest 2·3·5-smooth integer that is `>= n`; `next_smooth(0) == 1`.
///
/// Returns `None` if no such value fits in `usize`.
#[must_use]
pub fn next_smooth(n: usize) -> Option<usize> {
    // Walk every 3^b * 5^c below the target and lift it with powers of two;
    // u128 keeps the overshoot past usize::MAX representable.
    let target = n.max(1) as u128;
    let mut best: Option<u128> = None;
    let mut p5: u128 = 1;
    loop {
        let mut p35 = p5;
        loop {
            let mut candidate = p35;
            while candidate < target {
                candidate *= 2;
            }
            if best.is_none_or(|current| candidate < current) {
                best = Some(candidate);
            }
            if p35 >= target {
                break;
            }
            p35 *= 3;
        }
        if p5 >= target {
            break;
        }
        p5 *= 5;
    }
    best.and_then(|value| usize::try_from(value).ok())
}

/// Prime factors of `n` in ascending order; empty for `n <= 1`.
#[must_use]
pub fn factorize_radix_path(mut n: usize) -> Vec<usize> {
    let mut factors = Vec::new();
    if n <= 1 {
        return factors;
    }
    let mut p = 2usize;
    while p * p <= n {
        while n.is_multiple_of(p) {
            factors.push(p);
            n /= p;
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Cache key for reusable FFT plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub len: usize,
    pub inverse: bool,
}

/// Precomputed mixed-radix decimation-in-time plan for one length and direction.
///
/// Radix 2, 3 and 5 stages are the intended fast path; any larger prime
/// factor falls back to an `O(p)` butterfly per output, so non-smooth
/// lengths still transform correctly, just more slowly. Output is
/// unscaled in both directions.
#[derive(Debug, Clone)]
pub struct FftPlan {
    len: usize,
    inverse: bool,
    factors: Vec<usize>,
    twiddles: Vec<Complex64>,
}

impl FftPlan {
    pub fn new(len: usize, inverse: bool) -> Result<Self, FftError> {
        if len == 0 {
            return Err(FftError::InvalidShape {
                detail: "plan length must be greater than zero",
            });
        }
        let sign = if inverse { 1.0 } else { -1.0 };
        let twiddles = (0..len)
            .map(|k| Complex64::from_polar(1.0, sign * 2.0 * PI * k as f64 / len as f64))
            .collect();
        Ok(Self {
            len,
            inverse,
            factors: factorize_radix_path(len),
            twiddles,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    #[must_use]
    pub fn radix_path(&self) -> &[usize] {
        &self.factors
    }

    /// Unscaled transform of `input`, which must have exactly `len` points.
    pub fn process(&self, input: &[Complex64]) -> Result<Vec<Complex64>, FftError> {
        if input.len() != self.len {
            return Err(FftError::LengthMismatch {
                expected: self.len,
                actual: input.len(),
            });
        }
        let mut output = vec![Complex64::new(0.0, 0.0); self.len];
        let radix_max = self.factors.iter().copied().max().unwrap_or(1);
        let mut scratch = vec![Complex64::new(0.0, 0.0); radix_max];
        self.decimate(input, 0, 1, &self.factors, 1, &mut output, &mut scratch);
        Ok(output)
    }

    // `out` holds the length-n sub-transform of input[offset + j*stride];
    // `twiddle_stride` is len / n so W_n^e == twiddles[e * twiddle_stride].
    #[allow(clippy::too_many_arguments)]
    fn decimate(
        &self,
        input: &[Complex64],
        offset: usize,
        stride: usize,
        factors: &[usize],
        twiddle_stride: usize,
        out: &mut [Complex64],
        scratch: &mut [Complex64],
    ) {
        let Some((&radix, rest)) = factors.split_first() else {
            out[0] = input[offset];
            return;
        };
        let m = out.len() / radix;
        for r in 0..radix {
            self.decimate(
                input,
                offset + r * stride,
                stride * radix,
                rest,
                twiddle_stride * radix,
                &mut out[r * m..(r + 1) * m],
                scratch,
            );
        }

        let radix_step = self.len / radix;
        for k in 0..m {
            for r in 0..radix {
                scratch[r] = out[r * m + k] * self.twiddles[r * k * twiddle_stride];
            }
            for q in 0..radix {
                let mut acc = scratch[0];
                for (r, &value) in scratch.iter().enumerate().take(radix).skip(1) {
                    acc += value * self.twiddles[((r * q) % radix) * radix_step];
                }
                out[q * m + k] = acc;
            }
        }
    }
}

/// Caller-owned cache of plans keyed by length and direction.
///
/// Each analysis owns its cache, so concurrent analyses never coordinate.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: HashMap<PlanKey, Arc<FftPlan>>,
    hits: u64,
    misses: u64,
}

impl PlanCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(&mut self, len: usize, inverse: bool) -> Result<Arc<FftPlan>, FftError> {
        let key = PlanKey { len, inverse };
        if let Some(plan) = self.plans.get(&key) {
            self.hits += 1;
            return Ok(Arc::clone(plan));
        }
        let plan = Arc::new(FftPlan::new(len, inverse)?);
        self.misses += 1;
        self.plans.insert(key, Arc::clone(&plan));
        Ok(plan)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.plans.clear();
    }
}
