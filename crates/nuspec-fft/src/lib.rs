#![forbid(unsafe_code)]

//! Uniform FFT layer for nuspec.
//!
//! - `plan`: smooth (2·3·5) length selection, radix factorization and
//!   reusable mixed-radix plans
//! - `transforms`: backend trait, the traced `fft` and planned entry points
//! - `helpers`: the folded (centered) index bijection

pub mod helpers;
pub mod plan;
pub mod transforms;

pub use helpers::{frequency_to_fft_index, frequency_to_index, index_to_frequency};
pub use num_complex::Complex64;
pub use plan::{FftPlan, PlanCache, PlanKey, factorize_radix_path, is_smooth, next_smooth};
pub use transforms::{
    BackendKind, FftBackend, FftError, FftOptions, MixedRadixBackend, NaiveDftBackend,
    TransformTrace, fft, fft_planned, take_transform_traces,
};

use serde::{Deserialize, Serialize};

/// Scaling conventions applied after an unscaled transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Forward transform scaled by `1/n`, inverse unscaled.
    Forward,
    /// Forward transform unscaled, inverse scaled by `1/n`.
    #[default]
    Backward,
    /// Both directions scaled by `1/sqrt(n)`.
    Ortho,
}

impl Normalization {
    /// Factor applied to a transform of `n` points in the given direction.
    #[must_use]
    pub fn scale(self, n: usize, inverse: bool) -> f64 {
        if n == 0 {
            return 1.0;
        }
        let n = n as f64;
        match (self, inverse) {
            (Self::Backward, false) | (Self::Forward, true) => 1.0,
            (Self::Backward, true) | (Self::Forward, false) => 1.0 / n,
            (Self::Ortho, _) => 1.0 / n.sqrt(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformKind {
    Fft,
    Ifft,
}
