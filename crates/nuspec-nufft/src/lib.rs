#![forbid(unsafe_code)]

//! One-dimensional Type-1 non-uniform discrete Fourier transform.
//!
//! Given samples `(θ_j, c_j)` with `θ_j` in `[-π, π)`, computes the
//! centered spectrum `F[k] = Σ_j c_j · exp(dir · i · f_k · θ_j)` with
//! `f_k = k - M/2`.
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | `sample`   | [`Sample`], [`Direction`], [`TransformOptions`]            |
//! | `spectrum` | [`Spectrum`], the centered output buffer                   |
//! | `planner`  | [`plan_length`], [`plan_for_rate`]                         |
//! | `direct`   | exact `O(N·M)` summation                                   |
//! | `kernel`   | [`GaussianKernel`] parameters from a precision target      |
//! | `fast`     | Gaussian-gridding transform, [`FastOutcome`] status model  |
//! | `metric`   | [`relative_rms_error`], [`max_abs_error`]                  |
//! | `oracle`   | [`Nudft1Engine`] trait and [`cross_validate`]              |
//! | `trace`    | [`NufftTrace`] records and [`take_nufft_traces`]           |

pub mod direct;
pub mod error;
pub mod fast;
pub mod kernel;
pub mod metric;
pub mod oracle;
pub mod planner;
pub mod sample;
pub mod spectrum;
pub mod trace;

pub use direct::{direct_nudft1, direct_nudft1_with_options};
pub use error::NufftError;
pub use fast::{FastOutcome, FastStatus, fast_nudft1, fast_nudft1_planned, fast_nudft1_with_options};
pub use kernel::{
    FastFailure, GaussianKernel, HIGH_ACCURACY_THRESHOLD, MAX_PRECISION, MIN_PRECISION,
};
pub use metric::{max_abs_error, relative_rms_error};
pub use oracle::{
    DirectEngine, EngineOutput, GaussianGriddingEngine, Nudft1Engine, OracleReport,
    cross_validate,
};
pub use planner::{plan_for_rate, plan_length};
pub use sample::{Direction, Sample, TransformOptions, samples_from_parts};
pub use spectrum::Spectrum;
pub use trace::{NufftKind, NufftTrace, take_nufft_traces};

pub use num_complex::Complex64;
pub use nuspec_fft::{Normalization, PlanCache};
