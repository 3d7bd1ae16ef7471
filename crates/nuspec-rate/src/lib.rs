#![forbid(unsafe_code)]

//! Dominant-rate estimation from non-uniformly sampled traces.
//!
//! A [`TraceSource`] yields a [`TimeSeries`]; an [`ObservationWindow`] maps
//! its timestamps onto `[-π, π]`; [`RateEstimator`] computes direct and fast
//! spectra, decides which to trust, and reads the strongest in-band bin with
//! [`find_dominant_rate`].

pub mod analyzer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod window;

pub use analyzer::{BpmScale, DominantPeak, RateBand, find_dominant_rate};
pub use config::{FallbackPolicy, RateConfig};
pub use error::RateError;
pub use pipeline::{
    EvidenceOutcome, RateEstimate, RateEstimator, SpectrumSource, WindowEstimate, WindowEvidence,
};
pub use source::{InMemoryTrace, JsonTraceFile, TimeSeries, TraceSource};
pub use window::ObservationWindow;
