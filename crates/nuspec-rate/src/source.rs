use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::RateError;

/// Timestamped real amplitude trace: every value finite, timestamps in
/// ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrace")]
pub struct TimeSeries {
    times: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl TimeSeries {
    pub fn new(times: Vec<f64>, amplitudes: Vec<f64>) -> Result<Self, RateError> {
        if times.len() != amplitudes.len() {
            return Err(RateError::TraceLength {
                times: times.len(),
                amplitudes: amplitudes.len(),
            });
        }
        if let Some(index) = times.iter().position(|t| !t.is_finite()) {
            return Err(RateError::NonFiniteTrace {
                field: "times",
                index,
            });
        }
        if let Some(index) = amplitudes.iter().position(|a| !a.is_finite()) {
            return Err(RateError::NonFiniteTrace {
                field: "amplitudes",
                index,
            });
        }
        if !times.windows(2).all(|pair| pair[0] <= pair[1]) {
            return Err(RateError::InvalidWindow {
                detail: "timestamps must be non-decreasing",
            });
        }
        Ok(Self { times, amplitudes })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[must_use]
    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Points with `start <= t <= end`.
    #[must_use]
    pub fn between(&self, start: f64, end: f64) -> TimeSeries {
        let lo = self.times.partition_point(|&t| t < start);
        let hi = self.times.partition_point(|&t| t <= end);
        let hi = hi.max(lo);
        Self {
            times: self.times[lo..hi].to_vec(),
            amplitudes: self.amplitudes[lo..hi].to_vec(),
        }
    }
}

/// Anything that can produce a trace to analyze.
pub trait TraceSource {
    fn describe(&self) -> String;
    fn load(&self) -> Result<TimeSeries, RateError>;
}

#[derive(Debug, Clone)]
pub struct InMemoryTrace {
    label: String,
    series: TimeSeries,
}

impl InMemoryTrace {
    #[must_use]
    pub fn new(label: impl Into<String>, series: TimeSeries) -> Self {
        Self {
            label: label.into(),
            series,
        }
    }
}

impl TraceSource for InMemoryTrace {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn load(&self) -> Result<TimeSeries, RateError> {
        Ok(self.series.clone())
    }
}

/// JSON document `{"times": [...], "amplitudes": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonTraceFile {
    path: PathBuf,
}

impl JsonTraceFile {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[derive(Deserialize)]
struct RawTrace {
    times: Vec<f64>,
    amplitudes: Vec<f64>,
}

impl TryFrom<RawTrace> for TimeSeries {
    type Error = RateError;

    fn try_from(raw: RawTrace) -> Result<Self, Self::Error> {
        Self::new(raw.times, raw.amplitudes)
    }
}

impl TraceSource for JsonTraceFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<TimeSeries, RateError> {
        let text = fs::read_to_string(&self.path).map_err(|source| RateError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| RateError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}
