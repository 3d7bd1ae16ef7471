use std::fs;
use std::path::Path;

use nuspec_nufft::{Direction, MAX_PRECISION, MIN_PRECISION};
use nuspec_runtime::RuntimeMode;
use serde::{Deserialize, Serialize};

use crate::RateError;
use crate::analyzer::RateBand;

/// What to do when the fast spectrum cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Analyze the direct spectrum instead.
    #[default]
    UseDirect,
    /// Surface [`RateError::FastRejected`].
    Fail,
}

/// Rate estimation settings.
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes. The defaults analyze 100 ms ticks for heart rates between 50
/// and 180 bpm with a forward transform at precision `1e-5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    pub direction: Direction,
    pub precision: f64,
    pub band: RateBand,
    /// Seconds per timestamp unit.
    pub time_unit_seconds: f64,
    /// Fast spectra farther than this from the direct one are not trusted.
    pub max_relative_error: f64,
    pub fallback: FallbackPolicy,
    pub mode: RuntimeMode,
    pub remove_mean: bool,
    pub ledger_capacity: usize,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            precision: 1e-5,
            band: RateBand {
                low: 50.0,
                high: 180.0,
            },
            time_unit_seconds: 0.1,
            max_relative_error: 1e-4,
            fallback: FallbackPolicy::UseDirect,
            mode: RuntimeMode::Strict,
            remove_mean: false,
            ledger_capacity: 256,
        }
    }
}

impl RateConfig {
    pub fn validate(&self) -> Result<(), RateError> {
        self.band.validate()?;
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&self.precision) {
            return Err(RateError::InvalidConfig {
                detail: "precision must lie in [1e-13, 1e-1]",
            });
        }
        if !(self.time_unit_seconds.is_finite() && self.time_unit_seconds > 0.0) {
            return Err(RateError::InvalidConfig {
                detail: "time unit must be finite and positive",
            });
        }
        if self.max_relative_error.is_nan() || self.max_relative_error <= 0.0 {
            return Err(RateError::InvalidConfig {
                detail: "max relative error must be positive",
            });
        }
        if self.band.high <= 0.0 {
            return Err(RateError::InvalidConfig {
                detail: "band upper edge must be positive",
            });
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self, RateError> {
        let config: Self = serde_json::from_str(text).map_err(RateError::ConfigParse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, RateError> {
        let text = fs::read_to_string(path).map_err(|source| RateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn with_band(mut self, band: RateBand) -> Self {
        self.band = band;
        self
    }

    #[must_use]
    pub fn with_remove_mean(mut self, remove_mean: bool) -> Self {
        self.remove_mean = remove_mean;
        self
    }
}
