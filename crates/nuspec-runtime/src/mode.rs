#![forbid(unsafe_code)]

//! Runtime mode definitions for Strict and Hardened operation.

use serde::{Deserialize, Serialize};

/// Operational mode governing input validation.
///
/// - **Strict**: accept what the transforms accept mathematically. Sample
///   positions are treated as 2π-periodic and wrapped; non-finite values
///   propagate into the output where the fast transform reports them.
/// - **Hardened**: reject non-finite positions or amplitudes and positions
///   outside `[-π, π]` at the boundary, before any work is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuntimeMode {
    #[default]
    Strict,
    Hardened,
}

impl RuntimeMode {
    #[must_use]
    pub fn checks_finite(self) -> bool {
        matches!(self, Self::Hardened)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Hardened => "Hardened",
        }
    }
}
