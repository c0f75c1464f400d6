//! Analysis configuration

use std::fmt;
use std::str::FromStr;

use qrdcheck_fixed_point::FixedPointFormat;
use serde::{Deserialize, Serialize};

/// Divisor applied to mean(|Â|) to get the relative-mode near-zero floor (empirical)
pub const DEFAULT_CLAMP_DIVISOR: f64 = 1000.0;

/// How element errors are measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// |a - â| / |a| with a near-zero clamp; no standard deviation
    #[default]
    Relative,
    /// |a - â|; standard deviation reported
    Absolute,
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative => write!(f, "relative"),
            Self::Absolute => write!(f, "absolute"),
        }
    }
}

impl FromStr for ErrorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relative" | "rel" => Ok(Self::Relative),
            "absolute" | "abs" => Ok(Self::Absolute),
            other => Err(format!("unknown error mode {other:?} (use relative or absolute)")),
        }
    }
}

/// Everything one analysis run needs; passed explicitly to every call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub format: FixedPointFormat,
    pub mode: ErrorMode,
    pub clamp_divisor: f64,
}

impl AnalysisConfig {
    pub fn new(format: FixedPointFormat, mode: ErrorMode) -> Self {
        Self {
            format,
            mode,
            clamp_divisor: DEFAULT_CLAMP_DIVISOR,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(FixedPointFormat::default(), ErrorMode::default())
    }
}
