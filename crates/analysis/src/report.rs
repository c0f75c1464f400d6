//! Per-instance and per-capture error reports

use qrdcheck_fixed_point::FixedPointFormat;
use serde::Serialize;

use crate::config::ErrorMode;
use crate::metrics::{maximum, mean, minimum, percentile, population_std};

/// Error summary of one decomposition instance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceReport {
    pub instance: usize,
    /// Largest element error
    pub worst: f64,
    /// Mean element error
    pub mean: f64,
    /// Population SD of the element errors (absolute mode only)
    pub std_dev: Option<f64>,
    /// Every element error, kept for pooled statistics
    #[serde(skip)]
    pub errors: Vec<f64>,
}

impl InstanceReport {
    pub fn from_errors(instance: usize, errors: Vec<f64>, mode: ErrorMode) -> Self {
        let worst = maximum(&errors);
        let std_dev = match mode {
            ErrorMode::Absolute => Some(population_std(&errors)),
            ErrorMode::Relative => None,
        };
        Self {
            instance,
            worst,
            mean: mean(&errors),
            std_dev,
            errors,
        }
    }
}

/// Box-plot style summary of a capture's errors
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorDistribution {
    /// Smallest pooled element error
    pub min: f64,
    /// 25th percentile of the pooled element errors
    pub p25: f64,
    /// Mean of the per-instance means
    pub mean: f64,
    /// 75th percentile of the pooled element errors
    pub p75: f64,
    /// Largest per-instance worst error
    pub max: f64,
}

/// Aggregate error report of one capture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub source_name: String,
    pub format: FixedPointFormat,
    pub mode: ErrorMode,
    /// Max of the per-instance worst errors
    pub worst: f64,
    /// Mean of the per-instance means
    pub mean: f64,
    /// Population SD over all pooled element errors (absolute mode only).
    /// Not the average of the per-instance SDs.
    pub std_dev: Option<f64>,
    pub instances: Vec<InstanceReport>,
}

impl ErrorReport {
    pub fn aggregate(
        source_name: impl Into<String>,
        format: FixedPointFormat,
        mode: ErrorMode,
        instances: Vec<InstanceReport>,
    ) -> Self {
        let worsts: Vec<f64> = instances.iter().map(|i| i.worst).collect();
        let means: Vec<f64> = instances.iter().map(|i| i.mean).collect();

        let mut report = Self {
            source_name: source_name.into(),
            format,
            mode,
            worst: maximum(&worsts),
            mean: mean(&means),
            std_dev: None,
            instances,
        };
        if mode == ErrorMode::Absolute {
            report.std_dev = Some(population_std(&report.pooled_errors()));
        }
        report
    }

    /// Every element error of every instance, in instance order
    pub fn pooled_errors(&self) -> Vec<f64> {
        self.instances
            .iter()
            .flat_map(|i| i.errors.iter().copied())
            .collect()
    }

    pub fn distribution(&self) -> ErrorDistribution {
        let pooled = self.pooled_errors();
        ErrorDistribution {
            min: minimum(&pooled),
            p25: percentile(&pooled, 25.0),
            mean: self.mean,
            p75: percentile(&pooled, 75.0),
            max: self.worst,
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}
