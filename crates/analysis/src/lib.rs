//! QRD Check Error Engine
//!
//! Multiplies the captured Q and R factors back together and measures how far
//! the product is from the captured A, per instance and across a capture.

mod config;
mod engine;
mod error;
mod metrics;
mod report;

pub use config::{AnalysisConfig, ErrorMode, DEFAULT_CLAMP_DIVISOR};
pub use engine::{
    analyze_capture, analyze_capture_with, analyze_file, element_errors, reconstruct,
    InstanceView,
};
pub use error::{AnalysisError, Result};
pub use metrics::{
    absolute_errors, maximum, mean, minimum, near_zero_floor, percentile, population_std,
    relative_errors, Element,
};
pub use report::{ErrorDistribution, ErrorReport, InstanceReport};
