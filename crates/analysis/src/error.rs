//! Analysis error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Capture(#[from] qrdcheck_capture::CaptureError),

    /// Q × R cannot be formed or does not match A. Always a producer or
    /// parser defect, never recoverable.
    #[error("{source_name}: instance {instance}: {reason}")]
    Shape {
        source_name: String,
        instance: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
