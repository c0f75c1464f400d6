//! Sweep error types

use std::path::PathBuf;

use thiserror::Error;

use crate::naming::CaptureLayout;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Failed to list results directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No {layout} captures found in {}", path.display())]
    NoCaptures { path: PathBuf, layout: CaptureLayout },

    #[error("Missing capture {} required by the sweep", path.display())]
    MissingCapture { path: PathBuf },

    #[error("Analysis of {} failed: {source}", path.display())]
    Analysis {
        path: PathBuf,
        #[source]
        source: qrdcheck_analysis::AnalysisError,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] qrdcheck_fixed_point::FixedPointError),
}

pub type Result<T> = std::result::Result<T, SweepError>;
