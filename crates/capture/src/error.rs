//! Capture error types

use std::path::PathBuf;

use thiserror::Error;

use crate::record::MatrixKind;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to read capture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}:{line}: malformed record {context}: {reason}")]
    Parse {
        source_name: String,
        line: usize,
        context: String,
        reason: String,
    },

    #[error("{source_name}: instance {instance} has no {kind} matrix records")]
    MissingMatrix {
        source_name: String,
        instance: usize,
        kind: MatrixKind,
    },

    #[error("{source_name}: {kind}{instance}: {reason}")]
    Shape {
        source_name: String,
        instance: usize,
        kind: MatrixKind,
        reason: String,
    },

    #[error("{source_name}: capture contains no matrix records")]
    Empty { source_name: String },
}

/// A single line that does not follow the record grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed record {context}: {reason}")]
pub struct RecordError {
    /// Record tag (or the start of the line when no tag could be read)
    pub context: String,
    pub reason: String,
}

impl RecordError {
    pub(crate) fn new(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
