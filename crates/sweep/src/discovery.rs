//! Results directory scanning

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{Result, SweepError};
use crate::naming::{CaptureLayout, CaptureName, MatrixSize};

/// Sweep points found in a results directory
#[derive(Debug, Clone, PartialEq)]
pub struct Discovered {
    pub layout: CaptureLayout,
    /// Integer bits shared by every capture kept below
    pub integer_bits: u8,
    /// Captures with that integer width, sorted by size, iterations, then
    /// fractional bits
    pub captures: Vec<CaptureName>,
}

impl Discovered {
    /// Sorted distinct sizes among captures matching `filter`
    pub fn sizes(&self, filter: impl Fn(&CaptureName) -> bool) -> Vec<MatrixSize> {
        self.distinct(filter, |c| c.size)
    }

    /// Sorted distinct iteration counts among captures matching `filter`
    pub fn iterations(&self, filter: impl Fn(&CaptureName) -> bool) -> Vec<u32> {
        self.distinct(filter, |c| c.iterations)
    }

    /// Sorted distinct fractional widths among captures matching `filter`
    pub fn fractional_bits(&self, filter: impl Fn(&CaptureName) -> bool) -> Vec<u8> {
        self.distinct(filter, |c| c.format.fractional_bits)
    }

    fn distinct<K: Ord>(
        &self,
        filter: impl Fn(&CaptureName) -> bool,
        key: impl Fn(&CaptureName) -> K,
    ) -> Vec<K> {
        self.captures
            .iter()
            .filter(|c| filter(c))
            .map(key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// List `dir` and keep the files that follow the naming convention of
/// `layout`. Other files are skipped.
///
/// With `integer_bits` unset, the integer width of the first capture is used
/// and captures with a different width are dropped with a warning.
pub fn discover(dir: &Path, layout: CaptureLayout, integer_bits: Option<u8>) -> Result<Discovered> {
    let read_dir_error = |source: std::io::Error| SweepError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut captures = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        match CaptureName::parse(file_name, layout) {
            Some(name) => captures.push(name),
            None => tracing::trace!("skipping {file_name}"),
        }
    }

    captures.sort_by_key(|c| {
        (
            c.size,
            c.iterations,
            c.format.fractional_bits,
            c.format.integer_bits,
        )
    });

    let detected = captures.first().map(|c| c.format.integer_bits);
    let integer_bits = match integer_bits.or(detected) {
        Some(m) => m,
        None => {
            return Err(SweepError::NoCaptures {
                path: dir.to_path_buf(),
                layout,
            })
        }
    };

    let total = captures.len();
    captures.retain(|c| c.format.integer_bits == integer_bits);
    if captures.len() != total {
        tracing::warn!(
            "ignoring {} captures whose integer width is not {integer_bits}",
            total - captures.len()
        );
    }
    if captures.is_empty() {
        return Err(SweepError::NoCaptures {
            path: dir.to_path_buf(),
            layout,
        });
    }

    tracing::info!(
        dir = %dir.display(),
        %layout,
        integer_bits,
        captures = captures.len(),
        "discovered captures"
    );

    Ok(Discovered {
        layout,
        integer_bits,
        captures,
    })
}
