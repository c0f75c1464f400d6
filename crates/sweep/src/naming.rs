//! Capture file naming convention

use std::fmt;
use std::str::FromStr;

use qrdcheck_analysis::ErrorMode;
use qrdcheck_fixed_point::FixedPointFormat;
use serde::{Deserialize, Serialize};

/// Which family of designs produced the captures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureLayout {
    /// k×k matrices, `capture_k{k}_i{i}_Q{m}p{n}.txt`, relative error
    #[default]
    Square,
    /// M×N matrices, `capture_M{M}_N{N}_i{i}_Q{m}p{n}.txt`, absolute error
    Rectangular,
    /// Complex-valued M×N matrices, same naming as rectangular
    Complex,
}

impl CaptureLayout {
    pub fn error_mode(self) -> ErrorMode {
        match self {
            Self::Square => ErrorMode::Relative,
            Self::Rectangular | Self::Complex => ErrorMode::Absolute,
        }
    }

    /// Column label of the size parameter in result tables
    pub fn size_parameter(self) -> &'static str {
        match self {
            Self::Square => "k",
            Self::Rectangular | Self::Complex => "M,N",
        }
    }

    /// Size part of result file names
    pub fn size_file_label(self) -> &'static str {
        match self {
            Self::Square => "k",
            Self::Rectangular | Self::Complex => "MxN",
        }
    }

    /// Whether a standard deviation table is produced
    pub fn reports_std_dev(self) -> bool {
        self.error_mode() == ErrorMode::Absolute
    }
}

impl fmt::Display for CaptureLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Square => write!(f, "square"),
            Self::Rectangular => write!(f, "rectangular"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

impl FromStr for CaptureLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square" => Ok(Self::Square),
            "rectangular" | "rect" => Ok(Self::Rectangular),
            "complex" => Ok(Self::Complex),
            other => Err(format!(
                "unknown capture layout {other:?} (use square, rectangular or complex)"
            )),
        }
    }
}

/// Matrix dimensions of a sweep point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatrixSize {
    pub rows: usize,
    pub cols: usize,
}

impl MatrixSize {
    pub fn square(k: usize) -> Self {
        Self { rows: k, cols: k }
    }
}

/// Row label in result tables: `k` for square sizes, `MxN` otherwise
impl fmt::Display for MatrixSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == self.cols {
            write!(f, "{}", self.rows)
        } else {
            write!(f, "{}x{}", self.rows, self.cols)
        }
    }
}

/// The sweep point a capture file was produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureName {
    pub size: MatrixSize,
    /// CORDIC iterations
    pub iterations: u32,
    pub format: FixedPointFormat,
}

impl CaptureName {
    pub fn file_name(&self, layout: CaptureLayout) -> String {
        let size = match layout {
            CaptureLayout::Square => format!("k{}", self.size.rows),
            CaptureLayout::Rectangular | CaptureLayout::Complex => {
                format!("M{}_N{}", self.size.rows, self.size.cols)
            }
        };
        format!(
            "capture_{size}_i{}_{}.txt",
            self.iterations,
            self.format.file_tag()
        )
    }

    /// Read a file name field by field; `None` if it does not follow the
    /// convention for `layout`
    pub fn parse(file_name: &str, layout: CaptureLayout) -> Option<Self> {
        let stem = file_name.strip_prefix("capture_")?.strip_suffix(".txt")?;
        let fields: Vec<&str> = stem.split('_').collect();

        let (size, rest) = match (layout, fields.as_slice()) {
            (CaptureLayout::Square, [k, rest @ ..]) => {
                (MatrixSize::square(prefixed(k, 'k')?), rest)
            }
            (CaptureLayout::Rectangular | CaptureLayout::Complex, [m, n, rest @ ..]) => (
                MatrixSize {
                    rows: prefixed(m, 'M')?,
                    cols: prefixed(n, 'N')?,
                },
                rest,
            ),
            _ => return None,
        };

        match rest {
            [iterations, format] => Some(Self {
                size,
                iterations: prefixed(iterations, 'i')?,
                format: format.parse().ok()?,
            }),
            _ => None,
        }
    }
}

fn prefixed<T: FromStr>(field: &str, prefix: char) -> Option<T> {
    field.strip_prefix(prefix)?.parse().ok()
}
