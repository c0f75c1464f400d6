//! Sweep configuration

use std::path::{Path, PathBuf};

use qrdcheck_analysis::DEFAULT_CLAMP_DIVISOR;
use serde::{Deserialize, Serialize};

use crate::naming::CaptureLayout;

/// Where the captures live, how to read them and how to lay out the tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Directory holding the `capture_*.txt` files
    pub results_dir: PathBuf,
    /// Directory the CSV tables are written to (defaults to `results_dir`)
    pub output_dir: Option<PathBuf>,
    pub layout: CaptureLayout,
    /// Integer bits of the swept formats; inferred from the file names if unset
    pub integer_bits: Option<u8>,
    /// CORDIC iteration count held fixed while the size varies
    pub reference_iterations: u32,
    /// Matrix size held fixed while the iteration count varies
    pub reference_size: usize,
    pub clamp_divisor: f64,
    /// Analyse captures on the rayon thread pool
    pub parallel: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("accuracy_results"),
            output_dir: None,
            layout: CaptureLayout::Square,
            integer_bits: None,
            reference_iterations: 16,
            reference_size: 16,
            clamp_divisor: DEFAULT_CLAMP_DIVISOR,
            parallel: true,
        }
    }
}

impl SweepConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `QRDCHECK_*` environment variables on top of this configuration
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("QRDCHECK_RESULTS_DIR") {
            self.results_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("QRDCHECK_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Ok(layout) = std::env::var("QRDCHECK_LAYOUT") {
            match layout.parse() {
                Ok(layout) => self.layout = layout,
                Err(e) => tracing::warn!("ignoring QRDCHECK_LAYOUT: {e}"),
            }
        }
        if let Ok(bits) = std::env::var("QRDCHECK_INTEGER_BITS") {
            if let Ok(m) = bits.parse() {
                self.integer_bits = Some(m);
            }
        }
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.results_dir)
    }
}
