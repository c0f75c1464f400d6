//! Sweep experiments

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use qrdcheck_analysis::{analyze_file, AnalysisConfig};
use qrdcheck_fixed_point::FixedPointFormat;
use rayon::prelude::*;

use crate::config::SweepConfig;
use crate::discovery::{discover, Discovered};
use crate::error::{Result, SweepError};
use crate::naming::{CaptureLayout, CaptureName, MatrixSize};
use crate::table::ResultTable;

/// Which sweep parameter varies along the table rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Experiment {
    /// Matrix size at the reference iteration count
    SizeScaling,
    /// CORDIC iteration count at the reference size
    IterationScaling,
}

impl Experiment {
    pub const ALL: [Experiment; 2] = [Experiment::SizeScaling, Experiment::IterationScaling];

    /// Row parameter label in the CSV header
    pub fn parameter(self, layout: CaptureLayout) -> &'static str {
        match self {
            Self::SizeScaling => layout.size_parameter(),
            Self::IterationScaling => "i",
        }
    }

    fn file_stem(self, layout: CaptureLayout) -> String {
        match self {
            Self::SizeScaling => format!("{}_scaling", layout.size_file_label()),
            Self::IterationScaling => "CORDIC_iters".to_string(),
        }
    }

    pub fn largest_error_file_name(self, layout: CaptureLayout) -> String {
        format!("experiment_results_{}_largest_error.csv", self.file_stem(layout))
    }

    pub fn average_error_file_name(self, layout: CaptureLayout) -> String {
        format!("experiment_results_{}_average_error.csv", self.file_stem(layout))
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeScaling => write!(f, "size scaling"),
            Self::IterationScaling => write!(f, "iteration scaling"),
        }
    }
}

/// Tables produced by one experiment
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentTables {
    pub experiment: Experiment,
    pub layout: CaptureLayout,
    pub worst: ResultTable,
    pub mean: ResultTable,
    /// Pooled SD per cell, absolute-error layouts only
    pub std_dev: Option<ResultTable>,
}

impl ExperimentTables {
    pub fn largest_error_csv(&self) -> String {
        self.worst.to_csv()
    }

    /// Mean table, followed by the SD table when there is one
    pub fn average_error_csv(&self) -> String {
        let mut csv = self.mean.to_csv();
        if let Some(std_dev) = &self.std_dev {
            csv.push_str(&std_dev.to_csv());
        }
        csv
    }
}

/// Everything a completed sweep produced
#[derive(Debug)]
pub struct SweepOutcome {
    pub discovered: Discovered,
    pub tables: Vec<ExperimentTables>,
    pub written: Vec<PathBuf>,
}

struct CellResult {
    worst: f64,
    mean: f64,
    std_dev: Option<f64>,
}

/// Run one experiment over the discovered captures.
///
/// Every (row, fractional width) cell must have a capture; a missing file or
/// a failed analysis aborts the experiment.
pub fn run_experiment(
    config: &SweepConfig,
    discovered: &Discovered,
    experiment: Experiment,
) -> Result<ExperimentTables> {
    let layout = discovered.layout;
    let reference_size = MatrixSize::square(config.reference_size);

    let (rows, columns): (Vec<(String, MatrixSize, u32)>, Vec<u8>) = match experiment {
        Experiment::SizeScaling => {
            let at_reference = |c: &CaptureName| c.iterations == config.reference_iterations;
            let rows = discovered
                .sizes(at_reference)
                .into_iter()
                .map(|size| (size.to_string(), size, config.reference_iterations))
                .collect();
            (rows, discovered.fractional_bits(at_reference))
        }
        Experiment::IterationScaling => {
            let at_reference = |c: &CaptureName| c.size == reference_size;
            let rows = discovered
                .iterations(at_reference)
                .into_iter()
                .map(|iterations| (iterations.to_string(), reference_size, iterations))
                .collect();
            (rows, discovered.fractional_bits(at_reference))
        }
    };

    let parameter = experiment.parameter(layout);
    let mut tables = ExperimentTables {
        experiment,
        layout,
        worst: ResultTable::new(parameter, columns.clone()),
        mean: ResultTable::new(parameter, columns.clone()),
        std_dev: layout
            .reports_std_dev()
            .then(|| ResultTable::new(parameter, columns.clone())),
    };
    if rows.is_empty() {
        tracing::warn!("no captures for {experiment}, tables will be empty");
        return Ok(tables);
    }

    let mut cells = Vec::with_capacity(rows.len() * columns.len());
    for &(_, size, iterations) in &rows {
        for &n in &columns {
            cells.push(CaptureName {
                size,
                iterations,
                format: FixedPointFormat::new(discovered.integer_bits, n)?,
            });
        }
    }

    tracing::info!(
        "generating {experiment} results: {} rows x {} widths",
        rows.len(),
        columns.len()
    );

    let evaluate = |name: &CaptureName| -> Result<CellResult> {
        let path = config.results_dir.join(name.file_name(layout));
        if !path.is_file() {
            return Err(SweepError::MissingCapture { path });
        }

        let analysis = AnalysisConfig {
            format: name.format,
            mode: layout.error_mode(),
            clamp_divisor: config.clamp_divisor,
        };
        let start = Instant::now();
        let report = analyze_file(&path, &analysis).map_err(|source| SweepError::Analysis {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            file = %path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            worst = report.worst,
            mean = report.mean,
            std_dev = ?report.std_dev,
            "processed capture"
        );
        Ok(CellResult {
            worst: report.worst,
            mean: report.mean,
            std_dev: report.std_dev,
        })
    };

    let results: Vec<CellResult> = if config.parallel {
        cells.par_iter().map(evaluate).collect::<Result<_>>()?
    } else {
        cells.iter().map(evaluate).collect::<Result<_>>()?
    };

    for ((key, _, _), row) in rows.iter().zip(results.chunks(columns.len())) {
        tables
            .worst
            .push_row(key.as_str(), row.iter().map(|c| c.worst).collect());
        tables
            .mean
            .push_row(key.as_str(), row.iter().map(|c| c.mean).collect());
        if let Some(std_dev) = tables.std_dev.as_mut() {
            std_dev.push_row(
                key.as_str(),
                row.iter().map(|c| c.std_dev.unwrap_or(f64::NAN)).collect(),
            );
        }
    }

    Ok(tables)
}

/// Write each experiment's largest- and average-error CSV files into `dir`
pub fn write_tables(tables: &[ExperimentTables], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|source| SweepError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(tables.len() * 2);
    for table in tables {
        let files = [
            (
                table.experiment.largest_error_file_name(table.layout),
                table.largest_error_csv(),
            ),
            (
                table.experiment.average_error_file_name(table.layout),
                table.average_error_csv(),
            ),
        ];
        for (name, contents) in files {
            let path = dir.join(name);
            std::fs::write(&path, contents).map_err(|source| SweepError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!("wrote {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

/// Discover the captures under `config.results_dir`, run both experiments
/// and write their tables to the output directory
pub fn run_sweep(config: &SweepConfig) -> Result<SweepOutcome> {
    let start = Instant::now();
    let discovered = discover(&config.results_dir, config.layout, config.integer_bits)?;

    let tables = Experiment::ALL
        .into_iter()
        .map(|experiment| run_experiment(config, &discovered, experiment))
        .collect::<Result<Vec<_>>>()?;
    let written = write_tables(&tables, config.output_dir())?;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        files = written.len(),
        "sweep complete"
    );
    Ok(SweepOutcome {
        discovered,
        tables,
        written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_names() {
        assert_eq!(
            Experiment::SizeScaling.largest_error_file_name(CaptureLayout::Square),
            "experiment_results_k_scaling_largest_error.csv"
        );
        assert_eq!(
            Experiment::SizeScaling.average_error_file_name(CaptureLayout::Rectangular),
            "experiment_results_MxN_scaling_average_error.csv"
        );
        assert_eq!(
            Experiment::IterationScaling.average_error_file_name(CaptureLayout::Complex),
            "experiment_results_CORDIC_iters_average_error.csv"
        );
    }

    #[test]
    fn test_parameter_labels() {
        assert_eq!(Experiment::SizeScaling.parameter(CaptureLayout::Square), "k");
        assert_eq!(Experiment::SizeScaling.parameter(CaptureLayout::Complex), "M,N");
        assert_eq!(Experiment::IterationScaling.parameter(CaptureLayout::Square), "i");
    }

    #[test]
    fn test_average_csv_appends_std_dev_table() {
        let mut mean = ResultTable::new("i", vec![19]);
        mean.push_row("16", vec![0.5]);
        let mut std_dev = ResultTable::new("i", vec![19]);
        std_dev.push_row("16", vec![0.25]);

        let tables = ExperimentTables {
            experiment: Experiment::IterationScaling,
            layout: CaptureLayout::Rectangular,
            worst: mean.clone(),
            mean,
            std_dev: Some(std_dev),
        };
        assert_eq!(
            tables.average_error_csv(),
            "i\\n,19\n16,0.50000000000000000000,\ni\\n,19\n16,0.25000000000000000000,\n"
        );
    }
}
