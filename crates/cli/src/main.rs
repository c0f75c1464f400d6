//! QRD Check CLI
//!
//! Measures how accurately a fixed-point QR decomposition design reproduces
//! its input from the A, Q and R matrices it captured.
//!
//! # Usage
//!
//! ```bash
//! # Check one capture, printing every instance
//! qrdcheck check -m 3 -n 19 -f accuracy_results/capture_k4_i16_Q3p19.txt
//!
//! # Aggregate line only, absolute error
//! qrdcheck check -n 21 -f capture_M8_N4_i16_Q3p21.txt -s --mode absolute
//!
//! # Tabulate a whole sweep directory
//! qrdcheck sweep --results-dir accuracy_results --layout rectangular
//!
//! # Constant table for a format
//! qrdcheck constants -m 3 -n 19
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use qrdcheck_analysis::{
    analyze_capture_with, AnalysisConfig, ErrorMode, ErrorReport, InstanceView,
    DEFAULT_CLAMP_DIVISOR,
};
use qrdcheck_capture::Capture;
use qrdcheck_fixed_point::{
    FixedPointConstants, FixedPointFormat, DEFAULT_FRACTIONAL_BITS, DEFAULT_INTEGER_BITS,
};
use qrdcheck_sweep::{run_sweep, CaptureLayout, SweepConfig};

#[derive(Parser)]
#[command(name = "qrdcheck")]
#[command(version)]
#[command(about = "Accuracy checker for fixed-point QR decomposition captures")]
#[command(long_about = r#"
QRD Check

Decodes the A, Q and R matrices a fixed-point QRD design wrote to a capture
file, multiplies Q by R and reports how far the product is from A.

Examples:
  # Check one capture
  qrdcheck check -m 3 -n 19 -f accuracy_results/capture_k4_i16_Q3p19.txt

  # Tabulate a sweep
  qrdcheck sweep --config sweep.toml

  # Print the constants for Q3.19
  qrdcheck constants
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a single capture file
    Check {
        /// Integer bits m (including the sign bit)
        #[arg(short = 'm', long, default_value_t = DEFAULT_INTEGER_BITS)]
        integer_bits: u8,

        /// Fractional bits n
        #[arg(short = 'n', long, default_value_t = DEFAULT_FRACTIONAL_BITS)]
        fractional_bits: u8,

        /// Capture file
        #[arg(short, long, default_value = "accuracy_results/capture_k4_i16_Q3p19.txt")]
        file: PathBuf,

        /// Only print the aggregate result
        #[arg(short, long, default_value = "false")]
        suppress: bool,

        /// Error measure (relative or absolute)
        #[arg(long, default_value = "relative")]
        mode: ErrorMode,

        /// Divisor of mean(|Â|) giving the relative-mode near-zero floor
        #[arg(long, default_value_t = DEFAULT_CLAMP_DIVISOR)]
        clamp_divisor: f64,

        /// Print the report as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Also print min, 25th percentile, mean, 75th percentile and max
        #[arg(long, default_value = "false")]
        percentiles: bool,
    },

    /// Tabulate a directory of sweep captures into CSV files
    Sweep {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding the captures
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Directory the CSV files are written to
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Capture family (square, rectangular or complex)
        #[arg(long)]
        layout: Option<CaptureLayout>,

        /// Integer bits m of the swept formats
        #[arg(short = 'm', long)]
        integer_bits: Option<u8>,

        /// Analyse captures one at a time
        #[arg(long, default_value = "false")]
        sequential: bool,

        /// Write the effective configuration to this file
        #[arg(long)]
        save_config: Option<PathBuf>,
    },

    /// Print the fixed-point constants for a format
    Constants {
        /// Integer bits m (including the sign bit)
        #[arg(short = 'm', long, default_value_t = DEFAULT_INTEGER_BITS)]
        integer_bits: u8,

        /// Fractional bits n
        #[arg(short = 'n', long, default_value_t = DEFAULT_FRACTIONAL_BITS)]
        fractional_bits: u8,

        /// Print the table as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qrdcheck_sweep=info,qrdcheck_analysis=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            integer_bits,
            fractional_bits,
            file,
            suppress,
            mode,
            clamp_divisor,
            json,
            percentiles,
        } => {
            let config = AnalysisConfig {
                format: FixedPointFormat::new(integer_bits, fractional_bits)?,
                mode,
                clamp_divisor,
            };
            run_check(&file, &config, suppress || json, json, percentiles)?;
        }
        Commands::Sweep {
            config,
            results_dir,
            output_dir,
            layout,
            integer_bits,
            sequential,
            save_config,
        } => {
            let mut sweep = match &config {
                Some(path) => SweepConfig::from_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))?
                    .with_env_overrides(),
                None => SweepConfig::from_env(),
            };
            if let Some(dir) = results_dir {
                sweep.results_dir = dir;
            }
            if output_dir.is_some() {
                sweep.output_dir = output_dir;
            }
            if let Some(layout) = layout {
                sweep.layout = layout;
            }
            if integer_bits.is_some() {
                sweep.integer_bits = integer_bits;
            }
            if sequential {
                sweep.parallel = false;
            }
            if let Some(path) = save_config {
                sweep
                    .to_file(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved configuration to {}", path.display());
            }
            tracing::debug!(?sweep, "effective sweep configuration");
            run_sweep_command(&sweep)?;
        }
        Commands::Constants {
            integer_bits,
            fractional_bits,
            json,
        } => {
            let format = FixedPointFormat::new(integer_bits, fractional_bits)?;
            run_constants(format, json)?;
        }
    }

    Ok(())
}

fn run_check(
    file: &Path,
    config: &AnalysisConfig,
    suppress: bool,
    json: bool,
    percentiles: bool,
) -> Result<()> {
    let capture = Capture::from_path(file)?;
    let report = analyze_capture_with(&capture, config, |view| {
        if !suppress {
            print_instance(view);
        }
    })?;

    if json {
        let mut value = serde_json::to_value(&report)?;
        if percentiles {
            value["distribution"] = serde_json::to_value(report.distribution())?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if !suppress {
        println!("{}", summary_header(&report, percentiles));
    }
    println!("{}", summary_line(&report, percentiles));
    Ok(())
}

fn print_instance(view: &InstanceView<'_>) {
    let i = view.decoded.instance;
    let decoded = view.decoded;

    println!("{}", style(format!("R{i} matrix:")).cyan().bold());
    println!("{}\n", decoded.r);
    println!("{}", style(format!("Q{i} matrix:")).cyan().bold());
    println!("{}\n", decoded.q);
    println!("{}", style(format!("Original A{i} matrix:")).cyan().bold());
    println!("{}\n", decoded.a);
    println!(
        "{}",
        style(format!("A{i} matrix constructed by multiplying Q{i} and R{i}:"))
            .cyan()
            .bold()
    );
    println!("{}\n", view.reconstructed);
    println!(
        "{}",
        style(format!("Error between elements of original A{i} and reconstructed A{i}:"))
            .cyan()
            .bold()
    );
    println!("{}\n", view.errors);

    println!("Highest error: {}", view.report.worst);
    println!("Mean error:    {}", view.report.mean);
    if let Some(sd) = view.report.std_dev {
        println!("SD error:      {}", sd);
    }
    println!();
}

fn summary_header(report: &ErrorReport, percentiles: bool) -> String {
    if percentiles {
        "Maximum / 75th percentile / mean / 25th percentile / minimum error:".to_string()
    } else if report.std_dev.is_some() {
        format!("Maximum error across all instances / mean error / SD ({} mode):", report.mode)
    } else {
        format!("Maximum error across all instances / mean error ({} mode):", report.mode)
    }
}

/// Space-separated numbers only: `worst mean [sd]`, or the five-number
/// distribution with `--percentiles`
fn summary_line(report: &ErrorReport, percentiles: bool) -> String {
    if percentiles {
        let d = report.distribution();
        return format!("{} {} {} {} {}", d.max, d.p75, d.mean, d.p25, d.min);
    }
    match report.std_dev {
        Some(sd) => format!("{} {} {}", report.worst, report.mean, sd),
        None => format!("{} {}", report.worst, report.mean),
    }
}

fn run_sweep_command(config: &SweepConfig) -> Result<()> {
    println!("{}", style("QRD Accuracy Sweep").cyan().bold());
    println!("========================================\n");
    println!("Results:  {}", config.results_dir.display());
    println!("Output:   {}", config.output_dir().display());
    println!("Layout:   {} ({} error)", config.layout, config.layout.error_mode());
    println!();

    let outcome = run_sweep(config)
        .with_context(|| format!("sweep over {} failed", config.results_dir.display()))?;

    println!(
        "Analysed {} captures in Q{}.n",
        outcome.discovered.captures.len(),
        outcome.discovered.integer_bits
    );
    for path in &outcome.written {
        println!("{} {}", style("[OK]").green().bold(), path.display());
    }
    Ok(())
}

fn run_constants(format: FixedPointFormat, json: bool) -> Result<()> {
    let table = FixedPointConstants::for_format(format);

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!("{}", style(format!("Fixed-point constants ({format})")).cyan().bold());
    println!("  m = {}, n = {}", format.integer_bits, format.fractional_bits);
    for constant in &table.constants {
        println!(
            "  {:<24} {:>12}  // {:.10} in {format}",
            constant.name, constant.raw, constant.actual
        );
    }
    Ok(())
}
