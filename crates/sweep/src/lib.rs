//! QRD Check Sweep Driver
//!
//! Runs the error engine over a directory of captures produced by a parameter
//! sweep (fractional width, matrix size, CORDIC iterations) and tabulates the
//! results as CSV.

mod config;
mod discovery;
mod driver;
mod error;
mod naming;
mod table;

pub use config::SweepConfig;
pub use discovery::{discover, Discovered};
pub use driver::{
    run_experiment, run_sweep, write_tables, Experiment, ExperimentTables, SweepOutcome,
};
pub use error::{Result, SweepError};
pub use naming::{CaptureLayout, CaptureName, MatrixSize};
pub use table::{ResultTable, TableRow};
