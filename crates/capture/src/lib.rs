//! QRD Check Capture Parser
//!
//! Reads the line-oriented capture logs written by QR-decomposition hardware
//! runs and turns them into decoded A, Q and R matrices per instance.
//!
//! One record per line:
//!
//! ```text
//! <Kind><instance>:<descriptor>: v0 v1 ... vN]
//! ```
//!
//! `Kind` is `A`, `Q` or `R`. The descriptor is optional and may carry
//! `row <r>`, `rows <count>` and a `re` / `im` part tag for complex captures.

mod capture;
mod error;
mod matrix;
mod record;

pub use capture::{Capture, DecodedInstance, InstanceBlocks};
pub use error::{CaptureError, RecordError, Result};
pub use matrix::{DecodedMatrix, Matrix, ShapeMismatch};
pub use record::{MatrixBlock, MatrixKind, Part};
