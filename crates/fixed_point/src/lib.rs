//! QRD Check Fixed-Point Codec
//!
//! Two's-complement Qm.n encoding as produced by fixed-point hardware:
//! a raw integer `r` in an `m + n` bit word stands for the real value `r · 2⁻ⁿ`.

mod constants;
mod error;
mod fixed;
mod vector;

pub use constants::{FixedPointConstants, NamedConstant, CORDIC_GAIN};
pub use error::{FixedPointError, Result};
pub use fixed::{FixedPointFormat, DEFAULT_FRACTIONAL_BITS, DEFAULT_INTEGER_BITS, MAX_WORD_BITS};
pub use vector::FixedVector;
