//! Fixed-point error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FixedPointError {
    #[error(
        "Invalid format Q{integer_bits}.{fractional_bits}: \
         need at least one integer (sign) bit and at most {max} bits in total"
    )]
    InvalidFormat {
        integer_bits: u8,
        fractional_bits: u8,
        max: u32,
    },

    #[error("Cannot parse fixed-point format from {0:?} (expected e.g. \"Q3.19\" or \"Q3p19\")")]
    UnparsableFormat(String),
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
