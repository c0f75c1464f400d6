//! Qm.n format and fixed-point scalar type

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FixedPointError, Result};

/// Default integer bits m (sign bit included), as used by the existing sweeps
pub const DEFAULT_INTEGER_BITS: u8 = 3;

/// Default fractional bits n
pub const DEFAULT_FRACTIONAL_BITS: u8 = 19;

/// Widest word the codec handles (raw values are carried in i64)
pub const MAX_WORD_BITS: u32 = 64;

/// A two's-complement Qm.n fixed-point format.
///
/// `integer_bits + fractional_bits` is the encoded word width. A raw integer
/// `r` decodes to `r · 2⁻ⁿ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPointFormat {
    /// m: integer bits including the sign bit
    pub integer_bits: u8,
    /// n: fractional bits
    pub fractional_bits: u8,
}

impl FixedPointFormat {
    /// Create a validated format
    pub fn new(integer_bits: u8, fractional_bits: u8) -> Result<Self> {
        let total = integer_bits as u32 + fractional_bits as u32;
        if integer_bits == 0 || total > MAX_WORD_BITS {
            return Err(FixedPointError::InvalidFormat {
                integer_bits,
                fractional_bits,
                max: MAX_WORD_BITS,
            });
        }
        Ok(Self {
            integer_bits,
            fractional_bits,
        })
    }

    /// Q3.19
    pub const fn q3_19() -> Self {
        Self {
            integer_bits: DEFAULT_INTEGER_BITS,
            fractional_bits: DEFAULT_FRACTIONAL_BITS,
        }
    }

    /// Encoded word width m + n
    pub fn word_bits(self) -> u32 {
        self.integer_bits as u32 + self.fractional_bits as u32
    }

    /// 2ⁿ, the weight of one integer unit
    pub fn scale(self) -> f64 {
        2f64.powi(self.fractional_bits as i32)
    }

    /// 2⁻ⁿ, the weight of one raw LSB
    pub fn resolution(self) -> f64 {
        2f64.powi(-(self.fractional_bits as i32))
    }

    /// Smallest raw value representable in the word
    pub fn min_raw(self) -> i64 {
        (-(1i128 << (self.word_bits() - 1))) as i64
    }

    /// Largest raw value representable in the word
    pub fn max_raw(self) -> i64 {
        ((1i128 << (self.word_bits() - 1)) - 1) as i64
    }

    /// Decode a raw two's-complement value.
    ///
    /// No range check: the caller guarantees `raw` fits in `m + n` bits.
    pub fn decode(self, raw: i64) -> f64 {
        raw as f64 * self.resolution()
    }

    /// Encode a real value: `round(value · 2ⁿ)` wrapped to `m + n` bits.
    ///
    /// Out-of-range values wrap around like the hardware word does; there is
    /// no overflow error. Non-finite input has no meaningful encoding.
    pub fn encode(self, value: f64) -> i64 {
        self.wrap((value * self.scale()).round() as i128)
    }

    /// Like [`encode`](Self::encode) but truncating toward zero instead of
    /// rounding, which is how hardware constant tables are derived.
    pub fn truncate(self, value: f64) -> i64 {
        self.wrap((value * self.scale()).trunc() as i128)
    }

    /// Reduce an integer to the word width, sign-extending bit `m + n - 1`
    pub fn wrap(self, value: i128) -> i64 {
        let shift = 128 - self.word_bits();
        ((value << shift) >> shift) as i64
    }

    /// Tag used in capture file names, e.g. `Q3p19`
    pub fn file_tag(self) -> String {
        format!("Q{}p{}", self.integer_bits, self.fractional_bits)
    }
}

impl Default for FixedPointFormat {
    fn default() -> Self {
        Self::q3_19()
    }
}

impl fmt::Display for FixedPointFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}.{}", self.integer_bits, self.fractional_bits)
    }
}

impl FromStr for FixedPointFormat {
    type Err = FixedPointError;

    /// Accepts `Q3.19`, `3.19` and the file-name form `Q3p19`
    fn from_str(s: &str) -> Result<Self> {
        let unparsable = || FixedPointError::UnparsableFormat(s.to_string());
        let body = s
            .strip_prefix('Q')
            .or_else(|| s.strip_prefix('q'))
            .unwrap_or(s);
        let (m, n) = body.split_once(['.', 'p']).ok_or_else(unparsable)?;
        let m = m.parse().map_err(|_| unparsable())?;
        let n = n.parse().map_err(|_| unparsable())?;
        Self::new(m, n)
    }
}
