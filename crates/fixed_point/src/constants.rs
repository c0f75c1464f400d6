//! Fixed-point constants a CORDIC QRD design is configured with
//!
//! Every constant is truncated toward zero into the target format, which is
//! what the hardware constant tables contain. `actual` is the value the
//! hardware really works with after truncation.

use serde::Serialize;

use crate::fixed::FixedPointFormat;

/// CORDIC gain compensation factor K (limit of ∏ 1/√(1 + 2⁻²ʲ))
pub const CORDIC_GAIN: f64 = 0.607252956441381;

/// Magnitude below which the design treats a value as zero
const NEAR_ZERO_BOUNDARY: f64 = 0.00005;

/// Step used by the input generator
const INCREMENT: f64 = 0.11;

/// One constant in a specific format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedConstant {
    pub name: &'static str,
    /// Value before quantisation
    pub requested: f64,
    /// Raw word value
    pub raw: i64,
    /// Value the raw word decodes to
    pub actual: f64,
}

/// The full constant table for one format
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedPointConstants {
    pub format: FixedPointFormat,
    pub constants: Vec<NamedConstant>,
}

impl FixedPointConstants {
    pub fn for_format(format: FixedPointFormat) -> Self {
        let entry = |name, requested: f64| {
            let raw = format.truncate(requested);
            NamedConstant {
                name,
                requested,
                raw,
                actual: format.decode(raw),
            }
        };

        Self {
            format,
            constants: vec![
                entry("fixed_point_one", 1.0),
                entry("fixed_point_minus_one", -1.0),
                entry("near_zero_boundary_p", NEAR_ZERO_BOUNDARY),
                entry("near_zero_boundary_n", -NEAR_ZERO_BOUNDARY),
                entry("increment", INCREMENT),
                entry("k_cordic_constant", CORDIC_GAIN),
            ],
        }
    }

    pub fn get(&self, name: &str) -> Option<&NamedConstant> {
        self.constants.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q3_19_constants() {
        let table = FixedPointConstants::for_format(FixedPointFormat::q3_19());

        assert_eq!(table.get("fixed_point_one").unwrap().raw, 1 << 19);
        assert_eq!(table.get("fixed_point_minus_one").unwrap().raw, -(1 << 19));
        // 0.607252956441381 * 2^19 = 318375.39...
        assert_eq!(table.get("k_cordic_constant").unwrap().raw, 318375);
        // 0.00005 * 2^19 = 26.2144
        assert_eq!(table.get("near_zero_boundary_p").unwrap().raw, 26);
        assert_eq!(table.get("near_zero_boundary_n").unwrap().raw, -26);
        assert_eq!(table.get("increment").unwrap().raw, 57671);
    }

    #[test]
    fn test_actual_is_decoded_raw() {
        let format = FixedPointFormat::new(2, 8).unwrap();
        let table = FixedPointConstants::for_format(format);
        for c in &table.constants {
            assert_eq!(c.actual, format.decode(c.raw));
            assert!((c.requested - c.actual).abs() < format.resolution());
        }
    }

    #[test]
    fn test_unknown_constant() {
        let table = FixedPointConstants::for_format(FixedPointFormat::default());
        assert!(table.get("does_not_exist").is_none());
    }
}
