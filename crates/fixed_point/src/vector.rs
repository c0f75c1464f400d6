//! Rows of raw fixed-point values

use crate::fixed::FixedPointFormat;

/// A vector of raw fixed-point values sharing one format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedVector {
    /// Raw two's-complement values
    pub data: Vec<i64>,
    pub format: FixedPointFormat,
}

impl FixedVector {
    /// Raw words exactly as captured
    pub fn from_raw(data: Vec<i64>, format: FixedPointFormat) -> Self {
        Self { data, format }
    }

    /// Encode floating-point values (round, then wrap to the word width)
    pub fn from_f64_slice(values: &[f64], format: FixedPointFormat) -> Self {
        Self {
            data: values.iter().map(|&v| format.encode(v)).collect(),
            format,
        }
    }

    /// Decode every element
    pub fn to_f64_vec(&self) -> Vec<f64> {
        let resolution = self.format.resolution();
        self.data.iter().map(|&x| x as f64 * resolution).collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_decode() {
        let format = FixedPointFormat::q3_19();
        let vec = FixedVector::from_raw(vec![524288, 0, -262144], format);
        assert_eq!(vec.to_f64_vec(), vec![1.0, 0.0, -0.5]);
        assert_eq!(vec.len(), 3);
    }

    #[test]
    fn test_vector_encode_within_resolution() {
        let format = FixedPointFormat::new(2, 10).unwrap();
        let values = [0.3, -1.7, 1.999];
        let back = FixedVector::from_f64_slice(&values, format).to_f64_vec();

        for (expected, got) in values.iter().zip(&back) {
            assert!((expected - got).abs() <= format.resolution());
        }
    }

    #[test]
    fn test_empty_vector() {
        let vec = FixedVector::from_raw(Vec::new(), FixedPointFormat::default());
        assert!(vec.is_empty());
        assert!(vec.to_f64_vec().is_empty());
    }
}
