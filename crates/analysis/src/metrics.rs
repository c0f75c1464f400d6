//! Element error measures and summary statistics

use std::ops::{Div, Sub};

use num_complex::Complex64;
use qrdcheck_capture::Matrix;

/// Matrix element the error measures work on (real or complex)
pub trait Element: Copy + Sub<Output = Self> + Div<Output = Self> {
    fn magnitude(self) -> f64;
    fn from_real(re: f64) -> Self;
}

impl Element for f64 {
    fn magnitude(self) -> f64 {
        self.abs()
    }

    fn from_real(re: f64) -> Self {
        re
    }
}

impl Element for Complex64 {
    fn magnitude(self) -> f64 {
        self.norm()
    }

    fn from_real(re: f64) -> Self {
        Complex64::new(re, 0.0)
    }
}

/// `mean(|Â|) / clamp_divisor`
pub fn near_zero_floor<T: Element>(reconstructed: &Matrix<T>, clamp_divisor: f64) -> f64 {
    let magnitudes: Vec<f64> = reconstructed
        .as_slice()
        .iter()
        .map(|x| x.magnitude())
        .collect();
    mean(&magnitudes) / clamp_divisor
}

/// `|(a - â) / a|` element-wise after clamping near-zero entries.
///
/// Entries of either matrix whose magnitude is below the near-zero floor are
/// replaced by the floor itself before dividing. This biases tiny entries
/// towards zero error but keeps zero entries of A from producing infinities.
/// Returns `None` if the shapes differ.
pub fn relative_errors<T: Element>(
    original: &Matrix<T>,
    reconstructed: &Matrix<T>,
    clamp_divisor: f64,
) -> Option<Matrix<f64>> {
    let floor = near_zero_floor(reconstructed, clamp_divisor);
    let clamp = |x: T| {
        if x.magnitude() < floor {
            T::from_real(floor)
        } else {
            x
        }
    };

    original.zip_map(reconstructed, |a, a_hat| {
        let a = clamp(a);
        ((a - clamp(a_hat)) / a).magnitude()
    })
}

/// `|a - â|` element-wise. Returns `None` if the shapes differ.
pub fn absolute_errors<T: Element>(
    original: &Matrix<T>,
    reconstructed: &Matrix<T>,
) -> Option<Matrix<f64>> {
    original.zip_map(reconstructed, |a, a_hat| (a - a_hat).magnitude())
}

/// Largest value; NaN if any value is NaN, -inf for an empty slice
pub fn maximum(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, |acc, x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            acc.max(x)
        }
    })
}

/// Smallest value; NaN if any value is NaN, +inf for an empty slice
pub fn minimum(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, |acc, x| {
        if acc.is_nan() || x.is_nan() {
            f64::NAN
        } else {
            acc.min(x)
        }
    })
}

/// Arithmetic mean; NaN for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by N)
pub fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Percentile `p` (0-100) with linear interpolation between closest ranks
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}
