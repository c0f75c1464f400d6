//! Dense row-major matrices for decoded captures

use std::fmt;
use std::ops::{Add, Mul};

use num_complex::Complex64;
use num_traits::Zero;
use thiserror::Error;

/// Why two matrices cannot be combined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeMismatch {
    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("cannot multiply {}x{} by {}x{}", .left.0, .left.1, .right.0, .right.1)]
    InnerDimension {
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// A dense matrix in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Copy> Matrix<T> {
    /// Stack rows; every row must have the same length
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, ShapeMismatch> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != cols {
                return Err(ShapeMismatch::RaggedRow {
                    row,
                    expected: cols,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Elements in row-major order
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Combine two equally shaped matrices element by element
    pub fn zip_map<U: Copy, V, F: Fn(T, U) -> V>(
        &self,
        other: &Matrix<U>,
        f: F,
    ) -> Option<Matrix<V>> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

impl<T> Matrix<T>
where
    T: Copy + Zero + Add<Output = T> + Mul<Output = T>,
{
    /// Standard matrix product `self × rhs`
    pub fn matmul(&self, rhs: &Self) -> Result<Self, ShapeMismatch> {
        if self.cols != rhs.rows {
            return Err(ShapeMismatch::InnerDimension {
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut data = vec![T::zero(); self.rows * rhs.cols];
        for i in 0..self.rows {
            let out = &mut data[i * rhs.cols..(i + 1) * rhs.cols];
            for (k, &lhs) in self.row(i).iter().enumerate() {
                for (o, &r) in out.iter_mut().zip(rhs.row(k)) {
                    *o = *o + lhs * r;
                }
            }
        }

        Ok(Self {
            rows: self.rows,
            cols: rhs.cols,
            data,
        })
    }
}

/// Renders like a small data frame: column indices on top, row indices left
impl<T: Copy + fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.data.iter().map(|v| format!("{v:.6}")).collect();
        let width = cells
            .iter()
            .map(String::len)
            .chain(std::iter::once(self.cols.to_string().len()))
            .max()
            .unwrap_or(1);
        let label = self.rows.to_string().len();

        write!(f, "{:label$}", "")?;
        for col in 0..self.cols {
            write!(f, "  {col:>width$}")?;
        }
        for row in 0..self.rows {
            write!(f, "\n{row:<label$}")?;
            for cell in &cells[row * self.cols..(row + 1) * self.cols] {
                write!(f, "  {cell:>width$}")?;
            }
        }
        Ok(())
    }
}

/// A capture matrix after fixed-point decoding
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMatrix {
    Real(Matrix<f64>),
    Complex(Matrix<Complex64>),
}

impl DecodedMatrix {
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Real(m) => m.shape(),
            Self::Complex(m) => m.shape(),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }

    /// Promote to complex (a copy, even when already complex)
    pub fn to_complex(&self) -> Matrix<Complex64> {
        match self {
            Self::Real(m) => m.map(|re| Complex64::new(re, 0.0)),
            Self::Complex(m) => m.clone(),
        }
    }
}

impl fmt::Display for DecodedMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(m) => fmt::Display::fmt(m, f),
            Self::Complex(m) => fmt::Display::fmt(m, f),
        }
    }
}
