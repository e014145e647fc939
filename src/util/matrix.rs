//! Dense row-major matrix used by the Bayes classifier.
//!
//! Only the handful of operations the classifier needs are provided: matrix
//! products, products with a column of ones, row scaling by a diagonal
//! inverse and element-wise complements.

use serde::{Deserialize, Serialize};

use crate::error::{ApprecError, Result};

/// A 2D matrix of `f64` values (row-major storage).
///
/// Deserialization rejects data whose length is not `rows * cols`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredMatrix")]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

#[derive(Deserialize)]
struct StoredMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl TryFrom<StoredMatrix> for Matrix {
    type Error = ApprecError;

    fn try_from(stored: StoredMatrix) -> Result<Self> {
        Matrix::from_vec(stored.rows, stored.cols, stored.data)
    }
}

impl Matrix {
    /// Creates a new matrix from a vector of data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(ApprecError::invalid_argument(format!(
                "data length {} does not match {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { data, rows, cols })
    }

    /// Creates a matrix from equally sized rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);

        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(ApprecError::invalid_argument(format!(
                    "row {i} has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            rows: n_rows,
            cols: n_cols,
        })
    }

    /// Creates a matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Returns the shape as (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Sets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Returns a row as a slice.
    pub fn row(&self, row_idx: usize) -> &[f64] {
        let start = row_idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Matrix-matrix multiplication.
    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(ApprecError::invalid_argument(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }

        let mut result = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let lhs = self.get(i, k);
                if lhs == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    result[i * other.cols + j] += lhs * other.get(k, j);
                }
            }
        }

        Ok(Matrix {
            data: result,
            rows: self.rows,
            cols: other.cols,
        })
    }

    /// Product with a column vector of ones, i.e. the row sums.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.rows).map(|i| self.row(i).iter().sum()).collect()
    }

    /// Computes `diag(diagonal)⁻¹ · self`.
    ///
    /// Fails with [`ApprecError::NumericDegeneracy`] when a diagonal entry is
    /// zero, since the diagonal matrix is then singular.
    pub fn scale_rows_by_inverse(&self, diagonal: &[f64]) -> Result<Matrix> {
        if diagonal.len() != self.rows {
            return Err(ApprecError::invalid_argument(format!(
                "diagonal has {} entries, matrix has {} rows",
                diagonal.len(),
                self.rows
            )));
        }

        let mut data = Vec::with_capacity(self.data.len());
        for (i, &d) in diagonal.iter().enumerate() {
            if d == 0.0 {
                return Err(ApprecError::numeric(format!(
                    "singular diagonal: entry {i} is zero"
                )));
            }
            data.extend(self.row(i).iter().map(|v| v / d));
        }

        Ok(Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Element-wise `1 - x`.
    pub fn complement(&self) -> Matrix {
        Matrix {
            data: self.data.iter().map(|v| 1.0 - v).collect(),
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Returns the underlying data as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
