//! Dense square matrix storage.

use crate::error::{ResnetError, Result};

/// Dense NxN matrix in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    /// Row-major storage: data[i*n + j] = A[i][j]
    data: Vec<f64>,
    /// Matrix dimension
    size: usize,
}

impl DenseMatrix {
    /// Create an all-zero matrix.
    pub fn zeros(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Create the identity matrix.
    pub fn identity(size: usize) -> Self {
        let mut m = Self::zeros(size);
        for i in 0..size {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from row-major data.
    pub fn from_data(size: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != size * size {
            return Err(ResnetError::DimensionMismatch {
                expected: size * size,
                actual: data.len(),
            });
        }
        Ok(Self { data, size })
    }

    /// Build from nested rows. Every row must have as many entries as there are rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for row in rows {
            if row.len() != size {
                return Err(ResnetError::DimensionMismatch {
                    expected: size,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { data, size })
    }

    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.size + col] = value;
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.size + col] += value;
    }

    /// Borrow one row.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.size..(row + 1) * self.size]
    }

    /// Reciprocal of each row's largest absolute entry, 1 for all-zero rows.
    ///
    /// Multiplying row `i` of `[A | I]` by `scales[i]` leaves the inverse
    /// unchanged and puts every row of `A` on a unit scale, so pivot
    /// thresholds do not depend on how large the entries of other rows are.
    pub fn row_scales(&self) -> Vec<f64> {
        (0..self.size)
            .map(|i| {
                let max = self.row(i).iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
                if max > 0.0 && max.is_finite() {
                    1.0 / max
                } else {
                    1.0
                }
            })
            .collect()
    }

    /// Copy with row `i` multiplied by `scales[i]`.
    pub fn scale_rows(&self, scales: &[f64]) -> Result<DenseMatrix> {
        check_size(self.size, scales.len())?;
        let n = self.size;
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(idx, v)| v * scales[idx / n.max(1)])
            .collect();
        Ok(Self { data, size: n })
    }

    /// Copy with column `j` multiplied by `scales[j]`.
    pub fn scale_columns(&self, scales: &[f64]) -> Result<DenseMatrix> {
        check_size(self.size, scales.len())?;
        let n = self.size;
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(idx, v)| v * scales[idx % n.max(1)])
            .collect();
        Ok(Self { data, size: n })
    }

    /// Frobenius norm of `self - I`.
    pub fn identity_residual(&self) -> f64 {
        let n = self.size;
        let mut sum = 0.0;
        for i in 0..n {
            for j in 0..n {
                let target = if i == j { 1.0 } else { 0.0 };
                let d = self.get(i, j) - target;
                sum += d * d;
            }
        }
        sum.sqrt()
    }

    /// Mean absolute elementwise difference between two matrices.
    pub fn mean_abs_diff(&self, other: &DenseMatrix) -> Result<f64> {
        check_size(self.size, other.size)?;
        if self.data.is_empty() {
            return Ok(0.0);
        }
        let total: f64 = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .sum();
        Ok(total / self.data.len() as f64)
    }

    /// Sequential matrix-vector product.
    pub fn mul_vec(&self, x: &[f64]) -> Result<Vec<f64>> {
        check_size(self.size, x.len())?;
        Ok((0..self.size)
            .map(|i| self.row(i).iter().zip(x).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Sequential matrix-matrix product.
    pub fn mul_mat(&self, other: &DenseMatrix) -> Result<DenseMatrix> {
        check_size(self.size, other.size)?;
        let n = self.size;
        let mut out = DenseMatrix::zeros(n);
        for i in 0..n {
            for k in 0..n {
                let a = self.get(i, k);
                if a == 0.0 {
                    continue;
                }
                for j in 0..n {
                    out.data[i * n + j] += a * other.data[k * n + j];
                }
            }
        }
        Ok(out)
    }
}

pub(crate) fn check_size(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ResnetError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, ResnetError::DimensionMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_mul_vec() {
        let m = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.mul_vec(&[1.0, 1.0]).unwrap(), vec![3.0, 7.0]);
        assert!(m.mul_vec(&[1.0]).is_err());
    }

    #[test]
    fn test_mul_mat_identity() {
        let m = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.mul_mat(&DenseMatrix::identity(2)).unwrap(), m);
    }

    #[test]
    fn test_identity_residual() {
        let m = DenseMatrix::from_rows(&[vec![4.0, 0.0], vec![0.0, -3.0]]).unwrap();
        assert_eq!(m.identity_residual(), 5.0);
        assert_eq!(DenseMatrix::identity(3).identity_residual(), 0.0);
    }

    #[test]
    fn test_row_scales() {
        let m = DenseMatrix::from_rows(&[
            vec![2e-7, -1e-7, 0.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, -4.0, 1.0],
        ])
        .unwrap();
        let scales = m.row_scales();
        assert_eq!(scales[1], 1.0);
        assert!((scales[2] - 0.25).abs() < 1e-15);

        let scaled = m.scale_rows(&scales).unwrap();
        assert!((scaled.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((scaled.get(0, 1) + 0.5).abs() < 1e-12);
        assert_eq!(scaled.get(2, 1), -1.0);
    }

    #[test]
    fn test_scale_columns() {
        let m = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let scaled = m.scale_columns(&[2.0, 0.5]).unwrap();
        assert_eq!(scaled, DenseMatrix::from_rows(&[vec![2.0, 1.0], vec![6.0, 2.0]]).unwrap());
    }

    #[test]
    fn test_mean_abs_diff() {
        let a = DenseMatrix::zeros(2);
        let b = DenseMatrix::identity(2);
        assert_eq!(a.mean_abs_diff(&b).unwrap(), 0.5);
    }
}
