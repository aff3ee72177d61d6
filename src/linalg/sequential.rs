//! Reference backend: Gauss-Jordan inversion in f64.

use super::dense::{check_size, DenseMatrix};
use super::{LinearAlgebraBackend, SINGULAR_PIVOT_TOLERANCE};
use crate::error::{ResnetError, Result};

/// Sequential, double-precision backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialBackend;

impl SequentialBackend {
    /// Create a new sequential backend.
    pub fn new() -> Self {
        Self
    }
}

impl LinearAlgebraBackend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    /// Gauss-Jordan elimination with partial pivoting on row-equilibrated `[A | I]`.
    fn invert(&self, matrix: &DenseMatrix) -> Result<DenseMatrix> {
        let n = matrix.size();
        let w = 2 * n;
        let scales = matrix.row_scales();

        let mut aug = vec![0.0; n * w];
        for i in 0..n {
            for (j, v) in matrix.row(i).iter().enumerate() {
                aug[i * w + j] = v * scales[i];
            }
            aug[i * w + n + i] = scales[i];
        }

        for k in 0..n {
            // Find pivot
            let mut max_val = aug[k * w + k].abs();
            let mut max_row = k;
            for i in (k + 1)..n {
                let val = aug[i * w + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if !(max_val > SINGULAR_PIVOT_TOLERANCE) {
                return Err(ResnetError::SingularMatrix { pivot: k });
            }

            // Swap rows if needed
            if max_row != k {
                for j in 0..w {
                    aug.swap(k * w + j, max_row * w + j);
                }
            }

            // Normalize pivot row
            let pivot = aug[k * w + k];
            for j in 0..w {
                aug[k * w + j] /= pivot;
            }

            // Eliminate column k from every other row
            for i in 0..n {
                if i == k {
                    continue;
                }
                let factor = aug[i * w + k];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..w {
                    aug[i * w + j] -= factor * aug[k * w + j];
                }
            }
        }

        let mut inverse = Vec::with_capacity(n * n);
        for i in 0..n {
            inverse.extend_from_slice(&aug[i * w + n..(i + 1) * w]);
        }
        DenseMatrix::from_data(n, inverse)
    }

    fn multiply(&self, matrix: &DenseMatrix, vector: &[f64]) -> Result<Vec<f64>> {
        matrix.mul_vec(vector)
    }

    fn multiply_matrix(&self, a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix> {
        check_size(a.size(), b.size())?;
        a.mul_mat(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_invert_2x2() {
        let m = DenseMatrix::from_rows(&[vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
        let inv = SequentialBackend.invert(&m).unwrap();
        assert_abs_diff_eq!(inv.get(0, 0), 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(inv.get(0, 1), -0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(inv.get(1, 0), -0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(inv.get(1, 1), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_invert_needs_pivoting() {
        let m = DenseMatrix::from_rows(&[
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 3.0],
            vec![4.0, -3.0, 8.0],
        ])
        .unwrap();
        let inv = SequentialBackend.invert(&m).unwrap();
        let product = m.mul_mat(&inv).unwrap();
        assert!(product.identity_residual() < 1e-12);
    }

    #[test]
    fn test_singular_zero_row() {
        let m = DenseMatrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 0.0]]).unwrap();
        let err = SequentialBackend.invert(&m).unwrap_err();
        assert!(matches!(err, ResnetError::SingularMatrix { pivot: 1 }));
    }

    #[test]
    fn test_singular_dependent_rows() {
        let m = DenseMatrix::from_rows(&[vec![1.0, -1.0], vec![-1.0, 1.0]]).unwrap();
        assert!(SequentialBackend.invert(&m).is_err());
    }

    #[test]
    fn test_solve_default_method() {
        let m = DenseMatrix::from_rows(&[vec![2.0, 0.0], vec![0.0, 4.0]]).unwrap();
        let x = SequentialBackend.solve(&m, &[2.0, 2.0]).unwrap();
        assert_eq!(x, vec![1.0, 0.5]);
    }

    #[test]
    fn test_high_impedance_rows_are_not_singular() {
        // KCL row of a 10 TOhm divider next to unit boundary rows
        let g = 1e-13;
        let m = DenseMatrix::from_rows(&[
            vec![1.0, 0.0, 0.0],
            vec![-g, 2.0 * g, -g],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        let inv = SequentialBackend.invert(&m).unwrap();
        let x = SequentialBackend.multiply(&inv, &[1.0, 0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(x[1], 0.5, epsilon = 1e-12);
        assert!(m.mul_mat(&inv).unwrap().identity_residual() < 1e-9);
    }

    #[test]
    fn test_empty_matrix() {
        let inv = SequentialBackend.invert(&DenseMatrix::zeros(0)).unwrap();
        assert_eq!(inv.size(), 0);
    }
}
