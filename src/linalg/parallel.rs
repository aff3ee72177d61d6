//! Data-parallel backend: Gauss-Jordan as a grid of per-cell updates.
//!
//! Each elimination step reads the full previous augmented matrix and writes
//! every output cell independently, so a step is one rayon `par_iter_mut`
//! over cells. Steps run strictly in order. Arithmetic is `f32`.

use log::debug;
use rayon::prelude::*;

use super::dense::{check_size, DenseMatrix};
use super::{LinearAlgebraBackend, SINGULAR_PIVOT_TOLERANCE_F32};
use crate::error::{ResnetError, Result};

/// Parallel, single-precision backend running on the rayon pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBackend;

impl ParallelBackend {
    /// Create a new parallel backend.
    pub fn new() -> Self {
        Self
    }
}

fn to_f32(data: &[f64]) -> Vec<f32> {
    data.iter().map(|&v| v as f32).collect()
}

impl LinearAlgebraBackend for ParallelBackend {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn invert(&self, matrix: &DenseMatrix) -> Result<DenseMatrix> {
        let n = matrix.size();
        let w = 2 * n;
        debug!(
            "parallel inversion of {}x{} on {} threads",
            n,
            n,
            rayon::current_num_threads()
        );

        // Equilibrate in f64 so tiny conductances survive the cast to f32
        let scales = matrix.row_scales();
        let mut prev = vec![0.0f32; n * w];
        prev.par_chunks_mut(w.max(1)).enumerate().for_each(|(i, row)| {
            for (cell, v) in row[..n].iter_mut().zip(matrix.row(i)) {
                *cell = (v * scales[i]) as f32;
            }
            row[n + i] = scales[i] as f32;
        });
        let mut next = vec![0.0f32; n * w];

        for k in 0..n {
            // Pivot search and row swap are O(n); only the update is dispatched
            let (max_row, max_val) = (k..n)
                .map(|i| (i, prev[i * w + k].abs()))
                .fold((k, -1.0f32), |best, cand| if cand.1 > best.1 { cand } else { best });

            if !(max_val > SINGULAR_PIVOT_TOLERANCE_F32) {
                return Err(ResnetError::SingularMatrix { pivot: k });
            }

            if max_row != k {
                for j in 0..w {
                    prev.swap(k * w + j, max_row * w + j);
                }
            }

            let pivot = prev[k * w + k];
            let pivot_row: Vec<f32> = prev[k * w..(k + 1) * w].iter().map(|v| v / pivot).collect();
            let source = &prev;

            next.par_iter_mut().enumerate().for_each(|(idx, cell)| {
                let i = idx / w;
                let j = idx % w;
                *cell = if i == k {
                    pivot_row[j]
                } else {
                    source[idx] - source[i * w + k] * pivot_row[j]
                };
            });

            std::mem::swap(&mut prev, &mut next);
        }

        let inverse: Vec<f64> = (0..n)
            .flat_map(|i| prev[i * w + n..(i + 1) * w].iter().map(|&v| v as f64))
            .collect();
        DenseMatrix::from_data(n, inverse)
    }

    fn multiply(&self, matrix: &DenseMatrix, vector: &[f64]) -> Result<Vec<f64>> {
        let n = matrix.size();
        check_size(n, vector.len())?;
        let a = to_f32(matrix.data());
        let x = to_f32(vector);

        Ok((0..n)
            .into_par_iter()
            .map(|i| {
                a[i * n..(i + 1) * n]
                    .iter()
                    .zip(&x)
                    .map(|(p, q)| p * q)
                    .sum::<f32>() as f64
            })
            .collect())
    }

    fn multiply_matrix(&self, a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix> {
        let n = a.size();
        check_size(n, b.size())?;
        let lhs = to_f32(a.data());
        let rhs = to_f32(b.data());

        let mut out = vec![0.0f64; n * n];
        out.par_iter_mut().enumerate().for_each(|(idx, cell)| {
            let i = idx / n;
            let j = idx % n;
            *cell = (0..n).map(|k| lhs[i * n + k] * rhs[k * n + j]).sum::<f32>() as f64;
        });
        DenseMatrix::from_data(n, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::SequentialBackend;
    use approx::assert_abs_diff_eq;

    fn diagonally_dominant(n: usize) -> DenseMatrix {
        let mut m = DenseMatrix::zeros(n);
        for i in 0..n {
            for j in 0..n {
                let v = ((i * 7 + j * 3) % 5) as f64 * 0.1;
                m.set(i, j, if i == j { n as f64 } else { v });
            }
        }
        m
    }

    #[test]
    fn test_matches_sequential_within_single_precision() {
        let m = diagonally_dominant(12);
        let exact = SequentialBackend.invert(&m).unwrap();
        let approx = ParallelBackend.invert(&m).unwrap();
        assert!(exact.mean_abs_diff(&approx).unwrap() < 1e-5);
    }

    #[test]
    fn test_multiply() {
        let m = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let y = ParallelBackend.multiply(&m, &[0.5, 0.25]).unwrap();
        assert_abs_diff_eq!(y[0], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y[1], 2.5, epsilon = 1e-6);
    }

    #[test]
    fn test_multiply_matrix() {
        let m = diagonally_dominant(5);
        let seq = m.mul_mat(&m).unwrap();
        let par = ParallelBackend.multiply_matrix(&m, &m).unwrap();
        assert!(seq.mean_abs_diff(&par).unwrap() < 1e-4);
    }

    #[test]
    fn test_high_impedance_divider() {
        // 10 MOhm / 10 MOhm divider: KCL entries of 1e-7 next to unit rows
        let g = 1e-7;
        let m = DenseMatrix::from_rows(&[
            vec![1.0, 0.0, 0.0],
            vec![-g, 2.0 * g, -g],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        let x = ParallelBackend.solve(&m, &[1.0, 0.0, 0.0]).unwrap();
        assert_abs_diff_eq!(x[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_singular() {
        let m = DenseMatrix::from_rows(&[vec![1.0, -1.0], vec![-1.0, 1.0]]).unwrap();
        assert!(matches!(
            ParallelBackend.invert(&m),
            Err(ResnetError::SingularMatrix { pivot: 1 })
        ));
    }
}
