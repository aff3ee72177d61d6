//! Dense linear algebra backends.
//!
//! The solver only needs three operations from a backend: invert a square
//! matrix, multiply a matrix by a vector, and multiply two matrices. These
//! are captured by [`LinearAlgebraBackend`] with three implementations:
//!
//! - [`SequentialBackend`] - Gauss-Jordan elimination in `f64`, the reference
//! - [`ParallelBackend`] - the same elimination dispatched as a grid of
//!   per-cell updates on the rayon pool, computed in `f32` (feature `parallel`)
//! - [`IterativeInverter`] - fixed-point approximation of the inverse
//!
//! The parallel backend trades accuracy for throughput: expect errors around
//! `1e-6` relative rather than `1e-15`. It is only used when selected
//! explicitly through [`BackendKind::Parallel`].

mod dense;
mod iterative;
#[cfg(feature = "parallel")]
mod parallel;
mod sequential;

use std::fmt;
use std::str::FromStr;

pub use dense::DenseMatrix;
pub use iterative::{InverseApproximation, IterativeInverter};
#[cfg(feature = "parallel")]
pub use parallel::ParallelBackend;
pub use sequential::SequentialBackend;

use crate::error::{ResnetError, Result};

/// Pivots smaller than this fraction of their row's largest entry count as zero (f64 path).
///
/// Rows are equilibrated before elimination, so boundary rows with unit
/// entries do not mask KCL rows of high-impedance networks.
pub const SINGULAR_PIVOT_TOLERANCE: f64 = 1e-12;

/// Pivot tolerance for the single-precision path.
pub const SINGULAR_PIVOT_TOLERANCE_F32: f32 = 1e-6;

/// Default iteration cap for [`IterativeInverter`].
pub const DEFAULT_INVERSION_ITERATIONS: usize = 1000;

/// Default Frobenius residual tolerance for [`IterativeInverter`].
pub const DEFAULT_INVERSION_TOLERANCE: f64 = 1e-9;

/// Matrix operations needed by the direct solver.
///
/// Calls are synchronous: a parallel implementation blocks until its kernel
/// has finished.
pub trait LinearAlgebraBackend: Send + Sync {
    /// Human-readable name of this backend.
    fn name(&self) -> &'static str;

    /// Compute the inverse of a square matrix.
    ///
    /// Fails with [`ResnetError::SingularMatrix`] when no usable pivot exists.
    fn invert(&self, matrix: &DenseMatrix) -> Result<DenseMatrix>;

    /// Compute `matrix * vector`.
    fn multiply(&self, matrix: &DenseMatrix, vector: &[f64]) -> Result<Vec<f64>>;

    /// Compute `a * b`.
    fn multiply_matrix(&self, a: &DenseMatrix, b: &DenseMatrix) -> Result<DenseMatrix>;

    /// Solve `matrix * x = rhs` as `inverse(matrix) * rhs`.
    fn solve(&self, matrix: &DenseMatrix, rhs: &[f64]) -> Result<Vec<f64>> {
        dense::check_size(matrix.size(), rhs.len())?;
        let inverse = self.invert(matrix)?;
        self.multiply(&inverse, rhs)
    }
}

/// Backend selector, used by configuration and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Exact f64 Gauss-Jordan
    #[default]
    Sequential,
    /// Data-parallel f32 Gauss-Jordan (requires the `parallel` feature)
    Parallel,
    /// Fixed-point inverse approximation with default settings
    Iterative,
}

impl BackendKind {
    /// All selectable backends, in display order.
    pub const ALL: [BackendKind; 3] = [Self::Sequential, Self::Parallel, Self::Iterative];

    /// Instantiate the selected backend.
    pub fn create(self) -> Result<Box<dyn LinearAlgebraBackend>> {
        match self {
            Self::Sequential => Ok(Box::new(SequentialBackend::new())),
            #[cfg(feature = "parallel")]
            Self::Parallel => Ok(Box::new(ParallelBackend::new())),
            #[cfg(not(feature = "parallel"))]
            Self::Parallel => Err(ResnetError::BackendUnavailable {
                backend: self.as_str(),
            }),
            Self::Iterative => Ok(Box::new(IterativeInverter::default())),
        }
    }

    /// Name used in configuration and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::Parallel => "parallel",
            Self::Iterative => "iterative",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ResnetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" | "seq" | "cpu" => Ok(Self::Sequential),
            "parallel" | "par" | "gpu" => Ok(Self::Parallel),
            "iterative" | "iter" => Ok(Self::Iterative),
            _ => Err(ResnetError::invalid_parameter(
                "backend",
                format!("unknown backend '{}' (expected sequential, parallel or iterative)", s),
            )),
        }
    }
}
