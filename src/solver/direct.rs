//! Direct solution by matrix inversion.

use log::debug;

use super::builder::{LinearSystem, MatrixBuilder};
use super::results::{ResultExtractor, Solution};
use crate::circuit::{BoundaryCondition, Circuit};
use crate::error::{ResnetError, Result};
use crate::linalg::{BackendKind, LinearAlgebraBackend};

/// Solves `M x = b` as `inverse(M) * b` on a pluggable backend.
pub struct DirectSolver {
    backend: Box<dyn LinearAlgebraBackend>,
}

impl DirectSolver {
    /// Create a solver on the selected backend.
    pub fn new(kind: BackendKind) -> Result<Self> {
        Ok(Self::with_backend(kind.create()?))
    }

    /// Create a solver on a caller-supplied backend.
    pub fn with_backend(backend: Box<dyn LinearAlgebraBackend>) -> Self {
        Self { backend }
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Solve an assembled system.
    ///
    /// A non-finite entry in the result is reported as
    /// [`ResnetError::NonFiniteSolution`] rather than returned.
    pub fn solve_system(&self, system: &LinearSystem) -> Result<Vec<f64>> {
        let inverse = self.backend.invert(&system.matrix)?;
        let x = self.backend.multiply(&inverse, &system.rhs)?;

        if let Some(node) = x.iter().position(|v| !v.is_finite()) {
            return Err(ResnetError::NonFiniteSolution { node });
        }
        Ok(x)
    }

    /// Build, solve and extract results for a circuit.
    pub fn solve(&self, circuit: &Circuit, boundary: BoundaryCondition) -> Result<Solution> {
        let system = MatrixBuilder::new(circuit, boundary).build()?;
        debug!(
            "direct solve of {} nodes on {} backend",
            system.size(),
            self.backend.name()
        );
        let voltages = self.solve_system(&system)?;
        ResultExtractor::extract(circuit, voltages)
    }
}

impl Default for DirectSolver {
    fn default() -> Self {
        Self::with_backend(Box::new(crate::linalg::SequentialBackend::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_divider() {
        let mut c = Circuit::with_nodes(3);
        c.add_resistor(0, 1, 1000.0).unwrap();
        c.add_resistor(1, 2, 3000.0).unwrap();
        let solution = DirectSolver::default()
            .solve(&c, BoundaryCondition::new(2, 0, 4.0))
            .unwrap();
        assert_abs_diff_eq!(solution.voltage(1), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.current(0, 0), 1e-3, epsilon = 1e-15);
    }

    #[test]
    fn test_isolated_node_is_singular() {
        let mut c = Circuit::with_nodes(3);
        c.add_resistor(0, 1, 1.0).unwrap();
        let err = DirectSolver::default()
            .solve(&c, BoundaryCondition::new(1, 0, 1.0))
            .unwrap_err();
        assert!(matches!(err, ResnetError::SingularMatrix { .. }));
    }

    #[test]
    fn test_floating_island_is_singular() {
        let mut c = Circuit::with_nodes(4);
        c.add_resistor(0, 1, 1.0).unwrap();
        c.add_resistor(2, 3, 5.0).unwrap();
        let err = DirectSolver::default()
            .solve(&c, BoundaryCondition::new(1, 0, 1.0))
            .unwrap_err();
        assert!(matches!(err, ResnetError::SingularMatrix { .. }));
    }

    struct NanBackend;

    impl LinearAlgebraBackend for NanBackend {
        fn name(&self) -> &'static str {
            "nan"
        }

        fn invert(&self, matrix: &crate::linalg::DenseMatrix) -> Result<crate::linalg::DenseMatrix> {
            Ok(matrix.clone())
        }

        fn multiply(&self, matrix: &crate::linalg::DenseMatrix, _: &[f64]) -> Result<Vec<f64>> {
            let mut x = vec![0.0; matrix.size()];
            x[1] = f64::NAN;
            Ok(x)
        }

        fn multiply_matrix(
            &self,
            a: &crate::linalg::DenseMatrix,
            _: &crate::linalg::DenseMatrix,
        ) -> Result<crate::linalg::DenseMatrix> {
            Ok(a.clone())
        }
    }

    #[test]
    fn test_non_finite_result_names_the_node() {
        let mut c = Circuit::with_nodes(3);
        c.add_resistor(0, 1, 1.0).unwrap();
        c.add_resistor(1, 2, 1.0).unwrap();
        let err = DirectSolver::with_backend(Box::new(NanBackend))
            .solve(&c, BoundaryCondition::new(2, 0, 1.0))
            .unwrap_err();
        assert!(matches!(err, ResnetError::NonFiniteSolution { node: 1 }));
    }

    #[test]
    fn test_iterative_backend() {
        let mut c = Circuit::with_nodes(3);
        c.add_resistor(0, 1, 1.0).unwrap();
        c.add_resistor(1, 2, 1.0).unwrap();
        let solver = DirectSolver::new(BackendKind::Iterative).unwrap();
        assert_eq!(solver.backend_name(), "iterative");
        let solution = solver.solve(&c, BoundaryCondition::new(2, 0, 1.0)).unwrap();
        assert_abs_diff_eq!(solution.voltage(1), 0.5, epsilon = 1e-8);
    }
}
