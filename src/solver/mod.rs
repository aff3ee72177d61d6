//! Steady-state solvers for resistor networks.
//!
//! ## Nodal formulation
//!
//! Each node contributes one row to the system `M x = b`:
//!
//! ```text
//! ground:   x[g] = 0
//! source:   x[s] = V
//! other i:  sum_k (x[i] - x[to_k]) / R_k = 0
//! ```
//!
//! The system is solved either directly, by inverting `M` on a
//! [`LinearAlgebraBackend`](crate::linalg::LinearAlgebraBackend), or
//! approximately by [`RelaxationSolver`], which never forms `M`.

mod builder;
mod direct;
mod network;
mod relaxation;
mod results;
mod validation;

pub use builder::{LinearSystem, MatrixBuilder};
pub use direct::DirectSolver;
pub use network::{Method, NetworkSolver, SolveOutcome, SolverConfig};
pub use relaxation::{DivergenceWarning, RelaxationConfig, RelaxationReport, RelaxationSolver};
pub use results::{compare_solutions, BranchCurrent, Comparison, NodeResult, ResultExtractor, Solution};
pub use validation::{ValidationReport, Validator, Violation};

use crate::circuit::{BoundaryCondition, Circuit, NodeIndex};
use crate::error::Result;
use crate::linalg::BackendKind;

/// Default number of relaxation passes.
pub const DEFAULT_RELAXATION_ITERATIONS: usize = 1000;

/// Default relaxation learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;

/// Default absolute tolerance for KCL checks.
pub const KCL_TOLERANCE: f64 = 1e-7;

/// Solve a network by matrix inversion on the selected backend.
///
/// Fails with an invalid-parameter error for bad indices, non-positive
/// resistances or `ground == source`, and with
/// [`SingularMatrix`](crate::ResnetError::SingularMatrix) when the network has
/// a node not connected to either boundary node.
pub fn solve_direct(
    circuit: &Circuit,
    ground: NodeIndex,
    source: NodeIndex,
    source_voltage: f64,
    backend: BackendKind,
) -> Result<Vec<NodeResult>> {
    let boundary = BoundaryCondition::new(ground, source, source_voltage);
    let solution = DirectSolver::new(backend)?.solve(circuit, boundary)?;
    Ok(solution.into_results())
}

/// Solve a network approximately by gradient relaxation.
///
/// Never fails on singular networks. Divergence is reported in the returned
/// [`RelaxationReport`], not as an error.
pub fn solve_relaxation(
    circuit: &Circuit,
    ground: NodeIndex,
    source: NodeIndex,
    source_voltage: f64,
    iterations: usize,
    learning_rate: f64,
) -> Result<(Vec<NodeResult>, RelaxationReport)> {
    let boundary = BoundaryCondition::new(ground, source, source_voltage);
    let config = RelaxationConfig::new()
        .with_iterations(iterations)
        .with_learning_rate(learning_rate);
    let (solution, report) = RelaxationSolver::new(config).solve(circuit, boundary)?;
    Ok((solution.into_results(), report))
}
