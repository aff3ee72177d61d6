//! Configured entry point choosing between the direct and relaxation methods.

use std::fmt;
use std::str::FromStr;

use log::info;

use super::direct::DirectSolver;
use super::relaxation::{RelaxationConfig, RelaxationReport, RelaxationSolver};
use super::results::Solution;
use crate::circuit::{BoundaryCondition, Circuit};
use crate::error::{ResnetError, Result};
use crate::linalg::BackendKind;

/// Solution method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Matrix inversion
    #[default]
    Direct,
    /// Gradient relaxation
    Relaxation,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Relaxation => f.write_str("relaxation"),
        }
    }
}

impl FromStr for Method {
    type Err = ResnetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "direct" | "inverse" => Ok(Self::Direct),
            "relaxation" | "relax" | "gradient" => Ok(Self::Relaxation),
            _ => Err(ResnetError::invalid_parameter(
                "method",
                format!("unknown method '{}' (expected direct or relaxation)", s),
            )),
        }
    }
}

/// Configuration for [`NetworkSolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolverConfig {
    /// Which method to run
    pub method: Method,
    /// Backend for the direct method
    pub backend: BackendKind,
    /// Settings for the relaxation method
    pub relaxation: RelaxationConfig,
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the solution method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the linear algebra backend.
    ///
    /// [`BackendKind::Parallel`] computes in single precision; results carry
    /// errors around `1e-6` instead of `1e-15`.
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set the relaxation settings.
    pub fn with_relaxation(mut self, relaxation: RelaxationConfig) -> Self {
        self.relaxation = relaxation;
        self
    }
}

/// Result of [`NetworkSolver::solve`].
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Voltages and currents
    pub solution: Solution,
    /// Method that produced the solution
    pub method: Method,
    /// Diagnostics, present for the relaxation method
    pub relaxation: Option<RelaxationReport>,
}

/// Solver front end holding a [`SolverConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkSolver {
    config: SolverConfig,
}

impl NetworkSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a network with the configured method.
    pub fn solve(&self, circuit: &Circuit, boundary: BoundaryCondition) -> Result<SolveOutcome> {
        info!(
            "solving {} nodes with {} method ({})",
            circuit.node_count(),
            self.config.method,
            boundary
        );

        match self.config.method {
            Method::Direct => {
                let solution = DirectSolver::new(self.config.backend)?.solve(circuit, boundary)?;
                Ok(SolveOutcome {
                    solution,
                    method: Method::Direct,
                    relaxation: None,
                })
            }
            Method::Relaxation => {
                let (solution, report) =
                    RelaxationSolver::new(self.config.relaxation).solve(circuit, boundary)?;
                Ok(SolveOutcome {
                    solution,
                    method: Method::Relaxation,
                    relaxation: Some(report),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!("direct".parse::<Method>().unwrap(), Method::Direct);
        assert_eq!("Relax".parse::<Method>().unwrap(), Method::Relaxation);
        assert!("newton".parse::<Method>().is_err());
    }

    #[test]
    fn test_outcome_carries_report_for_relaxation() {
        let mut c = Circuit::with_nodes(2);
        c.add_resistor(0, 1, 1.0).unwrap();
        let bc = BoundaryCondition::new(1, 0, 1.0);

        let direct = NetworkSolver::default().solve(&c, bc).unwrap();
        assert!(direct.relaxation.is_none());

        let config = SolverConfig::new()
            .with_method(Method::Relaxation)
            .with_relaxation(RelaxationConfig::new().with_iterations(3));
        let relaxed = NetworkSolver::new(config).solve(&c, bc).unwrap();
        assert_eq!(relaxed.relaxation.unwrap().iterations, 3);
        assert_eq!(relaxed.solution.voltages, direct.solution.voltages);
    }
}
