//! Gradient relaxation on per-node current imbalance.
//!
//! For each free node `j` the imbalance is
//! `s_j = sum_k (V[to_k] - V[j]) / R_k`, the net current flowing into `j`.
//! Each pass visits the free nodes in order and takes one gradient step on
//! `s_j^2 / 2`: neighbours move by `-rate * s_j / R_k`, the node itself by
//! `+rate * s_j * sum_k 1/R_k`. Ground and source are never moved, matched
//! by node identity. There is no early stop: quality depends on
//! `iterations * learning_rate`.

use log::{debug, trace, warn};

use super::results::{ResultExtractor, Solution};
use super::{DEFAULT_LEARNING_RATE, DEFAULT_RELAXATION_ITERATIONS};
use crate::circuit::{validate_boundary, validate_circuit, BoundaryCondition, Circuit};
use crate::error::{ResnetError, Result};

/// Configuration for the relaxation solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationConfig {
    /// Number of full passes over the network
    pub iterations: usize,
    /// Step size of each gradient update
    pub learning_rate: f64,
    /// Record the error diagnostic every this many passes (0 disables recording)
    pub record_every: usize,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_RELAXATION_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            record_every: 1,
        }
    }
}

impl RelaxationConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the learning rate.
    ///
    /// Too large a rate makes the imbalance grow instead of shrink.
    /// A rate around `1 / (G^2 + sum g^2)` per node, with `G` the node's total
    /// conductance, is the largest that still relaxes every step.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the diagnostic sampling interval.
    pub fn with_record_every(mut self, record_every: usize) -> Self {
        self.record_every = record_every;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0) || !self.learning_rate.is_finite() {
            return Err(ResnetError::invalid_parameter(
                "learning_rate",
                format!("must be finite and positive, got {}", self.learning_rate),
            ));
        }
        Ok(())
    }
}

/// Advisory signal that the KCL imbalance grew instead of shrinking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergenceWarning {
    /// Imbalance seen during the first pass
    pub initial_imbalance: f64,
    /// Imbalance seen during the last pass
    pub final_imbalance: f64,
}

/// Diagnostics of a relaxation run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelaxationReport {
    /// Passes performed
    pub iterations: usize,
    /// Sum of squared branch currents seen during each recorded pass.
    /// Rises while voltage spreads from the source; not a convergence measure.
    pub error_history: Vec<f64>,
    /// Sum of squared KCL imbalances seen during each recorded pass
    pub imbalance_history: Vec<f64>,
    /// Sum of squared KCL imbalances over free nodes after the last pass
    pub final_imbalance: f64,
    /// Set when the imbalance increased over the run
    pub divergence: Option<DivergenceWarning>,
}

impl RelaxationReport {
    /// Whether the run looks divergent.
    pub fn diverged(&self) -> bool {
        self.divergence.is_some()
    }
}

/// Approximate solver that never forms or inverts a matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelaxationSolver {
    config: RelaxationConfig,
}

impl RelaxationSolver {
    /// Create a solver with the given configuration.
    pub fn new(config: RelaxationConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &RelaxationConfig {
        &self.config
    }

    /// Relax the network and return the solution with its diagnostics.
    pub fn solve(
        &self,
        circuit: &Circuit,
        boundary: BoundaryCondition,
    ) -> Result<(Solution, RelaxationReport)> {
        self.solve_with_observer(circuit, boundary, |_, _| {})
    }

    /// Like [`solve`](Self::solve), calling `observer(pass, error)` after every pass.
    pub fn solve_with_observer<F>(
        &self,
        circuit: &Circuit,
        boundary: BoundaryCondition,
        mut observer: F,
    ) -> Result<(Solution, RelaxationReport)>
    where
        F: FnMut(usize, f64),
    {
        validate_circuit(circuit)?;
        validate_boundary(circuit, &boundary)?;
        self.config.validate()?;

        let rate = self.config.learning_rate;
        let mut voltages = vec![0.0; circuit.node_count()];
        voltages[boundary.source] = boundary.source_voltage;

        let mut report = RelaxationReport::default();
        let mut first_imbalance = None;
        let mut last_imbalance = 0.0;

        for pass in 0..self.config.iterations {
            let mut error = 0.0;
            let mut pass_imbalance = 0.0;

            for (j, list) in circuit.iter() {
                if boundary.is_fixed(j) {
                    continue;
                }

                let mut current_sum = 0.0;
                let mut self_conductance = 0.0;
                for conn in list {
                    let current = (voltages[conn.to] - voltages[j]) / conn.resistance;
                    current_sum += current;
                    error += current * current;
                    if conn.to != j {
                        self_conductance += conn.conductance();
                    }
                }

                pass_imbalance += current_sum * current_sum;
                voltages[j] += rate * current_sum * self_conductance;
                for conn in list {
                    if conn.to == j || boundary.is_fixed(conn.to) {
                        continue;
                    }
                    voltages[conn.to] -= rate * current_sum * conn.conductance();
                }
            }

            if self.config.record_every > 0 && pass % self.config.record_every == 0 {
                report.error_history.push(error);
                report.imbalance_history.push(pass_imbalance);
                trace!(
                    "relaxation pass {}: error {:.6e}, imbalance {:.6e}",
                    pass,
                    error,
                    pass_imbalance
                );
            }
            observer(pass, error);

            if first_imbalance.is_none() {
                first_imbalance = Some(pass_imbalance);
            }
            last_imbalance = pass_imbalance;
            report.iterations = pass + 1;
        }

        report.final_imbalance = imbalance(circuit, &boundary, &voltages);

        if let Some(initial_imbalance) = first_imbalance {
            if !last_imbalance.is_finite() || last_imbalance > initial_imbalance {
                warn!(
                    "relaxation imbalance grew from {:.3e} to {:.3e}; learning rate {} may be too large",
                    initial_imbalance, last_imbalance, rate
                );
                report.divergence = Some(DivergenceWarning {
                    initial_imbalance,
                    final_imbalance: last_imbalance,
                });
            }
        }

        debug!(
            "relaxation finished: {} passes, imbalance {:.3e}",
            report.iterations, report.final_imbalance
        );

        let solution = ResultExtractor::extract(circuit, voltages)?;
        Ok((solution, report))
    }
}

/// Sum of squared net inflows over free nodes.
fn imbalance(circuit: &Circuit, boundary: &BoundaryCondition, voltages: &[f64]) -> f64 {
    circuit
        .iter()
        .filter(|(j, _)| !boundary.is_fixed(*j))
        .map(|(j, list)| {
            let s: f64 = list
                .iter()
                .map(|c| (voltages[c.to] - voltages[j]) / c.resistance)
                .sum();
            s * s
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Connection;
    use approx::assert_abs_diff_eq;

    fn chain(n: usize) -> Circuit {
        let mut c = Circuit::with_nodes(n);
        for i in 0..n - 1 {
            c.add_resistor(i, i + 1, 1.0).unwrap();
        }
        c
    }

    #[test]
    fn test_chain_midpoint() {
        let solver = RelaxationSolver::new(
            RelaxationConfig::new()
                .with_iterations(2000)
                .with_learning_rate(0.05),
        );
        let (solution, report) = solver.solve(&chain(3), BoundaryCondition::new(2, 0, 1.0)).unwrap();
        assert_abs_diff_eq!(solution.voltage(1), 0.5, epsilon = 1e-6);
        assert_eq!(solution.voltage(0), 1.0);
        assert_eq!(solution.voltage(2), 0.0);
        assert_eq!(report.iterations, 2000);
        assert_eq!(report.error_history.len(), 2000);
        assert_eq!(report.imbalance_history.len(), 2000);
        assert!(report.final_imbalance < 1e-10);
        assert!(!report.diverged());
    }

    #[test]
    fn test_fixed_nodes_never_move() {
        let solver = RelaxationSolver::new(RelaxationConfig::new().with_iterations(50));
        let (solution, _) = solver.solve(&chain(5), BoundaryCondition::new(4, 0, 2.5)).unwrap();
        assert_eq!(solution.voltage(0), 2.5);
        assert_eq!(solution.voltage(4), 0.0);
    }

    #[test]
    fn test_zero_iterations_returns_initial_state() {
        let solver = RelaxationSolver::new(RelaxationConfig::new().with_iterations(0));
        let (solution, report) = solver.solve(&chain(3), BoundaryCondition::new(2, 0, 1.0)).unwrap();
        assert_eq!(solution.voltages, vec![1.0, 0.0, 0.0]);
        assert!(report.error_history.is_empty());
        assert!(!report.diverged());
    }

    #[test]
    fn test_large_learning_rate_flags_divergence() {
        let solver = RelaxationSolver::new(
            RelaxationConfig::new()
                .with_iterations(100)
                .with_learning_rate(2.0),
        );
        let (_, report) = solver.solve(&chain(3), BoundaryCondition::new(2, 0, 1.0)).unwrap();
        let warning = report.divergence.unwrap();
        assert!(!(warning.final_imbalance <= warning.initial_imbalance));
    }

    #[test]
    fn test_rising_error_is_not_divergence() {
        // Source behind 10 Ohm: branch currents grow from their all-zero start
        let c = Circuit::from_adjacency(vec![
            vec![Connection::new(1, 10.0)],
            vec![Connection::new(0, 10.0), Connection::new(2, 1.0)],
            vec![Connection::new(1, 1.0), Connection::new(3, 1.0)],
            vec![Connection::new(2, 1.0)],
        ]);
        let solver = RelaxationSolver::new(
            RelaxationConfig::new()
                .with_iterations(20000)
                .with_learning_rate(0.1),
        );
        let (solution, report) = solver.solve(&c, BoundaryCondition::new(3, 0, 1.0)).unwrap();

        assert_abs_diff_eq!(solution.voltage(1), 1.0 / 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(solution.voltage(2), 1.0 / 12.0, epsilon = 1e-9);
        let errors = &report.error_history;
        assert!(errors[errors.len() - 1] > errors[0]);
        let imbalances = &report.imbalance_history;
        assert!(imbalances[imbalances.len() - 1] < imbalances[0]);
        assert!(!report.diverged());
    }

    #[test]
    fn test_singular_network_does_not_fail() {
        let mut c = chain(3);
        c.add_node();
        let solver = RelaxationSolver::new(RelaxationConfig::new().with_iterations(10));
        let (solution, _) = solver.solve(&c, BoundaryCondition::new(2, 0, 1.0)).unwrap();
        assert_eq!(solution.voltage(3), 0.0);
    }

    #[test]
    fn test_invalid_learning_rate() {
        let solver = RelaxationSolver::new(RelaxationConfig::new().with_learning_rate(0.0));
        let err = solver
            .solve(&chain(3), BoundaryCondition::new(2, 0, 1.0))
            .unwrap_err();
        assert!(matches!(err, ResnetError::InvalidParameter { .. }));
    }

    #[test]
    fn test_observer_and_sampling() {
        let solver = RelaxationSolver::new(
            RelaxationConfig::new()
                .with_iterations(10)
                .with_record_every(4),
        );
        let mut seen = Vec::new();
        let (_, report) = solver
            .solve_with_observer(&chain(3), BoundaryCondition::new(2, 0, 1.0), |pass, error| {
                seen.push((pass, error))
            })
            .unwrap();
        assert_eq!(seen.len(), 10);
        assert_eq!(report.error_history.len(), 3);
        assert_eq!(report.error_history[1], seen[4].1);
    }
}
