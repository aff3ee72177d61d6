//! Sanity checks on solved networks.
//!
//! These are diagnostics for callers and tests. The solvers never run them.

use std::fmt;

use super::results::Solution;
use super::KCL_TOLERANCE;
use crate::circuit::{BoundaryCondition, NodeIndex};

/// A single failed check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    /// Node voltage is NaN or infinite
    NanVoltage { node: NodeIndex },
    /// Branch current is NaN or infinite
    NanCurrent { node: NodeIndex, connection: usize },
    /// Net outgoing current at an interior node exceeds the tolerance
    Kcl { node: NodeIndex, net_current: f64 },
    /// Sum of neighbour voltage differences at an interior node exceeds the tolerance
    VoltageImbalance { node: NodeIndex, sum: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NanVoltage { node } => write!(f, "node {} has an undefined voltage", node),
            Self::NanCurrent { node, connection } => {
                write!(f, "node {} has an undefined current on connection {}", node, connection)
            }
            Self::Kcl { node, net_current } => write!(
                f,
                "Kirchhoff's current law is violated at node {} (net {:.3e} A)",
                node, net_current
            ),
            Self::VoltageImbalance { node, sum } => write!(
                f,
                "neighbour voltages are unbalanced at node {} (sum {:.3e} V)",
                node, sum
            ),
        }
    }
}

/// Result of [`Validator::check`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// All failed checks, in node order
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Whether every check passed.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Only the KCL violations.
    pub fn kcl_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| matches!(v, Violation::Kcl { .. }))
    }

    /// Whether any NaN/infinite value was found.
    pub fn has_non_finite(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, Violation::NanVoltage { .. } | Violation::NanCurrent { .. }))
    }
}

/// Checks a [`Solution`] against KCL and for non-finite values.
///
/// Ground and source inject or absorb the network current, so conservation
/// checks only cover the other nodes.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    /// Absolute tolerance for the conservation checks
    pub tolerance: f64,
    /// Also check that neighbour voltage differences sum to zero. This equals
    /// KCL only at nodes whose resistors are all equal.
    pub voltage_balance: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            tolerance: KCL_TOLERANCE,
            voltage_balance: false,
        }
    }
}

impl Validator {
    /// Create a validator with the default tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Enable or disable the neighbour voltage check.
    pub fn with_voltage_balance(mut self, enabled: bool) -> Self {
        self.voltage_balance = enabled;
        self
    }

    /// Run every enabled check.
    pub fn check(&self, solution: &Solution, boundary: &BoundaryCondition) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (node, result) in solution.results.iter().enumerate() {
            if !result.voltage.is_finite() {
                report.violations.push(Violation::NanVoltage { node });
            }
            for (connection, branch) in result.connections.iter().enumerate() {
                if !branch.current.is_finite() {
                    report.violations.push(Violation::NanCurrent { node, connection });
                }
            }
        }

        for (node, result) in solution.results.iter().enumerate() {
            if boundary.is_fixed(node) {
                continue;
            }

            let net_current = result.net_current();
            if !(net_current.abs() <= self.tolerance) {
                report.violations.push(Violation::Kcl { node, net_current });
            }

            if self.voltage_balance {
                let sum: f64 = result
                    .connections
                    .iter()
                    .map(|c| solution.voltages[c.to] - result.voltage)
                    .sum();
                if !(sum.abs() <= self.tolerance) {
                    report.violations.push(Violation::VoltageImbalance { node, sum });
                }
            }
        }

        report
    }
}
