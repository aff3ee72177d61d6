//! Per-node results derived from solved voltages.

use crate::circuit::{Circuit, NodeIndex};
use crate::error::{ResnetError, Result};

/// Current through one connection, seen from the node that lists it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchCurrent {
    /// Node at the far end
    pub to: NodeIndex,
    /// Current in amperes; positive flows from this node toward `to`
    pub current: f64,
}

/// Voltage and branch currents of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeResult {
    /// Node voltage
    pub voltage: f64,
    /// Currents, index-aligned with the node's adjacency list
    pub connections: Vec<BranchCurrent>,
}

impl NodeResult {
    /// Sum of outgoing currents. Zero at interior nodes of a solved network.
    pub fn net_current(&self) -> f64 {
        self.connections.iter().map(|c| c.current).sum()
    }
}

/// Solver output.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Node voltages, index-aligned with nodes
    pub voltages: Vec<f64>,
    /// Per-node results, index-aligned with nodes
    pub results: Vec<NodeResult>,
}

impl Solution {
    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.voltages.len()
    }

    /// Voltage of a node.
    pub fn voltage(&self, node: NodeIndex) -> f64 {
        self.voltages[node]
    }

    /// Current through connection `connection` of `node`.
    pub fn current(&self, node: NodeIndex, connection: usize) -> f64 {
        self.results[node].connections[connection].current
    }

    /// Total current leaving a node.
    pub fn net_current(&self, node: NodeIndex) -> f64 {
        self.results[node].net_current()
    }

    /// Consume the solution, keeping only the per-node results.
    pub fn into_results(self) -> Vec<NodeResult> {
        self.results
    }
}

/// Derives branch currents from node voltages.
pub struct ResultExtractor;

impl ResultExtractor {
    /// Build per-node results: `current = (V[i] - V[to]) / R`.
    ///
    /// NaN voltages propagate into the currents unchanged.
    pub fn extract(circuit: &Circuit, voltages: Vec<f64>) -> Result<Solution> {
        if voltages.len() != circuit.node_count() {
            return Err(ResnetError::DimensionMismatch {
                expected: circuit.node_count(),
                actual: voltages.len(),
            });
        }

        let results = circuit
            .iter()
            .map(|(i, list)| NodeResult {
                voltage: voltages[i],
                connections: list
                    .iter()
                    .map(|conn| BranchCurrent {
                        to: conn.to,
                        current: (voltages[i] - voltages[conn.to]) / conn.resistance,
                    })
                    .collect(),
            })
            .collect();

        Ok(Solution { voltages, results })
    }
}

/// Error statistics between a reference solution and a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Comparison {
    /// Mean absolute voltage error per node
    pub mean_voltage_error: f64,
    /// Summed absolute current error of each node's connections, averaged over nodes
    pub mean_current_error: f64,
    /// Largest absolute voltage error
    pub max_voltage_error: f64,
    /// Largest absolute current error
    pub max_current_error: f64,
}

/// Compare two solutions of the same circuit.
pub fn compare_solutions(reference: &Solution, candidate: &Solution) -> Result<Comparison> {
    if reference.node_count() != candidate.node_count() {
        return Err(ResnetError::DimensionMismatch {
            expected: reference.node_count(),
            actual: candidate.node_count(),
        });
    }

    let mut cmp = Comparison::default();
    let mut voltage_total = 0.0;
    let mut current_total = 0.0;

    for (truth, result) in reference.results.iter().zip(&candidate.results) {
        let dv = (truth.voltage - result.voltage).abs();
        voltage_total += dv;
        cmp.max_voltage_error = cmp.max_voltage_error.max(dv);

        if truth.connections.len() != result.connections.len() {
            return Err(ResnetError::DimensionMismatch {
                expected: truth.connections.len(),
                actual: result.connections.len(),
            });
        }
        for (a, b) in truth.connections.iter().zip(&result.connections) {
            let di = (a.current - b.current).abs();
            current_total += di;
            cmp.max_current_error = cmp.max_current_error.max(di);
        }
    }

    if reference.node_count() > 0 {
        cmp.mean_voltage_error = voltage_total / reference.node_count() as f64;
        cmp.mean_current_error = current_total / reference.node_count() as f64;
    }
    Ok(cmp)
}
