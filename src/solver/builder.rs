//! Conductance matrix assembly.

use log::debug;

use crate::circuit::{validate_boundary, validate_circuit, BoundaryCondition, Circuit, NodeIndex};
use crate::error::Result;
use crate::linalg::DenseMatrix;

/// The system `M x = b` for one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    /// Coefficient matrix M
    pub matrix: DenseMatrix,
    /// Right-hand side b
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    /// Create an all-zero system of the given size.
    pub fn new(size: usize) -> Self {
        Self {
            matrix: DenseMatrix::zeros(size),
            rhs: vec![0.0; size],
        }
    }

    /// System dimension.
    pub fn size(&self) -> usize {
        self.rhs.len()
    }

    /// Pin a node to a voltage: identity row, `b[node] = value`.
    pub fn stamp_fixed_voltage(&mut self, node: NodeIndex, value: f64) {
        self.matrix.set(node, node, 1.0);
        self.rhs[node] = value;
    }

    /// Stamp one directed connection into the KCL row of `from`.
    /// Only row `from` is touched:
    ///   M[from,from] += G
    ///   M[from,to]   -= G
    pub fn stamp_connection(&mut self, from: NodeIndex, to: NodeIndex, g: f64) {
        self.matrix.add(from, from, g);
        self.matrix.add(from, to, -g);
    }

    /// Largest absolute entry of `M x - b`.
    pub fn residual(&self, x: &[f64]) -> Result<f64> {
        let mx = self.matrix.mul_vec(x)?;
        Ok(mx
            .iter()
            .zip(&self.rhs)
            .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs())))
    }
}

/// Translates a circuit and its boundary condition into a [`LinearSystem`].
pub struct MatrixBuilder<'a> {
    circuit: &'a Circuit,
    boundary: BoundaryCondition,
}

impl<'a> MatrixBuilder<'a> {
    /// Create a builder for the given inputs.
    pub fn new(circuit: &'a Circuit, boundary: BoundaryCondition) -> Self {
        Self { circuit, boundary }
    }

    /// Validate the inputs and assemble `(M, b)`.
    ///
    /// Rows of ground and source are identity rows; every other row is the
    /// KCL balance of that node. Parallel connections add their conductances.
    pub fn build(&self) -> Result<LinearSystem> {
        validate_circuit(self.circuit)?;
        validate_boundary(self.circuit, &self.boundary)?;

        let n = self.circuit.node_count();
        let mut system = LinearSystem::new(n);

        system.stamp_fixed_voltage(self.boundary.ground, 0.0);
        system.stamp_fixed_voltage(self.boundary.source, self.boundary.source_voltage);

        for (i, list) in self.circuit.iter() {
            if self.boundary.is_fixed(i) {
                continue;
            }
            for conn in list {
                system.stamp_connection(i, conn.to, conn.conductance());
            }
        }

        debug!(
            "assembled {}x{} system from {} connections ({})",
            n,
            n,
            self.circuit.connection_count(),
            self.boundary
        );

        Ok(system)
    }
}
