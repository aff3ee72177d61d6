//! Core types for circuit representation.

use std::fmt;

/// Index of a node in the circuit. Nodes have no identity beyond this.
pub type NodeIndex = usize;

/// One directed view of a resistor, stored in the adjacency list of its
/// source node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// Node at the far end of the resistor
    pub to: NodeIndex,
    /// Resistance in ohms (must be > 0)
    pub resistance: f64,
}

impl Connection {
    /// Create a new connection.
    pub fn new(to: NodeIndex, resistance: f64) -> Self {
        Self { to, resistance }
    }

    /// Conductance (1/R) in siemens.
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-> N{} ({} ohm)", self.to, self.resistance)
    }
}

/// The fixed-voltage boundary condition applied to a network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCondition {
    /// Node pinned to 0 V
    pub ground: NodeIndex,
    /// Node pinned to `source_voltage`
    pub source: NodeIndex,
    /// Voltage applied at the source node
    pub source_voltage: f64,
}

impl BoundaryCondition {
    /// Create a new boundary condition.
    pub fn new(ground: NodeIndex, source: NodeIndex, source_voltage: f64) -> Self {
        Self {
            ground,
            source,
            source_voltage,
        }
    }

    /// Check whether a node has its voltage fixed by this boundary.
    pub fn is_fixed(&self, node: NodeIndex) -> bool {
        node == self.ground || node == self.source
    }

    /// The pinned voltage of a node, if any.
    pub fn fixed_voltage(&self, node: NodeIndex) -> Option<f64> {
        if node == self.ground {
            Some(0.0)
        } else if node == self.source {
            Some(self.source_voltage)
        } else {
            None
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GND=N{} SRC=N{} ({} V)",
            self.ground, self.source, self.source_voltage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_conductance() {
        let c = Connection::new(1, 1000.0);
        assert!((c.conductance() - 0.001).abs() < 1e-15);
    }

    #[test]
    fn test_boundary_fixed_voltage() {
        let bc = BoundaryCondition::new(2, 0, 5.0);
        assert_eq!(bc.fixed_voltage(2), Some(0.0));
        assert_eq!(bc.fixed_voltage(0), Some(5.0));
        assert_eq!(bc.fixed_voltage(1), None);
        assert!(bc.is_fixed(0));
        assert!(!bc.is_fixed(1));
    }
}
