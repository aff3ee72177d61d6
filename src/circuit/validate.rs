//! Circuit validation.

use log::warn;

use crate::error::{ResnetError, Result};

use super::{BoundaryCondition, Circuit};

/// Validate the structure of a circuit.
///
/// Checks:
/// - Every connection targets a node inside the circuit
/// - Every resistance is finite and strictly positive, with a finite conductance
///
/// One-sided entries are reported with a warning but not rejected.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    let node_count = circuit.node_count();

    for (node, list) in circuit.iter() {
        for (connection, conn) in list.iter().enumerate() {
            if conn.to >= node_count {
                return Err(ResnetError::NodeOutOfRange {
                    role: "connection target",
                    index: conn.to,
                    node_count,
                });
            }
            if !(conn.resistance > 0.0)
                || !conn.resistance.is_finite()
                || !conn.conductance().is_finite()
            {
                return Err(ResnetError::NonPositiveResistance {
                    node,
                    connection,
                    resistance: conn.resistance,
                });
            }
        }
    }

    let asymmetric = circuit.asymmetric_entries();
    if !asymmetric.is_empty() {
        warn!(
            "{} connection(s) have no matching reverse entry (first at node {}); conductance matrix will be asymmetric",
            asymmetric.len(),
            asymmetric[0].0
        );
    }

    Ok(())
}

/// Validate a boundary condition against a circuit.
pub fn validate_boundary(circuit: &Circuit, boundary: &BoundaryCondition) -> Result<()> {
    let node_count = circuit.node_count();

    if boundary.ground >= node_count {
        return Err(ResnetError::NodeOutOfRange {
            role: "Ground",
            index: boundary.ground,
            node_count,
        });
    }

    if boundary.source >= node_count {
        return Err(ResnetError::NodeOutOfRange {
            role: "Source",
            index: boundary.source,
            node_count,
        });
    }

    if boundary.ground == boundary.source {
        return Err(ResnetError::CoincidentBoundary {
            node: boundary.ground,
        });
    }

    if !boundary.source_voltage.is_finite() {
        return Err(ResnetError::invalid_parameter(
            "source_voltage",
            format!("must be finite, got {}", boundary.source_voltage),
        ));
    }

    Ok(())
}
