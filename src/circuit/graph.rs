//! Circuit graph structure.

use std::collections::HashMap;

use super::types::{BoundaryCondition, Connection, NodeIndex};
use crate::error::{ResnetError, Result};
use crate::netlist::{Directive, NetlistAst};

/// A resistor network stored as per-node adjacency lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    /// Outgoing connections, index-aligned with node identity
    adjacency: Vec<Vec<Connection>>,

    /// Optional node names (from a netlist), index-aligned with `adjacency`
    node_names: Vec<String>,
}

impl Circuit {
    /// Create a circuit with `node_count` unconnected nodes.
    pub fn with_nodes(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            node_names: Vec::new(),
        }
    }

    /// Wrap an existing adjacency list. No symmetry repair is performed.
    pub fn from_adjacency(adjacency: Vec<Vec<Connection>>) -> Self {
        Self {
            adjacency,
            node_names: Vec::new(),
        }
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self) -> NodeIndex {
        self.adjacency.push(Vec::new());
        self.adjacency.len() - 1
    }

    /// Add a resistor between `a` and `b` as two directed entries.
    pub fn add_resistor(&mut self, a: NodeIndex, b: NodeIndex, resistance: f64) -> Result<()> {
        let node_count = self.node_count();
        for (role, index) in [("first", a), ("second", b)] {
            if index >= node_count {
                return Err(ResnetError::NodeOutOfRange {
                    role,
                    index,
                    node_count,
                });
            }
        }
        self.adjacency[a].push(Connection::new(b, resistance));
        self.adjacency[b].push(Connection::new(a, resistance));
        Ok(())
    }

    /// Add a single directed entry. Used to build deliberately one-sided lists.
    pub fn add_connection(&mut self, from: NodeIndex, connection: Connection) -> Result<()> {
        let node_count = self.node_count();
        let list = self
            .adjacency
            .get_mut(from)
            .ok_or(ResnetError::NodeOutOfRange {
                role: "from",
                index: from,
                node_count,
            })?;
        list.push(connection);
        Ok(())
    }

    /// Number of nodes in the network.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the circuit has no nodes.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Outgoing connections of a node.
    pub fn connections(&self, node: NodeIndex) -> &[Connection] {
        &self.adjacency[node]
    }

    /// The full adjacency list.
    pub fn adjacency(&self) -> &[Vec<Connection>] {
        &self.adjacency
    }

    /// Iterate over `(node, connections)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &[Connection])> {
        self.adjacency
            .iter()
            .enumerate()
            .map(|(i, list)| (i, list.as_slice()))
    }

    /// Total number of directed entries.
    pub fn connection_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Get the name of a node, falling back to `N<index>`.
    pub fn node_name(&self, node: NodeIndex) -> String {
        self.node_names
            .get(node)
            .cloned()
            .unwrap_or_else(|| format!("N{}", node))
    }

    /// Find a node index by name.
    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.node_names.iter().position(|n| n == name)
    }

    /// Directed entries `(node, position)` that have no matching reverse entry
    /// with the same resistance. Parallel resistors are matched by count.
    pub fn asymmetric_entries(&self) -> Vec<(NodeIndex, usize)> {
        let mut out = Vec::new();
        for (i, list) in self.iter() {
            for (k, conn) in list.iter().enumerate() {
                let forward = list
                    .iter()
                    .filter(|c| c.to == conn.to && same_resistance(c.resistance, conn.resistance))
                    .count();
                let backward = self
                    .adjacency
                    .get(conn.to)
                    .map(|back| {
                        back.iter()
                            .filter(|c| c.to == i && same_resistance(c.resistance, conn.resistance))
                            .count()
                    })
                    .unwrap_or(0);
                if forward != backward {
                    out.push((i, k));
                }
            }
        }
        out
    }

    /// Check that every directed entry has a matching reverse entry.
    pub fn is_symmetric(&self) -> bool {
        self.asymmetric_entries().is_empty()
    }

    /// Build a circuit and its boundary condition from a parsed netlist.
    pub fn from_ast(ast: NetlistAst) -> Result<(Self, BoundaryCondition)> {
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();
        let mut node_names = Vec::new();

        // Explicit declarations fix the ordering; the rest follow first use
        for name in ast.declared_nodes.iter().chain(
            ast.resistors
                .iter()
                .flat_map(|r| r.nodes.iter()),
        ) {
            let normalized = normalize_node(name);
            if !node_map.contains_key(&normalized) {
                node_map.insert(normalized.clone(), node_names.len());
                node_names.push(normalized);
            }
        }

        let lookup = |name: &str| -> Result<NodeIndex> {
            node_map
                .get(&normalize_node(name))
                .copied()
                .ok_or_else(|| ResnetError::NodeNotFound {
                    node: name.to_string(),
                })
        };

        let mut ground = None;
        let mut source = None;
        for directive in &ast.directives {
            match directive {
                Directive::Ground { node, .. } => ground = Some(lookup(node)?),
                Directive::Source { node, voltage, .. } => source = Some((lookup(node)?, *voltage)),
            }
        }

        let ground = match ground {
            Some(g) => g,
            None => node_map.get("0").copied().ok_or(ResnetError::MissingGround)?,
        };
        let (source, source_voltage) = source.ok_or(ResnetError::MissingSource)?;

        let mut circuit = Circuit {
            adjacency: vec![Vec::new(); node_names.len()],
            node_names,
        };

        let mut seen = HashMap::new();
        for resistor in &ast.resistors {
            if seen.insert(resistor.name.clone(), resistor.line).is_some() {
                return Err(ResnetError::DuplicateResistor {
                    name: resistor.name.clone(),
                });
            }
            let a = lookup(&resistor.nodes[0])?;
            let b = lookup(&resistor.nodes[1])?;
            circuit.add_resistor(a, b, resistor.resistance)?;
        }

        Ok((circuit, BoundaryCondition::new(ground, source, source_voltage)))
    }
}

fn normalize_node(name: &str) -> String {
    if name.eq_ignore_ascii_case("GND") {
        "0".to_string()
    } else {
        name.to_string()
    }
}

fn same_resistance(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-12 * a.abs().max(b.abs())
}
