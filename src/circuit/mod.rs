//! Resistor network representation and validation.
//!
//! A [`Circuit`] is an adjacency list indexed by node: entry `i` holds the
//! directed [`Connection`]s leaving node `i`. A physical resistor between
//! `a` and `b` is stored as two entries, one in each list. The solver never
//! repairs a one-sided entry; [`Circuit::asymmetric_entries`] reports them.

mod graph;
mod types;
mod validate;

pub use graph::Circuit;
pub use types::*;
pub use validate::{validate_boundary, validate_circuit};
