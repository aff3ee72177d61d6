//! # Resnet Core
//!
//! Steady-state solver for networks of resistors.
//!
//! This library provides:
//! - Translation of a resistor network plus a fixed-voltage boundary into a
//!   nodal (KCL) linear system
//! - A direct solver that inverts the system on a pluggable dense backend
//! - A relaxation solver that approaches the same answer without forming a matrix
//! - A small netlist format for describing networks in text
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - Adjacency-list network representation and validation
//! - [`netlist`] - Parser for the netlist text format
//! - [`linalg`] - Dense matrices and the sequential, parallel and iterative backends
//! - [`solver`] - Matrix assembly, direct and relaxation solvers, result checks
//! - [`report`] - Text rendering of solutions (CLI only)
//!
//! ## Usage
//!
//! ### Native CLI
//!
//! ```bash
//! resnet solve divider.net --backend parallel --check
//! resnet solve divider.net --method relaxation --iterations 20000 --learning-rate 0.05
//! resnet bench --size 300
//! ```
//!
//! ### Library
//!
//! ```
//! use resnet_core::{circuit::Circuit, linalg::BackendKind, solver::solve_direct};
//!
//! let mut circuit = Circuit::with_nodes(3);
//! circuit.add_resistor(0, 1, 1.0).unwrap();
//! circuit.add_resistor(1, 2, 1.0).unwrap();
//!
//! let results = solve_direct(&circuit, 2, 0, 1.0, BackendKind::Sequential).unwrap();
//! assert!((results[1].voltage - 0.5).abs() < 1e-12);
//! ```
//!
//! ## Solution Method
//!
//! For a network with ground node `g`, source node `s` and source voltage `V`:
//!
//! 1. Assemble `M x = b`: identity rows for `g` and `s`, a KCL row for every other node
//! 2. Solve for node voltages, directly (`x = M^-1 b`) or by relaxation
//! 3. Derive each branch current as `(V[i] - V[to]) / R`
//!
//! A network with a node that reaches neither `g` nor `s` has a singular `M`
//! and is rejected by the direct solver.

pub mod circuit;
pub mod error;
pub mod linalg;
pub mod netlist;
pub mod solver;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use circuit::{BoundaryCondition, Circuit, Connection};
pub use error::{ResnetError, Result};
pub use linalg::BackendKind;
pub use solver::{NetworkSolver, Solution, SolverConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmNetworkSolver;
