//! WASM bindings for Resnet Core.
//!
//! This module provides JavaScript-friendly bindings for solving resistor
//! networks in the browser.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmNetworkSolver } from 'resnet_core';
//!
//! await init();
//!
//! const netlist = `
//!   .ground 0
//!   .source in 1.0
//!   R1 in mid 1k
//!   R2 mid 0 1k
//! `;
//!
//! const solver = new WasmNetworkSolver(netlist);
//! const voltages = solver.solve_direct("parallel");
//! console.log(solver.node_voltage("mid"));
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{BoundaryCondition, Circuit};
use crate::error::ResnetError;
use crate::linalg::BackendKind;
use crate::netlist;
use crate::solver::{DirectSolver, RelaxationConfig, RelaxationSolver, Solution};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js(e: ResnetError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// WASM-compatible resistor network solver.
///
/// Holds a parsed network and the most recent solution, so voltages and
/// currents can be queried after a solve call.
#[wasm_bindgen]
pub struct WasmNetworkSolver {
    circuit: Circuit,
    boundary: BoundaryCondition,
    solution: Option<Solution>,
}

#[wasm_bindgen]
impl WasmNetworkSolver {
    /// Parse a netlist and validate the network.
    ///
    /// # Example
    /// ```javascript
    /// const solver = new WasmNetworkSolver(netlist);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(netlist_source: &str) -> Result<WasmNetworkSolver, JsValue> {
        let (circuit, boundary) = netlist::load(netlist_source).map_err(to_js)?;

        crate::circuit::validate_circuit(&circuit).map_err(to_js)?;
        crate::circuit::validate_boundary(&circuit, &boundary).map_err(to_js)?;

        Ok(WasmNetworkSolver {
            circuit,
            boundary,
            solution: None,
        })
    }

    /// Solve by matrix inversion and return node voltages.
    ///
    /// # Arguments
    /// * `backend` - `"sequential"`, `"parallel"` or `"iterative"`
    #[wasm_bindgen]
    pub fn solve_direct(&mut self, backend: &str) -> Result<Vec<f64>, JsValue> {
        let kind: BackendKind = backend.parse().map_err(to_js)?;
        let solution = DirectSolver::new(kind)
            .and_then(|solver| solver.solve(&self.circuit, self.boundary))
            .map_err(to_js)?;
        let voltages = solution.voltages.clone();
        self.solution = Some(solution);
        Ok(voltages)
    }

    /// Solve by relaxation and return node voltages.
    ///
    /// # Arguments
    /// * `iterations` - Number of passes over all nodes
    /// * `learning_rate` - Step size; too large a value diverges
    #[wasm_bindgen]
    pub fn solve_relaxation(
        &mut self,
        iterations: usize,
        learning_rate: f64,
    ) -> Result<Vec<f64>, JsValue> {
        let config = RelaxationConfig::new()
            .with_iterations(iterations)
            .with_learning_rate(learning_rate);
        let (solution, _report) = RelaxationSolver::new(config)
            .solve(&self.circuit, self.boundary)
            .map_err(to_js)?;
        let voltages = solution.voltages.clone();
        self.solution = Some(solution);
        Ok(voltages)
    }

    /// Number of nodes in the network.
    #[wasm_bindgen(getter)]
    pub fn node_count(&self) -> usize {
        self.circuit.node_count()
    }

    /// Voltage at a named node from the last solve.
    ///
    /// # Returns
    /// The voltage, or `undefined` if the node doesn't exist or nothing was solved yet.
    #[wasm_bindgen]
    pub fn node_voltage(&self, node_name: &str) -> Option<f64> {
        let node = self.circuit.find_node(node_name)?;
        self.solution.as_ref().map(|s| s.voltage(node))
    }

    /// Current through connection `connection` of node `node` from the last solve.
    #[wasm_bindgen]
    pub fn branch_current(&self, node: usize, connection: usize) -> Result<f64, JsValue> {
        let solution = self.solution.as_ref().ok_or_else(|| {
            to_js(ResnetError::WasmError {
                message: "no solution yet; call solve_direct or solve_relaxation first".into(),
            })
        })?;
        solution
            .results
            .get(node)
            .and_then(|r| r.connections.get(connection))
            .map(|c| c.current)
            .ok_or_else(|| {
                to_js(ResnetError::WasmError {
                    message: format!("no connection {} at node {}", connection, node),
                })
            })
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
