//! Error types for the resistor network solver.
//!
//! This module provides a unified error type [`ResnetError`] that covers
//! all error conditions that can occur during netlist parsing, circuit
//! validation, and solving.

use thiserror::Error;

/// Result type alias using [`ResnetError`].
pub type Result<T> = std::result::Result<T, ResnetError>;

/// Unified error type for all solver operations.
#[derive(Error, Debug)]
pub enum ResnetError {
    // ============ Netlist Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Unknown element type in a netlist line
    #[error("Unknown element type '{element}' at line {line} (only resistors are supported)")]
    UnknownElement { element: String, line: usize },

    /// Duplicate resistor name
    #[error("Duplicate resistor name '{name}'")]
    DuplicateResistor { name: String },

    /// Node referenced by a directive was never declared
    #[error("Node '{node}' not found in netlist")]
    NodeNotFound { node: String },

    /// Missing ground directive
    #[error("Netlist has no ground node (use '.ground <node>' or a node named '0'/'GND')")]
    MissingGround,

    /// Missing source directive
    #[error("Netlist has no voltage source (use '.source <node> <volts>')")]
    MissingSource,

    // ============ Circuit Validation Errors ============
    /// Invalid parameter value
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Node index outside the circuit
    #[error("{role} node {index} is out of range for a circuit with {node_count} nodes")]
    NodeOutOfRange {
        role: &'static str,
        index: usize,
        node_count: usize,
    },

    /// Ground and source pinned to the same node
    #[error("Ground and source cannot both be node {node}")]
    CoincidentBoundary { node: usize },

    /// Zero, negative, non-finite or too small to invert resistance
    #[error("Connection {connection} of node {node} has invalid resistance {resistance} (must be positive with a finite conductance)")]
    NonPositiveResistance {
        node: usize,
        connection: usize,
        resistance: f64,
    },

    /// Matrix/vector shapes do not agree
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // ============ Solving Errors ============
    /// Matrix is singular and cannot be inverted
    #[error("Singular matrix at pivot {pivot} - a node may be isolated or floating")]
    SingularMatrix { pivot: usize },

    /// Solved voltage is NaN or infinite
    #[error("Solution is not finite at node {node} - the system is singular or too ill-conditioned")]
    NonFiniteSolution { node: usize },

    /// Iterative inversion did not reach its tolerance
    #[error("Iterative inversion did not converge after {iterations} iterations (residual: {residual:.2e})")]
    ConvergenceFailure { iterations: usize, residual: f64 },

    /// Requested backend was compiled out
    #[error("Backend '{backend}' is not available in this build")]
    BackendUnavailable { backend: &'static str },

    // ============ I/O Errors ============
    /// Error reading a netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a report
    #[error("Output error: {message}")]
    OutputError { message: String },

    // ============ WASM Errors ============
    /// WASM-specific error
    #[cfg(feature = "wasm")]
    #[error("WASM error: {message}")]
    WasmError { message: String },
}

impl ResnetError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a convergence failure error
    pub fn convergence_failure(iterations: usize, residual: f64) -> Self {
        Self::ConvergenceFailure {
            iterations,
            residual,
        }
    }

    /// Whether this error belongs to the invalid-input family
    /// (bad indices, non-positive resistance, shape errors).
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::NodeOutOfRange { .. }
                | Self::CoincidentBoundary { .. }
                | Self::NonPositiveResistance { .. }
                | Self::DimensionMismatch { .. }
        )
    }
}
