//! Netlist parser for resistor network descriptions.
//!
//! This module provides a SPICE-inspired text format for describing
//! resistor networks together with their boundary condition. The format is
//! line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | resistor | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = '.' directive_name { argument }
//! resistor    = 'R' name node node value
//!
//! directive_name = "ground" | "source" | "node"
//! node        = identifier | number
//! value       = number [unit_suffix]
//!
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! # Directives
//!
//! | Directive | Description | Syntax |
//! |-----------|-------------|--------|
//! | .ground | Node pinned to 0 V | `.ground <node>` |
//! | .source | Node pinned to a voltage | `.source <node> <volts>` |
//! | .node | Declare nodes (fixes index order) | `.node <name> [<name> ...]` |
//!
//! A node named `0` or `GND` is used as ground when no `.ground` is given.
//!
//! # Example
//!
//! ```text
//! # Voltage divider
//! .source in 1
//! R1  in   mid  1k
//! R2  mid  0    1k
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::circuit::{BoundaryCondition, Circuit};
use crate::error::Result;

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    parser.parse()
}

/// Parse a netlist string straight into a circuit and its boundary condition.
pub fn load(input: &str) -> Result<(Circuit, BoundaryCondition)> {
    Circuit::from_ast(parse(input)?)
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::ResnetError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Connection;

    #[test]
    fn test_load_divider() {
        let (circuit, bc) = load(".source in 2\nR1 in mid 1k\nR2 mid 0 1k\n").unwrap();
        assert_eq!(circuit.node_count(), 3);
        assert_eq!(circuit.find_node("in"), Some(0));
        assert_eq!(circuit.find_node("mid"), Some(1));
        assert_eq!(bc, BoundaryCondition::new(2, 0, 2.0));
        assert_eq!(circuit.connections(1), &[Connection::new(0, 1000.0), Connection::new(2, 1000.0)]);
    }

    #[test]
    fn test_load_explicit_ground_and_order() {
        let input = ".node a b c\n.ground c\n.source a 1\nR1 a b 1\nR2 b c 1\n";
        let (circuit, bc) = load(input).unwrap();
        assert_eq!(circuit.node_name(2), "c");
        assert_eq!(bc.ground, 2);
        assert_eq!(bc.source, 0);
    }

    #[test]
    fn test_gnd_alias() {
        let (_, bc) = load(".source top 1\nR1 top GND 10\n").unwrap();
        assert_eq!(bc.ground, 1);
    }

    #[test]
    fn test_missing_source() {
        let err = load("R1 a 0 1\n").unwrap_err();
        assert!(matches!(err, crate::error::ResnetError::MissingSource));
    }

    #[test]
    fn test_missing_ground() {
        let err = load(".source a 1\nR1 a b 1\n").unwrap_err();
        assert!(matches!(err, crate::error::ResnetError::MissingGround));
    }

    #[test]
    fn test_duplicate_resistor() {
        let err = load(".source a 1\nR1 a 0 1\nR1 a 0 2\n").unwrap_err();
        assert!(matches!(err, crate::error::ResnetError::DuplicateResistor { .. }));
    }

    #[test]
    fn test_directive_on_unknown_node() {
        let err = load(".source nowhere 1\nR1 a 0 1\n").unwrap_err();
        assert!(matches!(err, crate::error::ResnetError::NodeNotFound { .. }));
    }
}
