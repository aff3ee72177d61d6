//! Abstract Syntax Tree types for the netlist format.

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct NetlistAst {
    /// All resistor instances, in file order
    pub resistors: Vec<ResistorDef>,
    /// Boundary directives
    pub directives: Vec<Directive>,
    /// Nodes declared with `.node`, in declaration order
    pub declared_nodes: Vec<String>,
}

impl NetlistAst {
    /// Create a new empty netlist AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A resistor definition from the netlist.
#[derive(Debug, Clone, PartialEq)]
pub struct ResistorDef {
    /// Unique resistor name
    pub name: String,
    /// Connected node names
    pub nodes: [String; 2],
    /// Resistance in ohms (validated later, not by the parser)
    pub resistance: f64,
    /// Source line number for error reporting
    pub line: usize,
}

/// A boundary directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// `.ground <node>`
    Ground { node: String, line: usize },
    /// `.source <node> <volts>`
    Source {
        node: String,
        voltage: f64,
        line: usize,
    },
}
