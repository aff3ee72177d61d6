//! Parser for the netlist format.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{ResnetError, Result};

/// Parser for netlists.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            current: Token {
                kind: TokenKind::Newline,
                text: String::new(),
                line: 1,
                column: 1,
            },
        }
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();
        self.advance()?;

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let resistor = self.parse_resistor()?;
                    ast.resistors.push(resistor);
                }
                _ => {
                    return Err(ResnetError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.expect_end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect_end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(ResnetError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    /// Node names may be identifiers or bare numbers such as `0`.
    fn expect_node(&mut self) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = self.current.text.clone();
                self.advance()?;
                Ok(text)
            }
            kind => Err(ResnetError::parse(
                self.current.line,
                format!("expected node name, got {:?}", kind),
            )),
        }
    }

    fn expect_value(&mut self, what: &str) -> Result<f64> {
        if self.current.kind != TokenKind::Number {
            return Err(ResnetError::parse(
                self.current.line,
                format!("expected {}, got {:?}", what, self.current.text),
            ));
        }
        let text = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;
        parse_value(&text).ok_or_else(|| ResnetError::parse(line, format!("invalid number: {}", text)))
    }

    fn parse_directive(&mut self, ast: &mut NetlistAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".ground" | ".gnd" => {
                if ast.directives.iter().any(|d| matches!(d, Directive::Ground { .. })) {
                    return Err(ResnetError::parse(line, "duplicate .ground directive"));
                }
                let node = self.expect_node()?;
                ast.directives.push(Directive::Ground { node, line });
            }
            ".source" => {
                if ast.directives.iter().any(|d| matches!(d, Directive::Source { .. })) {
                    return Err(ResnetError::parse(line, "duplicate .source directive"));
                }
                let node = self.expect_node()?;
                let voltage = self.expect_value("source voltage")?;
                ast.directives.push(Directive::Source {
                    node,
                    voltage,
                    line,
                });
            }
            ".node" => {
                let first = self.expect_node()?;
                ast.declared_nodes.push(first);
                while matches!(self.current.kind, TokenKind::Identifier | TokenKind::Number) {
                    let node = self.expect_node()?;
                    ast.declared_nodes.push(node);
                }
            }
            ".end" => {}
            _ => {
                return Err(ResnetError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_resistor(&mut self) -> Result<ResistorDef> {
        let name = self.current.text.clone();
        let line = self.current.line;

        if !name.starts_with(['R', 'r']) {
            return Err(ResnetError::UnknownElement {
                element: name,
                line,
            });
        }
        self.advance()?;

        let a = self.expect_node()?;
        let b = self.expect_node()?;
        let resistance = self.expect_value("resistance")?;

        Ok(ResistorDef {
            name,
            nodes: [a, b],
            resistance,
            line,
        })
    }
}
