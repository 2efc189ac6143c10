//! Netlist language for circuit descriptions.
//!
//! A SPICE-flavoured, line-oriented text format for the circuits the solver
//! understands, plus directives for the simulation driver.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | element | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = '.' directive_name value
//! element     = prefixed | keyword
//! prefixed    = ('R' | 'C' | 'V' | 'B') name_rest node node value
//! keyword     = ('REF' | 'PROBE') name node
//!
//! directive_name = "tstep" | "rate" | "tolerance" | "instants" | "iterations"
//! node        = identifier | integer      ; "0" and "GND" are ground
//! value       = number [unit_suffix]
//!
//! number      = ['-'|'+'] digit+ ['.' digit*] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! # Elements
//!
//! | Type | Description | Syntax |
//! |------|-------------|--------|
//! | R | Resistor | `R<name> <n0> <n1> <ohms>` |
//! | C | Capacitor | `C<name> <n0> <n1> <farads>` |
//! | V, B | Voltage source | `V<name> <n0> <n1> <volts>` (drives n1 above n0) |
//! | REF | Ground reference | `REF <name> <node>` |
//! | PROBE | Voltage probe | `PROBE <name> <node>` |
//!
//! # Directives
//!
//! | Directive | Description |
//! |-----------|-------------|
//! | `.tstep <s>` | Time step between instants |
//! | `.rate <r>` | Learning rate |
//! | `.instants <n>` | Number of simulated instants |
//! | `.iterations <n>` | Iteration budget per instant |
//! | `.tolerance <e>` | Convergence threshold |
//!
//! # Example
//!
//! ```text
//! # RC charging
//! .tstep 1m
//! REF gnd 0
//! B1   0    in   1.5
//! R1   in   out  10
//! C1   0    out  10m
//! PROBE vout out
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<CircuitAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a netlist file.
pub fn parse_file(path: &std::path::Path) -> Result<CircuitAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::GradspiceError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
