//! Error types for the gradspice solver.
//!
//! This module provides a unified error type [`GradspiceError`] covering
//! netlist parsing, circuit construction, verification and driver
//! configuration. Failing to converge is not an error: the driver reports it.

use thiserror::Error;

use crate::circuit::{NodeId, TerminalId};

/// Result type alias using [`GradspiceError`].
pub type Result<T> = std::result::Result<T, GradspiceError>;

/// Unified error type for all gradspice operations.
#[derive(Error, Debug)]
pub enum GradspiceError {
    // ============ Netlist Errors ============
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

    /// Invalid element line
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    /// Node name not present in the circuit
    #[error("Node '{node}' not found in circuit")]
    NodeNotFound { node: String },

    // ============ Construction Errors ============
    /// Invalid component parameter (e.g. zero resistance)
    #[error("Invalid parameter '{param}' for component '{component}': {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    /// Terminal handle that names no terminal
    #[error("Terminal {terminal} does not exist")]
    InvalidTerminal { terminal: TerminalId },

    /// Terminal wired a second time
    #[error("Terminal {terminal} is already connected to node {node}")]
    TerminalAlreadyConnected { terminal: TerminalId, node: NodeId },

    /// Connection list does not match the component's terminal count
    #[error("Component '{component}' has {expected} terminal(s) but {actual} connection(s) were given")]
    ConnectionMismatch {
        component: String,
        expected: usize,
        actual: usize,
    },

    // ============ Verification Errors ============
    /// A terminal was never wired to a node
    #[error("Component '{component}' has a non-connected terminal ({terminal})")]
    UnconnectedTerminal { component: String, terminal: usize },

    // ============ Simulation Errors ============
    /// Invalid driver parameter
    #[error("Invalid simulation parameter: {message}")]
    InvalidSimulationParam { message: String },

    /// Relaxation blew up instead of settling
    #[error("Simulation diverged at instant {instant} (t = {time}s, error {error:e})")]
    Diverged { instant: usize, time: f64, error: f64 },

    // ============ I/O Errors ============
    /// Error reading a netlist file
    #[error("Failed to read netlist file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GradspiceError {
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

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an invalid simulation parameter error
    pub fn simulation_param(message: impl Into<String>) -> Self {
        Self::InvalidSimulationParam {
            message: message.into(),
        }
    }
}
