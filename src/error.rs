//! Error types for the SQL engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Lexer errors
    #[error("lex error at {line}:{column}: {message}")]
    Lex {
        message: String,
        line: u32,
        column: u32,
    },

    // Parser errors
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    // Name errors
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    DuplicateTable(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    // Type errors
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Invalid type: {0}")]
    InvalidType(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    // Conversion errors
    #[error("Conversion failed: {0}")]
    Conversion(String),

    // Function arity errors
    #[error("{function} takes {expected} arguments, got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },

    // Parser-accepted but executor-unsupported constructs
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    /// Builds a parse error at the given source position.
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Error::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Builds a lex error at the given source position.
    pub fn lex(message: impl Into<String>, line: u32, column: u32) -> Self {
        Error::Lex {
            message: message.into(),
            line,
            column,
        }
    }
}
