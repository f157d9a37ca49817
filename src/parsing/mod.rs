//! SQL parsing: lexer, AST, and recursive-descent parser.
//!
//! This module parses raw SQL strings in the engine's ClickHouse-flavored
//! dialect into a structured Abstract Syntax Tree. It only ensures the
//! syntax is well-formed; name resolution and typing happen at execution.

pub mod ast;
mod lexer;
pub(crate) mod parser;

use crate::error::Result;

pub use ast::Statement;
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::Parser;

/// Parses a SQL statement string into an AST.
pub fn parse_sql(sql: &str) -> Result<Statement> {
    Parser::parse(sql)
}
