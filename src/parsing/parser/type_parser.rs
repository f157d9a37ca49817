//! Type expression parser.
//!
//! Parses syntactic type expressions like `Array(Nullable(Int64))`,
//! `Decimal(10, 2)`, `Tuple(x Int64, y String)` or `DateTime('UTC')` into
//! `TypeExpr` nodes. Normalization to concrete types happens in the type
//! model, which also accepts free-form strings.

use super::token_helper::TokenHelper;
use crate::error::Result;
use crate::parsing::ast::{TypeArg, TypeExpr};
use crate::parsing::lexer::TokenKind;

/// Parser trait for type expressions.
pub trait TypeParser: TokenHelper {
    /// Parses a type expression: a type name with an optional parenthesized
    /// argument list of nested types, integers, and strings.
    fn parse_type(&mut self) -> Result<TypeExpr> {
        let name = self.next_type_name()?;
        let mut args = Vec::new();
        if self.next_is(TokenKind::OpenParen) {
            if self.peek() != Some(&TokenKind::CloseParen) {
                loop {
                    args.push(self.parse_type_arg()?);
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::CloseParen)?;
        }
        Ok(TypeExpr { name, args })
    }

    /// Parses a single argument inside a type's parameter list.
    fn parse_type_arg(&mut self) -> Result<TypeArg> {
        match self.peek() {
            Some(TokenKind::Integer(_)) => {
                let token = self.next()?;
                let TokenKind::Integer(n) = token.kind else {
                    unreachable!()
                };
                let value = n.parse::<i64>().map_err(|_| {
                    crate::error::Error::parse(
                        format!("invalid type parameter {}", n),
                        token.line,
                        token.column,
                    )
                })?;
                Ok(TypeArg::Int(value))
            }
            Some(TokenKind::String(_)) => {
                let token = self.next()?;
                let TokenKind::String(s) = token.kind else {
                    unreachable!()
                };
                // Enum8('a' = 1, ...) carries a value per name; skip it.
                if self.next_is(TokenKind::Equal) {
                    self.next()?;
                }
                Ok(TypeArg::Str(s))
            }
            _ => {
                // Either a nested type, or `name type` for a named tuple
                // element. If two type-name tokens follow each other, the
                // first is the element name.
                let name = self.next_type_name()?;
                if self.starts_type() {
                    let element = self.parse_type()?;
                    return Ok(TypeArg::Named(name, element));
                }
                let mut args = Vec::new();
                if self.next_is(TokenKind::OpenParen) {
                    if self.peek() != Some(&TokenKind::CloseParen) {
                        loop {
                            args.push(self.parse_type_arg()?);
                            if !self.next_is(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::CloseParen)?;
                }
                Ok(TypeArg::Type(TypeExpr { name, args }))
            }
        }
    }

    /// Returns the next token as a type name. Type names are identifiers,
    /// but the composite type heads (ARRAY, TUPLE, MAP, NULLABLE) lex as
    /// keywords and are accepted here too.
    fn next_type_name(&mut self) -> Result<String> {
        match self.peek() {
            Some(TokenKind::Keyword(_)) => self.next_ident_or_keyword(),
            _ => self.next_ident(),
        }
    }

    /// Whether the next token could begin a type expression.
    fn starts_type(&self) -> bool {
        matches!(
            self.peek(),
            Some(TokenKind::Ident(_) | TokenKind::QuotedIdent(_) | TokenKind::Keyword(_))
        )
    }
}
