//! DDL statement parser: CREATE TABLE, DROP TABLE.

use super::token_helper::TokenHelper;
use super::type_parser::TypeParser;
use crate::error::Result;
use crate::parsing::ast::{ColumnDef, DdlStatement, Expression, Statement};
use crate::parsing::lexer::{Keyword, TokenKind};

/// Parser trait for DDL statements.
pub trait DdlParser: TokenHelper + TypeParser {
    /// Parses an expression (provided by the expression parser).
    fn parse_expression(&mut self) -> Result<Expression>;

    /// Parses a CREATE TABLE statement.
    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(Keyword::Create.into())?;
        self.expect(Keyword::Table.into())?;

        let if_not_exists = if self.next_is(Keyword::If.into()) {
            self.expect(Keyword::Not.into())?;
            self.expect(Keyword::Exists.into())?;
            true
        } else {
            false
        };

        let name = self.next_ident()?;
        self.expect(TokenKind::OpenParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if !self.next_is(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::CloseParen)?;

        // Optional ENGINE tail: the engine name and its parameters are
        // accepted and skipped. ENGINE is not a reserved word.
        if self.next_if_ident_eq("ENGINE") {
            self.expect(TokenKind::Equal)?;
            self.next_ident()?;
            if self.next_is(TokenKind::OpenParen) {
                let mut depth = 1usize;
                while depth > 0 {
                    match self.next()?.kind {
                        TokenKind::OpenParen => depth += 1,
                        TokenKind::CloseParen => depth -= 1,
                        _ => {}
                    }
                }
            }
        }

        // Optional PRIMARY KEY and ORDER BY lists. PRIMARY and KEY are not
        // reserved words.
        let mut primary_key = Vec::new();
        if self.next_if_ident_eq("PRIMARY") {
            if !self.next_if_ident_eq("KEY") {
                return Err(self.error_here("expected KEY after PRIMARY"));
            }
            primary_key = self.parse_key_expr_list()?;
        }
        let mut order_by = Vec::new();
        if self.next_is(Keyword::Order.into()) {
            self.expect(Keyword::By.into())?;
            order_by = self.parse_key_expr_list()?;
        }

        Ok(Statement::Ddl(DdlStatement::CreateTable {
            name,
            columns,
            if_not_exists,
            primary_key,
            order_by,
        }))
    }

    /// Parses a single column definition: name, type, optional DEFAULT.
    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.next_ident()?;
        let data_type = self.parse_type()?;
        // DEFAULT is not a reserved word; match it as an identifier.
        let default = if self.next_if_ident_eq("DEFAULT") {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(ColumnDef {
            name,
            data_type,
            default,
        })
    }

    /// Parses a key expression list, parenthesized or bare.
    fn parse_key_expr_list(&mut self) -> Result<Vec<Expression>> {
        let mut exprs = Vec::new();
        if self.next_is(TokenKind::OpenParen) {
            if self.peek() != Some(&TokenKind::CloseParen) {
                loop {
                    exprs.push(self.parse_expression()?);
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::CloseParen)?;
        } else {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    /// Parses a DROP TABLE statement.
    fn parse_drop(&mut self) -> Result<Statement> {
        self.expect(Keyword::Drop.into())?;
        self.expect(Keyword::Table.into())?;
        let if_exists = if self.next_is(Keyword::If.into()) {
            self.expect(Keyword::Exists.into())?;
            true
        } else {
            false
        };
        let name = self.next_ident()?;
        Ok(Statement::Ddl(DdlStatement::DropTable { name, if_exists }))
    }
}
