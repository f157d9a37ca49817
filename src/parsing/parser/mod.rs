//! Modular SQL parser implementation.
//!
//! The parser is split into several trait modules:
//! - expr_parser: expression parsing with operator precedence
//! - type_parser: data type expression parsing
//! - ddl_parser: CREATE TABLE / DROP TABLE
//! - dml_parser: SELECT / INSERT / UPDATE / DELETE
//! - token_helper: base trait for token navigation

pub mod ddl_parser;
pub mod dml_parser;
pub mod expr_parser;
pub mod token_helper;
pub mod type_parser;

use self::ddl_parser::DdlParser;
use self::dml_parser::DmlParser;
use self::expr_parser::ExpressionParser;
use self::token_helper::TokenHelper;
use self::type_parser::TypeParser;
use super::ast::{Expression, SetOperator, Statement};
use super::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::error::{Error, Result};

/// The SQL parser takes tokens from the lexer and parses the SQL syntax into
/// an Abstract Syntax Tree. The AST only ensures the syntax is well-formed;
/// whether a table or column exists is the executor's concern.
///
/// The input is lexed up front into a token buffer so that speculative
/// parses (lambda arguments) can save and restore their position.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Counter for parameter placeholders (?).
    param_count: u32,
}

impl Parser {
    /// Parses the input string into a single statement AST, ending with an
    /// optional semicolon. The entire input must be consumed.
    pub fn parse(statement: &str) -> Result<Statement> {
        let mut parser = Self::new(statement)?;
        let statement = parser.parse_statement()?;
        parser.skip(TokenKind::Semicolon);
        if let Some(kind) = TokenHelper::peek(&parser) {
            return Err(parser.error_here(format!("unexpected token {}", kind)));
        }
        Ok(statement)
    }

    /// Creates a new parser for the given string, lexing it fully.
    pub fn new(input: &str) -> Result<Parser> {
        let tokens = Lexer::new(input).collect::<Result<Vec<_>>>()?;
        Ok(Parser {
            tokens,
            pos: 0,
            param_count: 0,
        })
    }

    /// Parses a statement, followed by any number of left-associative set
    /// operations: UNION / INTERSECT / EXCEPT [ALL | DISTINCT].
    pub fn parse_statement(&mut self) -> Result<Statement> {
        let mut statement = self.parse_single_statement()?;
        loop {
            let op = match TokenHelper::peek(self) {
                Some(TokenKind::Keyword(Keyword::Union)) => SetOperator::Union,
                Some(TokenKind::Keyword(Keyword::Intersect)) => SetOperator::Intersect,
                Some(TokenKind::Keyword(Keyword::Except)) => SetOperator::Except,
                _ => break,
            };
            TokenHelper::next(self)?;
            let all = self.next_is(Keyword::All.into());
            if !all {
                self.skip(Keyword::Distinct.into());
            }
            let right = self.parse_single_statement()?;
            statement = Statement::SetOperation {
                left: Box::new(statement),
                op,
                all,
                right: Box::new(right),
            };
        }
        Ok(statement)
    }

    /// Parses a single statement, dispatching on the leading token.
    fn parse_single_statement(&mut self) -> Result<Statement> {
        match TokenHelper::peek(self) {
            Some(TokenKind::Keyword(Keyword::Select | Keyword::With)) => {
                DmlParser::parse_select(self)
            }
            Some(TokenKind::Keyword(Keyword::Insert)) => DmlParser::parse_insert(self),
            Some(TokenKind::Keyword(Keyword::Update)) => DmlParser::parse_update(self),
            Some(TokenKind::Keyword(Keyword::Delete)) => DmlParser::parse_delete(self),
            Some(TokenKind::Keyword(Keyword::Create)) => DdlParser::parse_create(self),
            Some(TokenKind::Keyword(Keyword::Drop)) => DdlParser::parse_drop(self),
            Some(TokenKind::OpenParen) => {
                self.expect(TokenKind::OpenParen)?;
                let statement = self.parse_statement()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(statement)
            }
            Some(kind) => Err(self.error_here(format!("expected statement, found {}", kind))),
            None => Err(self.error_here("expected statement, found end of input")),
        }
    }
}

impl TokenHelper for Parser {
    fn position(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, position: usize) {
        self.pos = position;
    }

    fn next(&mut self) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token.clone())
            }
            None => {
                let (line, column) = self.next_pos();
                Err(Error::parse("unexpected end of input", line, column))
            }
        }
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn next_pos(&self) -> (u32, u32) {
        match self.tokens.get(self.pos).or_else(|| self.tokens.last()) {
            Some(token) => (token.line, token.column),
            None => (1, 1),
        }
    }
}

impl ExpressionParser for Parser {
    fn increment_param_count(&mut self) -> u32 {
        let idx = self.param_count;
        self.param_count += 1;
        idx
    }
}

impl TypeParser for Parser {}

impl DmlParser for Parser {
    fn parse_expression(&mut self) -> Result<Expression> {
        ExpressionParser::parse_expression(self)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        Parser::parse_statement(self)
    }
}

impl DdlParser for Parser {
    fn parse_expression(&mut self) -> Result<Expression> {
        ExpressionParser::parse_expression(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::ast::{
        DdlStatement, DmlStatement, JoinKind, Literal, Operator, SetOperator, TableRef,
    };

    fn parse(sql: &str) -> Statement {
        Parser::parse(sql).expect(sql)
    }

    #[test]
    fn test_parse_select() {
        let stmt = parse("SELECT name, age FROM users WHERE age > 25 ORDER BY age");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.select.len(), 2);
        assert!(select.r#where.is_some());
        assert_eq!(select.order_by.len(), 1);
    }

    #[test]
    fn test_parse_insert() {
        let stmt = parse("INSERT INTO users (id, name) VALUES (1, 'Alice'), (2, 'Bob')");
        assert!(matches!(
            stmt,
            Statement::Dml(DmlStatement::Insert { .. })
        ));
    }

    #[test]
    fn test_parse_update() {
        let stmt = parse("UPDATE users SET name = 'Bob' WHERE id = 1");
        assert!(matches!(
            stmt,
            Statement::Dml(DmlStatement::Update { .. })
        ));
    }

    #[test]
    fn test_parse_delete() {
        let stmt = parse("DELETE FROM users WHERE id = 1");
        assert!(matches!(
            stmt,
            Statement::Dml(DmlStatement::Delete { .. })
        ));
    }

    #[test]
    fn test_parse_create_table() {
        let stmt = parse(
            "CREATE TABLE IF NOT EXISTS t (id Int64, name Nullable(String)) \
             ENGINE = MergeTree() ORDER BY id",
        );
        let Statement::Ddl(DdlStatement::CreateTable {
            columns,
            if_not_exists,
            order_by,
            ..
        }) = stmt
        else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(columns.len(), 2);
        assert!(if_not_exists);
        assert_eq!(order_by.len(), 1);
    }

    #[test]
    fn test_parse_drop_table() {
        assert!(matches!(
            parse("DROP TABLE IF EXISTS t"),
            Statement::Ddl(DdlStatement::DropTable {
                if_exists: true,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_set_operation_left_associative() {
        let stmt = parse("SELECT 1 UNION SELECT 2 UNION ALL SELECT 3");
        let Statement::SetOperation {
            left, op, all: true, ..
        } = stmt
        else {
            panic!("expected set operation");
        };
        assert_eq!(op, SetOperator::Union);
        assert!(matches!(*left, Statement::SetOperation { all: false, .. }));
    }

    #[test]
    fn test_parse_cte() {
        let stmt = parse("WITH doubled AS (SELECT number * 2 AS value FROM numbers(5)) SELECT value FROM doubled");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(select.with.len(), 1);
        assert_eq!(select.with[0].name, "doubled");
    }

    #[test]
    fn test_parse_joins() {
        let stmt = parse("SELECT * FROM a LEFT JOIN b ON a.id = b.id CROSS JOIN c");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let Some(TableRef::Join { kind, left, .. }) = select.from else {
            panic!("expected join");
        };
        assert_eq!(kind, JoinKind::Cross);
        assert!(matches!(
            *left,
            TableRef::Join {
                kind: JoinKind::Left,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_comma_is_cross_join() {
        let stmt = parse("SELECT * FROM a, b");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert!(matches!(
            select.from,
            Some(TableRef::Join {
                kind: JoinKind::Cross,
                ..
            })
        ));
    }

    #[test]
    fn test_parse_window_function() {
        let stmt = parse("SELECT row_number() OVER (PARTITION BY a ORDER BY b DESC) FROM t");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let Expression::WindowFunction { name, over, .. } = &select.select[0].0 else {
            panic!("expected window function");
        };
        assert_eq!(name, "row_number");
        assert_eq!(over.partition_by.len(), 1);
        assert_eq!(over.order_by.len(), 1);
    }

    #[test]
    fn test_parse_lambda_argument() {
        let stmt = parse("SELECT arrayMap(x -> x + 1, [1, 2, 3])");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let Expression::Function { args, .. } = &select.select[0].0 else {
            panic!("expected function");
        };
        assert!(matches!(args[0], Expression::Lambda { .. }));
    }

    #[test]
    fn test_parse_precedence() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let stmt = parse("SELECT 1 + 2 * 3");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let Expression::Operator(Operator::Add(_, rhs)) = &select.select[0].0 else {
            panic!("expected addition at the root");
        };
        assert!(matches!(**rhs, Expression::Operator(Operator::Multiply(_, _))));
    }

    #[test]
    fn test_parse_cast_postfix() {
        let stmt = parse("SELECT '42'::Int64");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let Expression::Cast { target, .. } = &select.select[0].0 else {
            panic!("expected cast");
        };
        assert_eq!(target.name, "Int64");
    }

    #[test]
    fn test_parse_ternary() {
        let stmt = parse("SELECT a > 1 ? 'big' : 'small' FROM t");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert!(matches!(select.select[0].0, Expression::Ternary { .. }));
    }

    #[test]
    fn test_parse_between_not_in() {
        let stmt = parse("SELECT * FROM t WHERE a BETWEEN 1 AND 5 AND b NOT IN (1, 2)");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        let Some(Expression::Operator(Operator::And(lhs, rhs))) = select.r#where else {
            panic!("expected AND");
        };
        assert!(matches!(*lhs, Expression::Between { negated: false, .. }));
        assert!(matches!(*rhs, Expression::InList { negated: true, .. }));
    }

    #[test]
    fn test_parse_error_has_position() {
        let err = Parser::parse("SELECT FROM").unwrap_err();
        match err {
            Error::Parse { line, column, .. } => {
                assert_eq!(line, 1);
                assert_eq!(column, 8);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_limit_comma_form() {
        let stmt = parse("SELECT * FROM t LIMIT 5, 10");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert_eq!(
            select.offset,
            Some(Expression::Literal(Literal::Integer(5)))
        );
        assert_eq!(select.limit, Some(Expression::Literal(Literal::Integer(10))));
    }

    #[test]
    fn test_parse_array_join() {
        let stmt = parse("SELECT x FROM t ARRAY JOIN arr AS x");
        let Statement::Select(select) = stmt else {
            panic!("expected SELECT");
        };
        assert!(matches!(select.from, Some(TableRef::ArrayJoin { .. })));
    }
}
