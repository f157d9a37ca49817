//! DML statement parser: SELECT (with CTEs), INSERT, UPDATE, DELETE.

use super::token_helper::TokenHelper;
use crate::error::Result;
use crate::parsing::ast::{
    CommonTableExpr, Direction, DmlStatement, Expression, InsertSource, JoinKind, NullsOrder,
    OrderByItem, SelectStatement, Statement, TableRef,
};
use crate::parsing::lexer::{Keyword, TokenKind};

/// Parser trait for DML statements.
pub trait DmlParser: TokenHelper {
    /// Parses an expression (provided by the expression parser).
    fn parse_expression(&mut self) -> Result<Expression>;

    /// Parses a complete statement, including set operations (provided by
    /// the top-level parser). Used for subqueries and CTE bodies.
    fn parse_statement(&mut self) -> Result<Statement>;

    /// Parses a SELECT statement, with an optional WITH prefix.
    fn parse_select(&mut self) -> Result<Statement> {
        let with = self.parse_with_clause()?;
        let mut select = self.parse_select_body()?;
        select.with = with;
        Ok(Statement::Select(Box::new(select)))
    }

    /// Parses a WITH clause, if present: `WITH [RECURSIVE] name [(cols)] AS
    /// (statement), ...`. RECURSIVE is accepted and ignored.
    fn parse_with_clause(&mut self) -> Result<Vec<CommonTableExpr>> {
        if !self.next_is(Keyword::With.into()) {
            return Ok(Vec::new());
        }
        self.skip(Keyword::Recursive.into());
        let mut ctes = Vec::new();
        loop {
            let name = self.next_ident()?;
            let mut columns = Vec::new();
            if self.next_is(TokenKind::OpenParen) {
                loop {
                    columns.push(self.next_ident_or_keyword()?);
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::CloseParen)?;
            }
            self.expect(Keyword::As.into())?;
            self.expect(TokenKind::OpenParen)?;
            let statement = self.parse_statement()?;
            self.expect(TokenKind::CloseParen)?;
            ctes.push(CommonTableExpr {
                name,
                columns,
                statement: Box::new(statement),
            });
            if !self.next_is(TokenKind::Comma) {
                break;
            }
        }
        Ok(ctes)
    }

    /// Parses the body of a SELECT statement, without any WITH prefix.
    fn parse_select_body(&mut self) -> Result<SelectStatement> {
        self.expect(Keyword::Select.into())?;
        let distinct = self.next_is(Keyword::Distinct.into());
        if !distinct {
            self.skip(Keyword::All.into());
        }

        let mut select = Vec::new();
        loop {
            let expr = self.parse_expression()?;
            let mut alias = None;
            if self.next_is(Keyword::As.into()) {
                alias = Some(self.next_ident_or_keyword()?);
            } else if matches!(
                self.peek(),
                Some(TokenKind::Ident(_) | TokenKind::QuotedIdent(_))
            ) {
                alias = Some(self.next_ident()?);
            }
            select.push((expr, alias));
            if !self.next_is(TokenKind::Comma) {
                break;
            }
        }

        let from = self.parse_from_clause()?;
        let r#where = self.parse_where_clause()?;
        let group_by = self.parse_group_by_clause()?;
        let having = self.parse_having_clause()?;
        let order_by = if self.next_is(Keyword::Order.into()) {
            self.expect(Keyword::By.into())?;
            self.parse_order_by_items()?
        } else {
            Vec::new()
        };
        let (limit, offset) = self.parse_limit_offset_clause()?;

        Ok(SelectStatement {
            with: Vec::new(),
            distinct,
            select,
            from,
            r#where,
            group_by,
            having,
            order_by,
            limit,
            offset,
        })
    }

    /// Parses a FROM clause, if present. Consecutive table references and
    /// join clauses fold left-associatively into a join tree; a bare comma
    /// is a CROSS JOIN.
    fn parse_from_clause(&mut self) -> Result<Option<TableRef>> {
        if !self.next_is(Keyword::From.into()) {
            return Ok(None);
        }
        let mut from = self.parse_table_ref()?;
        loop {
            // ARRAY JOIN expands arrays; not part of the join-kind table.
            if self.peek() == Some(&TokenKind::Keyword(Keyword::Array))
                && self.peek_at(1) == Some(&TokenKind::Keyword(Keyword::Join))
            {
                self.next()?;
                self.next()?;
                let mut exprs = Vec::new();
                loop {
                    let expr = self.parse_expression()?;
                    let alias = if self.next_is(Keyword::As.into()) {
                        Some(self.next_ident()?)
                    } else {
                        None
                    };
                    exprs.push((expr, alias));
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
                from = TableRef::ArrayJoin {
                    left: Box::new(from),
                    exprs,
                };
                continue;
            }

            let Some(kind) = self.parse_join_kind()? else {
                break;
            };
            let right = self.parse_table_ref()?;
            let mut predicate = None;
            let mut using = None;
            if kind != JoinKind::Cross {
                if self.next_is(Keyword::On.into()) {
                    predicate = Some(self.parse_expression()?);
                } else if self.next_is(Keyword::Using.into()) {
                    let mut columns = Vec::new();
                    let parenthesized = self.next_is(TokenKind::OpenParen);
                    loop {
                        columns.push(self.next_ident()?);
                        if !self.next_is(TokenKind::Comma) {
                            break;
                        }
                    }
                    if parenthesized {
                        self.expect(TokenKind::CloseParen)?;
                    }
                    using = Some(columns);
                }
            }
            from = TableRef::Join {
                left: Box::new(from),
                kind,
                right: Box::new(right),
                predicate,
                using,
            };
        }
        Ok(Some(from))
    }

    /// Parses a join clause introducer, if present. GLOBAL and ANY prefixes
    /// are consumed and ignored. Returns the join kind.
    fn parse_join_kind(&mut self) -> Result<Option<JoinKind>> {
        // A comma between table references is a cross join.
        if self.next_is(TokenKind::Comma) {
            return Ok(Some(JoinKind::Cross));
        }

        let saved = self.position();
        self.skip(Keyword::Global.into());
        self.skip(Keyword::Any.into());

        let kind = match self.peek() {
            Some(TokenKind::Keyword(Keyword::Join)) => {
                self.next()?;
                return Ok(Some(JoinKind::Inner));
            }
            Some(TokenKind::Keyword(Keyword::Inner)) => {
                self.next()?;
                JoinKind::Inner
            }
            Some(TokenKind::Keyword(Keyword::Cross)) => {
                self.next()?;
                JoinKind::Cross
            }
            Some(TokenKind::Keyword(Keyword::Asof)) => {
                self.next()?;
                JoinKind::Asof
            }
            Some(TokenKind::Keyword(Keyword::Left)) => {
                self.next()?;
                if self.next_is(Keyword::Semi.into()) {
                    JoinKind::LeftSemi
                } else if self.next_is(Keyword::Anti.into()) {
                    JoinKind::LeftAnti
                } else {
                    self.skip(Keyword::Outer.into());
                    JoinKind::Left
                }
            }
            Some(TokenKind::Keyword(Keyword::Right)) => {
                self.next()?;
                if self.next_is(Keyword::Semi.into()) {
                    JoinKind::RightSemi
                } else if self.next_is(Keyword::Anti.into()) {
                    JoinKind::RightAnti
                } else {
                    self.skip(Keyword::Outer.into());
                    JoinKind::Right
                }
            }
            Some(TokenKind::Keyword(Keyword::Full)) => {
                self.next()?;
                self.skip(Keyword::Outer.into());
                JoinKind::Full
            }
            _ => {
                self.restore(saved);
                return Ok(None);
            }
        };
        // All non-bare forms take an optional JOIN keyword.
        self.skip(Keyword::Join.into());
        Ok(Some(kind))
    }

    /// Parses a single table reference: a named table, a table function, or
    /// a parenthesized subquery, each with an optional alias.
    fn parse_table_ref(&mut self) -> Result<TableRef> {
        if self.next_is(TokenKind::OpenParen) {
            let statement = self.parse_statement()?;
            self.expect(TokenKind::CloseParen)?;
            self.skip(Keyword::As.into());
            let alias = self.next_ident()?;
            return Ok(TableRef::Subquery {
                statement: Box::new(statement),
                alias,
            });
        }

        let name = self.next_ident()?;

        // A table function: name(args).
        if self.next_is(TokenKind::OpenParen) {
            let mut args = Vec::new();
            if self.peek() != Some(&TokenKind::CloseParen) {
                loop {
                    args.push(self.parse_expression()?);
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::CloseParen)?;
            let alias = self.parse_table_alias()?;
            return Ok(TableRef::TableFunction { name, args, alias });
        }

        // FINAL is accepted after a table name and ignored.
        self.skip(Keyword::Final.into());
        let alias = self.parse_table_alias()?;
        Ok(TableRef::Table { name, alias })
    }

    /// Parses an optional table alias: `AS name` or a bare identifier.
    fn parse_table_alias(&mut self) -> Result<Option<String>> {
        if self.next_is(Keyword::As.into()) {
            return Ok(Some(self.next_ident()?));
        }
        if matches!(
            self.peek(),
            Some(TokenKind::Ident(_) | TokenKind::QuotedIdent(_))
        ) {
            return Ok(Some(self.next_ident()?));
        }
        Ok(None)
    }

    /// Parses a WHERE clause, if present.
    fn parse_where_clause(&mut self) -> Result<Option<Expression>> {
        if !self.next_is(Keyword::Where.into()) {
            return Ok(None);
        }
        Ok(Some(self.parse_expression()?))
    }

    /// Parses a GROUP BY clause, if present.
    fn parse_group_by_clause(&mut self) -> Result<Vec<Expression>> {
        if !self.next_is(Keyword::Group.into()) {
            return Ok(Vec::new());
        }
        self.expect(Keyword::By.into())?;
        let mut group_by = Vec::new();
        loop {
            group_by.push(self.parse_expression()?);
            if !self.next_is(TokenKind::Comma) {
                break;
            }
        }
        Ok(group_by)
    }

    /// Parses a HAVING clause, if present.
    fn parse_having_clause(&mut self) -> Result<Option<Expression>> {
        if !self.next_is(Keyword::Having.into()) {
            return Ok(None);
        }
        Ok(Some(self.parse_expression()?))
    }

    /// Parses an ORDER BY clause, if present, consuming the leading
    /// keywords. Used by window specs, where the clause is optional.
    fn parse_order_by_clause(&mut self) -> Result<Vec<OrderByItem>> {
        if !self.next_is(Keyword::Order.into()) {
            return Ok(Vec::new());
        }
        self.expect(Keyword::By.into())?;
        self.parse_order_by_items()
    }

    /// Parses the item list of an ORDER BY clause: expression, optional
    /// ASC/DESC, optional NULLS FIRST/LAST.
    fn parse_order_by_items(&mut self) -> Result<Vec<OrderByItem>> {
        let mut items = Vec::new();
        loop {
            let expr = self.parse_expression()?;
            let direction = self
                .next_if_map(|kind| match kind {
                    TokenKind::Keyword(Keyword::Asc) => Some(Direction::Asc),
                    TokenKind::Keyword(Keyword::Desc) => Some(Direction::Desc),
                    _ => None,
                })
                .unwrap_or(Direction::Asc);
            // NULLS is not a reserved word; match it as an identifier.
            let mut nulls = None;
            if self.next_if_ident_eq("NULLS") {
                if self.next_if_ident_eq("FIRST") {
                    nulls = Some(NullsOrder::First);
                } else if self.next_if_ident_eq("LAST") {
                    nulls = Some(NullsOrder::Last);
                } else {
                    return Err(self.error_here("expected FIRST or LAST after NULLS"));
                }
            }
            items.push(OrderByItem {
                expr,
                direction,
                nulls,
            });
            if !self.next_is(TokenKind::Comma) {
                break;
            }
        }
        Ok(items)
    }

    /// Parses LIMIT and OFFSET clauses, if present. `LIMIT n, m` means
    /// offset n, limit m. Returns (limit, offset).
    fn parse_limit_offset_clause(
        &mut self,
    ) -> Result<(Option<Expression>, Option<Expression>)> {
        let mut limit = None;
        let mut offset = None;
        if self.next_is(Keyword::Limit.into()) {
            let first = self.parse_expression()?;
            if self.next_is(TokenKind::Comma) {
                offset = Some(first);
                limit = Some(self.parse_expression()?);
            } else {
                limit = Some(first);
            }
        }
        if self.next_is(Keyword::Offset.into()) {
            offset = Some(self.parse_expression()?);
        }
        Ok((limit, offset))
    }

    /// Parses an INSERT statement.
    fn parse_insert(&mut self) -> Result<Statement> {
        self.expect(Keyword::Insert.into())?;
        self.expect(Keyword::Into.into())?;
        let table = self.next_ident()?;

        let mut columns = None;
        if self.peek() == Some(&TokenKind::OpenParen) {
            // Distinguish a column list from INSERT INTO t (SELECT ...).
            if !matches!(
                self.peek_at(1),
                Some(TokenKind::Keyword(Keyword::Select | Keyword::With))
            ) {
                self.expect(TokenKind::OpenParen)?;
                let list = columns.insert(Vec::new());
                loop {
                    list.push(self.next_ident_or_keyword()?);
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::CloseParen)?;
            }
        }

        let source = if self.next_is(Keyword::Values.into()) {
            let mut rows = Vec::new();
            loop {
                let mut row = Vec::new();
                self.expect(TokenKind::OpenParen)?;
                loop {
                    row.push(self.parse_expression()?);
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::CloseParen)?;
                rows.push(row);
                if !self.next_is(TokenKind::Comma) {
                    break;
                }
            }
            InsertSource::Values(rows)
        } else if matches!(
            self.peek(),
            Some(TokenKind::Keyword(Keyword::Select | Keyword::With) | TokenKind::OpenParen)
        ) {
            InsertSource::Select(Box::new(self.parse_statement()?))
        } else {
            return Err(self.error_here("expected VALUES or SELECT after INSERT INTO"));
        };

        Ok(Statement::Dml(DmlStatement::Insert {
            table,
            columns,
            source,
        }))
    }

    /// Parses an UPDATE statement.
    fn parse_update(&mut self) -> Result<Statement> {
        self.expect(Keyword::Update.into())?;
        let table = self.next_ident()?;
        self.expect(Keyword::Set.into())?;
        let mut set = Vec::new();
        loop {
            let column = self.next_ident()?;
            self.expect(TokenKind::Equal)?;
            let expr = self.parse_expression()?;
            if set.iter().any(|(name, _)| name == &column) {
                return Err(self.error_here(format!("column {} set multiple times", column)));
            }
            set.push((column, expr));
            if !self.next_is(TokenKind::Comma) {
                break;
            }
        }
        Ok(Statement::Dml(DmlStatement::Update {
            table,
            set,
            r#where: self.parse_where_clause()?,
        }))
    }

    /// Parses a DELETE statement.
    fn parse_delete(&mut self) -> Result<Statement> {
        self.expect(Keyword::Delete.into())?;
        self.expect(Keyword::From.into())?;
        let table = self.next_ident()?;
        Ok(Statement::Dml(DmlStatement::Delete {
            table,
            r#where: self.parse_where_clause()?,
        }))
    }
}
