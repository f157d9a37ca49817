//! Data Manipulation Language statements: SELECT, INSERT, UPDATE, DELETE

use super::common::{OrderByItem, TableRef};
use super::expressions::Expression;
use super::Statement;

/// A common table expression: WITH name [(columns)] AS (statement).
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTableExpr {
    pub name: String,
    pub columns: Vec<String>,
    pub statement: Box<Statement>,
}

/// A SELECT statement, including any WITH prefix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    pub with: Vec<CommonTableExpr>,
    pub distinct: bool,
    /// Projection expressions with optional AS aliases.
    pub select: Vec<(Expression, Option<String>)>,
    pub from: Option<TableRef>,
    pub r#where: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

/// The row source of an INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// INSERT INTO t VALUES (..), (..)
    Values(Vec<Vec<Expression>>),
    /// INSERT INTO t SELECT ...
    Select(Box<Statement>),
}

/// Set operators combining two statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

/// DML statements.
#[derive(Debug, Clone, PartialEq)]
pub enum DmlStatement {
    /// INSERT INTO: inserts rows into a table.
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        source: InsertSource,
    },
    /// UPDATE: updates matching rows in a table.
    Update {
        table: String,
        set: Vec<(String, Expression)>,
        r#where: Option<Expression>,
    },
    /// DELETE FROM: deletes matching rows from a table.
    Delete {
        table: String,
        r#where: Option<Expression>,
    },
}
