//! Abstract Syntax Tree for SQL statements.
//!
//! The tree is strictly statement-shaped: the parser produces no cycles and
//! only ensures the syntax is well-formed. Whether a table or column exists
//! is the executor's concern.

pub mod common;
pub mod ddl;
pub mod dml;
pub mod expressions;

pub use common::{
    Direction, FrameBound, FrameUnits, JoinKind, NullsOrder, OrderByItem, TableRef, TypeArg,
    TypeExpr, WindowFrame, WindowSpec,
};
pub use ddl::{ColumnDef, DdlStatement};
pub use dml::{CommonTableExpr, DmlStatement, InsertSource, SelectStatement, SetOperator};
pub use expressions::{Expression, Literal, Operator};

/// SQL statements represented as an Abstract Syntax Tree. The statement is
/// the root node of the tree, built from raw SQL by the parser and consumed
/// by the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A SELECT (or WITH ... SELECT) statement.
    Select(Box<SelectStatement>),

    /// A set operation over two statements: UNION / INTERSECT / EXCEPT,
    /// with an ALL flag.
    SetOperation {
        left: Box<Statement>,
        op: SetOperator,
        all: bool,
        right: Box<Statement>,
    },

    /// DDL statements (CREATE TABLE, DROP TABLE).
    Ddl(DdlStatement),

    /// DML statements (INSERT, UPDATE, DELETE).
    Dml(DmlStatement),
}
