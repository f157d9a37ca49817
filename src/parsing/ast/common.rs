//! Common structures used across AST modules

use super::expressions::Expression;
use super::Statement;

/// Sort direction for ORDER BY items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Asc,
    Desc,
}

/// Null placement for ORDER BY items. Parsed and stored; ordering always
/// places nulls first regardless (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullsOrder {
    First,
    Last,
}

/// A single ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub direction: Direction,
    pub nulls: Option<NullsOrder>,
}

/// Join kinds recognized by the parser. ASOF and the right-side SEMI/ANTI
/// variants parse but are rejected by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    LeftSemi,
    LeftAnti,
    Right,
    RightSemi,
    RightAnti,
    Full,
    Cross,
    Asof,
}

/// A table reference in a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    /// A named table (or CTE), with an optional alias.
    Table {
        name: String,
        alias: Option<String>,
    },
    /// A derived table: (SELECT ...) AS alias.
    Subquery {
        statement: Box<Statement>,
        alias: String,
    },
    /// A table function: numbers(10), zeros(n), one().
    TableFunction {
        name: String,
        args: Vec<Expression>,
        alias: Option<String>,
    },
    /// A join of two table references.
    Join {
        left: Box<TableRef>,
        kind: JoinKind,
        right: Box<TableRef>,
        predicate: Option<Expression>,
        using: Option<Vec<String>>,
    },
    /// ARRAY JOIN: expands array expressions into one row per element.
    ArrayJoin {
        left: Box<TableRef>,
        exprs: Vec<(Expression, Option<String>)>,
    },
}

/// A window specification: OVER (PARTITION BY ... ORDER BY ... frame).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub frame: Option<WindowFrame>,
}

/// A window frame clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnits {
    Rows,
    Range,
}

/// A window frame bound.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    UnboundedFollowing,
    CurrentRow,
    Preceding(Box<Expression>),
    Following(Box<Expression>),
}

/// A syntactic data type: a name plus optional parameters, e.g.
/// `Array(Nullable(Int64))`, `Decimal(10, 2)`, `DateTime('UTC')`. Normalized
/// to a concrete `DataType` by the type model.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub name: String,
    pub args: Vec<TypeArg>,
}

/// A parameter inside a type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeArg {
    /// A nested type, e.g. the T in Array(T).
    Type(TypeExpr),
    /// An integer parameter, e.g. the N in FixedString(N).
    Int(i64),
    /// A string parameter, e.g. the timezone in DateTime('UTC').
    Str(String),
    /// A named nested type, e.g. Tuple(x Int64, y String).
    Named(String, TypeExpr),
}

impl TypeExpr {
    /// A bare type name with no parameters.
    pub fn simple(name: impl Into<String>) -> Self {
        TypeExpr {
            name: name.into(),
            args: Vec::new(),
        }
    }
}
