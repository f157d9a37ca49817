//! SQL expressions and operators

use super::common::{TypeExpr, WindowSpec};
use super::Statement;

/// SQL expressions, e.g. `a + 7 > b`. Can be nested.
#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    /// A literal value.
    Literal(Literal),
    /// A column reference, optionally qualified with a table name or alias.
    Column(Option<String>, String),
    /// All columns, i.e. `*` or `t.*`.
    All(Option<String>),
    /// An operator.
    Operator(Operator),
    /// A function call (name, arguments, DISTINCT flag).
    Function {
        name: String,
        args: Vec<Expression>,
        distinct: bool,
    },
    /// CAST(expr AS type) or expr::type.
    Cast {
        expr: Box<Expression>,
        target: TypeExpr,
    },
    /// CASE expression, simple (with operand) or searched.
    Case {
        operand: Option<Box<Expression>>,
        when_clauses: Vec<(Expression, Expression)>,
        else_clause: Option<Box<Expression>>,
    },
    /// a [NOT] IN (expr, ...)
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    /// a [NOT] IN (SELECT ...)
    InSubquery {
        expr: Box<Expression>,
        subquery: Box<Statement>,
        negated: bool,
    },
    /// a [NOT] BETWEEN low AND high
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    /// A scalar subquery: (SELECT ...).
    Subquery(Box<Statement>),
    /// [NOT] EXISTS (SELECT ...)
    Exists {
        subquery: Box<Statement>,
        negated: bool,
    },
    /// Array literal: [1, 2, 3].
    ArrayLiteral(Vec<Expression>),
    /// Tuple literal: (1, 'a', 2.5).
    TupleLiteral(Vec<Expression>),
    /// Map literal: {key: value, ...}.
    MapLiteral(Vec<(Expression, Expression)>),
    /// Element access: base[index]. Arrays are 1-indexed.
    Index {
        base: Box<Expression>,
        index: Box<Expression>,
    },
    /// Conditional (ternary): cond ? then : else.
    Ternary {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    /// A window function call: name(args) OVER (spec).
    WindowFunction {
        name: String,
        args: Vec<Expression>,
        over: WindowSpec,
    },
    /// A parameter placeholder (? in SQL), with its 0-based position.
    Parameter(u32),
    /// A lambda: x -> expr or (x, y) -> expr.
    Lambda {
        params: Vec<String>,
        body: Box<Expression>,
    },
}

/// Expression literal values. Numbers keep their lexeme until the parser
/// narrows them, so out-of-range detection stays in one place.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// Expression operators.
///
/// Since this is a recursive data structure, each child expression is boxed.
#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    And(Box<Expression>, Box<Expression>), // a AND b
    Or(Box<Expression>, Box<Expression>),  // a OR b
    Not(Box<Expression>),                  // NOT a

    Equal(Box<Expression>, Box<Expression>),              // a = b
    NotEqual(Box<Expression>, Box<Expression>),           // a != b, a <> b
    LessThan(Box<Expression>, Box<Expression>),           // a < b
    LessThanOrEqual(Box<Expression>, Box<Expression>),    // a <= b
    GreaterThan(Box<Expression>, Box<Expression>),        // a > b
    GreaterThanOrEqual(Box<Expression>, Box<Expression>), // a >= b
    /// a IS [NOT] NULL
    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
    /// a [NOT] LIKE b / a [NOT] ILIKE b
    Like {
        expr: Box<Expression>,
        pattern: Box<Expression>,
        case_insensitive: bool,
        negated: bool,
    },

    Concat(Box<Expression>, Box<Expression>), // a || b

    Add(Box<Expression>, Box<Expression>),       // a + b
    Subtract(Box<Expression>, Box<Expression>),  // a - b
    Multiply(Box<Expression>, Box<Expression>),  // a * b
    Divide(Box<Expression>, Box<Expression>),    // a / b
    Remainder(Box<Expression>, Box<Expression>), // a % b
    Identity(Box<Expression>),                   // +a
    Negate(Box<Expression>),                     // -a
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

impl From<Operator> for Expression {
    fn from(operator: Operator) -> Self {
        Expression::Operator(operator)
    }
}

impl Expression {
    /// Walks the expression tree depth-first, calling a closure for every
    /// node. Halts and returns false if the closure returns false. Does not
    /// descend into subquery statements.
    pub fn walk(&self, visitor: &mut impl FnMut(&Expression) -> bool) -> bool {
        use Operator::*;

        if !visitor(self) {
            return false;
        }

        match self {
            Self::Operator(op) => match op {
                Add(lhs, rhs)
                | And(lhs, rhs)
                | Concat(lhs, rhs)
                | Divide(lhs, rhs)
                | Equal(lhs, rhs)
                | GreaterThan(lhs, rhs)
                | GreaterThanOrEqual(lhs, rhs)
                | LessThan(lhs, rhs)
                | LessThanOrEqual(lhs, rhs)
                | Multiply(lhs, rhs)
                | NotEqual(lhs, rhs)
                | Or(lhs, rhs)
                | Remainder(lhs, rhs)
                | Subtract(lhs, rhs) => lhs.walk(visitor) && rhs.walk(visitor),

                Identity(expr) | Negate(expr) | Not(expr) => expr.walk(visitor),

                IsNull { expr, .. } => expr.walk(visitor),

                Like { expr, pattern, .. } => expr.walk(visitor) && pattern.walk(visitor),
            },

            Self::Function { args, .. } => args.iter().all(|expr| expr.walk(visitor)),

            Self::WindowFunction { args, over, .. } => {
                args.iter().all(|expr| expr.walk(visitor))
                    && over.partition_by.iter().all(|expr| expr.walk(visitor))
                    && over.order_by.iter().all(|item| item.expr.walk(visitor))
            }

            Self::Cast { expr, .. } => expr.walk(visitor),

            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                operand.iter().all(|op| op.walk(visitor))
                    && when_clauses
                        .iter()
                        .all(|(cond, result)| cond.walk(visitor) && result.walk(visitor))
                    && else_clause.iter().all(|e| e.walk(visitor))
            }

            Self::InList { expr, list, .. } => {
                expr.walk(visitor) && list.iter().all(|e| e.walk(visitor))
            }

            Self::InSubquery { expr, .. } => expr.walk(visitor),

            Self::Between {
                expr, low, high, ..
            } => expr.walk(visitor) && low.walk(visitor) && high.walk(visitor),

            Self::ArrayLiteral(elements) | Self::TupleLiteral(elements) => {
                elements.iter().all(|e| e.walk(visitor))
            }

            Self::MapLiteral(pairs) => pairs
                .iter()
                .all(|(k, v)| k.walk(visitor) && v.walk(visitor)),

            Self::Index { base, index } => base.walk(visitor) && index.walk(visitor),

            Self::Ternary {
                condition,
                then,
                otherwise,
            } => condition.walk(visitor) && then.walk(visitor) && otherwise.walk(visitor),

            Self::Lambda { body, .. } => body.walk(visitor),

            Self::Literal(_)
            | Self::Column(_, _)
            | Self::All(_)
            | Self::Subquery(_)
            | Self::Exists { .. }
            | Self::Parameter(_) => true,
        }
    }

    /// Returns whether any node in the tree satisfies the predicate.
    pub fn contains(&self, predicate: &impl Fn(&Expression) -> bool) -> bool {
        !self.walk(&mut |expr| !predicate(expr))
    }

    /// Transforms the expression tree depth-first, applying a closure to
    /// every node and replacing the node in place. Does not descend into
    /// subquery statements.
    pub fn transform<E>(
        &mut self,
        transformer: &mut impl FnMut(&mut Expression) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        use Operator::*;

        // Transform children first.
        match self {
            Self::Operator(op) => match op {
                Add(lhs, rhs)
                | And(lhs, rhs)
                | Concat(lhs, rhs)
                | Divide(lhs, rhs)
                | Equal(lhs, rhs)
                | GreaterThan(lhs, rhs)
                | GreaterThanOrEqual(lhs, rhs)
                | LessThan(lhs, rhs)
                | LessThanOrEqual(lhs, rhs)
                | Multiply(lhs, rhs)
                | NotEqual(lhs, rhs)
                | Or(lhs, rhs)
                | Remainder(lhs, rhs)
                | Subtract(lhs, rhs) => {
                    lhs.transform(transformer)?;
                    rhs.transform(transformer)?;
                }

                Identity(expr) | Negate(expr) | Not(expr) => expr.transform(transformer)?,

                IsNull { expr, .. } => expr.transform(transformer)?,

                Like { expr, pattern, .. } => {
                    expr.transform(transformer)?;
                    pattern.transform(transformer)?;
                }
            },

            Self::Function { args, .. } => {
                for arg in args {
                    arg.transform(transformer)?;
                }
            }

            Self::WindowFunction { args, .. } => {
                for arg in args {
                    arg.transform(transformer)?;
                }
            }

            Self::Cast { expr, .. } => expr.transform(transformer)?,

            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                if let Some(operand) = operand {
                    operand.transform(transformer)?;
                }
                for (when, then) in when_clauses {
                    when.transform(transformer)?;
                    then.transform(transformer)?;
                }
                if let Some(else_clause) = else_clause {
                    else_clause.transform(transformer)?;
                }
            }

            Self::InList { expr, list, .. } => {
                expr.transform(transformer)?;
                for item in list {
                    item.transform(transformer)?;
                }
            }

            Self::InSubquery { expr, .. } => expr.transform(transformer)?,

            Self::Between {
                expr, low, high, ..
            } => {
                expr.transform(transformer)?;
                low.transform(transformer)?;
                high.transform(transformer)?;
            }

            Self::ArrayLiteral(elements) | Self::TupleLiteral(elements) => {
                for element in elements {
                    element.transform(transformer)?;
                }
            }

            Self::MapLiteral(pairs) => {
                for (key, value) in pairs {
                    key.transform(transformer)?;
                    value.transform(transformer)?;
                }
            }

            Self::Index { base, index } => {
                base.transform(transformer)?;
                index.transform(transformer)?;
            }

            Self::Ternary {
                condition,
                then,
                otherwise,
            } => {
                condition.transform(transformer)?;
                then.transform(transformer)?;
                otherwise.transform(transformer)?;
            }

            Self::Lambda { body, .. } => body.transform(transformer)?,

            Self::Literal(_)
            | Self::Column(_, _)
            | Self::All(_)
            | Self::Subquery(_)
            | Self::Exists { .. }
            | Self::Parameter(_) => {}
        }

        // Transform the current node.
        transformer(self)
    }
}
