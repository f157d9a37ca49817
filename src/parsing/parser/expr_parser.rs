//! Expression parser.
//!
//! Parses SQL expressions with the precedence climbing algorithm, including
//! operators, function calls (with DISTINCT and lambda arguments), CASE,
//! CAST, subqueries, window functions, and the postfix operators `[index]`,
//! `.member`, `::type` and `OVER (...)`.

use super::dml_parser::DmlParser;
use super::token_helper::TokenHelper;
use super::type_parser::TypeParser;
use crate::error::Result;
use crate::parsing::ast::{
    Expression, FrameBound, FrameUnits, Literal, Operator, Statement, TypeExpr, WindowFrame,
    WindowSpec,
};
use crate::parsing::lexer::{Keyword, TokenKind};
use std::ops::Add;

/// Operator precedence.
pub type Precedence = u8;

/// Operator associativity.
pub enum Associativity {
    Left,
    Right,
}

impl Add<Associativity> for Precedence {
    type Output = Self;

    fn add(self, rhs: Associativity) -> Self {
        // Left-associative operators have increased precedence, so they bind
        // tighter to their left-hand side.
        self + match rhs {
            Associativity::Left => 1,
            Associativity::Right => 0,
        }
    }
}

const COMPARISON_PRECEDENCE: Precedence = 4;
const POSTFIX_PRECEDENCE: Precedence = 9;

/// Prefix operators.
pub enum PrefixOperator {
    Minus, // -a
    Not,   // NOT a
    Plus,  // +a
}

impl PrefixOperator {
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Not => 3,
            Self::Minus | Self::Plus => 8,
        }
    }

    // Prefix operators are right-associative by definition.
    pub fn associativity(&self) -> Associativity {
        Associativity::Right
    }

    pub fn into_expression(self, rhs: Expression) -> Expression {
        let rhs = Box::new(rhs);
        match self {
            Self::Plus => Operator::Identity(rhs).into(),
            Self::Minus => Operator::Negate(rhs).into(),
            Self::Not => Operator::Not(rhs).into(),
        }
    }
}

/// Infix operators.
pub enum InfixOperator {
    Add,                // a + b
    And,                // a AND b
    Concat,             // a || b
    Divide,             // a / b
    Equal,              // a = b
    GreaterThan,        // a > b
    GreaterThanOrEqual, // a >= b
    ILike,              // a ILIKE b
    LessThan,           // a < b
    LessThanOrEqual,    // a <= b
    Like,               // a LIKE b
    Multiply,           // a * b
    NotEqual,           // a != b
    Or,                 // a OR b
    Remainder,          // a % b
    Subtract,           // a - b
}

impl InfixOperator {
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Or => 1,
            Self::And => 2,
            // PrefixOperator::Not => 3
            Self::Equal
            | Self::NotEqual
            | Self::LessThan
            | Self::LessThanOrEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual
            | Self::Like
            | Self::ILike => COMPARISON_PRECEDENCE,
            Self::Concat => 5,
            Self::Add | Self::Subtract => 6,
            Self::Multiply | Self::Divide | Self::Remainder => 7,
        }
    }

    pub fn associativity(&self) -> Associativity {
        Associativity::Left
    }

    pub fn into_expression(self, lhs: Expression, rhs: Expression) -> Expression {
        let (lhs, rhs) = (Box::new(lhs), Box::new(rhs));
        match self {
            Self::Add => Operator::Add(lhs, rhs).into(),
            Self::And => Operator::And(lhs, rhs).into(),
            Self::Concat => Operator::Concat(lhs, rhs).into(),
            Self::Divide => Operator::Divide(lhs, rhs).into(),
            Self::Equal => Operator::Equal(lhs, rhs).into(),
            Self::GreaterThan => Operator::GreaterThan(lhs, rhs).into(),
            Self::GreaterThanOrEqual => Operator::GreaterThanOrEqual(lhs, rhs).into(),
            Self::ILike => Operator::Like {
                expr: lhs,
                pattern: rhs,
                case_insensitive: true,
                negated: false,
            }
            .into(),
            Self::LessThan => Operator::LessThan(lhs, rhs).into(),
            Self::LessThanOrEqual => Operator::LessThanOrEqual(lhs, rhs).into(),
            Self::Like => Operator::Like {
                expr: lhs,
                pattern: rhs,
                case_insensitive: false,
                negated: false,
            }
            .into(),
            Self::Multiply => Operator::Multiply(lhs, rhs).into(),
            Self::NotEqual => Operator::NotEqual(lhs, rhs).into(),
            Self::Or => Operator::Or(lhs, rhs).into(),
            Self::Remainder => Operator::Remainder(lhs, rhs).into(),
            Self::Subtract => Operator::Subtract(lhs, rhs).into(),
        }
    }
}

/// Postfix operators.
pub enum PostfixOperator {
    IsNull {
        negated: bool,
    }, // a IS [NOT] NULL
    InList(Vec<Expression>, bool),   // a [NOT] IN (list)
    InSubquery(Box<Statement>, bool), // a [NOT] IN (SELECT ...)
    Between(Expression, Expression, bool), // a [NOT] BETWEEN low AND high
    NotLike(Expression, bool),       // a NOT LIKE b, a NOT ILIKE b (case_insensitive flag)
    Index(Expression),               // a[i]
    Member(Expression),              // a.1 or a.name (tuple / map access)
    CastType(TypeExpr),              // a::type
    Over(WindowSpec),                // fn(...) OVER (...)
}

impl PostfixOperator {
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::IsNull { .. }
            | Self::InList(_, _)
            | Self::InSubquery(_, _)
            | Self::Between(_, _, _)
            | Self::NotLike(_, _) => COMPARISON_PRECEDENCE,
            Self::Index(_) | Self::Member(_) | Self::CastType(_) | Self::Over(_) => {
                POSTFIX_PRECEDENCE
            }
        }
    }
}

/// Parser trait for SQL expressions.
pub trait ExpressionParser: TokenHelper + TypeParser + DmlParser {
    /// Increments and returns the previous parameter count.
    fn increment_param_count(&mut self) -> u32;

    /// Parses an expression, including a trailing ternary `cond ? a : b`,
    /// which binds loosest of all operators.
    fn parse_expression(&mut self) -> Result<Expression> {
        let expr = self.parse_expression_at(0)?;
        if self.next_is(TokenKind::Question) {
            let then = <Self as ExpressionParser>::parse_expression(self)?;
            self.expect(TokenKind::Colon)?;
            let otherwise = <Self as ExpressionParser>::parse_expression(self)?;
            return Ok(Expression::Ternary {
                condition: Box::new(expr),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }
        Ok(expr)
    }

    /// Parses an expression at the given minimum precedence, using
    /// precedence climbing.
    fn parse_expression_at(&mut self, min_precedence: Precedence) -> Result<Expression> {
        // If the left-hand side is a prefix operator, recursively parse it
        // and its operand. Otherwise, parse the left-hand side as an atom.
        let mut lhs = if let Some(prefix) = self.parse_prefix_operator_at(min_precedence) {
            let next_precedence = prefix.precedence() + prefix.associativity();
            let rhs = self.parse_expression_at(next_precedence)?;
            prefix.into_expression(rhs)
        } else {
            self.parse_expression_atom()?
        };

        // Apply any postfix operators to the left-hand side.
        while let Some(postfix) = self.parse_postfix_operator_at(min_precedence)? {
            lhs = self.apply_postfix(lhs, postfix)?;
        }

        // Repeatedly apply infix operators as long as their precedence is at
        // least the current minimum. The right-hand side recursion applies
        // operators above this precedence to the right-hand side.
        while let Some(infix) = self.parse_infix_operator_at(min_precedence) {
            let next_precedence = infix.precedence() + infix.associativity();
            let rhs = self.parse_expression_at(next_precedence)?;
            lhs = infix.into_expression(lhs, rhs);

            // Postfix operators may also follow a binary expression, e.g.
            // 1 + NULL IS NULL.
            while let Some(postfix) = self.parse_postfix_operator_at(min_precedence)? {
                lhs = self.apply_postfix(lhs, postfix)?;
            }
        }

        Ok(lhs)
    }

    /// Builds the expression for a postfix operator applied to lhs.
    fn apply_postfix(&mut self, lhs: Expression, postfix: PostfixOperator) -> Result<Expression> {
        let expr = match postfix {
            PostfixOperator::IsNull { negated } => Operator::IsNull {
                expr: Box::new(lhs),
                negated,
            }
            .into(),
            PostfixOperator::InList(list, negated) => Expression::InList {
                expr: Box::new(lhs),
                list,
                negated,
            },
            PostfixOperator::InSubquery(subquery, negated) => Expression::InSubquery {
                expr: Box::new(lhs),
                subquery,
                negated,
            },
            PostfixOperator::Between(low, high, negated) => Expression::Between {
                expr: Box::new(lhs),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            },
            PostfixOperator::NotLike(pattern, case_insensitive) => Operator::Like {
                expr: Box::new(lhs),
                pattern: Box::new(pattern),
                case_insensitive,
                negated: true,
            }
            .into(),
            PostfixOperator::Index(index) => Expression::Index {
                base: Box::new(lhs),
                index: Box::new(index),
            },
            PostfixOperator::Member(index) => Expression::Index {
                base: Box::new(lhs),
                index: Box::new(index),
            },
            PostfixOperator::CastType(target) => Expression::Cast {
                expr: Box::new(lhs),
                target,
            },
            PostfixOperator::Over(over) => match lhs {
                Expression::Function {
                    name,
                    args,
                    distinct: false,
                } => Expression::WindowFunction { name, args, over },
                _ => return Err(self.error_here("OVER must follow a function call")),
            },
        };
        Ok(expr)
    }

    /// Parses an expression atom.
    fn parse_expression_atom(&mut self) -> Result<Expression> {
        let token = self.next()?;
        Ok(match token.kind {
            TokenKind::Integer(n) => {
                let value = n.parse::<i64>().map_err(|_| {
                    crate::error::Error::parse(
                        format!("integer literal {} out of range", n),
                        token.line,
                        token.column,
                    )
                })?;
                Literal::Integer(value).into()
            }
            TokenKind::Float(n) => {
                let value = n.parse::<f64>().map_err(|_| {
                    crate::error::Error::parse(
                        format!("invalid float literal {}", n),
                        token.line,
                        token.column,
                    )
                })?;
                Literal::Float(value).into()
            }
            TokenKind::String(s) => Literal::String(s).into(),

            TokenKind::Keyword(Keyword::True) => Literal::Boolean(true).into(),
            TokenKind::Keyword(Keyword::False) => Literal::Boolean(false).into(),
            TokenKind::Keyword(Keyword::Null) => Literal::Null.into(),

            // All columns.
            TokenKind::Asterisk => Expression::All(None),

            // Parameter placeholder.
            TokenKind::Question => Expression::Parameter(self.increment_param_count()),

            // Array literal: [1, 2, 3] or ARRAY[1, 2, 3].
            TokenKind::OpenBracket => self.parse_array_literal()?,
            TokenKind::Keyword(Keyword::Array)
                if self.peek() == Some(&TokenKind::OpenBracket) =>
            {
                self.expect(TokenKind::OpenBracket)?;
                self.parse_array_literal()?
            }

            // Map literal: {key: value, ...}.
            TokenKind::OpenBrace => {
                let mut pairs = Vec::new();
                if self.peek() != Some(&TokenKind::CloseBrace) {
                    loop {
                        let key = <Self as ExpressionParser>::parse_expression(self)?;
                        self.expect(TokenKind::Colon)?;
                        let value = <Self as ExpressionParser>::parse_expression(self)?;
                        pairs.push((key, value));
                        if !self.next_is(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::CloseBrace)?;
                Expression::MapLiteral(pairs)
            }

            // CASE [operand] WHEN ... THEN ... [ELSE ...] END.
            TokenKind::Keyword(Keyword::Case) => self.parse_case()?,

            // CAST(expr AS type).
            TokenKind::Keyword(Keyword::Cast) => {
                self.expect(TokenKind::OpenParen)?;
                let expr = <Self as ExpressionParser>::parse_expression(self)?;
                self.expect(Keyword::As.into())?;
                let target = self.parse_type()?;
                self.expect(TokenKind::CloseParen)?;
                Expression::Cast {
                    expr: Box::new(expr),
                    target,
                }
            }

            // EXISTS (SELECT ...).
            TokenKind::Keyword(Keyword::Exists) => {
                let subquery = self.parse_parenthesized_statement()?;
                Expression::Exists {
                    subquery: Box::new(subquery),
                    negated: false,
                }
            }

            // NOT EXISTS (SELECT ...). Plain NOT is a prefix operator and
            // never reaches the atom parser.
            TokenKind::Keyword(Keyword::Not)
                if self.peek() == Some(&TokenKind::Keyword(Keyword::Exists)) =>
            {
                self.expect(Keyword::Exists.into())?;
                let subquery = self.parse_parenthesized_statement()?;
                Expression::Exists {
                    subquery: Box::new(subquery),
                    negated: true,
                }
            }

            // Nested expression, tuple literal, or subquery.
            TokenKind::OpenParen => {
                if matches!(
                    self.peek(),
                    Some(TokenKind::Keyword(Keyword::Select | Keyword::With))
                ) {
                    let statement = self.parse_statement()?;
                    self.expect(TokenKind::CloseParen)?;
                    Expression::Subquery(Box::new(statement))
                } else {
                    let expr = <Self as ExpressionParser>::parse_expression(self)?;
                    if self.next_is(TokenKind::Comma) {
                        let mut elements = vec![expr];
                        loop {
                            elements
                                .push(<Self as ExpressionParser>::parse_expression(self)?);
                            if !self.next_is(TokenKind::Comma) {
                                break;
                            }
                        }
                        self.expect(TokenKind::CloseParen)?;
                        Expression::TupleLiteral(elements)
                    } else {
                        self.expect(TokenKind::CloseParen)?;
                        expr
                    }
                }
            }

            // Function call, qualified star/column, or bare column.
            TokenKind::Ident(name) | TokenKind::QuotedIdent(name) => {
                if self.peek() == Some(&TokenKind::OpenParen) {
                    self.expect(TokenKind::OpenParen)?;
                    self.parse_function_call(name)?
                } else if self.peek() == Some(&TokenKind::Period) {
                    match self.peek_at(1) {
                        Some(TokenKind::Asterisk) => {
                            self.expect(TokenKind::Period)?;
                            self.expect(TokenKind::Asterisk)?;
                            Expression::All(Some(name))
                        }
                        Some(TokenKind::Ident(_) | TokenKind::QuotedIdent(_)) => {
                            self.expect(TokenKind::Period)?;
                            Expression::Column(Some(name), self.next_ident()?)
                        }
                        // Leave e.g. `x.1` for the postfix member operator.
                        _ => Expression::Column(None, name),
                    }
                } else {
                    Expression::Column(None, name)
                }
            }

            // A small whitelist of keywords usable as function names, e.g.
            // if(c, a, b) and any(x).
            TokenKind::Keyword(
                keyword @ (Keyword::If | Keyword::Any | Keyword::Left | Keyword::Right),
            ) if self.peek() == Some(&TokenKind::OpenParen) => {
                self.expect(TokenKind::OpenParen)?;
                self.parse_function_call(keyword.as_str().to_lowercase())?
            }

            kind => {
                return Err(crate::error::Error::parse(
                    format!("expected expression atom, found {}", kind),
                    token.line,
                    token.column,
                ));
            }
        })
    }

    /// Parses the element list of an array literal, after the `[`.
    fn parse_array_literal(&mut self) -> Result<Expression> {
        let mut elements = Vec::new();
        if self.peek() != Some(&TokenKind::CloseBracket) {
            loop {
                elements.push(<Self as ExpressionParser>::parse_expression(self)?);
                if !self.next_is(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseBracket)?;
        Ok(Expression::ArrayLiteral(elements))
    }

    /// Parses a CASE expression after the CASE keyword.
    fn parse_case(&mut self) -> Result<Expression> {
        // A simple CASE has an operand before the first WHEN.
        let operand = if self.peek() == Some(&TokenKind::Keyword(Keyword::When)) {
            None
        } else {
            Some(Box::new(<Self as ExpressionParser>::parse_expression(
                self,
            )?))
        };

        let mut when_clauses = Vec::new();
        while self.next_is(Keyword::When.into()) {
            let when = <Self as ExpressionParser>::parse_expression(self)?;
            self.expect(Keyword::Then.into())?;
            let then = <Self as ExpressionParser>::parse_expression(self)?;
            when_clauses.push((when, then));
        }
        if when_clauses.is_empty() {
            return Err(self.error_here("CASE must have at least one WHEN clause"));
        }

        let else_clause = if self.next_is(Keyword::Else.into()) {
            Some(Box::new(<Self as ExpressionParser>::parse_expression(
                self,
            )?))
        } else {
            None
        };
        self.expect(Keyword::End.into())?;

        Ok(Expression::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    /// Parses a function call after the opening paren: an optional DISTINCT,
    /// then comma-separated arguments, each of which may be a lambda.
    fn parse_function_call(&mut self, name: String) -> Result<Expression> {
        let distinct = self.next_is(Keyword::Distinct.into());
        let mut args = Vec::new();
        while !self.next_is(TokenKind::CloseParen) {
            if !args.is_empty() {
                self.expect(TokenKind::Comma)?;
            }
            args.push(self.parse_function_arg()?);
        }
        Ok(Expression::Function {
            name,
            args,
            distinct,
        })
    }

    /// Parses a function argument, trying a lambda first: `x -> expr` or
    /// `(x, y) -> expr`. The lookahead is undone via the saved position when
    /// the argument turns out not to be a lambda.
    fn parse_function_arg(&mut self) -> Result<Expression> {
        let saved = self.position();
        if let Some(params) = self.try_parse_lambda_params() {
            let body = <Self as ExpressionParser>::parse_expression(self)?;
            return Ok(Expression::Lambda {
                params,
                body: Box::new(body),
            });
        }
        self.restore(saved);
        <Self as ExpressionParser>::parse_expression(self)
    }

    /// Attempts to consume a lambda parameter list followed by `->`.
    /// Returns None (with tokens consumed; caller restores) on mismatch.
    fn try_parse_lambda_params(&mut self) -> Option<Vec<String>> {
        match self.peek()? {
            TokenKind::Ident(_) => {
                let param = self.next_ident().ok()?;
                if self.next_is(TokenKind::Arrow) {
                    Some(vec![param])
                } else {
                    None
                }
            }
            TokenKind::OpenParen => {
                self.next().ok()?;
                let mut params = Vec::new();
                loop {
                    match self.peek()? {
                        TokenKind::Ident(_) => params.push(self.next_ident().ok()?),
                        _ => return None,
                    }
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
                if !self.next_is(TokenKind::CloseParen) {
                    return None;
                }
                if !self.next_is(TokenKind::Arrow) {
                    return None;
                }
                Some(params)
            }
            _ => None,
        }
    }

    /// Parses a parenthesized statement, e.g. the body of EXISTS (...).
    fn parse_parenthesized_statement(&mut self) -> Result<Statement> {
        self.expect(TokenKind::OpenParen)?;
        if !matches!(
            self.peek(),
            Some(TokenKind::Keyword(Keyword::Select | Keyword::With) | TokenKind::OpenParen)
        ) {
            return Err(self.error_here("expected a subquery"));
        }
        let statement = self.parse_statement()?;
        self.expect(TokenKind::CloseParen)?;
        Ok(statement)
    }

    /// Parses a window specification after OVER: `( [PARTITION BY exprs]
    /// [ORDER BY items] [frame] )`.
    fn parse_window_spec(&mut self) -> Result<WindowSpec> {
        self.expect(TokenKind::OpenParen)?;

        let mut partition_by = Vec::new();
        if self.next_is(Keyword::Partition.into()) {
            self.expect(Keyword::By.into())?;
            loop {
                partition_by.push(<Self as ExpressionParser>::parse_expression(self)?);
                if !self.next_is(TokenKind::Comma) {
                    break;
                }
            }
        }

        let order_by = self.parse_order_by_clause()?;

        let frame = match self.peek() {
            Some(TokenKind::Keyword(Keyword::Rows)) => {
                self.next()?;
                Some(self.parse_window_frame(FrameUnits::Rows)?)
            }
            Some(TokenKind::Keyword(Keyword::Range)) => {
                self.next()?;
                Some(self.parse_window_frame(FrameUnits::Range)?)
            }
            _ => None,
        };

        self.expect(TokenKind::CloseParen)?;
        Ok(WindowSpec {
            partition_by,
            order_by,
            frame,
        })
    }

    /// Parses a window frame after ROWS or RANGE: either a single start
    /// bound or `BETWEEN start AND end`.
    fn parse_window_frame(&mut self, units: FrameUnits) -> Result<WindowFrame> {
        if self.next_is(Keyword::Between.into()) {
            let start = self.parse_frame_bound()?;
            self.expect(Keyword::And.into())?;
            let end = self.parse_frame_bound()?;
            Ok(WindowFrame {
                units,
                start,
                end: Some(end),
            })
        } else {
            let start = self.parse_frame_bound()?;
            Ok(WindowFrame {
                units,
                start,
                end: None,
            })
        }
    }

    /// Parses one frame bound.
    fn parse_frame_bound(&mut self) -> Result<FrameBound> {
        if self.next_is(Keyword::Unbounded.into()) {
            if self.next_is(Keyword::Preceding.into()) {
                return Ok(FrameBound::UnboundedPreceding);
            }
            self.expect(Keyword::Following.into())?;
            return Ok(FrameBound::UnboundedFollowing);
        }
        if self.next_is(Keyword::Current.into()) {
            self.expect(Keyword::Row.into())?;
            return Ok(FrameBound::CurrentRow);
        }
        let expr = <Self as ExpressionParser>::parse_expression(self)?;
        if self.next_is(Keyword::Preceding.into()) {
            return Ok(FrameBound::Preceding(Box::new(expr)));
        }
        self.expect(Keyword::Following.into())?;
        Ok(FrameBound::Following(Box::new(expr)))
    }

    /// Parses a prefix operator, if there is one and its precedence is at
    /// least min_precedence. NOT EXISTS is left for the atom parser.
    fn parse_prefix_operator_at(&mut self, min_precedence: Precedence) -> Option<PrefixOperator> {
        if self.peek() == Some(&TokenKind::Keyword(Keyword::Not))
            && self.peek_at(1) == Some(&TokenKind::Keyword(Keyword::Exists))
        {
            return None;
        }
        self.next_if_map(|kind| {
            let operator = match kind {
                TokenKind::Keyword(Keyword::Not) => PrefixOperator::Not,
                TokenKind::Minus => PrefixOperator::Minus,
                TokenKind::Plus => PrefixOperator::Plus,
                _ => return None,
            };
            Some(operator).filter(|op| op.precedence() >= min_precedence)
        })
    }

    /// Parses an infix operator, if there is one and its precedence is at
    /// least min_precedence.
    fn parse_infix_operator_at(&mut self, min_precedence: Precedence) -> Option<InfixOperator> {
        self.next_if_map(|kind| {
            let operator = match kind {
                TokenKind::Asterisk => InfixOperator::Multiply,
                TokenKind::Concat => InfixOperator::Concat,
                TokenKind::Equal => InfixOperator::Equal,
                TokenKind::GreaterThan => InfixOperator::GreaterThan,
                TokenKind::GreaterThanOrEqual => InfixOperator::GreaterThanOrEqual,
                TokenKind::Keyword(Keyword::And) => InfixOperator::And,
                TokenKind::Keyword(Keyword::ILike) => InfixOperator::ILike,
                TokenKind::Keyword(Keyword::Like) => InfixOperator::Like,
                TokenKind::Keyword(Keyword::Or) => InfixOperator::Or,
                TokenKind::LessOrGreaterThan => InfixOperator::NotEqual,
                TokenKind::LessThan => InfixOperator::LessThan,
                TokenKind::LessThanOrEqual => InfixOperator::LessThanOrEqual,
                TokenKind::Minus => InfixOperator::Subtract,
                TokenKind::NotEqual => InfixOperator::NotEqual,
                TokenKind::Percent => InfixOperator::Remainder,
                TokenKind::Plus => InfixOperator::Add,
                TokenKind::Slash => InfixOperator::Divide,
                _ => return None,
            };
            Some(operator).filter(|op| op.precedence() >= min_precedence)
        })
    }

    /// Parses a postfix operator, if there is one and its precedence is at
    /// least min_precedence.
    fn parse_postfix_operator_at(
        &mut self,
        min_precedence: Precedence,
    ) -> Result<Option<PostfixOperator>> {
        // IS [NOT] NULL spans multiple tokens; check precedence up front.
        if self.peek() == Some(&TokenKind::Keyword(Keyword::Is)) {
            if COMPARISON_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.expect(Keyword::Is.into())?;
            let negated = self.next_is(Keyword::Not.into());
            self.expect(Keyword::Null.into())?;
            return Ok(Some(PostfixOperator::IsNull { negated }));
        }

        // NOT followed by IN / BETWEEN / LIKE / ILIKE is the negated form of
        // those postfix comparisons.
        let negated = if self.peek() == Some(&TokenKind::Keyword(Keyword::Not))
            && matches!(
                self.peek_at(1),
                Some(TokenKind::Keyword(
                    Keyword::In | Keyword::Between | Keyword::Like | Keyword::ILike
                ))
            ) {
            if COMPARISON_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.next()?;
            true
        } else {
            false
        };

        if self.peek() == Some(&TokenKind::Keyword(Keyword::In)) {
            if COMPARISON_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.expect(Keyword::In.into())?;
            self.expect(TokenKind::OpenParen)?;

            if matches!(
                self.peek(),
                Some(TokenKind::Keyword(Keyword::Select | Keyword::With))
            ) {
                let statement = self.parse_statement()?;
                self.expect(TokenKind::CloseParen)?;
                return Ok(Some(PostfixOperator::InSubquery(
                    Box::new(statement),
                    negated,
                )));
            }

            let mut list = Vec::new();
            if self.peek() != Some(&TokenKind::CloseParen) {
                loop {
                    list.push(<Self as ExpressionParser>::parse_expression(self)?);
                    if !self.next_is(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::CloseParen)?;
            return Ok(Some(PostfixOperator::InList(list, negated)));
        }

        if self.peek() == Some(&TokenKind::Keyword(Keyword::Between)) {
            if COMPARISON_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.expect(Keyword::Between.into())?;
            // The bounds bind tighter than AND, so parse above it.
            let low = self.parse_expression_at(COMPARISON_PRECEDENCE + 1)?;
            self.expect(Keyword::And.into())?;
            let high = self.parse_expression_at(COMPARISON_PRECEDENCE + 1)?;
            return Ok(Some(PostfixOperator::Between(low, high, negated)));
        }

        if negated {
            // Only LIKE or ILIKE can remain after a consumed NOT.
            let case_insensitive = match self.next()?.kind {
                TokenKind::Keyword(Keyword::Like) => false,
                TokenKind::Keyword(Keyword::ILike) => true,
                kind => {
                    return Err(
                        self.error_here(format!("expected LIKE after NOT, found {}", kind))
                    );
                }
            };
            let pattern = self.parse_expression_at(COMPARISON_PRECEDENCE + 1)?;
            return Ok(Some(PostfixOperator::NotLike(pattern, case_insensitive)));
        }

        if self.peek() == Some(&TokenKind::OpenBracket) {
            if POSTFIX_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.expect(TokenKind::OpenBracket)?;
            let index = <Self as ExpressionParser>::parse_expression(self)?;
            self.expect(TokenKind::CloseBracket)?;
            return Ok(Some(PostfixOperator::Index(index)));
        }

        // Member access: `.1` for tuple elements, `.name` for map keys on
        // non-column bases (qualified columns are consumed by the atom).
        if self.peek() == Some(&TokenKind::Period) {
            if POSTFIX_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.expect(TokenKind::Period)?;
            let token = self.next()?;
            let index = match token.kind {
                TokenKind::Integer(n) => {
                    let value = n.parse::<i64>().map_err(|_| {
                        crate::error::Error::parse(
                            format!("invalid member index {}", n),
                            token.line,
                            token.column,
                        )
                    })?;
                    Literal::Integer(value).into()
                }
                TokenKind::Ident(name) | TokenKind::QuotedIdent(name) => {
                    Literal::String(name).into()
                }
                kind => {
                    return Err(crate::error::Error::parse(
                        format!("expected member after '.', found {}", kind),
                        token.line,
                        token.column,
                    ));
                }
            };
            return Ok(Some(PostfixOperator::Member(index)));
        }

        if self.peek() == Some(&TokenKind::DoubleColon) {
            if POSTFIX_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.expect(TokenKind::DoubleColon)?;
            let target = self.parse_type()?;
            return Ok(Some(PostfixOperator::CastType(target)));
        }

        if self.peek() == Some(&TokenKind::Keyword(Keyword::Over)) {
            if POSTFIX_PRECEDENCE < min_precedence {
                return Ok(None);
            }
            self.expect(Keyword::Over.into())?;
            let spec = self.parse_window_spec()?;
            return Ok(Some(PostfixOperator::Over(spec)));
        }

        Ok(None)
    }
}
