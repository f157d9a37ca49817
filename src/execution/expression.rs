//! Expression evaluation against a row context.
//!
//! The evaluator and the executor are mutually recursive: subqueries inside
//! expressions execute through the executor borrow threaded into every
//! call.

use std::cmp::Ordering;

use super::executor::Executor;
use super::RowContext;
use crate::error::{Error, Result};
use crate::parsing::ast::{Expression, Literal, Operator};
use crate::types::{compare, convert, DataType, Value};

/// Evaluates an expression in the given row context.
pub fn evaluate(expr: &Expression, ctx: &RowContext, exec: &mut Executor) -> Result<Value> {
    match expr {
        Expression::Literal(literal) => Ok(match literal {
            Literal::Null => Value::Null,
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::Integer(i) => Value::Int64(*i),
            Literal::Float(f) => Value::Float64(*f),
            Literal::String(s) => Value::String(s.clone()),
        }),

        Expression::Column(None, name) => ctx
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(name.clone())),

        Expression::Column(Some(table), name) => ctx
            .get_qualified(table, name)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(format!("{}.{}", table, name))),

        Expression::All(_) => Err(Error::InvalidValue(
            "* is only allowed in SELECT projections and count(*)".into(),
        )),

        Expression::Operator(op) => evaluate_operator(op, ctx, exec),

        Expression::Function {
            name,
            args,
            distinct,
        } => {
            if args.iter().any(|a| matches!(a, Expression::Lambda { .. })) {
                return Err(Error::TypeMismatch {
                    expected: "a value argument".into(),
                    found: format!("lambda passed to {}", name),
                });
            }
            let values = evaluate_function_args(args, ctx, exec)?;
            exec.functions.execute(name, &values, *distinct)
        }

        Expression::Cast { expr, target } => {
            let value = evaluate(expr, ctx, exec)?;
            let target = DataType::from_type_expr(target)?;
            convert::cast(&value, &target)
        }

        Expression::Case {
            operand,
            when_clauses,
            else_clause,
        } => {
            match operand {
                // Simple CASE: compare the operand against each WHEN value.
                Some(operand) => {
                    let operand = evaluate(operand, ctx, exec)?;
                    for (when, then) in when_clauses {
                        let when = evaluate(when, ctx, exec)?;
                        if !operand.is_null() && !when.is_null() && operand.sql_eq(&when)? {
                            return evaluate(then, ctx, exec);
                        }
                    }
                }
                // Searched CASE: the first truthy WHEN condition wins.
                None => {
                    for (when, then) in when_clauses {
                        if evaluate(when, ctx, exec)?.is_truthy() {
                            return evaluate(then, ctx, exec);
                        }
                    }
                }
            }
            match else_clause {
                Some(else_clause) => evaluate(else_clause, ctx, exec),
                None => Ok(Value::Null),
            }
        }

        Expression::InList {
            expr,
            list,
            negated,
        } => {
            let value = evaluate(expr, ctx, exec)?;
            if value.is_null() {
                return Ok(Value::Null);
            }
            let mut saw_null = false;
            for item in list {
                let item = evaluate(item, ctx, exec)?;
                if item.is_null() {
                    saw_null = true;
                    continue;
                }
                if value.sql_eq(&item)? {
                    return Ok(Value::Bool(!negated));
                }
            }
            if saw_null {
                return Ok(Value::Null);
            }
            Ok(Value::Bool(*negated))
        }

        Expression::InSubquery {
            expr,
            subquery,
            negated,
        } => {
            let value = evaluate(expr, ctx, exec)?;
            if value.is_null() {
                return Ok(Value::Null);
            }
            let result = exec.execute(subquery)?;
            let mut saw_null = false;
            for row in &result.rows {
                let item = row.first().cloned().unwrap_or(Value::Null);
                if item.is_null() {
                    saw_null = true;
                    continue;
                }
                if value.sql_eq(&item)? {
                    return Ok(Value::Bool(!negated));
                }
            }
            if saw_null {
                return Ok(Value::Null);
            }
            Ok(Value::Bool(*negated))
        }

        Expression::Between {
            expr,
            low,
            high,
            negated,
        } => {
            let value = evaluate(expr, ctx, exec)?;
            let low = evaluate(low, ctx, exec)?;
            let high = evaluate(high, ctx, exec)?;
            if value.is_null() || low.is_null() || high.is_null() {
                return Ok(Value::Null);
            }
            let within = compare(&value, &low)? != Ordering::Less
                && compare(&value, &high)? != Ordering::Greater;
            Ok(Value::Bool(within != *negated))
        }

        Expression::Subquery(statement) => {
            let result = exec.execute(statement)?;
            if result.rows.len() > 1 {
                return Err(Error::InvalidValue(
                    "scalar subquery returned more than one row".into(),
                ));
            }
            Ok(result
                .rows
                .first()
                .and_then(|row| row.first().cloned())
                .unwrap_or(Value::Null))
        }

        Expression::Exists { subquery, negated } => {
            let result = exec.execute(subquery)?;
            Ok(Value::Bool(result.rows.is_empty() == *negated))
        }

        Expression::ArrayLiteral(elements) => {
            let values = elements
                .iter()
                .map(|e| evaluate(e, ctx, exec))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }

        Expression::TupleLiteral(elements) => {
            let values = elements
                .iter()
                .map(|e| evaluate(e, ctx, exec))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Tuple(values))
        }

        Expression::MapLiteral(pairs) => {
            let entries = pairs
                .iter()
                .map(|(k, v)| Ok((evaluate(k, ctx, exec)?, evaluate(v, ctx, exec)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Map(entries))
        }

        Expression::Index { base, index } => {
            let base = evaluate(base, ctx, exec)?;
            let index = evaluate(index, ctx, exec)?;
            evaluate_index(&base, &index)
        }

        Expression::Ternary {
            condition,
            then,
            otherwise,
        } => {
            if evaluate(condition, ctx, exec)?.is_truthy() {
                evaluate(then, ctx, exec)
            } else {
                evaluate(otherwise, ctx, exec)
            }
        }

        Expression::WindowFunction { name, .. } => Err(Error::NotImplemented(format!(
            "window function {} outside SELECT projections",
            name
        ))),

        Expression::Parameter(_) => Err(Error::NotImplemented(
            "parameter placeholders are not bound by this engine".into(),
        )),

        Expression::Lambda { .. } => Err(Error::TypeMismatch {
            expected: "a value expression".into(),
            found: "lambda".into(),
        }),
    }
}

/// Evaluates function-call arguments. A `*` argument (as in `count(*)`)
/// contributes no value: the aggregate counts rows.
pub fn evaluate_function_args(
    args: &[Expression],
    ctx: &RowContext,
    exec: &mut Executor,
) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        if matches!(arg, Expression::All(None)) {
            continue;
        }
        values.push(evaluate(arg, ctx, exec)?);
    }
    Ok(values)
}

/// Element access. Arrays and tuples are 1-indexed at the SQL surface; an
/// out-of-bounds index yields null, not an error. Maps index by key.
fn evaluate_index(base: &Value, index: &Value) -> Result<Value> {
    match base {
        Value::Null => Ok(Value::Null),
        Value::Array(elements) | Value::Tuple(elements) => {
            let Some(i) = index.as_i64() else {
                return if index.is_null() {
                    Ok(Value::Null)
                } else {
                    Err(Error::TypeMismatch {
                        expected: "an integer index".into(),
                        found: index.data_type().to_string(),
                    })
                };
            };
            if i < 1 || i as usize > elements.len() {
                return Ok(Value::Null);
            }
            Ok(elements[i as usize - 1].clone())
        }
        Value::Map(entries) => {
            if index.is_null() {
                return Ok(Value::Null);
            }
            for (key, value) in entries {
                if key.sql_eq(index)? {
                    return Ok(value.clone());
                }
            }
            Ok(Value::Null)
        }
        other => Err(Error::TypeMismatch {
            expected: "Array, Tuple or Map".into(),
            found: other.data_type().to_string(),
        }),
    }
}

fn evaluate_operator(op: &Operator, ctx: &RowContext, exec: &mut Executor) -> Result<Value> {
    use Operator::*;

    match op {
        // Three-valued logic for AND/OR/NOT.
        And(lhs, rhs) => {
            let lhs = to_tristate(evaluate(lhs, ctx, exec)?);
            let rhs = to_tristate(evaluate(rhs, ctx, exec)?);
            Ok(match (lhs, rhs) {
                (Some(false), _) | (_, Some(false)) => Value::Bool(false),
                (Some(true), Some(true)) => Value::Bool(true),
                _ => Value::Null,
            })
        }
        Or(lhs, rhs) => {
            let lhs = to_tristate(evaluate(lhs, ctx, exec)?);
            let rhs = to_tristate(evaluate(rhs, ctx, exec)?);
            Ok(match (lhs, rhs) {
                (Some(true), _) | (_, Some(true)) => Value::Bool(true),
                (Some(false), Some(false)) => Value::Bool(false),
                _ => Value::Null,
            })
        }
        Not(operand) => {
            let value = evaluate(operand, ctx, exec)?;
            Ok(match to_tristate(value) {
                Some(b) => Value::Bool(!b),
                None => Value::Null,
            })
        }

        // Comparisons. A null operand makes the comparison null; IS NULL is
        // the exception, handled below.
        Equal(lhs, rhs) => compare_op(lhs, rhs, ctx, exec, |v, ord| {
            if let Some(eq) = v {
                eq
            } else {
                ord == Ordering::Equal
            }
        }),
        NotEqual(lhs, rhs) => compare_op(lhs, rhs, ctx, exec, |v, ord| {
            if let Some(eq) = v {
                !eq
            } else {
                ord != Ordering::Equal
            }
        }),
        LessThan(lhs, rhs) => ordering_op(lhs, rhs, ctx, exec, |ord| ord == Ordering::Less),
        LessThanOrEqual(lhs, rhs) => {
            ordering_op(lhs, rhs, ctx, exec, |ord| ord != Ordering::Greater)
        }
        GreaterThan(lhs, rhs) => ordering_op(lhs, rhs, ctx, exec, |ord| ord == Ordering::Greater),
        GreaterThanOrEqual(lhs, rhs) => {
            ordering_op(lhs, rhs, ctx, exec, |ord| ord != Ordering::Less)
        }

        IsNull { expr, negated } => {
            let value = evaluate(expr, ctx, exec)?;
            Ok(Value::Bool(value.is_null() != *negated))
        }

        Like {
            expr,
            pattern,
            case_insensitive,
            negated,
        } => {
            let value = evaluate(expr, ctx, exec)?;
            let pattern = evaluate(pattern, ctx, exec)?;
            if value.is_null() || pattern.is_null() {
                return Ok(Value::Null);
            }
            let (Value::String(text) | Value::FixedString(text, _)) = &value else {
                return Err(Error::TypeMismatch {
                    expected: "String".into(),
                    found: value.data_type().to_string(),
                });
            };
            let (Value::String(pattern) | Value::FixedString(pattern, _)) = &pattern else {
                return Err(Error::TypeMismatch {
                    expected: "String".into(),
                    found: pattern.data_type().to_string(),
                });
            };
            let matched = like_match(text, pattern, *case_insensitive)?;
            Ok(Value::Bool(matched != *negated))
        }

        Concat(lhs, rhs) => {
            let lhs = evaluate(lhs, ctx, exec)?;
            let rhs = evaluate(rhs, ctx, exec)?;
            if lhs.is_null() || rhs.is_null() {
                return Ok(Value::Null);
            }
            match (&lhs, &rhs) {
                (
                    Value::String(x) | Value::FixedString(x, _),
                    Value::String(y) | Value::FixedString(y, _),
                ) => Ok(Value::String(format!("{}{}", x, y))),
                (Value::Array(x), Value::Array(y)) => {
                    let mut elements = x.clone();
                    elements.extend(y.iter().cloned());
                    Ok(Value::Array(elements))
                }
                _ => Err(Error::TypeMismatch {
                    expected: "String || String or Array || Array".into(),
                    found: format!("{} || {}", lhs.data_type(), rhs.data_type()),
                }),
            }
        }

        Add(lhs, rhs) => {
            let lhs = evaluate(lhs, ctx, exec)?;
            let rhs = evaluate(rhs, ctx, exec)?;
            lhs.checked_add(&rhs)
        }
        Subtract(lhs, rhs) => {
            let lhs = evaluate(lhs, ctx, exec)?;
            let rhs = evaluate(rhs, ctx, exec)?;
            lhs.checked_sub(&rhs)
        }
        Multiply(lhs, rhs) => {
            let lhs = evaluate(lhs, ctx, exec)?;
            let rhs = evaluate(rhs, ctx, exec)?;
            lhs.checked_mul(&rhs)
        }
        Divide(lhs, rhs) => {
            let lhs = evaluate(lhs, ctx, exec)?;
            let rhs = evaluate(rhs, ctx, exec)?;
            lhs.checked_div(&rhs)
        }
        Remainder(lhs, rhs) => {
            let lhs = evaluate(lhs, ctx, exec)?;
            let rhs = evaluate(rhs, ctx, exec)?;
            lhs.checked_rem(&rhs)
        }
        Identity(operand) => evaluate(operand, ctx, exec),
        Negate(operand) => evaluate(operand, ctx, exec)?.checked_neg(),
    }
}

/// Converts a value to Some(bool) or None for null, for three-valued logic.
fn to_tristate(value: Value) -> Option<bool> {
    if value.is_null() {
        None
    } else {
        Some(value.is_truthy())
    }
}

/// Shared null-propagating equality comparison. Maps are equatable but not
/// orderable, so equality goes through `sql_eq` while the remaining
/// comparisons use `compare`.
fn compare_op(
    lhs: &Expression,
    rhs: &Expression,
    ctx: &RowContext,
    exec: &mut Executor,
    decide: impl Fn(Option<bool>, Ordering) -> bool,
) -> Result<Value> {
    let lhs = evaluate(lhs, ctx, exec)?;
    let rhs = evaluate(rhs, ctx, exec)?;
    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }
    if matches!(lhs, Value::Map(_)) || matches!(rhs, Value::Map(_)) {
        return Ok(Value::Bool(decide(Some(lhs.sql_eq(&rhs)?), Ordering::Equal)));
    }
    Ok(Value::Bool(decide(None, compare(&lhs, &rhs)?)))
}

fn ordering_op(
    lhs: &Expression,
    rhs: &Expression,
    ctx: &RowContext,
    exec: &mut Executor,
    decide: impl Fn(Ordering) -> bool,
) -> Result<Value> {
    let lhs = evaluate(lhs, ctx, exec)?;
    let rhs = evaluate(rhs, ctx, exec)?;
    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }
    Ok(Value::Bool(decide(compare(&lhs, &rhs)?)))
}

/// Matches a SQL LIKE pattern by translating it to an anchored regex:
/// regex metacharacters are escaped, then `%` becomes `.*` and `_` becomes
/// `.`. ILIKE adds case insensitivity.
fn like_match(text: &str, pattern: &str, case_insensitive: bool) -> Result<bool> {
    let mut regex = String::with_capacity(pattern.len() + 8);
    if case_insensitive {
        regex.push_str("(?i)");
    }
    regex.push('^');
    for c in pattern.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }
    regex.push('$');
    let re = regex::Regex::new(&regex)
        .map_err(|e| Error::InvalidValue(format!("invalid LIKE pattern: {}", e)))?;
    Ok(re.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_translation() {
        assert!(like_match("hello world", "hello%", false).unwrap());
        assert!(like_match("hello", "h_llo", false).unwrap());
        assert!(!like_match("hello", "H%", false).unwrap());
        assert!(like_match("hello", "H%", true).unwrap());
        // Regex metacharacters in the pattern are literal.
        assert!(like_match("a.b", "a.b", false).unwrap());
        assert!(!like_match("axb", "a.b", false).unwrap());
    }

    #[test]
    fn test_index_rules() {
        let array = Value::Array(vec![Value::Int64(10), Value::Int64(20)]);
        assert_eq!(
            evaluate_index(&array, &Value::Int64(1)).unwrap(),
            Value::Int64(10)
        );
        assert_eq!(evaluate_index(&array, &Value::Int64(0)).unwrap(), Value::Null);
        assert_eq!(evaluate_index(&array, &Value::Int64(3)).unwrap(), Value::Null);
        assert_eq!(
            evaluate_index(&array, &Value::Int64(-1)).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_map_index() {
        let map = Value::Map(vec![(Value::String("k".into()), Value::Int64(7))]);
        assert_eq!(
            evaluate_index(&map, &Value::String("k".into())).unwrap(),
            Value::Int64(7)
        );
        assert_eq!(
            evaluate_index(&map, &Value::String("missing".into())).unwrap(),
            Value::Null
        );
    }
}
