//! Join combinators over row contexts.
//!
//! All joins materialize both sides fully and pair rows with nested loops.
//! Each successful pairing clones the left context and merges the right
//! into the clone, so contexts never alias across rows.

use super::executor::Executor;
use super::expression::evaluate;
use super::RowContext;
use crate::error::{Error, Result};
use crate::parsing::ast::{Expression, JoinKind};
use crate::types::Value;

/// Executes a join of the given kind over fully materialized sides.
pub fn execute(
    exec: &mut Executor,
    left: Vec<RowContext>,
    right: Vec<RowContext>,
    kind: JoinKind,
    predicate: Option<&Expression>,
    using: Option<&[String]>,
) -> Result<Vec<RowContext>> {
    match kind {
        JoinKind::Cross => {
            let mut out = Vec::new();
            for l in &left {
                for r in &right {
                    out.push(merged(l, r));
                }
            }
            Ok(out)
        }

        JoinKind::Inner => {
            let mut out = Vec::new();
            for l in &left {
                for r in &right {
                    if let Some(row) = try_match(exec, l, r, predicate, using)? {
                        out.push(row);
                    }
                }
            }
            Ok(out)
        }

        JoinKind::Left => {
            let right_columns = observed_columns(&right);
            let mut out = Vec::new();
            for l in &left {
                let mut matched = false;
                for r in &right {
                    if let Some(row) = try_match(exec, l, r, predicate, using)? {
                        out.push(row);
                        matched = true;
                    }
                }
                if !matched {
                    out.push(null_padded(l, &right_columns));
                }
            }
            Ok(out)
        }

        // RIGHT is LEFT with the operands swapped.
        JoinKind::Right => execute(exec, right, left, JoinKind::Left, predicate, using),

        JoinKind::Full => {
            let right_columns = observed_columns(&right);
            let left_columns = observed_columns(&left);
            let mut right_matched = vec![false; right.len()];
            let mut out = Vec::new();
            for l in &left {
                let mut matched = false;
                for (ri, r) in right.iter().enumerate() {
                    if let Some(row) = try_match(exec, l, r, predicate, using)? {
                        out.push(row);
                        matched = true;
                        right_matched[ri] = true;
                    }
                }
                if !matched {
                    out.push(null_padded(l, &right_columns));
                }
            }
            // The unmatched-right residual contributes right-side data
            // only; left-side columns are padded with nulls so that
            // projections over them still resolve.
            for (ri, r) in right.iter().enumerate() {
                if !right_matched[ri] {
                    let mut row = RowContext::new();
                    for (alias, name) in &left_columns {
                        row.set(alias.as_deref(), name, Value::Null);
                    }
                    row.merge(r);
                    out.push(row);
                }
            }
            Ok(out)
        }

        JoinKind::LeftSemi => {
            let mut out = Vec::new();
            for l in &left {
                for r in &right {
                    if try_match(exec, l, r, predicate, using)?.is_some() {
                        out.push(l.clone());
                        break;
                    }
                }
            }
            Ok(out)
        }

        JoinKind::LeftAnti => {
            let mut out = Vec::new();
            for l in &left {
                let mut matched = false;
                for r in &right {
                    if try_match(exec, l, r, predicate, using)?.is_some() {
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    out.push(l.clone());
                }
            }
            Ok(out)
        }

        JoinKind::Asof => Err(Error::NotImplemented("ASOF JOIN".into())),
        JoinKind::RightSemi => Err(Error::NotImplemented("RIGHT SEMI JOIN".into())),
        JoinKind::RightAnti => Err(Error::NotImplemented("RIGHT ANTI JOIN".into())),
    }
}

/// Pairs a left and right row if they match. A USING list compares the
/// named columns from each side's original context, short-circuiting on the
/// first mismatch; an ON predicate evaluates over the merged context; with
/// neither, every pair matches.
fn try_match(
    exec: &mut Executor,
    left: &RowContext,
    right: &RowContext,
    predicate: Option<&Expression>,
    using: Option<&[String]>,
) -> Result<Option<RowContext>> {
    if let Some(columns) = using {
        for column in columns {
            let l = left
                .get(column)
                .ok_or_else(|| Error::ColumnNotFound(column.clone()))?;
            let r = right
                .get(column)
                .ok_or_else(|| Error::ColumnNotFound(column.clone()))?;
            if l.is_null() || r.is_null() || !l.sql_eq(r)? {
                return Ok(None);
            }
        }
        return Ok(Some(merged(left, right)));
    }
    let row = merged(left, right);
    match predicate {
        Some(predicate) => {
            if evaluate(predicate, &row, exec)?.is_truthy() {
                Ok(Some(row))
            } else {
                Ok(None)
            }
        }
        None => Ok(Some(row)),
    }
}

fn merged(left: &RowContext, right: &RowContext) -> RowContext {
    let mut row = left.clone();
    row.merge(right);
    row
}

/// Every column name (qualified and unqualified) observed on any context of
/// a join side, used to null-pad unmatched rows.
fn observed_columns(rows: &[RowContext]) -> Vec<(Option<String>, String)> {
    let mut seen = std::collections::HashSet::new();
    let mut columns = Vec::new();
    for row in rows {
        for alias in row.aliases() {
            for name in row.qualified_columns(&alias).unwrap_or_default() {
                if seen.insert((Some(alias.clone()), name.clone())) {
                    columns.push((Some(alias.clone()), name));
                }
            }
        }
        for name in row.columns() {
            if seen.insert((None, name.clone())) {
                columns.push((None, name.clone()));
            }
        }
    }
    columns
}

/// A left row extended with nulls for every observed right-side column.
fn null_padded(left: &RowContext, right_columns: &[(Option<String>, String)]) -> RowContext {
    let mut row = left.clone();
    for (alias, name) in right_columns {
        row.set(alias.as_deref(), name, Value::Null);
    }
    row
}
