//! Window function computation.
//!
//! Window expressions are collected from the projection list left to right,
//! rewritten to read a reserved `__window_<n>` slot, and computed per
//! partition: rows partition by the PARTITION BY key, stable-sort by the
//! window's ORDER BY, and each row receives its output in the reserved
//! slot. The subsequent projection pass reads the slots instead of
//! evaluating the window expressions.

use indexmap::IndexMap;

use super::aggregate::drive_aggregate;
use super::executor::Executor;
use super::expression::evaluate;
use super::select::{stable_sort, SortKey};
use super::RowContext;
use crate::error::{Error, Result};
use crate::parsing::ast::{Expression, FrameBound, WindowFrame, WindowSpec};
use crate::types::Value;

/// Collects, rewrites, and computes all window expressions in the
/// projection list. A no-op when there are none.
pub fn compute(
    exec: &mut Executor,
    projections: &mut [(Expression, Option<String>)],
    rows: &mut [RowContext],
) -> Result<()> {
    let mut windows: Vec<(String, Vec<Expression>, WindowSpec)> = Vec::new();
    for (expr, _) in projections.iter_mut() {
        expr.transform(&mut |node| {
            if let Expression::WindowFunction { name, args, over } = node {
                let slot = format!("__window_{}", windows.len());
                windows.push((name.clone(), args.clone(), over.clone()));
                *node = Expression::Column(None, slot);
            }
            Ok::<(), Error>(())
        })?;
    }

    for (n, (name, args, spec)) in windows.iter().enumerate() {
        compute_window(exec, n, name, args, spec, rows)?;
    }
    Ok(())
}

fn compute_window(
    exec: &mut Executor,
    n: usize,
    name: &str,
    args: &[Expression],
    spec: &WindowSpec,
    rows: &mut [RowContext],
) -> Result<()> {
    // Partition row indices by the PARTITION BY key.
    let mut partitions: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (i, row) in rows.iter().enumerate() {
        let mut parts = Vec::with_capacity(spec.partition_by.len());
        for expr in &spec.partition_by {
            parts.push(evaluate(expr, row, exec)?.group_key());
        }
        partitions.entry(parts.join("\0")).or_default().push(i);
    }

    let slot = format!("__window_{}", n);
    for indices in partitions.into_values() {
        // Stable-sort the partition by the window's ORDER BY.
        let indices = if spec.order_by.is_empty() {
            indices
        } else {
            let mut keyed = Vec::with_capacity(indices.len());
            for i in indices {
                let mut keys = Vec::with_capacity(spec.order_by.len());
                for item in &spec.order_by {
                    keys.push(evaluate(&item.expr, &rows[i], exec)?);
                }
                keyed.push((i, keys));
            }
            let directions: Vec<SortKey> = spec
                .order_by
                .iter()
                .map(|item| SortKey::from(item.direction))
                .collect();
            stable_sort(&mut keyed, &directions)?;
            keyed.into_iter().map(|(i, _)| i).collect()
        };

        let outputs = compute_outputs(exec, name, args, spec, rows, &indices)?;
        for (position, &i) in indices.iter().enumerate() {
            rows[i].set(None, &slot, outputs[position].clone());
        }
    }
    Ok(())
}

/// Computes the window function's output for every position of a sorted
/// partition.
fn compute_outputs(
    exec: &mut Executor,
    name: &str,
    args: &[Expression],
    spec: &WindowSpec,
    rows: &[RowContext],
    indices: &[usize],
) -> Result<Vec<Value>> {
    let len = indices.len();
    match name.to_lowercase().as_str() {
        "row_number" => Ok((1..=len as i64).map(Value::Int64).collect()),

        // rank and dense_rank key on the first ORDER BY expression's value.
        "rank" | "dense_rank" => {
            let dense = name.eq_ignore_ascii_case("dense_rank");
            let order_expr = spec
                .order_by
                .first()
                .map(|item| &item.expr)
                .ok_or_else(|| {
                    Error::InvalidValue(format!("{} requires a window ORDER BY", name))
                })?;
            let mut outputs = Vec::with_capacity(len);
            let mut previous: Option<String> = None;
            let mut rank = 0i64;
            let mut dense_rank = 0i64;
            for (position, &i) in indices.iter().enumerate() {
                let key = evaluate(order_expr, &rows[i], exec)?.group_key();
                if previous.as_deref() != Some(key.as_str()) {
                    rank = position as i64 + 1;
                    dense_rank += 1;
                    previous = Some(key);
                }
                outputs.push(Value::Int64(if dense { dense_rank } else { rank }));
            }
            Ok(outputs)
        }

        "ntile" => {
            let arg = args.first().ok_or_else(|| Error::Arity {
                function: "ntile".into(),
                expected: "1".into(),
                found: 0,
            })?;
            let buckets = evaluate(arg, &RowContext::new(), exec)?
                .as_i64()
                .filter(|k| *k > 0)
                .ok_or_else(|| Error::InvalidValue("ntile requires a positive bucket count".into()))?;
            Ok((0..len)
                .map(|i| Value::Int64((i as i64 * buckets) / len as i64 + 1))
                .collect())
        }

        "lag" | "lead" => {
            let lead = name.eq_ignore_ascii_case("lead");
            let value_expr = args.first().ok_or_else(|| Error::Arity {
                function: name.to_string(),
                expected: "1 to 3".into(),
                found: 0,
            })?;
            let mut outputs = Vec::with_capacity(len);
            for (position, &i) in indices.iter().enumerate() {
                let offset = match args.get(1) {
                    Some(expr) => evaluate(expr, &rows[i], exec)?
                        .as_i64()
                        .filter(|o| *o >= 0)
                        .ok_or_else(|| {
                            Error::InvalidValue(format!("invalid {} offset", name))
                        })?,
                    None => 1,
                };
                let target = if lead {
                    position.checked_add(offset as usize)
                } else {
                    position.checked_sub(offset as usize)
                };
                let value = match target.filter(|t| *t < len) {
                    Some(target) => evaluate(value_expr, &rows[indices[target]], exec)?,
                    None => match args.get(2) {
                        Some(default) => evaluate(default, &rows[i], exec)?,
                        None => Value::Null,
                    },
                };
                outputs.push(value);
            }
            Ok(outputs)
        }

        "first_value" => {
            let value_expr = args.first().ok_or_else(|| Error::Arity {
                function: "first_value".into(),
                expected: "1".into(),
                found: 0,
            })?;
            let first = evaluate(value_expr, &rows[indices[0]], exec)?;
            Ok(vec![first; len])
        }

        "last_value" => {
            let value_expr = args.first().ok_or_else(|| Error::Arity {
                function: "last_value".into(),
                expected: "1".into(),
                found: 0,
            })?;
            // Without an explicit frame, last_value falls back to the
            // frame's start bound: the partition start, like first_value.
            if spec.frame.is_none() {
                let first = evaluate(value_expr, &rows[indices[0]], exec)?;
                return Ok(vec![first; len]);
            }
            let mut outputs = Vec::with_capacity(len);
            for (position, &i) in indices.iter().enumerate() {
                let (_, end) = frame_bounds(exec, spec.frame.as_ref(), &rows[i], position, len)?;
                outputs.push(evaluate(value_expr, &rows[indices[end]], exec)?);
            }
            Ok(outputs)
        }

        // Any registry aggregate computes over the frame: by default from
        // the partition start to the current row.
        _ if exec.functions.is_aggregate(name) => {
            let mut outputs = Vec::with_capacity(len);
            for (position, &i) in indices.iter().enumerate() {
                let (start, end) = frame_bounds(exec, spec.frame.as_ref(), &rows[i], position, len)?;
                let frame: Vec<RowContext> = if start > end {
                    Vec::new()
                } else {
                    indices[start..=end].iter().map(|&j| rows[j].clone()).collect()
                };
                outputs.push(drive_aggregate(exec, name, args, false, &frame)?);
            }
            Ok(outputs)
        }

        _ => Err(Error::UnknownFunction(format!("window function {}", name))),
    }
}

/// Resolves the frame of the given row position to inclusive start and end
/// positions within the partition. The default frame runs from the
/// partition start to the current row; ROWS and RANGE are both interpreted
/// over row positions.
fn frame_bounds(
    exec: &mut Executor,
    frame: Option<&WindowFrame>,
    row: &RowContext,
    position: usize,
    len: usize,
) -> Result<(usize, usize)> {
    let last = len.saturating_sub(1);
    let Some(frame) = frame else {
        return Ok((0, position));
    };

    let resolve = |exec: &mut Executor, bound: &FrameBound| -> Result<usize> {
        Ok(match bound {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::UnboundedFollowing => last,
            FrameBound::CurrentRow => position,
            FrameBound::Preceding(expr) => {
                let n = frame_distance(exec, expr, row)?;
                position.saturating_sub(n)
            }
            FrameBound::Following(expr) => {
                let n = frame_distance(exec, expr, row)?;
                position.saturating_add(n).min(last)
            }
        })
    };

    let start = resolve(exec, &frame.start)?;
    let end = match &frame.end {
        Some(bound) => resolve(exec, bound)?,
        None => position,
    };
    Ok((start, end))
}

fn frame_distance(exec: &mut Executor, expr: &Expression, row: &RowContext) -> Result<usize> {
    evaluate(expr, row, exec)?
        .as_i64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| Error::InvalidValue("invalid window frame distance".into()))
}
