//! Aggregation: the GROUP BY branch and the no-GROUP-BY aggregate collapse.
//!
//! Groups are keyed by the stringified values of the GROUP BY expressions
//! (null keeps the distinct "NULL" sentinel), joined by a NUL byte that
//! cannot occur inside a value's textual form. Aggregate calls inside
//! projections, HAVING, and ORDER BY are resolved per group by driving the
//! registry's aggregate interface and splicing the result into a reserved
//! slot on the group's representative row.

use indexmap::IndexMap;
use std::collections::HashSet;

use super::executor::Executor;
use super::expression::{evaluate, evaluate_function_args};
use super::select::{eval_limit_offset, projection_name, stable_sort, SortKey};
use super::{QueryResult, ResultColumn, RowContext};
use crate::error::{Error, Result};
use crate::functions::FunctionRegistry;
use crate::parsing::ast::{Expression, SelectStatement};
use crate::types::{DataType, Value};

/// Whether any node of the expression is an aggregate function call.
pub fn contains_aggregate(expr: &Expression, functions: &FunctionRegistry) -> bool {
    expr.contains(&|node| {
        matches!(node, Expression::Function { name, .. } if functions.is_aggregate(name))
    })
}

/// Executes the GROUP BY branch of a SELECT over the filtered rows.
pub fn execute_group_by(
    exec: &mut Executor,
    select: &SelectStatement,
    rows: Vec<RowContext>,
) -> Result<QueryResult> {
    let mut groups: IndexMap<String, Vec<RowContext>> = IndexMap::new();
    for row in rows {
        let mut parts = Vec::with_capacity(select.group_by.len());
        for expr in &select.group_by {
            parts.push(evaluate(expr, &row, exec)?.group_key());
        }
        groups.entry(parts.join("\0")).or_default().push(row);
    }
    let groups: Vec<Vec<RowContext>> = groups.into_values().collect();
    project_groups(exec, select, groups)
}

/// Collapses the whole filtered set into a single row when the projection
/// contains aggregates but there is no GROUP BY. The representative row for
/// identifier references outside aggregates is the first row, if any.
pub fn execute_global(
    exec: &mut Executor,
    select: &SelectStatement,
    rows: Vec<RowContext>,
) -> Result<QueryResult> {
    project_groups(exec, select, vec![rows])
}

/// Projects each group into one output row, enforcing HAVING and applying
/// ORDER BY and LIMIT/OFFSET over the resulting rows.
fn project_groups(
    exec: &mut Executor,
    select: &SelectStatement,
    groups: Vec<Vec<RowContext>>,
) -> Result<QueryResult> {
    let names: Vec<String> = select
        .select
        .iter()
        .enumerate()
        .map(|(i, (expr, alias))| projection_name(expr, alias.as_ref(), i))
        .collect();

    let mut out: Vec<(Vec<Value>, Vec<Value>)> = Vec::new();
    for group in &groups {
        // The representative row carries the reserved aggregate slots.
        let mut rep = group.first().cloned().unwrap_or_default();
        let mut counter = 0;

        let mut values = Vec::with_capacity(select.select.len());
        for (expr, _) in &select.select {
            let resolved = resolve_aggregates(exec, expr, group, &mut rep, &mut counter)?;
            values.push(evaluate(&resolved, &rep, exec)?);
        }

        if let Some(having) = &select.having {
            let resolved = resolve_aggregates(exec, having, group, &mut rep, &mut counter)?;
            if !evaluate(&resolved, &rep, exec)?.is_truthy() {
                continue;
            }
        }

        let mut order_keys = Vec::with_capacity(select.order_by.len());
        for item in &select.order_by {
            // A bare identifier resolves against SELECT-level aliases first.
            if let Expression::Column(None, name) = &item.expr
                && let Some(i) = select
                    .select
                    .iter()
                    .position(|(_, alias)| alias.as_deref() == Some(name.as_str()))
            {
                order_keys.push(values[i].clone());
                continue;
            }
            let resolved = resolve_aggregates(exec, &item.expr, group, &mut rep, &mut counter)?;
            order_keys.push(evaluate(&resolved, &rep, exec)?);
        }
        out.push((values, order_keys));
    }

    if !select.order_by.is_empty() {
        let directions: Vec<SortKey> = select
            .order_by
            .iter()
            .map(|item| SortKey::from(item.direction))
            .collect();
        stable_sort(&mut out, &directions)?;
    }

    let (limit, offset) = eval_limit_offset(exec, select)?;
    let rows: Vec<Vec<Value>> = out
        .into_iter()
        .map(|(values, _)| values)
        .skip(offset)
        .take(limit)
        .collect();

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| ResultColumn {
            name,
            data_type: rows
                .first()
                .map(|row| row[i].data_type())
                .unwrap_or(DataType::Null),
        })
        .collect();

    Ok(QueryResult {
        columns,
        rows,
        affected: 0,
    })
}

/// Replaces every aggregate function call in the expression with a reserved
/// column slot on the representative row, computing the aggregate over the
/// group as it goes. Returns the rewritten expression.
fn resolve_aggregates(
    exec: &mut Executor,
    expr: &Expression,
    group: &[RowContext],
    rep: &mut RowContext,
    counter: &mut usize,
) -> Result<Expression> {
    let mut resolved = expr.clone();
    resolved.transform(&mut |node| {
        if let Expression::Function {
            name,
            args,
            distinct,
        } = node
            && exec.functions.is_aggregate(name)
        {
            let value = drive_aggregate(exec, name, args, *distinct, group)?;
            let slot = format!("__agg_{}", *counter);
            *counter += 1;
            rep.set(None, &slot, value);
            *node = Expression::Column(None, slot);
        }
        Ok::<(), Error>(())
    })?;
    Ok(resolved)
}

/// Drives the registry's aggregate interface over a group: create a state,
/// accumulate every row (deduplicating the first argument under DISTINCT),
/// finalize into a single value.
pub(crate) fn drive_aggregate(
    exec: &mut Executor,
    name: &str,
    args: &[Expression],
    distinct: bool,
    group: &[RowContext],
) -> Result<Value> {
    let functions = exec.functions;
    let function = functions
        .get_aggregate(name)
        .ok_or_else(|| Error::UnknownFunction(name.to_string()))?;
    let mut state = function.create_state();
    let mut seen = HashSet::new();
    for row in group {
        let values = evaluate_function_args(args, row, exec)?;
        if distinct {
            let key = values
                .first()
                .map(|v| v.group_key())
                .unwrap_or_else(|| "NULL".to_string());
            if !seen.insert(key) {
                continue;
            }
        }
        state.accumulate(&values)?;
    }
    state.finalize()
}
