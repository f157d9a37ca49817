//! UPDATE execution.

use tracing::debug;

use super::executor::Executor;
use super::expression::evaluate;
use super::{QueryResult, RowContext};
use crate::error::Result;
use crate::parsing::ast::Expression;
use crate::types::convert;

/// Executes an UPDATE: scans the table, evaluates the optional WHERE per
/// row, and on match applies the assignments by evaluating each right-hand
/// side in the row's context and reassigning through the column type's
/// construction function.
pub fn execute(
    exec: &mut Executor,
    table_name: &str,
    set: &[(String, Expression)],
    filter: Option<&Expression>,
) -> Result<QueryResult> {
    let table = exec.catalog.get(table_name)?;
    let columns = table.columns.clone();
    let alias = table.name.clone();

    // Resolve assignment targets up front so an unknown column fails before
    // any row is touched.
    let mut targets = Vec::with_capacity(set.len());
    for (name, expr) in set {
        targets.push((table.column_index(name)?, expr));
    }

    // Phase 1: compute the updates against a snapshot of the rows.
    let rows = table.rows.clone();
    let mut updates = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let mut ctx = RowContext::new();
        for (column, value) in columns.iter().zip(row.iter()) {
            ctx.set(Some(&alias), &column.name, value.clone());
        }
        if let Some(filter) = filter
            && !evaluate(filter, &ctx, exec)?.is_truthy()
        {
            continue;
        }
        let mut assigned = Vec::with_capacity(targets.len());
        for (target, expr) in &targets {
            let value = evaluate(expr, &ctx, exec)?;
            assigned.push((*target, convert::cast(&value, &columns[*target].data_type)?));
        }
        updates.push((i, assigned));
    }

    // Phase 2: apply them.
    let updated = updates.len() as u64;
    let table = exec.catalog.get_mut(table_name)?;
    for (i, assigned) in updates {
        for (target, value) in assigned {
            table.rows[i][target] = value;
        }
    }

    debug!(table = %table_name, rows = updated, "update");
    Ok(QueryResult::affected(updated))
}
