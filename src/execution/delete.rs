//! DELETE execution.

use tracing::debug;

use super::executor::Executor;
use super::expression::evaluate;
use super::{QueryResult, RowContext};
use crate::error::Result;
use crate::parsing::ast::Expression;

/// Executes a DELETE: scans the table, marks matching rows, and removes
/// them after the scan.
pub fn execute(
    exec: &mut Executor,
    table_name: &str,
    filter: Option<&Expression>,
) -> Result<QueryResult> {
    let table = exec.catalog.get(table_name)?;
    let columns = table.columns.clone();
    let alias = table.name.clone();
    let rows = table.rows.clone();

    let mut doomed = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let matched = match filter {
            Some(filter) => {
                let mut ctx = RowContext::new();
                for (column, value) in columns.iter().zip(row.iter()) {
                    ctx.set(Some(&alias), &column.name, value.clone());
                }
                evaluate(filter, &ctx, exec)?.is_truthy()
            }
            None => true,
        };
        if matched {
            doomed.push(i);
        }
    }

    let deleted = doomed.len() as u64;
    let table = exec.catalog.get_mut(table_name)?;
    for i in doomed.into_iter().rev() {
        table.rows.remove(i);
    }

    debug!(table = %table_name, rows = deleted, "delete");
    Ok(QueryResult::affected(deleted))
}
