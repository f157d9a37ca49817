//! INSERT execution.

use tracing::debug;

use super::executor::Executor;
use super::expression::evaluate;
use super::{QueryResult, RowContext};
use crate::error::{Error, Result};
use crate::parsing::ast::InsertSource;
use crate::types::{convert, Row, Value};

/// Executes an INSERT: computes each target column by matching the optional
/// column list (positional by default), casting through the column type's
/// construction function and filling missing columns with their declared
/// default expression or the type's default value.
pub fn execute(
    exec: &mut Executor,
    table_name: &str,
    columns: Option<&[String]>,
    source: &InsertSource,
) -> Result<QueryResult> {
    // Evaluate or execute the source rows first.
    let source_rows: Vec<Row> = match source {
        InsertSource::Values(rows) => {
            let empty = RowContext::new();
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let mut values = Vec::with_capacity(row.len());
                for expr in row {
                    values.push(evaluate(expr, &empty, exec)?);
                }
                out.push(values);
            }
            out
        }
        InsertSource::Select(statement) => exec.execute(statement)?.rows,
    };

    let table = exec.catalog.get(table_name)?;
    let table_columns = table.columns.clone();

    // Map each table column to its position in the source row, if any.
    let positions: Vec<Option<usize>> = match columns {
        None => (0..table_columns.len()).map(Some).collect(),
        Some(columns) => {
            let mut positions = vec![None; table_columns.len()];
            for (source_pos, name) in columns.iter().enumerate() {
                let target = table.column_index(name)?;
                positions[target] = Some(source_pos);
            }
            positions
        }
    };
    let expected = columns.map(|c| c.len()).unwrap_or(table_columns.len());

    // Resolve the fill-in value for every column the source doesn't
    // provide: the declared DEFAULT expression when there is one, the
    // type's default otherwise.
    let empty = RowContext::new();
    let mut defaults: Vec<Option<Value>> = Vec::with_capacity(table_columns.len());
    for (column, position) in table_columns.iter().zip(positions.iter()) {
        if position.is_some() {
            defaults.push(None);
            continue;
        }
        let value = match &column.default {
            Some(default) => {
                let value = evaluate(default, &empty, exec)?;
                convert::cast(&value, &column.data_type)?
            }
            None => convert::default_value(&column.data_type),
        };
        defaults.push(Some(value));
    }

    let mut rows = Vec::with_capacity(source_rows.len());
    for source_row in source_rows {
        if source_row.len() != expected {
            return Err(Error::InvalidValue(format!(
                "INSERT expects {} values, got {}",
                expected,
                source_row.len()
            )));
        }
        let mut row = Vec::with_capacity(table_columns.len());
        for (i, (column, position)) in table_columns.iter().zip(positions.iter()).enumerate() {
            let value = match position {
                Some(position) => convert::cast(&source_row[*position], &column.data_type)?,
                None => defaults[i].clone().unwrap(),
            };
            row.push(value);
        }
        rows.push(row);
    }

    let inserted = rows.len() as u64;
    exec.catalog.get_mut(table_name)?.rows.extend(rows);
    debug!(table = %table_name, rows = inserted, "insert");
    Ok(QueryResult::affected(inserted))
}
