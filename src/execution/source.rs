//! FROM clause materialization: tables, CTEs, subqueries, table functions,
//! joins, and ARRAY JOIN expansion.

use super::executor::Executor;
use super::expression::evaluate;
use super::{join, QueryResult, RowContext};
use crate::error::{Error, Result};
use crate::parsing::ast::{Expression, TableRef};
use crate::types::Value;

/// Materializes a table reference into a list of row contexts.
pub fn materialize(exec: &mut Executor, table_ref: &TableRef) -> Result<Vec<RowContext>> {
    match table_ref {
        TableRef::Table { name, alias } => {
            let alias = alias.as_deref().unwrap_or(name);
            // A registered CTE shadows any catalog table of the same name.
            if exec.cte(name).is_some() {
                return materialize_cte(exec, name, alias);
            }
            let table = exec.catalog.get(name)?;
            let mut rows = Vec::with_capacity(table.rows.len());
            for table_row in &table.rows {
                let mut ctx = RowContext::new();
                for (column, value) in table.columns.iter().zip(table_row.iter()) {
                    ctx.set(Some(alias), &column.name, value.clone());
                }
                rows.push(ctx);
            }
            Ok(rows)
        }

        TableRef::Subquery { statement, alias } => {
            let result = exec.execute(statement)?;
            Ok(project_result(&result, alias, None))
        }

        TableRef::TableFunction { name, args, alias } => {
            materialize_table_function(exec, name, args, alias.as_deref())
        }

        TableRef::Join {
            left,
            kind,
            right,
            predicate,
            using,
        } => {
            let left_rows = materialize(exec, left)?;
            let right_rows = materialize(exec, right)?;
            join::execute(
                exec,
                left_rows,
                right_rows,
                *kind,
                predicate.as_ref(),
                using.as_deref(),
            )
        }

        TableRef::ArrayJoin { left, exprs } => {
            let rows = materialize(exec, left)?;
            array_join(exec, rows, exprs)
        }
    }
}

/// Projects a registered CTE's result rows under the given alias, applying
/// its declared column names if any.
fn materialize_cte(exec: &mut Executor, name: &str, alias: &str) -> Result<Vec<RowContext>> {
    let cte = exec.cte(name).unwrap();
    let columns: Vec<String> = if cte.columns.is_empty() {
        cte.result.columns.iter().map(|c| c.name.clone()).collect()
    } else {
        cte.columns.clone()
    };
    if columns.len() < cte.result.columns.len() {
        return Err(Error::InvalidValue(format!(
            "CTE {} declares {} columns but produces {}",
            name,
            columns.len(),
            cte.result.columns.len()
        )));
    }
    let mut rows = Vec::with_capacity(cte.result.rows.len());
    for result_row in &cte.result.rows {
        let mut ctx = RowContext::new();
        for (column, value) in columns.iter().zip(result_row.iter()) {
            ctx.set(Some(alias), column, value.clone());
        }
        rows.push(ctx);
    }
    Ok(rows)
}

/// Projects a query result's rows under an alias, used for FROM subqueries.
fn project_result(
    result: &QueryResult,
    alias: &str,
    columns: Option<&[String]>,
) -> Vec<RowContext> {
    let names: Vec<String> = match columns {
        Some(columns) => columns.to_vec(),
        None => result.columns.iter().map(|c| c.name.clone()).collect(),
    };
    result
        .rows
        .iter()
        .map(|row| {
            let mut ctx = RowContext::new();
            for (name, value) in names.iter().zip(row.iter()) {
                ctx.set(Some(alias), name, value.clone());
            }
            ctx
        })
        .collect()
}

/// Dispatches a table function by name, evaluating its arguments in an
/// empty row context.
fn materialize_table_function(
    exec: &mut Executor,
    name: &str,
    args: &[Expression],
    alias: Option<&str>,
) -> Result<Vec<RowContext>> {
    let empty = RowContext::new();
    let values = args
        .iter()
        .map(|arg| evaluate(arg, &empty, exec))
        .collect::<Result<Vec<_>>>()?;

    let as_count = |value: &Value| -> Result<u64> {
        value
            .as_i64()
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| Error::InvalidValue(format!("invalid row count {}", value)))
    };

    match name.to_lowercase().as_str() {
        // numbers(n[, start]): one UInt64 column `number`.
        "numbers" => {
            let alias = alias.unwrap_or("numbers");
            let (start, count) = match values.as_slice() {
                [count] => (0, as_count(count)?),
                [count, start] => (as_count(start)?, as_count(count)?),
                _ => {
                    return Err(Error::Arity {
                        function: "numbers".into(),
                        expected: "1 or 2".into(),
                        found: values.len(),
                    });
                }
            };
            Ok((start..start + count)
                .map(|n| {
                    let mut ctx = RowContext::new();
                    ctx.set(Some(alias), "number", Value::UInt64(n));
                    ctx
                })
                .collect())
        }

        // zeros(n): one UInt64 column `zero`, always 0.
        "zeros" => {
            let alias = alias.unwrap_or("zeros");
            let [count] = values.as_slice() else {
                return Err(Error::Arity {
                    function: "zeros".into(),
                    expected: "1".into(),
                    found: values.len(),
                });
            };
            Ok((0..as_count(count)?)
                .map(|_| {
                    let mut ctx = RowContext::new();
                    ctx.set(Some(alias), "zero", Value::UInt64(0));
                    ctx
                })
                .collect())
        }

        // one(): a single row with a UInt8 column `dummy` = 0.
        "one" => {
            if !values.is_empty() {
                return Err(Error::Arity {
                    function: "one".into(),
                    expected: "0".into(),
                    found: values.len(),
                });
            }
            let alias = alias.unwrap_or("one");
            let mut ctx = RowContext::new();
            ctx.set(Some(alias), "dummy", Value::UInt8(0));
            Ok(vec![ctx])
        }

        _ => Err(Error::UnknownFunction(format!("table function {}", name))),
    }
}

/// ARRAY JOIN: for each row, emits one row per array element, binding the
/// element under the expression's alias (or the column's own name when the
/// expression is a bare column). Rows whose arrays are empty are dropped.
/// Multiple arrays advance in lockstep, padding shorter ones with null.
fn array_join(
    exec: &mut Executor,
    rows: Vec<RowContext>,
    exprs: &[(Expression, Option<String>)],
) -> Result<Vec<RowContext>> {
    // Resolve the output name of each array expression.
    let mut names = Vec::with_capacity(exprs.len());
    for (expr, alias) in exprs {
        let name = match (alias, expr) {
            (Some(alias), _) => alias.clone(),
            (None, Expression::Column(_, name)) => name.clone(),
            _ => {
                return Err(Error::InvalidValue(
                    "ARRAY JOIN over an expression requires an alias".into(),
                ));
            }
        };
        names.push(name);
    }

    let mut out = Vec::new();
    for row in rows {
        let mut arrays = Vec::with_capacity(exprs.len());
        for (expr, _) in exprs {
            match evaluate(expr, &row, exec)? {
                Value::Array(elements) => arrays.push(elements),
                Value::Null => arrays.push(Vec::new()),
                other => {
                    return Err(Error::TypeMismatch {
                        expected: "Array".into(),
                        found: other.data_type().to_string(),
                    });
                }
            }
        }
        let length = arrays.iter().map(|a| a.len()).max().unwrap_or(0);
        for i in 0..length {
            let mut ctx = row.clone();
            for (name, array) in names.iter().zip(arrays.iter()) {
                let element = array.get(i).cloned().unwrap_or(Value::Null);
                ctx.set(None, name, element);
            }
            out.push(ctx);
        }
    }
    Ok(out)
}
