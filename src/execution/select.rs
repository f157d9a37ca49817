//! The SELECT pipeline.
//!
//! Stages run in a fixed order over lists of row contexts: FROM, WHERE,
//! aggregation (returning early), window computation, DISTINCT, ORDER BY,
//! OFFSET/LIMIT, and projection.

use std::cmp::Ordering;
use std::collections::HashSet;

use super::executor::Executor;
use super::expression::evaluate;
use super::{aggregate, source, window, QueryResult, ResultColumn, RowContext};
use crate::error::{Error, Result};
use crate::parsing::ast::{Direction, Expression, Literal, SelectStatement};
use crate::types::{compare, DataType, Value};

/// Executes a SELECT statement body. CTE registration has already happened
/// in the executor.
pub fn execute(exec: &mut Executor, select: &SelectStatement) -> Result<QueryResult> {
    // Materialize source rows; an empty FROM yields a single empty context
    // so that constant projections produce one row.
    let mut rows = match &select.from {
        Some(table_ref) => source::materialize(exec, table_ref)?,
        None => vec![RowContext::new()],
    };

    // WHERE keeps rows whose predicate is truthy (null drops the row).
    if let Some(predicate) = &select.r#where {
        rows = filter_rows(exec, rows, predicate)?;
    }

    // Grouped and globally-aggregated queries take their own branch.
    if !select.group_by.is_empty() {
        return aggregate::execute_group_by(exec, select, rows);
    }
    if select
        .select
        .iter()
        .any(|(expr, _)| aggregate::contains_aggregate(expr, exec.functions))
    {
        return aggregate::execute_global(exec, select, rows);
    }

    // HAVING without grouping or aggregates degenerates to a second WHERE.
    if let Some(having) = &select.having {
        rows = filter_rows(exec, rows, having)?;
    }

    // Expand * and t.* against the first row context's visible columns.
    let mut projections = expand_projections(select, rows.first())?;
    let names: Vec<String> = projections
        .iter()
        .enumerate()
        .map(|(i, (expr, alias))| projection_name(expr, alias.as_ref(), i))
        .collect();

    // Compute window outputs into reserved slots and rewrite the window
    // expressions to read them.
    window::compute(exec, &mut projections, &mut rows)?;

    if select.distinct {
        rows = distinct_rows(exec, rows, &projections)?;
    }

    if !select.order_by.is_empty() {
        rows = order_rows(exec, rows, select, &projections)?;
    }

    let (limit, offset) = eval_limit_offset(exec, select)?;
    let rows: Vec<RowContext> = rows.into_iter().skip(offset).take(limit).collect();

    // Project.
    let mut out_rows = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut values = Vec::with_capacity(projections.len());
        for (expr, _) in &projections {
            values.push(evaluate(expr, row, exec)?);
        }
        out_rows.push(values);
    }

    let columns = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| ResultColumn {
            name,
            data_type: out_rows
                .first()
                .map(|row| row[i].data_type())
                .unwrap_or(DataType::Null),
        })
        .collect();

    Ok(QueryResult {
        columns,
        rows: out_rows,
        affected: 0,
    })
}

fn filter_rows(
    exec: &mut Executor,
    rows: Vec<RowContext>,
    predicate: &Expression,
) -> Result<Vec<RowContext>> {
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if evaluate(predicate, &row, exec)?.is_truthy() {
            kept.push(row);
        }
    }
    Ok(kept)
}

/// Expands `*` and `t.*` projections into column references, using the
/// first row context's visible column names. With no rows the stars expand
/// to nothing.
fn expand_projections(
    select: &SelectStatement,
    first: Option<&RowContext>,
) -> Result<Vec<(Expression, Option<String>)>> {
    let mut projections = Vec::with_capacity(select.select.len());
    for (expr, alias) in &select.select {
        match expr {
            Expression::All(None) => {
                if let Some(first) = first {
                    for name in first.columns() {
                        if name.starts_with("__") {
                            continue;
                        }
                        projections.push((Expression::Column(None, name.clone()), None));
                    }
                }
            }
            Expression::All(Some(table)) => {
                if let Some(first) = first {
                    let columns = first.qualified_columns(table).ok_or_else(|| {
                        Error::TableNotFound(table.clone())
                    })?;
                    for name in columns {
                        projections.push((Expression::Column(Some(table.clone()), name), None));
                    }
                }
            }
            _ => projections.push((expr.clone(), alias.clone())),
        }
    }
    Ok(projections)
}

/// Deduplicates rows by the stringified key of the projected expressions,
/// keeping first occurrences in order.
fn distinct_rows(
    exec: &mut Executor,
    rows: Vec<RowContext>,
    projections: &[(Expression, Option<String>)],
) -> Result<Vec<RowContext>> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        let mut parts = Vec::with_capacity(projections.len());
        for (expr, _) in projections {
            parts.push(evaluate(expr, &row, exec)?.group_key());
        }
        if seen.insert(parts.join("\0")) {
            kept.push(row);
        }
    }
    Ok(kept)
}

/// Stable-sorts rows by the ORDER BY items. A bare identifier resolves
/// against SELECT-level aliases first, then against the row context.
fn order_rows(
    exec: &mut Executor,
    rows: Vec<RowContext>,
    select: &SelectStatement,
    projections: &[(Expression, Option<String>)],
) -> Result<Vec<RowContext>> {
    let mut keyed = Vec::with_capacity(rows.len());
    for row in rows {
        let mut keys = Vec::with_capacity(select.order_by.len());
        for item in &select.order_by {
            let expr = resolve_order_expr(&item.expr, projections);
            keys.push(evaluate(expr, &row, exec)?);
        }
        keyed.push((row, keys));
    }
    let directions: Vec<SortKey> = select
        .order_by
        .iter()
        .map(|item| SortKey::from(item.direction))
        .collect();
    stable_sort(&mut keyed, &directions)?;
    Ok(keyed.into_iter().map(|(row, _)| row).collect())
}

/// Resolves an ORDER BY expression: a bare identifier matching a SELECT
/// alias refers to that projection.
fn resolve_order_expr<'a>(
    expr: &'a Expression,
    projections: &'a [(Expression, Option<String>)],
) -> &'a Expression {
    if let Expression::Column(None, name) = expr
        && let Some((projected, _)) = projections
            .iter()
            .find(|(_, alias)| alias.as_deref() == Some(name.as_str()))
    {
        return projected;
    }
    expr
}

/// Sort direction for the shared stable sort.
#[derive(Clone, Copy)]
pub(crate) enum SortKey {
    Asc,
    Desc,
}

impl From<Direction> for SortKey {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => SortKey::Asc,
            Direction::Desc => SortKey::Desc,
        }
    }
}

/// Stable sort of (item, keys) pairs. Nulls sort strictly first regardless
/// of direction; comparison errors surface after the sort.
pub(crate) fn stable_sort<T>(
    items: &mut [(T, Vec<Value>)],
    directions: &[SortKey],
) -> Result<()> {
    let mut error = None;
    items.sort_by(|(_, a), (_, b)| {
        for ((x, y), direction) in a.iter().zip(b.iter()).zip(directions.iter()) {
            let ord = match (x.is_null(), y.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => match compare(x, y) {
                    Ok(ord) => match direction {
                        SortKey::Asc => ord,
                        SortKey::Desc => ord.reverse(),
                    },
                    Err(err) => {
                        error.get_or_insert(err);
                        Ordering::Equal
                    }
                },
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    match error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Evaluates LIMIT and OFFSET expressions in an empty row context.
/// `LIMIT n, m` arrives from the parser as offset n, limit m.
pub(crate) fn eval_limit_offset(
    exec: &mut Executor,
    select: &SelectStatement,
) -> Result<(usize, usize)> {
    let eval_count = |exec: &mut Executor, expr: &Expression| -> Result<usize> {
        let value = evaluate(expr, &RowContext::new(), exec)?;
        value
            .as_i64()
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| Error::InvalidValue(format!("invalid LIMIT/OFFSET {}", value)))
    };
    let limit = match &select.limit {
        Some(expr) => eval_count(exec, expr)?,
        None => usize::MAX,
    };
    let offset = match &select.offset {
        Some(expr) => eval_count(exec, expr)?,
        None => 0,
    };
    Ok((limit, offset))
}

/// The output name of a projection: the AS alias, the column name, the
/// function name, the literal's text, or a positional fallback.
pub(crate) fn projection_name(
    expr: &Expression,
    alias: Option<&String>,
    index: usize,
) -> String {
    if let Some(alias) = alias {
        return alias.clone();
    }
    match expr {
        Expression::Column(_, name) => name.clone(),
        Expression::Function { name, .. } => name.clone(),
        Expression::WindowFunction { name, .. } => name.clone(),
        Expression::Literal(Literal::Integer(i)) => i.to_string(),
        Expression::Literal(Literal::Float(f)) => f.to_string(),
        Expression::Literal(Literal::String(s)) => format!("'{}'", s),
        Expression::Literal(Literal::Boolean(b)) => b.to_string(),
        Expression::Literal(Literal::Null) => "NULL".to_string(),
        _ => format!("expr_{}", index + 1),
    }
}
