//! DDL execution: CREATE TABLE and DROP TABLE against the catalog.

use super::executor::Executor;
use super::QueryResult;
use crate::catalog::{Column, Table};
use crate::error::Result;
use crate::parsing::ast::ColumnDef;
use crate::types::DataType;

/// Translates the column definitions to concrete types and inserts the
/// table into the catalog. IF NOT EXISTS silently skips duplicates.
pub fn create_table(
    exec: &mut Executor,
    name: &str,
    columns: &[ColumnDef],
    if_not_exists: bool,
) -> Result<QueryResult> {
    let mut table_columns = Vec::with_capacity(columns.len());
    for def in columns {
        let data_type = DataType::from_type_expr(&def.data_type)?;
        let mut column = Column::new(def.name.clone(), data_type);
        column.default = def.default.clone();
        table_columns.push(column);
    }
    exec.catalog
        .create_table(Table::new(name, table_columns), if_not_exists)?;
    Ok(QueryResult::affected(0))
}

/// Drops a table. IF EXISTS silently skips missing tables.
pub fn drop_table(exec: &mut Executor, name: &str, if_exists: bool) -> Result<QueryResult> {
    exec.catalog.drop_table(name, if_exists)?;
    Ok(QueryResult::affected(0))
}
