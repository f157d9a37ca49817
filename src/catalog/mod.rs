//! The in-memory catalog: tables, columns, and rows.
//!
//! The catalog is the engine's only state that outlives a statement. Table
//! names are case-insensitive; iteration order follows creation order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parsing::ast::Expression;
use crate::types::{DataType, Row};

/// A table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    /// An optional default expression from the DDL. When absent, a missing
    /// INSERT value falls back to the type's default.
    #[serde(skip)]
    pub default: Option<Expression>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let nullable = data_type.is_nullable();
        Column {
            name: name.into(),
            data_type,
            nullable,
            default: None,
        }
    }
}

/// A table: an ordered column list and the rows stored against it. Row
/// value positions match the column list; rows have no identity beyond
/// their position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// The position of a column by name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }
}

/// The catalog of tables, keyed case-insensitively by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: IndexMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table. With `if_not_exists`, an existing table of the same
    /// name is left untouched.
    pub fn create_table(&mut self, table: Table, if_not_exists: bool) -> Result<bool> {
        let key = table.name.to_lowercase();
        if self.tables.contains_key(&key) {
            if if_not_exists {
                return Ok(false);
            }
            return Err(Error::DuplicateTable(table.name));
        }
        self.tables.insert(key, table);
        Ok(true)
    }

    /// Drops a table. With `if_exists`, a missing table is not an error.
    pub fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<bool> {
        let key = name.to_lowercase();
        if self.tables.shift_remove(&key).is_none() {
            if if_exists {
                return Ok(false);
            }
            return Err(Error::TableNotFound(name.to_string()));
        }
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    /// Table names in creation order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.values().map(|t| t.name.clone()).collect()
    }
}
