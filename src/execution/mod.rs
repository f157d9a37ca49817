//! Query execution: an interpreter over the AST.
//!
//! Every stage of the SELECT pipeline is a function over lists of row
//! contexts. A row context binds column names (optionally qualified by a
//! table alias) to values for expression evaluation; it is cloned whenever
//! a join branches.

mod aggregate;
mod ddl;
mod delete;
mod executor;
mod expression;
mod insert;
mod join;
mod select;
mod source;
mod update;
mod window;

pub use executor::Executor;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{DataType, Row, Value};

/// A column of a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    pub data_type: DataType,
}

/// The result of executing a statement: a schema, rows, and an affected row
/// count. For DDL and DML the rows are empty and only the count is
/// meaningful.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Row>,
    pub affected: u64,
}

impl QueryResult {
    /// A row-count-only result for DML and DDL.
    pub fn affected(count: u64) -> Self {
        QueryResult {
            affected: count,
            ..Default::default()
        }
    }
}

/// A per-row binding from column names to values, used during expression
/// evaluation. Unqualified names keep their insertion order (for `*`
/// expansion); qualified writes mirror into the unqualified map so that
/// both `t.c` and `c` resolve when unambiguous.
#[derive(Debug, Clone, Default)]
pub struct RowContext {
    columns: Vec<String>,
    values: HashMap<String, Value>,
    qualified: HashMap<String, IndexMap<String, Value>>,
}

impl RowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a column to a value. A qualified write also populates the
    /// unqualified binding.
    pub fn set(&mut self, alias: Option<&str>, name: &str, value: Value) {
        if let Some(alias) = alias {
            self.qualified
                .entry(alias.to_string())
                .or_default()
                .insert(name.to_string(), value.clone());
        }
        if !self.values.contains_key(name) {
            self.columns.push(name.to_string());
        }
        self.values.insert(name.to_string(), value);
    }

    /// Resolves an unqualified column.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Resolves a qualified column.
    pub fn get_qualified(&self, alias: &str, name: &str) -> Option<&Value> {
        self.qualified.get(alias)?.get(name)
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.qualified.contains_key(alias)
    }

    /// The visible unqualified column names, in binding order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The column names bound under the given alias, in binding order.
    pub fn qualified_columns(&self, alias: &str) -> Option<Vec<String>> {
        self.qualified
            .get(alias)
            .map(|columns| columns.keys().cloned().collect())
    }

    /// The table aliases bound in this context.
    pub fn aliases(&self) -> Vec<String> {
        self.qualified.keys().cloned().collect()
    }

    /// Merges another context into this one, used when a join pairs a left
    /// and a right row.
    pub fn merge(&mut self, other: &RowContext) {
        for (alias, columns) in &other.qualified {
            for (name, value) in columns {
                self.qualified
                    .entry(alias.clone())
                    .or_default()
                    .insert(name.clone(), value.clone());
            }
        }
        for name in &other.columns {
            let value = other.values[name].clone();
            if !self.values.contains_key(name) {
                self.columns.push(name.clone());
            }
            self.values.insert(name.clone(), value);
        }
    }
}
