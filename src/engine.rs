//! The public engine facade.

use tracing::debug;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::execution::{Executor, QueryResult};
use crate::functions::FunctionRegistry;
use crate::parsing;

/// An embeddable, in-memory SQL engine. One engine owns one catalog and one
/// function registry; statements execute synchronously, one at a time.
pub struct SqlEngine {
    catalog: Catalog,
    functions: FunctionRegistry,
}

impl Default for SqlEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlEngine {
    /// An engine with the builtin function registry.
    pub fn new() -> Self {
        Self::with_registry(FunctionRegistry::default())
    }

    /// An engine with a caller-provided function registry.
    pub fn with_registry(functions: FunctionRegistry) -> Self {
        SqlEngine {
            catalog: Catalog::new(),
            functions,
        }
    }

    /// Parses and executes a single SQL statement, returning its columns,
    /// rows, and affected-row count. For DDL and DML the rows are empty and
    /// only the affected count is meaningful.
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        debug!(sql, "execute");
        let statement = parsing::parse_sql(sql)?;
        let mut executor = Executor::new(&mut self.catalog, &self.functions);
        executor.execute(&statement)
    }

    /// Splits the input on top-level semicolons, skips blank statements,
    /// and executes each in order, returning the results.
    pub fn execute_many(&mut self, sql: &str) -> Result<Vec<QueryResult>> {
        let mut results = Vec::new();
        for statement in split_statements(sql) {
            if statement.trim().is_empty() {
                continue;
            }
            results.push(self.execute(statement)?);
        }
        Ok(results)
    }

    /// Whether a table of the given name exists (case-insensitive).
    pub fn table_exists(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    /// Table names in creation order.
    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.table_names()
    }
}

/// Splits a script on top-level semicolons, respecting quoted strings,
/// quoted identifiers, and both comment forms.
fn split_statements(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' | b'`' => {
                let quote = bytes[i];
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b if b == quote => {
                            // A doubled delimiter stays inside the string.
                            if bytes.get(i + 1) == Some(&quote) {
                                i += 2;
                            } else {
                                i += 1;
                                break;
                            }
                        }
                        _ => i += 1,
                    }
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() {
                    if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b';' => {
                statements.push(&sql[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < sql.len() {
        statements.push(&sql[start..]);
    }
    statements
}
