//! Statement dispatch and cross-statement machinery: CTE registration and
//! set operations.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::{ddl, delete, insert, select, update, QueryResult};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::functions::FunctionRegistry;
use crate::parsing::ast::{CommonTableExpr, DdlStatement, DmlStatement, SetOperator, Statement};

/// A registered common table expression: the materialized result and the
/// declared column names, if any.
pub(crate) struct Cte {
    pub result: QueryResult,
    pub columns: Vec<String>,
}

/// The statement executor. Single-threaded and synchronous: one statement
/// computes to completion against the catalog and returns.
pub struct Executor<'a> {
    pub(crate) catalog: &'a mut Catalog,
    pub(crate) functions: &'a FunctionRegistry,
    /// CTEs visible to the statement currently executing, keyed by
    /// lowercased name.
    ctes: HashMap<String, Cte>,
}

impl<'a> Executor<'a> {
    pub fn new(catalog: &'a mut Catalog, functions: &'a FunctionRegistry) -> Self {
        Executor {
            catalog,
            functions,
            ctes: HashMap::new(),
        }
    }

    /// Executes a statement to completion.
    pub fn execute(&mut self, statement: &Statement) -> Result<QueryResult> {
        match statement {
            Statement::Select(select_stmt) => {
                // Register the statement's CTEs, run the body, and remove
                // them again on both success and failure.
                let registered = self.register_ctes(&select_stmt.with)?;
                let result = select::execute(self, select_stmt);
                self.unregister_ctes(registered);
                result
            }

            Statement::SetOperation {
                left,
                op,
                all,
                right,
            } => self.execute_set_operation(left, *op, *all, right),

            Statement::Ddl(DdlStatement::CreateTable {
                name,
                columns,
                if_not_exists,
                ..
            }) => {
                debug!(table = %name, "create table");
                ddl::create_table(self, name, columns, *if_not_exists)
            }

            Statement::Ddl(DdlStatement::DropTable { name, if_exists }) => {
                debug!(table = %name, "drop table");
                ddl::drop_table(self, name, *if_exists)
            }

            Statement::Dml(DmlStatement::Insert {
                table,
                columns,
                source,
            }) => insert::execute(self, table, columns.as_deref(), source),

            Statement::Dml(DmlStatement::Update {
                table,
                set,
                r#where,
            }) => update::execute(self, table, set, r#where.as_ref()),

            Statement::Dml(DmlStatement::Delete { table, r#where }) => {
                delete::execute(self, table, r#where.as_ref())
            }
        }
    }

    /// Materializes and registers CTEs in declaration order, so later CTEs
    /// can reference earlier ones. On failure, already-registered CTEs are
    /// removed before the error propagates.
    fn register_ctes(
        &mut self,
        ctes: &[CommonTableExpr],
    ) -> Result<Vec<(String, Option<Cte>)>> {
        let mut registered = Vec::new();
        for cte in ctes {
            match self.execute(&cte.statement) {
                Ok(result) => {
                    let key = cte.name.to_lowercase();
                    let previous = self.ctes.insert(
                        key.clone(),
                        Cte {
                            result,
                            columns: cte.columns.clone(),
                        },
                    );
                    registered.push((key, previous));
                }
                Err(err) => {
                    self.unregister_ctes(registered);
                    return Err(err);
                }
            }
        }
        Ok(registered)
    }

    /// Removes registered CTEs, restoring any definitions they shadowed.
    fn unregister_ctes(&mut self, registered: Vec<(String, Option<Cte>)>) {
        for (key, previous) in registered.into_iter().rev() {
            match previous {
                Some(cte) => {
                    self.ctes.insert(key, cte);
                }
                None => {
                    self.ctes.remove(&key);
                }
            }
        }
    }

    /// Looks up a registered CTE by name, case-insensitively.
    pub(crate) fn cte(&self, name: &str) -> Option<&Cte> {
        self.ctes.get(&name.to_lowercase())
    }

    /// Executes a set operation. Both sides must produce the same column
    /// count; the left side's schema is adopted.
    fn execute_set_operation(
        &mut self,
        left: &Statement,
        op: SetOperator,
        all: bool,
        right: &Statement,
    ) -> Result<QueryResult> {
        let left = self.execute(left)?;
        let right = self.execute(right)?;
        if left.columns.len() != right.columns.len() {
            return Err(Error::TypeMismatch {
                expected: format!("{} columns on both sides", left.columns.len()),
                found: format!("{} columns", right.columns.len()),
            });
        }

        let row_key = |row: &[crate::types::Value]| {
            row.iter()
                .map(|v| v.group_key())
                .collect::<Vec<_>>()
                .join("\0")
        };

        let mut rows = match op {
            SetOperator::Union => {
                let mut rows = left.rows;
                rows.extend(right.rows);
                rows
            }
            SetOperator::Intersect => {
                let right_keys: HashSet<String> = right.rows.iter().map(|r| row_key(r)).collect();
                left.rows
                    .into_iter()
                    .filter(|row| right_keys.contains(&row_key(row)))
                    .collect()
            }
            SetOperator::Except => {
                let right_keys: HashSet<String> = right.rows.iter().map(|r| row_key(r)).collect();
                left.rows
                    .into_iter()
                    .filter(|row| !right_keys.contains(&row_key(row)))
                    .collect()
            }
        };

        if !all {
            let mut seen = HashSet::new();
            rows.retain(|row| seen.insert(row_key(row)));
        }

        Ok(QueryResult {
            columns: left.columns,
            rows,
            affected: 0,
        })
    }
}
