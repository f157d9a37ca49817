//! An embeddable, in-memory SQL query engine for a ClickHouse-flavored
//! dialect.
//!
//! The engine parses SQL into an abstract syntax tree and interprets it
//! against a process-local catalog of row-oriented tables:
//!
//! ```
//! use memhouse::SqlEngine;
//!
//! let mut engine = SqlEngine::new();
//! engine.execute("CREATE TABLE users (id Int64, name String)").unwrap();
//! engine.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
//! let result = engine.execute("SELECT name FROM users WHERE id = 1").unwrap();
//! assert_eq!(result.rows.len(), 1);
//! ```

mod catalog;
mod engine;
mod error;
mod execution;
mod functions;
mod parsing;
mod types;

pub use catalog::{Catalog, Column, Table};
pub use engine::SqlEngine;
pub use error::{Error, Result};
pub use execution::{QueryResult, ResultColumn};
pub use functions::{
    AggregateFunction, AggregateState, FunctionRegistry, ScalarFunction, SqlFunction,
};
pub use types::{DataType, Value};
