//! Common test utilities for SQL integration tests
#![allow(dead_code)]

use memhouse::{Error, QueryResult, SqlEngine, Value};

/// Test context wrapping an engine with panicking helpers.
pub struct TestContext {
    pub engine: SqlEngine,
}

impl TestContext {
    pub fn new() -> Self {
        TestContext {
            engine: SqlEngine::new(),
        }
    }

    /// Executes SQL, panicking on error.
    pub fn exec(&mut self, sql: &str) -> QueryResult {
        match self.engine.execute(sql) {
            Ok(result) => result,
            Err(err) => panic!("SQL execution failed: {} - Error: {}", sql, err),
        }
    }

    /// Executes SQL and returns the result rows.
    pub fn rows(&mut self, sql: &str) -> Vec<Vec<Value>> {
        self.exec(sql).rows
    }

    /// Executes SQL and returns the single value of a one-row, one-column
    /// result.
    pub fn scalar(&mut self, sql: &str) -> Value {
        let rows = self.rows(sql);
        assert_eq!(rows.len(), 1, "expected one row from: {}", sql);
        rows.into_iter().next().unwrap().into_iter().next().unwrap()
    }

    /// Executes SQL expecting an error, returning it.
    pub fn error(&mut self, sql: &str) -> Error {
        match self.engine.execute(sql) {
            Ok(_) => panic!("expected error from: {}", sql),
            Err(err) => err,
        }
    }
}

pub fn setup_test() -> TestContext {
    // Surface the engine's tracing output when tests run with RUST_LOG
    // set. Only the first call installs the subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    TestContext::new()
}

/// Creates the three-user fixture table shared by several tests.
pub fn setup_users() -> TestContext {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE users (id Int64, name String, age Int64)");
    ctx.exec("INSERT INTO users VALUES (1, 'Alice', 30), (2, 'Bob', 25), (3, 'Charlie', 35)");
    ctx
}
