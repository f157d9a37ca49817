//! INSERT tests: VALUES, column lists, defaults, INSERT ... SELECT.

mod common;

use common::setup_test;
use memhouse::Value;

#[test]
fn test_insert_values() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int64, name String)");
    let result = ctx.exec("INSERT INTO t VALUES (1, 'a'), (2, 'b')");
    assert_eq!(result.affected, 2);
    assert_eq!(ctx.scalar("SELECT count(*) FROM t"), Value::Int64(2));
}

#[test]
fn test_insert_casts_to_column_type() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int32, score Float64)");
    ctx.exec("INSERT INTO t VALUES (1, 2)");
    let rows = ctx.rows("SELECT id, score FROM t");
    assert_eq!(rows, vec![vec![Value::Int32(1), Value::Float64(2.0)]]);
}

#[test]
fn test_insert_column_list_fills_defaults() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int64, name String, age Nullable(Int64))");
    ctx.exec("INSERT INTO t (id) VALUES (7)");
    let rows = ctx.rows("SELECT id, name, age FROM t");
    assert_eq!(
        rows,
        vec![vec![
            Value::Int64(7),
            Value::String(String::new()),
            Value::Null,
        ]]
    );
}

#[test]
fn test_insert_declared_default() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int64, score Int64 DEFAULT 100)");
    ctx.exec("INSERT INTO t (id) VALUES (1)");
    assert_eq!(ctx.scalar("SELECT score FROM t"), Value::Int64(100));
}

#[test]
fn test_insert_column_list_reorders() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int64, name String)");
    ctx.exec("INSERT INTO t (name, id) VALUES ('x', 5)");
    let rows = ctx.rows("SELECT id, name FROM t");
    assert_eq!(rows, vec![vec![Value::Int64(5), Value::String("x".into())]]);
}

#[test]
fn test_insert_select() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (n UInt64)");
    let result = ctx.exec("INSERT INTO t SELECT number FROM numbers(5)");
    assert_eq!(result.affected, 5);
    assert_eq!(ctx.scalar("SELECT count(*) FROM t"), Value::Int64(5));
}

#[test]
fn test_insert_unknown_column_errors() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int64)");
    let err = ctx.error("INSERT INTO t (nope) VALUES (1)");
    assert!(matches!(err, memhouse::Error::ColumnNotFound(_)));
}

#[test]
fn test_insert_conversion_error() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int8)");
    let err = ctx.error("INSERT INTO t VALUES (1000)");
    assert!(matches!(err, memhouse::Error::Conversion(_)));
}

#[test]
fn test_insert_arity_mismatch_errors() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (id Int64, name String)");
    let err = ctx.error("INSERT INTO t VALUES (1)");
    assert!(matches!(err, memhouse::Error::InvalidValue(_)));
}
