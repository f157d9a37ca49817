//! Common table expression tests.

mod common;

use common::setup_test;
use memhouse::Value;

#[test]
fn test_cte_basic() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "WITH doubled AS (SELECT number * 2 AS value FROM numbers(5)) \
         SELECT value FROM doubled ORDER BY value",
    );
    assert_eq!(
        rows,
        vec![
            vec![Value::Int64(0)],
            vec![Value::Int64(2)],
            vec![Value::Int64(4)],
            vec![Value::Int64(6)],
            vec![Value::Int64(8)],
        ]
    );
}

#[test]
fn test_cte_declared_columns() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "WITH t(a, b) AS (SELECT number, number * 10 FROM numbers(2)) \
         SELECT b, a FROM t ORDER BY a",
    );
    assert_eq!(
        rows,
        vec![
            vec![Value::Int64(0), Value::UInt64(0)],
            vec![Value::Int64(10), Value::UInt64(1)],
        ]
    );
}

#[test]
fn test_cte_references_earlier_cte() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "WITH a AS (SELECT number FROM numbers(3)), \
              b AS (SELECT number + 10 AS shifted FROM a) \
         SELECT shifted FROM b ORDER BY shifted",
    );
    assert_eq!(
        rows,
        vec![
            vec![Value::Int64(10)],
            vec![Value::Int64(11)],
            vec![Value::Int64(12)],
        ]
    );
}

#[test]
fn test_cte_shadows_table() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (v Int64)");
    ctx.exec("INSERT INTO t VALUES (1)");
    let rows = ctx.rows("WITH t AS (SELECT 42 AS v) SELECT v FROM t");
    assert_eq!(rows, vec![vec![Value::Int64(42)]]);
    // The definition is gone once the statement finishes.
    let rows = ctx.rows("SELECT v FROM t");
    assert_eq!(rows, vec![vec![Value::Int64(1)]]);
}

#[test]
fn test_cte_removed_after_failure() {
    let mut ctx = setup_test();
    // The statement fails after the CTE registers; the CTE must not leak
    // into the next statement.
    ctx.error("WITH doubled AS (SELECT 1 AS v) SELECT nope FROM doubled");
    let err = ctx.error("SELECT v FROM doubled");
    assert!(matches!(err, memhouse::Error::TableNotFound(_)));
}

#[test]
fn test_cte_with_alias() {
    let mut ctx = setup_test();
    let rows = ctx.rows("WITH c AS (SELECT 7 AS v) SELECT x.v FROM c AS x");
    assert_eq!(rows, vec![vec![Value::Int64(7)]]);
}
