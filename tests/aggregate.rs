//! Aggregate tests: COUNT/SUM/AVG/MIN/MAX, GROUP BY, HAVING, DISTINCT.

mod common;

use common::{setup_test, setup_users};
use memhouse::Value;

#[test]
fn test_count_over_numbers() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT count() FROM numbers(10)"), Value::Int64(10));
    assert_eq!(
        ctx.scalar("SELECT count(*) FROM numbers(10)"),
        Value::Int64(10)
    );
}

#[test]
fn test_sum_over_numbers_is_float() {
    let mut ctx = setup_test();
    assert_eq!(
        ctx.scalar("SELECT sum(number) FROM numbers(10)"),
        Value::Float64(45.0)
    );
}

#[test]
fn test_aggregates_over_empty_set() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE empty (x Int64)");
    let row = &ctx.rows("SELECT count(*), count(x), sum(x), avg(x), min(x), max(x) FROM empty")[0];
    assert_eq!(
        row,
        &vec![
            Value::Int64(0),
            Value::Int64(0),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ]
    );
}

#[test]
fn test_count_skips_nulls() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (v Nullable(Int64))");
    ctx.exec("INSERT INTO t VALUES (1), (NULL), (3)");
    assert_eq!(ctx.scalar("SELECT count(v) FROM t"), Value::Int64(2));
    assert_eq!(ctx.scalar("SELECT count(*) FROM t"), Value::Int64(3));
}

#[test]
fn test_group_by() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE sales (category String, amount Int64)");
    ctx.exec(
        "INSERT INTO sales VALUES ('a', 10), ('b', 20), ('a', 30), ('b', 5), ('c', 1)",
    );
    let rows = ctx.rows(
        "SELECT category, count(*), sum(amount) FROM sales GROUP BY category ORDER BY category",
    );
    assert_eq!(
        rows,
        vec![
            vec![Value::String("a".into()), Value::Int64(2), Value::Float64(40.0)],
            vec![Value::String("b".into()), Value::Int64(2), Value::Float64(25.0)],
            vec![Value::String("c".into()), Value::Int64(1), Value::Float64(1.0)],
        ]
    );
}

#[test]
fn test_group_by_null_is_its_own_group() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (k Nullable(String), v Int64)");
    ctx.exec("INSERT INTO t VALUES (NULL, 1), ('x', 2), (NULL, 3)");
    let rows = ctx.rows("SELECT k, count(*) FROM t GROUP BY k ORDER BY k");
    assert_eq!(
        rows,
        vec![
            vec![Value::Null, Value::Int64(2)],
            vec![Value::String("x".into()), Value::Int64(1)],
        ]
    );
}

#[test]
fn test_having_filters_groups() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE sales (category String, amount Int64)");
    ctx.exec("INSERT INTO sales VALUES ('a', 10), ('b', 20), ('a', 30), ('c', 1)");
    let rows = ctx.rows(
        "SELECT category FROM sales GROUP BY category HAVING count(*) > 1 ORDER BY category",
    );
    assert_eq!(rows, vec![vec![Value::String("a".into())]]);
}

#[test]
fn test_order_by_aggregate() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE sales (category String, amount Int64)");
    ctx.exec("INSERT INTO sales VALUES ('a', 1), ('b', 10), ('b', 10), ('a', 2)");
    let rows = ctx.rows("SELECT category FROM sales GROUP BY category ORDER BY sum(amount) DESC");
    assert_eq!(
        rows,
        vec![
            vec![Value::String("b".into())],
            vec![Value::String("a".into())],
        ]
    );
}

#[test]
fn test_distinct_aggregate() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (v Int64)");
    ctx.exec("INSERT INTO t VALUES (1), (1), (2), (2), (3)");
    assert_eq!(ctx.scalar("SELECT count(DISTINCT v) FROM t"), Value::Int64(3));
    assert_eq!(
        ctx.scalar("SELECT sum(DISTINCT v) FROM t"),
        Value::Float64(6.0)
    );
}

#[test]
fn test_aggregate_in_arithmetic() {
    let mut ctx = setup_users();
    assert_eq!(
        ctx.scalar("SELECT max(age) - min(age) FROM users"),
        Value::Int64(10)
    );
}

#[test]
fn test_avg() {
    let mut ctx = setup_users();
    assert_eq!(ctx.scalar("SELECT avg(age) FROM users"), Value::Float64(30.0));
}

#[test]
fn test_min_max_strings() {
    let mut ctx = setup_users();
    assert_eq!(
        ctx.scalar("SELECT min(name) FROM users"),
        Value::String("Alice".into())
    );
    assert_eq!(
        ctx.scalar("SELECT max(name) FROM users"),
        Value::String("Charlie".into())
    );
}

#[test]
fn test_group_by_expression_key() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT number % 2 AS parity, count(*) FROM numbers(10) GROUP BY number % 2 ORDER BY parity",
    );
    assert_eq!(
        rows,
        vec![
            vec![Value::Int64(0), Value::Int64(5)],
            vec![Value::Int64(1), Value::Int64(5)],
        ]
    );
}

#[test]
fn test_unknown_function_errors() {
    let mut ctx = setup_test();
    let err = ctx.error("SELECT frobnicate(1)");
    assert!(matches!(err, memhouse::Error::UnknownFunction(_)));
}
