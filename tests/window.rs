//! Window function tests.

mod common;

use common::{setup_test, TestContext};
use memhouse::Value;

fn setup_scores() -> TestContext {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE scores (name String, score Int64)");
    ctx.exec(
        "INSERT INTO scores VALUES \
         ('Alice', 90), ('Bob', 90), ('Charlie', 80), ('Dave', 80), ('Eve', 70)",
    );
    ctx
}

#[test]
fn test_row_number() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT number, row_number() OVER (ORDER BY number DESC) AS rn \
         FROM numbers(3) ORDER BY number",
    );
    assert_eq!(
        rows,
        vec![
            vec![Value::UInt64(0), Value::Int64(3)],
            vec![Value::UInt64(1), Value::Int64(2)],
            vec![Value::UInt64(2), Value::Int64(1)],
        ]
    );
}

#[test]
fn test_rank_and_dense_rank() {
    let mut ctx = setup_scores();
    let rows = ctx.rows(
        "SELECT name, rank() OVER (ORDER BY score DESC) AS r, \
                dense_rank() OVER (ORDER BY score DESC) AS dr \
         FROM scores ORDER BY score DESC, name",
    );
    let ranks: Vec<i64> = rows
        .iter()
        .map(|row| match row[1] {
            Value::Int64(r) => r,
            _ => panic!("expected Int64 rank"),
        })
        .collect();
    let dense: Vec<i64> = rows
        .iter()
        .map(|row| match row[2] {
            Value::Int64(r) => r,
            _ => panic!("expected Int64 dense_rank"),
        })
        .collect();
    assert_eq!(ranks, vec![1, 1, 3, 3, 5]);
    assert_eq!(dense, vec![1, 1, 2, 2, 3]);
}

#[test]
fn test_lag() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT number, lag(number) OVER (ORDER BY number) AS prev \
         FROM numbers(5) ORDER BY number",
    );
    assert_eq!(rows[0][1], Value::Null);
    assert_eq!(rows[1][1], Value::UInt64(0));
    assert_eq!(rows[4][1], Value::UInt64(3));
}

#[test]
fn test_lead_with_default() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT number, lead(number, 1, 99) OVER (ORDER BY number) AS next \
         FROM numbers(3) ORDER BY number",
    );
    assert_eq!(rows[0][1], Value::UInt64(1));
    assert_eq!(rows[1][1], Value::UInt64(2));
    assert_eq!(rows[2][1], Value::Int64(99));
}

#[test]
fn test_partition_locality() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (grp String, v Int64)");
    ctx.exec("INSERT INTO t VALUES ('a', 1), ('a', 2), ('b', 10), ('b', 20), ('b', 30)");
    let rows = ctx.rows(
        "SELECT grp, v, row_number() OVER (PARTITION BY grp ORDER BY v) AS rn \
         FROM t ORDER BY grp, v",
    );
    // The numbering restarts in each partition.
    assert_eq!(
        rows,
        vec![
            vec![Value::String("a".into()), Value::Int64(1), Value::Int64(1)],
            vec![Value::String("a".into()), Value::Int64(2), Value::Int64(2)],
            vec![Value::String("b".into()), Value::Int64(10), Value::Int64(1)],
            vec![Value::String("b".into()), Value::Int64(20), Value::Int64(2)],
            vec![Value::String("b".into()), Value::Int64(30), Value::Int64(3)],
        ]
    );
}

#[test]
fn test_ntile() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT number, ntile(2) OVER (ORDER BY number) AS bucket \
         FROM numbers(4) ORDER BY number",
    );
    let buckets: Vec<&Value> = rows.iter().map(|row| &row[1]).collect();
    assert_eq!(
        buckets,
        vec![
            &Value::Int64(1),
            &Value::Int64(1),
            &Value::Int64(2),
            &Value::Int64(2),
        ]
    );
}

#[test]
fn test_first_and_last_value() {
    let mut ctx = setup_scores();
    let rows = ctx.rows(
        "SELECT name, first_value(name) OVER (ORDER BY score DESC) AS top, \
                last_value(name) OVER (ORDER BY score DESC) AS bottom \
         FROM scores ORDER BY score DESC, name",
    );
    // Without an explicit frame, last_value falls back to the frame's
    // start bound and matches first_value.
    for row in &rows {
        assert_eq!(row[1], Value::String("Alice".into()));
        assert_eq!(row[2], row[1]);
    }
}

#[test]
fn test_last_value_with_frame_reads_frame_end() {
    let mut ctx = setup_scores();
    let rows = ctx.rows(
        "SELECT name, \
                last_value(name) OVER (ORDER BY score DESC \
                    ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW) AS cur, \
                last_value(name) OVER (ORDER BY score DESC \
                    ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING) AS last \
         FROM scores ORDER BY score DESC, name",
    );
    for row in &rows {
        assert_eq!(row[1], row[0]);
        assert_eq!(row[2], Value::String("Eve".into()));
    }
}

#[test]
fn test_running_sum_default_frame() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT number, sum(number) OVER (ORDER BY number) AS running \
         FROM numbers(4) ORDER BY number",
    );
    let running: Vec<&Value> = rows.iter().map(|row| &row[1]).collect();
    assert_eq!(
        running,
        vec![
            &Value::Float64(0.0),
            &Value::Float64(1.0),
            &Value::Float64(3.0),
            &Value::Float64(6.0),
        ]
    );
}

#[test]
fn test_explicit_frame() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT number, \
                sum(number) OVER (ORDER BY number ROWS BETWEEN 1 PRECEDING AND 1 FOLLOWING) AS s \
         FROM numbers(4) ORDER BY number",
    );
    let sums: Vec<&Value> = rows.iter().map(|row| &row[1]).collect();
    assert_eq!(
        sums,
        vec![
            &Value::Float64(1.0),
            &Value::Float64(3.0),
            &Value::Float64(6.0),
            &Value::Float64(5.0),
        ]
    );
}

#[test]
fn test_count_over_unbounded_frame() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT count(*) OVER (ROWS BETWEEN UNBOUNDED PRECEDING AND UNBOUNDED FOLLOWING) AS c \
         FROM numbers(5)",
    );
    for row in &rows {
        assert_eq!(row[0], Value::Int64(5));
    }
}

#[test]
fn test_window_with_arithmetic() {
    let mut ctx = setup_test();
    let rows = ctx.rows(
        "SELECT row_number() OVER (ORDER BY number) + 100 AS shifted \
         FROM numbers(2) ORDER BY shifted",
    );
    assert_eq!(rows, vec![vec![Value::Int64(101)], vec![Value::Int64(102)]]);
}
