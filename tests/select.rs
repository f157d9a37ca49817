//! SELECT pipeline tests: projection, WHERE, ORDER BY, LIMIT/OFFSET,
//! DISTINCT, aliases.

mod common;

use common::{setup_test, setup_users};
use memhouse::Value;

#[test]
fn test_select_where_order() {
    let mut ctx = setup_users();
    let rows = ctx.rows("SELECT name, age FROM users WHERE age > 25 ORDER BY age");
    assert_eq!(
        rows,
        vec![
            vec![Value::String("Alice".into()), Value::Int64(30)],
            vec![Value::String("Charlie".into()), Value::Int64(35)],
        ]
    );
}

#[test]
fn test_select_star() {
    let mut ctx = setup_users();
    let result = ctx.exec("SELECT * FROM users ORDER BY id");
    let names: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "age"]);
    assert_eq!(result.rows.len(), 3);
}

#[test]
fn test_select_qualified_star() {
    let mut ctx = setup_users();
    let result = ctx.exec("SELECT u.* FROM users AS u ORDER BY u.id");
    assert_eq!(result.columns.len(), 3);
    assert_eq!(result.rows.len(), 3);
}

#[test]
fn test_select_constant_without_from() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT 1 + 2 * 3"), Value::Int64(7));
    assert_eq!(ctx.scalar("SELECT 'a' || 'b'"), Value::String("ab".into()));
}

#[test]
fn test_alias_resolution_in_order_by() {
    let mut ctx = setup_test();
    let rows = ctx.rows("SELECT number * 2 AS doubled FROM numbers(3) ORDER BY doubled DESC");
    assert_eq!(
        rows,
        vec![
            vec![Value::Int64(4)],
            vec![Value::Int64(2)],
            vec![Value::Int64(0)],
        ]
    );
}

#[test]
fn test_order_by_stability() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (k Int64, v String)");
    ctx.exec("INSERT INTO t VALUES (1, 'first'), (1, 'second'), (1, 'third'), (0, 'zero')");
    // Equal keys keep their insertion order.
    let rows = ctx.rows("SELECT v FROM t ORDER BY k");
    assert_eq!(
        rows,
        vec![
            vec![Value::String("zero".into())],
            vec![Value::String("first".into())],
            vec![Value::String("second".into())],
            vec![Value::String("third".into())],
        ]
    );
}

#[test]
fn test_order_by_nulls_first() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (v Nullable(Int64))");
    ctx.exec("INSERT INTO t VALUES (2), (NULL), (1)");
    let rows = ctx.rows("SELECT v FROM t ORDER BY v");
    assert_eq!(
        rows,
        vec![
            vec![Value::Null],
            vec![Value::Int64(1)],
            vec![Value::Int64(2)],
        ]
    );
    // Nulls stay first under DESC as well.
    let rows = ctx.rows("SELECT v FROM t ORDER BY v DESC");
    assert_eq!(rows[0], vec![Value::Null]);
    assert_eq!(rows[1], vec![Value::Int64(2)]);
}

#[test]
fn test_limit_offset() {
    let mut ctx = setup_test();
    let rows = ctx.rows("SELECT number FROM numbers(10) ORDER BY number LIMIT 3 OFFSET 2");
    assert_eq!(
        rows,
        vec![
            vec![Value::UInt64(2)],
            vec![Value::UInt64(3)],
            vec![Value::UInt64(4)],
        ]
    );
    // LIMIT n, m means offset n, limit m.
    let rows = ctx.rows("SELECT number FROM numbers(10) LIMIT 8, 5");
    assert_eq!(rows, vec![vec![Value::UInt64(8)], vec![Value::UInt64(9)]]);
}

#[test]
fn test_distinct() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (v Int64)");
    ctx.exec("INSERT INTO t VALUES (1), (2), (1), (3), (2)");
    let rows = ctx.rows("SELECT DISTINCT v FROM t ORDER BY v");
    assert_eq!(
        rows,
        vec![
            vec![Value::Int64(1)],
            vec![Value::Int64(2)],
            vec![Value::Int64(3)],
        ]
    );
}

#[test]
fn test_distinct_treats_null_as_one_group() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (v Nullable(Int64))");
    ctx.exec("INSERT INTO t VALUES (NULL), (1), (NULL)");
    let rows = ctx.rows("SELECT DISTINCT v FROM t ORDER BY v");
    assert_eq!(rows, vec![vec![Value::Null], vec![Value::Int64(1)]]);
}

#[test]
fn test_case_expression() {
    let mut ctx = setup_users();
    let rows = ctx.rows(
        "SELECT name, CASE WHEN age >= 30 THEN 'senior' ELSE 'junior' END AS band \
         FROM users ORDER BY id",
    );
    assert_eq!(rows[0][1], Value::String("senior".into()));
    assert_eq!(rows[1][1], Value::String("junior".into()));
    assert_eq!(rows[2][1], Value::String("senior".into()));
}

#[test]
fn test_simple_case_expression() {
    let mut ctx = setup_test();
    assert_eq!(
        ctx.scalar("SELECT CASE 2 WHEN 1 THEN 'one' WHEN 2 THEN 'two' END"),
        Value::String("two".into())
    );
    assert_eq!(ctx.scalar("SELECT CASE 9 WHEN 1 THEN 'one' END"), Value::Null);
}

#[test]
fn test_ternary() {
    let mut ctx = setup_test();
    assert_eq!(
        ctx.scalar("SELECT 2 > 1 ? 'yes' : 'no'"),
        Value::String("yes".into())
    );
}

#[test]
fn test_between_and_in() {
    let mut ctx = setup_users();
    let rows = ctx.rows("SELECT name FROM users WHERE age BETWEEN 25 AND 30 ORDER BY id");
    assert_eq!(rows.len(), 2);
    let rows = ctx.rows("SELECT name FROM users WHERE id IN (1, 3) ORDER BY id");
    assert_eq!(rows.len(), 2);
    let rows = ctx.rows("SELECT name FROM users WHERE id NOT IN (1, 3)");
    assert_eq!(rows, vec![vec![Value::String("Bob".into())]]);
}

#[test]
fn test_null_comparison_propagation() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT NULL = 1"), Value::Null);
    assert_eq!(ctx.scalar("SELECT NULL != NULL"), Value::Null);
    assert_eq!(ctx.scalar("SELECT 1 < NULL"), Value::Null);
    assert_eq!(ctx.scalar("SELECT NULL IS NULL"), Value::Bool(true));
    assert_eq!(ctx.scalar("SELECT 1 IS NOT NULL"), Value::Bool(true));
}

#[test]
fn test_unknown_column_errors() {
    let mut ctx = setup_users();
    let err = ctx.error("SELECT nope FROM users");
    assert!(matches!(err, memhouse::Error::ColumnNotFound(_)));
}

#[test]
fn test_unknown_table_errors() {
    let mut ctx = setup_test();
    let err = ctx.error("SELECT * FROM missing");
    assert!(matches!(err, memhouse::Error::TableNotFound(_)));
}
