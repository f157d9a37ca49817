//! UPDATE and DELETE tests.

mod common;

use common::setup_users;
use memhouse::Value;

#[test]
fn test_update_with_where() {
    let mut ctx = setup_users();
    let result = ctx.exec("UPDATE users SET age = age + 1 WHERE age < 30");
    assert_eq!(result.affected, 1);
    assert_eq!(
        ctx.scalar("SELECT age FROM users WHERE name = 'Bob'"),
        Value::Int64(26)
    );
}

#[test]
fn test_update_all_rows() {
    let mut ctx = setup_users();
    let result = ctx.exec("UPDATE users SET age = 0");
    assert_eq!(result.affected, 3);
    assert_eq!(ctx.scalar("SELECT sum(age) FROM users"), Value::Float64(0.0));
}

#[test]
fn test_update_casts_to_column_type() {
    let mut ctx = setup_users();
    ctx.exec("UPDATE users SET age = '40' WHERE id = 1");
    assert_eq!(
        ctx.scalar("SELECT age FROM users WHERE id = 1"),
        Value::Int64(40)
    );
}

#[test]
fn test_update_multiple_assignments() {
    let mut ctx = setup_users();
    ctx.exec("UPDATE users SET name = 'Alicia', age = 31 WHERE id = 1");
    let rows = ctx.rows("SELECT name, age FROM users WHERE id = 1");
    assert_eq!(
        rows,
        vec![vec![Value::String("Alicia".into()), Value::Int64(31)]]
    );
}

#[test]
fn test_delete_with_where() {
    let mut ctx = setup_users();
    let result = ctx.exec("DELETE FROM users WHERE age > 28");
    assert_eq!(result.affected, 2);
    let rows = ctx.rows("SELECT name FROM users");
    assert_eq!(rows, vec![vec![Value::String("Bob".into())]]);
}

#[test]
fn test_delete_all() {
    let mut ctx = setup_users();
    let result = ctx.exec("DELETE FROM users");
    assert_eq!(result.affected, 3);
    assert_eq!(ctx.scalar("SELECT count(*) FROM users"), Value::Int64(0));
}

#[test]
fn test_update_unknown_column_errors() {
    let mut ctx = setup_users();
    let err = ctx.error("UPDATE users SET nope = 1");
    assert!(matches!(err, memhouse::Error::ColumnNotFound(_)));
}

#[test]
fn test_delete_unknown_table_errors() {
    let mut ctx = setup_users();
    let err = ctx.error("DELETE FROM missing");
    assert!(matches!(err, memhouse::Error::TableNotFound(_)));
}
