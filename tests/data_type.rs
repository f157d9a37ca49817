//! Value and type model tests at the SQL surface: arrays, tuples, maps,
//! casts, nullability, LIKE.

mod common;

use common::setup_test;
use memhouse::Value;

#[test]
fn test_array_one_based_indexing() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT [10, 20, 30][1]"), Value::Int64(10));
    assert_eq!(ctx.scalar("SELECT [10, 20, 30][3]"), Value::Int64(30));
    // Out of bounds yields null, not an error.
    assert_eq!(ctx.scalar("SELECT [10, 20, 30][4]"), Value::Null);
    assert_eq!(ctx.scalar("SELECT [10, 20, 30][0]"), Value::Null);
}

#[test]
fn test_array_column() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (tags Array(String))");
    ctx.exec("INSERT INTO t VALUES (['x', 'y'])");
    assert_eq!(ctx.scalar("SELECT tags[2] FROM t"), Value::String("y".into()));
    assert_eq!(ctx.scalar("SELECT length(tags) FROM t"), Value::UInt64(2));
}

#[test]
fn test_tuple_access() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT (1, 'two', 3.0).2"), Value::String("two".into()));
    assert_eq!(ctx.scalar("SELECT (1, 2).5"), Value::Null);
}

#[test]
fn test_map_literal_and_access() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT {'a': 1, 'b': 2}['b']"), Value::Int64(2));
    assert_eq!(ctx.scalar("SELECT {'a': 1}['missing']"), Value::Null);
}

#[test]
fn test_map_comparison_errors() {
    let mut ctx = setup_test();
    let err = ctx.error("SELECT {'a': 1} < {'b': 2}");
    assert!(matches!(err, memhouse::Error::TypeMismatch { .. }));
}

#[test]
fn test_map_equality() {
    let mut ctx = setup_test();
    assert_eq!(
        ctx.scalar("SELECT {'a': 1, 'b': 2} = {'b': 2, 'a': 1}"),
        Value::Bool(true)
    );
}

#[test]
fn test_cast_forms() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT CAST('42' AS Int64)"), Value::Int64(42));
    assert_eq!(ctx.scalar("SELECT '7'::UInt8"), Value::UInt8(7));
    assert_eq!(ctx.scalar("SELECT CAST(3.9 AS Int64)"), Value::Int64(3));
    assert_eq!(
        ctx.scalar("SELECT CAST(NULL AS Int64)"),
        Value::Null
    );
}

#[test]
fn test_cast_conversion_error() {
    let mut ctx = setup_test();
    let err = ctx.error("SELECT CAST('nope' AS Int64)");
    assert!(matches!(err, memhouse::Error::Conversion(_)));
}

#[test]
fn test_cast_unknown_type_errors() {
    let mut ctx = setup_test();
    let err = ctx.error("SELECT CAST(1 AS Frobnicate)");
    assert!(matches!(err, memhouse::Error::InvalidType(_)));
}

#[test]
fn test_conversion_functions() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT toInt32('12')"), Value::Int32(12));
    assert_eq!(ctx.scalar("SELECT toString(12)"), Value::String("12".into()));
    assert_eq!(ctx.scalar("SELECT toFloat64('2.5')"), Value::Float64(2.5));
}

#[test]
fn test_date_values() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (d Date, ts DateTime)");
    ctx.exec("INSERT INTO t VALUES ('2024-05-01', '2024-05-01 10:30:00')");
    let rows = ctx.rows("SELECT d, ts FROM t WHERE d = toDate('2024-05-01')");
    assert_eq!(rows.len(), 1);
    // A date compares against a datetime at midnight.
    assert_eq!(
        ctx.scalar("SELECT toDate('2024-05-01') < toDateTime('2024-05-01 00:00:01')"),
        Value::Bool(true)
    );
}

#[test]
fn test_nullable_column_accepts_null() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (v Nullable(Int64))");
    ctx.exec("INSERT INTO t VALUES (NULL), (1)");
    assert_eq!(ctx.scalar("SELECT count(*) FROM t WHERE v IS NULL"), Value::Int64(1));
}

#[test]
fn test_like_and_ilike() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT 'hello' LIKE 'he%'"), Value::Bool(true));
    assert_eq!(ctx.scalar("SELECT 'hello' LIKE 'h_llo'"), Value::Bool(true));
    assert_eq!(ctx.scalar("SELECT 'hello' LIKE 'HE%'"), Value::Bool(false));
    assert_eq!(ctx.scalar("SELECT 'hello' ILIKE 'HE%'"), Value::Bool(true));
    assert_eq!(ctx.scalar("SELECT 'hello' NOT LIKE 'xyz%'"), Value::Bool(true));
    assert_eq!(ctx.scalar("SELECT NULL LIKE 'x'"), Value::Null);
}

#[test]
fn test_incompatible_comparison_errors() {
    let mut ctx = setup_test();
    let err = ctx.error("SELECT 1 < 'one'");
    assert!(matches!(err, memhouse::Error::TypeMismatch { .. }));
}

#[test]
fn test_numeric_cross_kind_comparison() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT 1 = 1.0"), Value::Bool(true));
    assert_eq!(ctx.scalar("SELECT toUInt8(5) = toInt64(5)"), Value::Bool(true));
}

#[test]
fn test_division_and_overflow() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT 7 / 2"), Value::Float64(3.5));
    assert_eq!(ctx.scalar("SELECT 7 % 3"), Value::Int64(1));
    let err = ctx.error("SELECT 1 / 0");
    assert!(matches!(err, memhouse::Error::InvalidValue(_)));
}

#[test]
fn test_string_concat_operator() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT 'a' || 'b' || 'c'"), Value::String("abc".into()));
    assert_eq!(ctx.scalar("SELECT 'a' || NULL"), Value::Null);
}

#[test]
fn test_fixed_string() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE t (code FixedString(3))");
    ctx.exec("INSERT INTO t VALUES ('abc')");
    let err = ctx.error("INSERT INTO t VALUES ('toolong')");
    assert!(matches!(err, memhouse::Error::Conversion(_)));
}

#[test]
fn test_scalar_functions() {
    let mut ctx = setup_test();
    assert_eq!(ctx.scalar("SELECT upper('abc')"), Value::String("ABC".into()));
    assert_eq!(ctx.scalar("SELECT lower('ABC')"), Value::String("abc".into()));
    assert_eq!(ctx.scalar("SELECT length('abcd')"), Value::UInt64(4));
    assert_eq!(ctx.scalar("SELECT abs(-5)"), Value::Int64(5));
    assert_eq!(ctx.scalar("SELECT round(2.567, 2)"), Value::Float64(2.57));
    assert_eq!(
        ctx.scalar("SELECT coalesce(NULL, NULL, 3)"),
        Value::Int64(3)
    );
    assert_eq!(ctx.scalar("SELECT ifNull(NULL, 9)"), Value::Int64(9));
    assert_eq!(ctx.scalar("SELECT nullIf(1, 1)"), Value::Null);
    assert_eq!(
        ctx.scalar("SELECT concat('a', 1, 'b')"),
        Value::String("a1b".into())
    );
}

#[test]
fn test_function_arity_errors() {
    let mut ctx = setup_test();
    let err = ctx.error("SELECT upper('a', 'b')");
    assert!(matches!(err, memhouse::Error::Arity { .. }));
}

#[test]
fn test_quoted_identifiers() {
    let mut ctx = setup_test();
    ctx.exec("CREATE TABLE `My Table` (`Weird Col` Int64)");
    ctx.exec("INSERT INTO `My Table` VALUES (1)");
    assert_eq!(
        ctx.scalar("SELECT `Weird Col` FROM `My Table`"),
        Value::Int64(1)
    );
}
