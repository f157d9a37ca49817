//! Runtime SQL values.
//!
//! A closed family of tagged values. Every value answers its data type;
//! nullability is a property of the column type, with the `Null` variant
//! inhabiting any nullable slot.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use super::data_type::DataType;
use crate::error::{Error, Result};

/// A row of values in a table.
pub type Row = Vec<Value>;

/// SQL values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    String(String),
    /// A fixed-length string with its declared byte length.
    FixedString(String, usize),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// DateTime64 with sub-second precision and an optional timezone label.
    /// Compares and converts like DateTime.
    DateTime64(NaiveDateTime, u8, Option<String>),
    Uuid(Uuid),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    /// Map entries in insertion order. Maps are equatable by entry set but
    /// refuse ordering.
    Map(Vec<(Value, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this is one of the signed integer variants.
    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_)
        )
    }

    /// Whether this is one of the unsigned integer variants.
    pub fn is_unsigned_integer(&self) -> bool {
        matches!(
            self,
            Value::UInt8(_) | Value::UInt16(_) | Value::UInt32(_) | Value::UInt64(_)
        )
    }

    pub fn is_integer(&self) -> bool {
        self.is_signed_integer() || self.is_unsigned_integer()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float32(_) | Value::Float64(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || matches!(self, Value::Decimal(_))
    }

    /// The data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Bool(_) => DataType::Bool,
            Value::Int8(_) => DataType::Int8,
            Value::Int16(_) => DataType::Int16,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::UInt8(_) => DataType::UInt8,
            Value::UInt16(_) => DataType::UInt16,
            Value::UInt32(_) => DataType::UInt32,
            Value::UInt64(_) => DataType::UInt64,
            Value::Float32(_) => DataType::Float32,
            Value::Float64(_) => DataType::Float64,
            Value::Decimal(d) => DataType::Decimal(38, d.scale()),
            Value::String(_) => DataType::String,
            Value::FixedString(_, n) => DataType::FixedString(*n),
            Value::Date(_) => DataType::Date,
            Value::DateTime(_) => DataType::DateTime(None),
            Value::DateTime64(_, precision, tz) => DataType::DateTime64(*precision, tz.clone()),
            Value::Uuid(_) => DataType::Uuid,
            Value::Array(elements) => {
                let element = elements
                    .iter()
                    .find(|v| !v.is_null())
                    .map(|v| v.data_type())
                    .unwrap_or(DataType::Null);
                DataType::Array(Box::new(element))
            }
            Value::Tuple(elements) => {
                DataType::Tuple(elements.iter().map(|v| (None, v.data_type())).collect())
            }
            Value::Map(entries) => {
                let (key, value) = entries
                    .first()
                    .map(|(k, v)| (k.data_type(), v.data_type()))
                    .unwrap_or((DataType::Null, DataType::Null));
                DataType::Map(Box::new(key), Box::new(value))
            }
        }
    }

    /// Widens any signed integer to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(v) => Some(*v as i64),
            Value::Int16(v) => Some(*v as i64),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::UInt8(v) => Some(*v as i64),
            Value::UInt16(v) => Some(*v as i64),
            Value::UInt32(v) => Some(*v as i64),
            Value::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Widens any numeric value to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int8(v) => Some(*v as f64),
            Value::Int16(v) => Some(*v as f64),
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::UInt8(v) => Some(*v as f64),
            Value::UInt16(v) => Some(*v as f64),
            Value::UInt32(v) => Some(*v as f64),
            Value::UInt64(v) => Some(*v as f64),
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// SQL truthiness: a predicate keeps a row only when its value is
    /// non-null and truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Float32(v) => *v != 0.0 && !v.is_nan(),
            Value::Float64(v) => *v != 0.0 && !v.is_nan(),
            Value::Decimal(d) => !d.is_zero(),
            v if v.is_integer() => v.as_f64().is_some_and(|f| f != 0.0),
            _ => false,
        }
    }

    /// The key used for grouping, deduplication, and set operations. Unlike
    /// SQL equality, null forms its own distinct key.
    pub fn group_key(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            other => other.to_string(),
        }
    }

    /// Structural SQL equality for non-null operands: numeric values
    /// compare across kinds (falling back to f64), maps compare by entry
    /// set. Fails on incomparable categories. Null handling (a comparison
    /// with null is null) is the operators' concern, not this function's.
    pub fn sql_eq(&self, other: &Value) -> Result<bool> {
        match (self, other) {
            (Value::Map(a), Value::Map(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (key, value) in a {
                    let matched = b.iter().any(|(k, v)| {
                        key.sql_eq(k).unwrap_or(false) && value.sql_eq(v).unwrap_or(false)
                    });
                    if !matched {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            _ => Ok(compare(self, other)? == Ordering::Equal),
        }
    }
}

/// Compares two values with a total order suitable for ORDER BY: null sorts
/// strictly before all non-null values. Comparison across incompatible
/// categories fails with a type error, as does any comparison involving a
/// map.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering> {
    use Value::*;

    let incompatible = || {
        Err(Error::TypeMismatch {
            expected: a.data_type().to_string(),
            found: b.data_type().to_string(),
        })
    };

    match (a, b) {
        (Map(_), _) | (_, Map(_)) => Err(Error::TypeMismatch {
            expected: "an orderable value".into(),
            found: "Map".into(),
        }),

        (Null, Null) => Ok(Ordering::Equal),
        (Null, _) => Ok(Ordering::Less),
        (_, Null) => Ok(Ordering::Greater),

        (Bool(x), Bool(y)) => Ok(x.cmp(y)),

        // Integer comparisons use the widened signed 64-bit view when both
        // sides fit; a mixed signed/unsigned comparison where the unsigned
        // side exceeds i64 falls back to f64.
        (x, y) if x.is_integer() && y.is_integer() => match (x.as_i64(), y.as_i64()) {
            (Some(xv), Some(yv)) => Ok(xv.cmp(&yv)),
            _ => Ok(float_cmp(x.as_f64().unwrap(), y.as_f64().unwrap())),
        },

        (Decimal(x), Decimal(y)) => Ok(x.cmp(y)),
        (Decimal(x), y) if y.is_integer() => match y.as_i64() {
            Some(yv) => Ok(x.cmp(&rust_decimal::Decimal::from(yv))),
            None => Ok(float_cmp(x.to_f64().unwrap_or(f64::NAN), y.as_f64().unwrap())),
        },
        (x, Decimal(y)) if x.is_integer() => match x.as_i64() {
            Some(xv) => Ok(rust_decimal::Decimal::from(xv).cmp(y)),
            None => Ok(float_cmp(x.as_f64().unwrap(), y.to_f64().unwrap_or(f64::NAN))),
        },

        // Any remaining numeric mix involves a float; promote to f64.
        (x, y) if x.is_numeric() && y.is_numeric() => {
            Ok(float_cmp(x.as_f64().unwrap(), y.as_f64().unwrap()))
        }

        // Strings compare by byte order; fixed strings compare as strings.
        (String(x) | FixedString(x, _), String(y) | FixedString(y, _)) => {
            Ok(x.as_bytes().cmp(y.as_bytes()))
        }

        (Date(x), Date(y)) => Ok(x.cmp(y)),
        (DateTime(x) | DateTime64(x, _, _), DateTime(y) | DateTime64(y, _, _)) => Ok(x.cmp(y)),
        // Mixing a date and a datetime compares the date at midnight.
        (Date(x), DateTime(y) | DateTime64(y, _, _)) => {
            Ok(x.and_hms_opt(0, 0, 0).unwrap().cmp(y))
        }
        (DateTime(x) | DateTime64(x, _, _), Date(y)) => {
            Ok(x.cmp(&y.and_hms_opt(0, 0, 0).unwrap()))
        }

        (Uuid(x), Uuid(y)) => Ok(x.cmp(y)),

        // Arrays and tuples compare lexicographically by element, with an
        // unequal prefix length breaking ties as shorter-is-less.
        (Array(x), Array(y)) | (Tuple(x), Tuple(y)) => {
            for (xe, ye) in x.iter().zip(y.iter()) {
                match compare(xe, ye)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(x.len().cmp(&y.len()))
        }

        _ => incompatible(),
    }
}

fn float_cmp(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or(Ordering::Equal)
}

/// Numeric arithmetic with type promotion. Integer operations stay in i64
/// with overflow detection; an operand that is a float (or a division)
/// promotes to f64; decimals stay decimal where possible.
impl Value {
    pub fn checked_add(&self, other: &Value) -> Result<Value> {
        self.numeric_op(other, "+", i64::checked_add, |x, y| x + y, |x, y| {
            x.checked_add(y)
        })
    }

    pub fn checked_sub(&self, other: &Value) -> Result<Value> {
        self.numeric_op(other, "-", i64::checked_sub, |x, y| x - y, |x, y| {
            x.checked_sub(y)
        })
    }

    pub fn checked_mul(&self, other: &Value) -> Result<Value> {
        self.numeric_op(other, "*", i64::checked_mul, |x, y| x * y, |x, y| {
            x.checked_mul(y)
        })
    }

    /// Division always goes through f64.
    pub fn checked_div(&self, other: &Value) -> Result<Value> {
        if self.is_null() || other.is_null() {
            return Ok(Value::Null);
        }
        let (x, y) = self.float_pair(other, "/")?;
        if y == 0.0 {
            return Err(Error::InvalidValue("division by zero".into()));
        }
        Ok(Value::Float64(x / y))
    }

    pub fn checked_rem(&self, other: &Value) -> Result<Value> {
        if self.is_null() || other.is_null() {
            return Ok(Value::Null);
        }
        if let (Some(x), Some(y)) = (self.as_i64(), other.as_i64())
            && self.is_integer()
            && other.is_integer()
        {
            if y == 0 {
                return Err(Error::InvalidValue("division by zero".into()));
            }
            return Ok(Value::Int64(x % y));
        }
        let (x, y) = self.float_pair(other, "%")?;
        if y == 0.0 {
            return Err(Error::InvalidValue("division by zero".into()));
        }
        Ok(Value::Float64(x % y))
    }

    pub fn checked_neg(&self) -> Result<Value> {
        match self {
            Value::Null => Ok(Value::Null),
            Value::Float32(v) => Ok(Value::Float32(-v)),
            Value::Float64(v) => Ok(Value::Float64(-v)),
            Value::Decimal(d) => Ok(Value::Decimal(-d)),
            v if v.is_integer() => {
                let value = v.as_i64().ok_or_else(|| {
                    Error::Conversion(format!("cannot negate {}", v))
                })?;
                let negated = value
                    .checked_neg()
                    .ok_or_else(|| Error::Conversion(format!("cannot negate {}", v)))?;
                Ok(Value::Int64(negated))
            }
            other => Err(Error::TypeMismatch {
                expected: "a numeric value".into(),
                found: other.data_type().to_string(),
            }),
        }
    }

    fn numeric_op(
        &self,
        other: &Value,
        symbol: &str,
        int_op: impl Fn(i64, i64) -> Option<i64>,
        float_op: impl Fn(f64, f64) -> f64,
        decimal_op: impl Fn(Decimal, Decimal) -> Option<Decimal>,
    ) -> Result<Value> {
        if self.is_null() || other.is_null() {
            return Ok(Value::Null);
        }
        // Decimal arithmetic when both sides are decimal-or-integer.
        if matches!(self, Value::Decimal(_)) || matches!(other, Value::Decimal(_)) {
            if let (Some(x), Some(y)) = (self.to_decimal(), other.to_decimal()) {
                let result = decimal_op(x, y).ok_or_else(|| {
                    Error::Conversion(format!("decimal overflow in {} {} {}", self, symbol, other))
                })?;
                return Ok(Value::Decimal(result));
            }
        }
        if self.is_integer() && other.is_integer() {
            if let (Some(x), Some(y)) = (self.as_i64(), other.as_i64()) {
                let result = int_op(x, y).ok_or_else(|| {
                    Error::Conversion(format!("integer overflow in {} {} {}", self, symbol, other))
                })?;
                return Ok(Value::Int64(result));
            }
        }
        let (x, y) = self.float_pair(other, symbol)?;
        Ok(Value::Float64(float_op(x, y)))
    }

    fn float_pair(&self, other: &Value, symbol: &str) -> Result<(f64, f64)> {
        match (self.as_f64(), other.as_f64()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(Error::TypeMismatch {
                expected: format!("numeric operands for {}", symbol),
                found: format!("{} {} {}", self.data_type(), symbol, other.data_type()),
            }),
        }
    }

    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            v if v.is_integer() => v.as_i64().map(Decimal::from),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) | Value::FixedString(s, _) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(ts) | Value::DateTime64(ts, _, _) => {
                write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S"))
            }
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_integer_comparison() {
        assert_eq!(
            compare(&Value::Int8(5), &Value::UInt64(5)).unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            compare(&Value::Int64(-1), &Value::UInt8(0)).unwrap(),
            Ordering::Less
        );
        // An unsigned value beyond i64 range falls back to f64.
        assert_eq!(
            compare(&Value::Int64(-1), &Value::UInt64(u64::MAX)).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_float_integer_comparison() {
        assert_eq!(
            compare(&Value::Float64(2.5), &Value::Int64(2)).unwrap(),
            Ordering::Greater
        );
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(
            compare(&Value::Null, &Value::Int64(i64::MIN)).unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_incompatible_comparison_errors() {
        assert!(compare(&Value::Int64(1), &Value::String("1".into())).is_err());
        assert!(compare(&Value::Bool(true), &Value::Int64(1)).is_err());
    }

    #[test]
    fn test_map_comparison_errors_but_equality_works() {
        let a = Value::Map(vec![(Value::String("k".into()), Value::Int64(1))]);
        let b = Value::Map(vec![(Value::String("k".into()), Value::Int64(1))]);
        assert!(compare(&a, &b).is_err());
        assert!(a.sql_eq(&b).unwrap());
    }

    #[test]
    fn test_map_equality_ignores_entry_order() {
        let a = Value::Map(vec![
            (Value::String("x".into()), Value::Int64(1)),
            (Value::String("y".into()), Value::Int64(2)),
        ]);
        let b = Value::Map(vec![
            (Value::String("y".into()), Value::Int64(2)),
            (Value::String("x".into()), Value::Int64(1)),
        ]);
        assert!(a.sql_eq(&b).unwrap());
    }

    #[test]
    fn test_array_comparison_lexicographic() {
        let shorter = Value::Array(vec![Value::Int64(1), Value::Int64(2)]);
        let longer = Value::Array(vec![Value::Int64(1), Value::Int64(2), Value::Int64(0)]);
        assert_eq!(compare(&shorter, &longer).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_date_datetime_comparison() {
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let datetime = Value::DateTime(
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        assert_eq!(compare(&date, &datetime).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(
            Value::Int32(2).checked_add(&Value::Int64(3)).unwrap(),
            Value::Int64(5)
        );
        assert_eq!(
            Value::Int64(7).checked_div(&Value::Int64(2)).unwrap(),
            Value::Float64(3.5)
        );
        assert!(matches!(
            Value::Int64(1).checked_add(&Value::Float64(0.5)).unwrap(),
            Value::Float64(_)
        ));
        assert_eq!(
            Value::Int64(1).checked_add(&Value::Null).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_integer_overflow_errors() {
        assert!(Value::Int64(i64::MAX).checked_add(&Value::Int64(1)).is_err());
    }

    #[test]
    fn test_group_key_null_sentinel() {
        assert_eq!(Value::Null.group_key(), "NULL");
        assert_eq!(Value::Int64(42).group_key(), "42");
    }
}
