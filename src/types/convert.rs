//! Value conversion: the construction functions behind CAST, column
//! coercion at INSERT/UPDATE, and the to* conversion functions.
//!
//! A null source always converts to null. Anything else goes through the
//! target type's construction function, which fails with a conversion error
//! on out-of-range or unparseable input. Date and datetime strings parse
//! with fixed ISO-8601 formats; numeric strings parse locale-free.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::*;
use uuid::Uuid;

use super::data_type::DataType;
use super::value::Value;
use crate::error::{Error, Result};

/// Converts a value to the given target type.
pub fn cast(value: &Value, target: &DataType) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    match target {
        DataType::Nullable(inner) | DataType::LowCardinality(inner) => cast(value, inner),

        DataType::Bool => to_bool(value),
        DataType::Int8 => to_signed(value, i8::MIN as i64, i8::MAX as i64, |v| Value::Int8(v as i8)),
        DataType::Int16 => {
            to_signed(value, i16::MIN as i64, i16::MAX as i64, |v| Value::Int16(v as i16))
        }
        DataType::Int32 => {
            to_signed(value, i32::MIN as i64, i32::MAX as i64, |v| Value::Int32(v as i32))
        }
        DataType::Int64 => to_signed(value, i64::MIN, i64::MAX, Value::Int64),
        DataType::UInt8 => to_unsigned(value, u8::MAX as u64, |v| Value::UInt8(v as u8)),
        DataType::UInt16 => to_unsigned(value, u16::MAX as u64, |v| Value::UInt16(v as u16)),
        DataType::UInt32 => to_unsigned(value, u32::MAX as u64, |v| Value::UInt32(v as u32)),
        DataType::UInt64 => to_unsigned(value, u64::MAX, Value::UInt64),
        DataType::Float32 => Ok(Value::Float32(to_f64(value)? as f32)),
        DataType::Float64 => Ok(Value::Float64(to_f64(value)?)),
        DataType::Decimal(_, scale) => to_decimal(value, *scale),
        DataType::String => Ok(Value::String(to_string(value))),
        DataType::FixedString(length) => {
            let s = to_string(value);
            if s.len() > *length {
                return Err(Error::Conversion(format!(
                    "string of {} bytes does not fit FixedString({})",
                    s.len(),
                    length
                )));
            }
            Ok(Value::FixedString(s, *length))
        }
        DataType::Date => to_date(value),
        DataType::DateTime(_) => Ok(Value::DateTime(to_datetime(value)?)),
        DataType::DateTime64(precision, tz) => Ok(Value::DateTime64(
            to_datetime(value)?,
            *precision,
            tz.clone(),
        )),
        DataType::Uuid => to_uuid(value),
        DataType::Array(element) => match value {
            Value::Array(elements) => Ok(Value::Array(
                elements
                    .iter()
                    .map(|v| cast(v, element))
                    .collect::<Result<Vec<_>>>()?,
            )),
            other => Err(conversion_error(other, target)),
        },
        DataType::Tuple(elements) => match value {
            Value::Tuple(values) if values.len() == elements.len() => Ok(Value::Tuple(
                values
                    .iter()
                    .zip(elements.iter())
                    .map(|(v, (_, t))| cast(v, t))
                    .collect::<Result<Vec<_>>>()?,
            )),
            other => Err(conversion_error(other, target)),
        },
        DataType::Map(key, value_type) => match value {
            Value::Map(entries) => Ok(Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| Ok((cast(k, key)?, cast(v, value_type)?)))
                    .collect::<Result<Vec<_>>>()?,
            )),
            other => Err(conversion_error(other, target)),
        },
        DataType::Null => Ok(Value::Null),
    }
}

/// The default value a column of this type takes when an INSERT omits it.
pub fn default_value(data_type: &DataType) -> Value {
    match data_type {
        DataType::Nullable(_) | DataType::Null => Value::Null,
        DataType::LowCardinality(inner) => default_value(inner),
        DataType::Bool => Value::Bool(false),
        DataType::Int8 => Value::Int8(0),
        DataType::Int16 => Value::Int16(0),
        DataType::Int32 => Value::Int32(0),
        DataType::Int64 => Value::Int64(0),
        DataType::UInt8 => Value::UInt8(0),
        DataType::UInt16 => Value::UInt16(0),
        DataType::UInt32 => Value::UInt32(0),
        DataType::UInt64 => Value::UInt64(0),
        DataType::Float32 => Value::Float32(0.0),
        DataType::Float64 => Value::Float64(0.0),
        DataType::Decimal(_, scale) => {
            Value::Decimal(Decimal::new(0, *scale))
        }
        DataType::String => Value::String(String::new()),
        DataType::FixedString(length) => Value::FixedString(String::new(), *length),
        DataType::Date => Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
        DataType::DateTime(_) => Value::DateTime(epoch()),
        DataType::DateTime64(precision, tz) => {
            Value::DateTime64(epoch(), *precision, tz.clone())
        }
        DataType::Uuid => Value::Uuid(Uuid::nil()),
        DataType::Array(_) => Value::Array(Vec::new()),
        DataType::Tuple(elements) => {
            Value::Tuple(elements.iter().map(|(_, t)| default_value(t)).collect())
        }
        DataType::Map(_, _) => Value::Map(Vec::new()),
    }
}

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn conversion_error(value: &Value, target: &DataType) -> Error {
    Error::Conversion(format!("cannot convert {} to {}", value.data_type(), target))
}

fn to_bool(value: &Value) -> Result<Value> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        v if v.is_numeric() => Ok(Value::Bool(v.is_truthy())),
        Value::String(s) | Value::FixedString(s, _) => match s.to_lowercase().as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(Error::Conversion(format!("cannot parse '{}' as Bool", s))),
        },
        other => Err(conversion_error(other, &DataType::Bool)),
    }
}

/// The shared i64 pivot for signed integer targets, with a range check.
fn to_signed(value: &Value, min: i64, max: i64, build: impl Fn(i64) -> Value) -> Result<Value> {
    let v = match value {
        Value::Bool(b) => *b as i64,
        v if v.is_integer() => v.as_i64().ok_or_else(|| {
            Error::Conversion(format!("{} out of range for a signed integer", v))
        })?,
        v if v.is_float() => {
            let f = v.as_f64().unwrap();
            if !f.is_finite() || f < min as f64 || f > max as f64 {
                return Err(Error::Conversion(format!("{} out of range", f)));
            }
            f.trunc() as i64
        }
        Value::Decimal(d) => d
            .trunc()
            .to_i64()
            .ok_or_else(|| Error::Conversion(format!("{} out of range", d)))?,
        Value::String(s) | Value::FixedString(s, _) => s.trim().parse::<i64>().map_err(|_| {
            Error::Conversion(format!("cannot parse '{}' as an integer", s))
        })?,
        other => return Err(conversion_error(other, &DataType::Int64)),
    };
    if v < min || v > max {
        return Err(Error::Conversion(format!("{} out of range", v)));
    }
    Ok(build(v))
}

fn to_unsigned(value: &Value, max: u64, build: impl Fn(u64) -> Value) -> Result<Value> {
    let v = match value {
        Value::Bool(b) => *b as u64,
        Value::UInt64(v) => *v,
        v if v.is_integer() => {
            let signed = v.as_i64().ok_or_else(|| {
                Error::Conversion(format!("{} out of range", v))
            })?;
            u64::try_from(signed)
                .map_err(|_| Error::Conversion(format!("{} out of range for unsigned", signed)))?
        }
        v if v.is_float() => {
            let f = v.as_f64().unwrap();
            if !f.is_finite() || f < 0.0 || f > max as f64 {
                return Err(Error::Conversion(format!("{} out of range", f)));
            }
            f.trunc() as u64
        }
        Value::Decimal(d) => d
            .trunc()
            .to_u64()
            .ok_or_else(|| Error::Conversion(format!("{} out of range", d)))?,
        Value::String(s) | Value::FixedString(s, _) => s.trim().parse::<u64>().map_err(|_| {
            Error::Conversion(format!("cannot parse '{}' as an unsigned integer", s))
        })?,
        other => return Err(conversion_error(other, &DataType::UInt64)),
    };
    if v > max {
        return Err(Error::Conversion(format!("{} out of range", v)));
    }
    Ok(build(v))
}

fn to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Bool(b) => Ok(*b as u8 as f64),
        Value::String(s) | Value::FixedString(s, _) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::Conversion(format!("cannot parse '{}' as a float", s))),
        v => v
            .as_f64()
            .ok_or_else(|| conversion_error(v, &DataType::Float64)),
    }
}

fn to_decimal(value: &Value, scale: u32) -> Result<Value> {
    let d = match value {
        Value::Decimal(d) => *d,
        v if v.is_integer() => {
            let signed = v.as_i64().ok_or_else(|| {
                Error::Conversion(format!("{} out of range for Decimal", v))
            })?;
            Decimal::from(signed)
        }
        v if v.is_float() => Decimal::from_f64(v.as_f64().unwrap())
            .ok_or_else(|| Error::Conversion(format!("{} out of range for Decimal", v)))?,
        Value::String(s) | Value::FixedString(s, _) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| Error::Conversion(format!("cannot parse '{}' as Decimal", s)))?,
        other => return Err(conversion_error(other, &DataType::Decimal(38, scale))),
    };
    let mut d = d;
    d.rescale(scale);
    Ok(Value::Decimal(d))
}

fn to_string(value: &Value) -> String {
    value.to_string()
}

fn to_date(value: &Value) -> Result<Value> {
    match value {
        Value::Date(d) => Ok(Value::Date(*d)),
        Value::DateTime(ts) | Value::DateTime64(ts, _, _) => Ok(Value::Date(ts.date())),
        Value::String(s) | Value::FixedString(s, _) => {
            let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| Error::Conversion(format!("cannot parse '{}' as Date", s)))?;
            Ok(Value::Date(date))
        }
        other => Err(conversion_error(other, &DataType::Date)),
    }
}

fn to_datetime(value: &Value) -> Result<NaiveDateTime> {
    match value {
        Value::DateTime(ts) | Value::DateTime64(ts, _, _) => Ok(*ts),
        Value::Date(d) => Ok(d.and_hms_opt(0, 0, 0).unwrap()),
        v if v.is_integer() => {
            let secs = v.as_i64().ok_or_else(|| {
                Error::Conversion(format!("{} out of range for DateTime", v))
            })?;
            chrono::DateTime::from_timestamp(secs, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| Error::Conversion(format!("{} out of range for DateTime", secs)))
        }
        Value::String(s) | Value::FixedString(s, _) => {
            let s = s.trim();
            for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
                if let Ok(ts) = NaiveDateTime::parse_from_str(s, format) {
                    return Ok(ts);
                }
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Ok(date.and_hms_opt(0, 0, 0).unwrap());
            }
            Err(Error::Conversion(format!(
                "cannot parse '{}' as DateTime",
                s
            )))
        }
        other => Err(conversion_error(other, &DataType::DateTime(None))),
    }
}

fn to_uuid(value: &Value) -> Result<Value> {
    match value {
        Value::Uuid(u) => Ok(Value::Uuid(*u)),
        Value::String(s) | Value::FixedString(s, _) => {
            let uuid = Uuid::parse_str(s.trim())
                .map_err(|_| Error::Conversion(format!("cannot parse '{}' as UUID", s)))?;
            Ok(Value::Uuid(uuid))
        }
        other => Err(conversion_error(other, &DataType::Uuid)),
    }
}
