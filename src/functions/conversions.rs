//! The to* conversion function family: toInt8..toUInt64, toFloat32,
//! toFloat64, toDecimal, toString, toDate, toDateTime.
//!
//! Each delegates to the target type's construction function, so CAST and
//! the named conversions share one code path.

use super::{check_arity, FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::{convert, DataType, Value};

/// A conversion function to a fixed target type.
struct ConvertFunction {
    name: &'static str,
    target: DataType,
}

impl ScalarFunction for ConvertFunction {
    fn name(&self) -> &'static str {
        self.name
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        check_arity(self.name, args, 1)?;
        convert::cast(&args[0], &self.target)
    }
}

/// toDecimal(x, scale): the scale rides as a second argument.
struct ToDecimalFunction;

impl ScalarFunction for ToDecimalFunction {
    fn name(&self) -> &'static str {
        "TODECIMAL"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        if args.is_empty() || args.len() > 2 {
            return Err(Error::Arity {
                function: "toDecimal".into(),
                expected: "1 or 2".into(),
                found: args.len(),
            });
        }
        let scale = match args.get(1) {
            None => 0,
            Some(v) => v
                .as_i64()
                .filter(|s| (0..=38).contains(s))
                .ok_or_else(|| Error::InvalidValue(format!("invalid decimal scale {}", v)))?,
        };
        convert::cast(&args[0], &DataType::Decimal(38, scale as u32))
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    let targets: &[(&'static str, DataType)] = &[
        ("TOINT8", DataType::Int8),
        ("TOINT16", DataType::Int16),
        ("TOINT32", DataType::Int32),
        ("TOINT64", DataType::Int64),
        ("TOUINT8", DataType::UInt8),
        ("TOUINT16", DataType::UInt16),
        ("TOUINT32", DataType::UInt32),
        ("TOUINT64", DataType::UInt64),
        ("TOFLOAT32", DataType::Float32),
        ("TOFLOAT64", DataType::Float64),
        ("TOSTRING", DataType::String),
        ("TODATE", DataType::Date),
        ("TODATETIME", DataType::DateTime(None)),
    ];
    for (name, target) in targets {
        registry.register_scalar(Box::new(ConvertFunction {
            name,
            target: target.clone(),
        }));
    }
    registry.register_scalar(Box::new(ToDecimalFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_int64() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            registry
                .execute("toInt64", &[Value::String("7".into())], false)
                .unwrap(),
            Value::Int64(7)
        );
    }

    #[test]
    fn test_to_string() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            registry.execute("toString", &[Value::Int64(7)], false).unwrap(),
            Value::String("7".into())
        );
    }

    #[test]
    fn test_null_propagates() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            registry.execute("toInt32", &[Value::Null], false).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_conversion_error() {
        let registry = FunctionRegistry::default();
        assert!(matches!(
            registry.execute("toInt8", &[Value::Int64(1000)], false),
            Err(Error::Conversion(_))
        ));
    }
}
