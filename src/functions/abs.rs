//! ABS math function

use super::{check_arity, FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::Value;

pub struct AbsFunction;

impl ScalarFunction for AbsFunction {
    fn name(&self) -> &'static str {
        "ABS"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        check_arity("ABS", args, 1)?;
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::Float32(v) => Ok(Value::Float32(v.abs())),
            Value::Float64(v) => Ok(Value::Float64(v.abs())),
            Value::Decimal(d) => Ok(Value::Decimal(d.abs())),
            v if v.is_unsigned_integer() => Ok(v.clone()),
            v if v.is_signed_integer() => {
                let value = v.as_i64().unwrap();
                value
                    .checked_abs()
                    .map(Value::Int64)
                    .ok_or_else(|| Error::Conversion(format!("cannot take abs of {}", value)))
            }
            other => Err(Error::TypeMismatch {
                expected: "a numeric value".into(),
                found: other.data_type().to_string(),
            }),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(AbsFunction));
}
