//! LENGTH function: string byte length or array/map element count

use super::{check_arity, FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::Value;

pub struct LengthFunction;

impl ScalarFunction for LengthFunction {
    fn name(&self) -> &'static str {
        "LENGTH"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        check_arity("LENGTH", args, 1)?;
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::String(s) | Value::FixedString(s, _) => Ok(Value::UInt64(s.len() as u64)),
            Value::Array(elements) | Value::Tuple(elements) => {
                Ok(Value::UInt64(elements.len() as u64))
            }
            Value::Map(entries) => Ok(Value::UInt64(entries.len() as u64)),
            other => Err(Error::TypeMismatch {
                expected: "String or Array".into(),
                found: other.data_type().to_string(),
            }),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(LengthFunction));
    registry.alias("char_length", "length");
}
