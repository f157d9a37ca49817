//! UPPER string function

use super::{check_arity, FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::Value;

pub struct UpperFunction;

impl ScalarFunction for UpperFunction {
    fn name(&self) -> &'static str {
        "UPPER"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        check_arity("UPPER", args, 1)?;
        match &args[0] {
            Value::Null => Ok(Value::Null),
            Value::String(s) | Value::FixedString(s, _) => Ok(Value::String(s.to_uppercase())),
            other => Err(Error::TypeMismatch {
                expected: "String".into(),
                found: other.data_type().to_string(),
            }),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(UpperFunction));
    registry.alias("ucase", "upper");
}
