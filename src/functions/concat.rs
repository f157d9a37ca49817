//! CONCAT string function

use super::{FunctionRegistry, ScalarFunction};
use crate::error::Result;
use crate::types::Value;

pub struct ConcatFunction;

impl ScalarFunction for ConcatFunction {
    fn name(&self) -> &'static str {
        "CONCAT"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        let mut result = String::new();
        for arg in args {
            if arg.is_null() {
                return Ok(Value::Null);
            }
            result.push_str(&arg.to_string());
        }
        Ok(Value::String(result))
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(ConcatFunction));
}
