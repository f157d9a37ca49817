//! COALESCE function: first non-null argument

use super::{FunctionRegistry, ScalarFunction};
use crate::error::Result;
use crate::types::Value;

pub struct CoalesceFunction;

impl ScalarFunction for CoalesceFunction {
    fn name(&self) -> &'static str {
        "COALESCE"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        for arg in args {
            if !arg.is_null() {
                return Ok(arg.clone());
            }
        }
        Ok(Value::Null)
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(CoalesceFunction));
}
