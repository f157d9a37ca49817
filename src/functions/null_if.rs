//! nullIf(a, b): null when a equals b, a otherwise

use super::{check_arity, FunctionRegistry, ScalarFunction};
use crate::error::Result;
use crate::types::Value;

pub struct NullIfFunction;

impl ScalarFunction for NullIfFunction {
    fn name(&self) -> &'static str {
        "NULLIF"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        check_arity("NULLIF", args, 2)?;
        if !args[0].is_null() && !args[1].is_null() && args[0].sql_eq(&args[1])? {
            return Ok(Value::Null);
        }
        Ok(args[0].clone())
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(NullIfFunction));
}
