//! ifNull(a, b): b when a is null, a otherwise

use super::{check_arity, FunctionRegistry, ScalarFunction};
use crate::error::Result;
use crate::types::Value;

pub struct IfNullFunction;

impl ScalarFunction for IfNullFunction {
    fn name(&self) -> &'static str {
        "IFNULL"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        check_arity("IFNULL", args, 2)?;
        if args[0].is_null() {
            Ok(args[1].clone())
        } else {
            Ok(args[0].clone())
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(IfNullFunction));
}
