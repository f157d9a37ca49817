//! if(cond, then, else) conditional function

use super::{check_arity, FunctionRegistry, ScalarFunction};
use crate::error::Result;
use crate::types::Value;

pub struct IfFunction;

impl ScalarFunction for IfFunction {
    fn name(&self) -> &'static str {
        "IF"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        check_arity("IF", args, 3)?;
        if args[0].is_truthy() {
            Ok(args[1].clone())
        } else {
            Ok(args[2].clone())
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(IfFunction));
}
