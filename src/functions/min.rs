//! MIN aggregate function

use super::{AggregateFunction, AggregateState, FunctionRegistry};
use crate::error::Result;
use crate::types::{compare, Value};
use std::cmp::Ordering;

pub struct MinFunction;

impl AggregateFunction for MinFunction {
    fn name(&self) -> &'static str {
        "MIN"
    }

    fn create_state(&self) -> Box<dyn AggregateState> {
        Box::new(MinState { min: Value::Null })
    }
}

struct MinState {
    min: Value,
}

impl AggregateState for MinState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        let value = args.first().unwrap_or(&Value::Null);
        if value.is_null() {
            return Ok(());
        }
        if self.min.is_null() || compare(value, &self.min)? == Ordering::Less {
            self.min = value.clone();
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Value> {
        Ok(self.min)
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_aggregate(Box::new(MinFunction));
}
