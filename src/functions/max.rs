//! MAX aggregate function

use super::{AggregateFunction, AggregateState, FunctionRegistry};
use crate::error::Result;
use crate::types::{compare, Value};
use std::cmp::Ordering;

pub struct MaxFunction;

impl AggregateFunction for MaxFunction {
    fn name(&self) -> &'static str {
        "MAX"
    }

    fn create_state(&self) -> Box<dyn AggregateState> {
        Box::new(MaxState { max: Value::Null })
    }
}

struct MaxState {
    max: Value,
}

impl AggregateState for MaxState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        let value = args.first().unwrap_or(&Value::Null);
        if value.is_null() {
            return Ok(());
        }
        if self.max.is_null() || compare(value, &self.max)? == Ordering::Greater {
            self.max = value.clone();
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Value> {
        Ok(self.max)
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_aggregate(Box::new(MaxFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max() {
        let mut state = MaxFunction.create_state();
        for v in [3, 1, 2] {
            state.accumulate(&[Value::Int64(v)]).unwrap();
        }
        assert_eq!(state.finalize().unwrap(), Value::Int64(3));
    }

    #[test]
    fn test_max_empty_set_is_null() {
        let state = MaxFunction.create_state();
        assert_eq!(state.finalize().unwrap(), Value::Null);
    }
}
