//! COUNT aggregate function

use super::{AggregateFunction, AggregateState, FunctionRegistry};
use crate::error::Result;
use crate::types::Value;

pub struct CountFunction;

impl AggregateFunction for CountFunction {
    fn name(&self) -> &'static str {
        "COUNT"
    }

    fn create_state(&self) -> Box<dyn AggregateState> {
        Box::new(CountState { count: 0 })
    }
}

struct CountState {
    count: i64,
}

impl AggregateState for CountState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        // count() and count(*) count rows; count(x) skips nulls.
        match args.first() {
            Some(Value::Null) => {}
            _ => self.count += 1,
        }
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Value> {
        Ok(Value::Int64(self.count))
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_aggregate(Box::new(CountFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_skips_nulls() {
        let mut state = CountFunction.create_state();
        state.accumulate(&[Value::Int64(1)]).unwrap();
        state.accumulate(&[Value::Null]).unwrap();
        state.accumulate(&[Value::Int64(3)]).unwrap();
        assert_eq!(state.finalize().unwrap(), Value::Int64(2));
    }

    #[test]
    fn test_count_star_counts_rows() {
        let mut state = CountFunction.create_state();
        state.accumulate(&[]).unwrap();
        state.accumulate(&[]).unwrap();
        assert_eq!(state.finalize().unwrap(), Value::Int64(2));
    }

    #[test]
    fn test_count_empty_set_is_zero() {
        let state = CountFunction.create_state();
        assert_eq!(state.finalize().unwrap(), Value::Int64(0));
    }
}
