//! SUM aggregate function

use super::{AggregateFunction, AggregateState, FunctionRegistry};
use crate::error::{Error, Result};
use crate::types::Value;

pub struct SumFunction;

impl AggregateFunction for SumFunction {
    fn name(&self) -> &'static str {
        "SUM"
    }

    fn create_state(&self) -> Box<dyn AggregateState> {
        Box::new(SumState { sum: None })
    }
}

/// Accumulates through f64. Over an empty or all-null input the sum is
/// null.
struct SumState {
    sum: Option<f64>,
}

impl AggregateState for SumState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        let value = args.first().unwrap_or(&Value::Null);
        if value.is_null() {
            return Ok(());
        }
        let v = value.as_f64().ok_or_else(|| Error::TypeMismatch {
            expected: "a numeric value".into(),
            found: value.data_type().to_string(),
        })?;
        self.sum = Some(self.sum.unwrap_or(0.0) + v);
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Value> {
        Ok(match self.sum {
            Some(sum) => Value::Float64(sum),
            None => Value::Null,
        })
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_aggregate(Box::new(SumFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum() {
        let mut state = SumFunction.create_state();
        for i in 0..10 {
            state.accumulate(&[Value::Int64(i)]).unwrap();
        }
        assert_eq!(state.finalize().unwrap(), Value::Float64(45.0));
    }

    #[test]
    fn test_sum_empty_set_is_null() {
        let state = SumFunction.create_state();
        assert_eq!(state.finalize().unwrap(), Value::Null);
    }

    #[test]
    fn test_sum_ignores_nulls() {
        let mut state = SumFunction.create_state();
        state.accumulate(&[Value::Int64(2)]).unwrap();
        state.accumulate(&[Value::Null]).unwrap();
        assert_eq!(state.finalize().unwrap(), Value::Float64(2.0));
    }

    #[test]
    fn test_sum_rejects_strings() {
        let mut state = SumFunction.create_state();
        assert!(state.accumulate(&[Value::String("x".into())]).is_err());
    }
}
