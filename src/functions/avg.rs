//! AVG aggregate function

use super::{AggregateFunction, AggregateState, FunctionRegistry};
use crate::error::{Error, Result};
use crate::types::Value;

pub struct AvgFunction;

impl AggregateFunction for AvgFunction {
    fn name(&self) -> &'static str {
        "AVG"
    }

    fn create_state(&self) -> Box<dyn AggregateState> {
        Box::new(AvgState { sum: 0.0, count: 0 })
    }
}

struct AvgState {
    sum: f64,
    count: i64,
}

impl AggregateState for AvgState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()> {
        let value = args.first().unwrap_or(&Value::Null);
        if value.is_null() {
            return Ok(());
        }
        let v = value.as_f64().ok_or_else(|| Error::TypeMismatch {
            expected: "a numeric value".into(),
            found: value.data_type().to_string(),
        })?;
        self.sum += v;
        self.count += 1;
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Value> {
        if self.count == 0 {
            return Ok(Value::Null);
        }
        Ok(Value::Float64(self.sum / self.count as f64))
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_aggregate(Box::new(AvgFunction));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avg() {
        let mut state = AvgFunction.create_state();
        for v in [10, 20, 30] {
            state.accumulate(&[Value::Int64(v)]).unwrap();
        }
        assert_eq!(state.finalize().unwrap(), Value::Float64(20.0));
    }

    #[test]
    fn test_avg_empty_set_is_null() {
        let state = AvgFunction.create_state();
        assert_eq!(state.finalize().unwrap(), Value::Null);
    }
}
