//! ROUND math function: round(x[, digits])

use super::{FunctionRegistry, ScalarFunction};
use crate::error::{Error, Result};
use crate::types::Value;

pub struct RoundFunction;

impl ScalarFunction for RoundFunction {
    fn name(&self) -> &'static str {
        "ROUND"
    }

    fn execute(&self, args: &[Value], _distinct: bool) -> Result<Value> {
        if args.is_empty() || args.len() > 2 {
            return Err(Error::Arity {
                function: "ROUND".into(),
                expected: "1 or 2".into(),
                found: args.len(),
            });
        }
        if args[0].is_null() {
            return Ok(Value::Null);
        }
        let digits = match args.get(1) {
            None => 0,
            Some(Value::Null) => return Ok(Value::Null),
            Some(v) => v.as_i64().ok_or_else(|| Error::TypeMismatch {
                expected: "an integer digit count".into(),
                found: v.data_type().to_string(),
            })?,
        };
        match &args[0] {
            v if v.is_integer() => Ok(v.clone()),
            Value::Decimal(d) => Ok(Value::Decimal(d.round_dp(digits.max(0) as u32))),
            v if v.is_float() => {
                let x = v.as_f64().unwrap();
                let factor = 10f64.powi(digits as i32);
                Ok(Value::Float64((x * factor).round() / factor))
            }
            other => Err(Error::TypeMismatch {
                expected: "a numeric value".into(),
                found: other.data_type().to_string(),
            }),
        }
    }
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register_scalar(Box::new(RoundFunction));
}
