//! SQL function registry.
//!
//! The registry is injected into the engine and owns every named function
//! the executor can call. Functions come in two shapes: scalars, executed
//! per row, and aggregates, driven through create-state / accumulate /
//! finalize. Name lookup is case-insensitive and alias-aware.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::Value;

mod abs;
mod avg;
mod coalesce;
mod concat;
mod conversions;
mod count;
mod if_else;
mod if_null;
mod length;
mod lower;
mod max;
mod min;
mod null_if;
mod round;
mod sum;
mod upper;

/// A scalar SQL function, executed once per row.
pub trait ScalarFunction: Send + Sync {
    /// The canonical function name (uppercase).
    fn name(&self) -> &'static str;

    /// Executes the function over already-evaluated arguments.
    fn execute(&self, args: &[Value], distinct: bool) -> Result<Value>;
}

/// An aggregate SQL function. The executor creates one state per group,
/// accumulates every row of the group into it, and finalizes it into a
/// single value.
pub trait AggregateFunction: Send + Sync {
    /// The canonical function name (uppercase).
    fn name(&self) -> &'static str;

    fn create_state(&self) -> Box<dyn AggregateState>;
}

/// Mutable per-group accumulator state.
pub trait AggregateState {
    fn accumulate(&mut self, args: &[Value]) -> Result<()>;
    fn finalize(self: Box<Self>) -> Result<Value>;
}

/// A registered function: scalar or aggregate.
pub enum SqlFunction {
    Scalar(Box<dyn ScalarFunction>),
    Aggregate(Box<dyn AggregateFunction>),
}

/// Registry of SQL functions, keyed by uppercase name.
pub struct FunctionRegistry {
    functions: HashMap<String, SqlFunction>,
    aliases: HashMap<String, String>,
}

impl Default for FunctionRegistry {
    /// A registry with all builtin functions registered.
    fn default() -> Self {
        let mut registry = Self::empty();

        // Aggregates
        count::register(&mut registry);
        sum::register(&mut registry);
        avg::register(&mut registry);
        min::register(&mut registry);
        max::register(&mut registry);

        // String functions
        upper::register(&mut registry);
        lower::register(&mut registry);
        length::register(&mut registry);
        concat::register(&mut registry);

        // Math functions
        abs::register(&mut registry);
        round::register(&mut registry);

        // Conditionals and null handling
        if_else::register(&mut registry);
        coalesce::register(&mut registry);
        if_null::register(&mut registry);
        null_if::register(&mut registry);

        // Conversion functions
        conversions::register(&mut registry);

        registry
    }
}

impl FunctionRegistry {
    /// An empty registry, for hosts that want full control over the
    /// function set.
    pub fn empty() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    pub fn register_scalar(&mut self, function: Box<dyn ScalarFunction>) {
        self.functions
            .insert(function.name().to_string(), SqlFunction::Scalar(function));
    }

    pub fn register_aggregate(&mut self, function: Box<dyn AggregateFunction>) {
        self.functions.insert(
            function.name().to_string(),
            SqlFunction::Aggregate(function),
        );
    }

    /// Registers an alternative name for an existing function.
    pub fn alias(&mut self, alias: &str, target: &str) {
        self.aliases
            .insert(alias.to_uppercase(), target.to_uppercase());
    }

    fn canonical(&self, name: &str) -> String {
        let upper = name.to_uppercase();
        self.aliases.get(&upper).cloned().unwrap_or(upper)
    }

    /// Looks up a function by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&SqlFunction> {
        self.functions.get(&self.canonical(name))
    }

    pub fn is_aggregate(&self, name: &str) -> bool {
        matches!(self.get(name), Some(SqlFunction::Aggregate(_)))
    }

    pub fn get_aggregate(&self, name: &str) -> Option<&dyn AggregateFunction> {
        match self.get(name) {
            Some(SqlFunction::Aggregate(f)) => Some(f.as_ref()),
            _ => None,
        }
    }

    /// Executes a function over evaluated arguments. An aggregate called in
    /// a scalar position runs through the one-value compatibility shim:
    /// create a state, accumulate once, finalize.
    pub fn execute(&self, name: &str, args: &[Value], distinct: bool) -> Result<Value> {
        match self.get(name) {
            Some(SqlFunction::Scalar(f)) => f.execute(args, distinct),
            Some(SqlFunction::Aggregate(f)) => {
                let mut state = f.create_state();
                state.accumulate(args)?;
                state.finalize()
            }
            None => Err(Error::UnknownFunction(name.to_string())),
        }
    }
}

/// Checks an exact argument count, the common case.
pub(crate) fn check_arity(function: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        return Err(Error::Arity {
            function: function.to_string(),
            expected: expected.to_string(),
            found: args.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let registry = FunctionRegistry::default();
        assert!(registry.get("COUNT").is_some());
        assert!(registry.get("count").is_some());
        assert!(registry.get("CoUnT").is_some());
        assert!(registry.get("no_such_fn").is_none());
    }

    #[test]
    fn test_aggregate_classification() {
        let registry = FunctionRegistry::default();
        assert!(registry.is_aggregate("sum"));
        assert!(registry.is_aggregate("count"));
        assert!(!registry.is_aggregate("upper"));
    }

    #[test]
    fn test_aliases() {
        let registry = FunctionRegistry::default();
        assert_eq!(
            registry.execute("ucase", &[Value::String("hi".into())], false).unwrap(),
            Value::String("HI".into())
        );
    }

    #[test]
    fn test_scalar_shim_for_aggregates() {
        let registry = FunctionRegistry::default();
        // sum(5) in a scalar position accumulates the one value.
        assert_eq!(
            registry.execute("sum", &[Value::Int64(5)], false).unwrap(),
            Value::Float64(5.0)
        );
    }
}
