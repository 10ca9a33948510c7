//! Applying a field's filter spec to its value

use super::registry::FilterRegistry;
use super::spec::{ChainEntry, FilterSpec};
use super::{Filterable, Options};
use crate::core::error::FilterError;
use serde_json::Value;

/// Run `filter` over `value`, element-wise when `value` is an array
///
/// Only one level is broadcast: an array nested inside an array is handed
/// to the filter whole.
pub fn broadcast(value: Value, filter: &dyn Filterable) -> anyhow::Result<Value> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| filter.filter(item))
            .collect::<anyhow::Result<Vec<_>>>()
            .map(Value::Array),
        other => filter.filter(other),
    }
}

/// Threads a value through the filters of one [`FilterSpec`]
#[derive(Debug, Clone, Copy)]
pub struct FilterChainApplier<'r> {
    registry: &'r FilterRegistry,
}

impl<'r> FilterChainApplier<'r> {
    pub fn new(registry: &'r FilterRegistry) -> Self {
        Self { registry }
    }

    /// Apply every filter of `spec` in order
    ///
    /// A bare name behaves as a one-step chain with empty options. The first
    /// failure aborts the chain.
    pub fn apply(&self, value: Value, spec: &FilterSpec) -> Result<Value, FilterError> {
        match spec {
            FilterSpec::Single(identifier) => self.step(value, identifier, &Options::new()),
            FilterSpec::Chain(entries) => entries
                .iter()
                .try_fold(value, |value, entry| self.apply_entry(value, entry)),
        }
    }

    /// Apply a single chain entry
    pub fn apply_entry(&self, value: Value, entry: &ChainEntry) -> Result<Value, FilterError> {
        let empty = Options::new();
        self.step(value, entry.identifier(), entry.options().unwrap_or(&empty))
    }

    fn step(&self, value: Value, identifier: &str, options: &Options) -> Result<Value, FilterError> {
        let filter = self.registry.resolve(identifier, options)?;
        tracing::trace!(filter = identifier, "applying filter");
        broadcast(value, filter.as_ref()).map_err(|e| FilterError::Failed {
            identifier: identifier.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;

    fn registry() -> FilterRegistry {
        let mut registry = FilterRegistry::with_builtins();
        registry.register_fn("AppendX", |value: Value| match value {
            Value::String(s) => Ok(Value::String(s + "X")),
            other => Ok(other),
        });
        registry.register_fn("RejectNumbers", |value: Value| {
            if value.is_number() {
                bail!("numbers are not allowed");
            }
            Ok(value)
        });
        registry
    }

    #[test]
    fn test_single_filter() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let result = applier
            .apply(json!("  hi "), &FilterSpec::single("StringTrim"))
            .expect("should not fail");
        assert_eq!(result, json!("hi"));
    }

    #[test]
    fn test_chain_order_is_application_order() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let mut one = Options::new();
        one.insert("length".to_string(), json!(1));

        let append_then_cut = FilterSpec::chain(vec![
            ChainEntry::name("AppendX"),
            ChainEntry::with_options("Truncate", one.clone()),
        ]);
        let cut_then_append = FilterSpec::chain(vec![
            ChainEntry::with_options("Truncate", one),
            ChainEntry::name("AppendX"),
        ]);

        let a = applier.apply(json!("ab"), &append_then_cut).expect("should not fail");
        let b = applier.apply(json!("ab"), &cut_then_append).expect("should not fail");
        assert_eq!(a, json!("a"));
        assert_eq!(b, json!("aX"));
    }

    #[test]
    fn test_array_is_broadcast() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let result = applier
            .apply(json!(["a", "b", "c"]), &FilterSpec::single("StringToUpper"))
            .expect("should not fail");
        assert_eq!(result, json!(["A", "B", "C"]));
    }

    #[test]
    fn test_broadcast_is_shallow() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let result = applier
            .apply(json!([["x"], "y"]), &FilterSpec::single("StringToUpper"))
            .expect("should not fail");
        assert_eq!(result, json!([["x"], "Y"]));
    }

    #[test]
    fn test_object_is_passed_whole() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let result = applier
            .apply(json!({"a": " x "}), &FilterSpec::single("StringTrim"))
            .expect("should not fail");
        assert_eq!(result, json!({"a": " x "}));
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let spec = FilterSpec::Chain(Vec::new());
        let result = applier.apply(json!(" v "), &spec).expect("should not fail");
        assert_eq!(result, json!(" v "));
    }

    #[test]
    fn test_unknown_filter_in_chain_fails() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let spec = FilterSpec::chain(["StringTrim", "Nope"]);
        let err = applier.apply(json!("v"), &spec).unwrap_err();
        assert!(matches!(err, FilterError::Unknown { ref identifier } if identifier == "Nope"));
    }

    #[test]
    fn test_filter_failure_names_the_filter() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let err = applier
            .apply(json!(["a", 1]), &FilterSpec::single("RejectNumbers"))
            .unwrap_err();
        assert_eq!(err.identifier(), "RejectNumbers");
        assert!(err.to_string().contains("numbers are not allowed"));
    }

    #[test]
    fn test_apply_entry() {
        let registry = registry();
        let applier = FilterChainApplier::new(&registry);
        let result = applier
            .apply_entry(json!("q"), &ChainEntry::name("AppendX"))
            .expect("should not fail");
        assert_eq!(result, json!("qX"));
    }
}
