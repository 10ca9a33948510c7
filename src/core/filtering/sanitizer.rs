//! Walks a handler's declared field filters over an input map

use super::chain::FilterChainApplier;
use super::registry::FilterRegistry;
use super::spec::FieldFilters;
use super::InputMap;
use crate::core::error::SanitizeResult;
use crate::core::path;
use serde_json::Value;
use std::sync::Arc;

/// Sanitizes input maps against one immutable set of field filters
#[derive(Debug, Clone)]
pub struct InputSanitizer {
    registry: Arc<FilterRegistry>,
    filters: Arc<FieldFilters>,
}

impl InputSanitizer {
    pub fn new(registry: Arc<FilterRegistry>, filters: Arc<FieldFilters>) -> Self {
        Self { registry, filters }
    }

    pub fn filters(&self) -> &FieldFilters {
        &self.filters
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    /// Filter every declared field present in `input`
    ///
    /// Fields are visited in declaration order. A field that is missing or
    /// null is skipped. Keys are never added or removed.
    pub fn sanitize(&self, input: InputMap) -> SanitizeResult<InputMap> {
        sanitize_with(&self.registry, input, &self.filters)
    }

    /// Sanitize against an unparsed spec value
    ///
    /// `spec` must be a mapping; anything else fails with
    /// [`SanitizeError::InvalidArgument`](crate::core::error::SanitizeError::InvalidArgument).
    pub fn sanitize_raw(
        registry: &FilterRegistry,
        input: InputMap,
        spec: &Value,
    ) -> SanitizeResult<InputMap> {
        if input.is_empty() {
            return Ok(InputMap::new());
        }
        let filters = FieldFilters::from_json_value(spec)?;
        sanitize_with(registry, input, &filters)
    }
}

fn sanitize_with(
    registry: &FilterRegistry,
    mut input: InputMap,
    filters: &FieldFilters,
) -> SanitizeResult<InputMap> {
    if input.is_empty() {
        return Ok(InputMap::new());
    }

    let applier = FilterChainApplier::new(registry);

    for (field, spec) in filters.iter() {
        let value = match path::get_in(&input, field) {
            Some(Value::Null) | None => {
                tracing::debug!(field, "field absent, skipping");
                continue;
            }
            Some(value) => value.clone(),
        };

        let filtered = applier.apply(value, spec)?;
        tracing::debug!(field, filters = spec.len(), "field filtered");
        path::set_in(&mut input, field, filtered);
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{FilterError, SanitizeError};
    use serde_json::json;

    fn input(value: Value) -> InputMap {
        value.as_object().cloned().expect("object fixture")
    }

    fn sanitizer(filters: FieldFilters) -> InputSanitizer {
        InputSanitizer::new(FilterRegistry::shared(), Arc::new(filters))
    }

    #[test]
    fn test_declared_field_is_filtered() {
        let s = sanitizer(FieldFilters::new().field("name", "StringTrim"));
        let out = s
            .sanitize(input(json!({"name": "  bob ", "age": 3})))
            .expect("should not fail");
        assert_eq!(Value::Object(out), json!({"name": "bob", "age": 3}));
    }

    #[test]
    fn test_nested_and_indexed_paths() {
        let s = sanitizer(
            FieldFilters::new()
                .field("user.email", "StringToLower")
                .field("items.1", "StringToUpper"),
        );
        let out = s
            .sanitize(input(json!({
                "user": {"email": "A@B.COM", "name": "Ann"},
                "items": ["a", "b"]
            })))
            .expect("should not fail");
        assert_eq!(
            Value::Object(out),
            json!({
                "user": {"email": "a@b.com", "name": "Ann"},
                "items": ["a", "B"]
            })
        );
    }

    #[test]
    fn test_null_field_is_skipped() {
        let s = sanitizer(FieldFilters::new().field("name", "Nope"));
        let out = s
            .sanitize(input(json!({"name": null})))
            .expect("should not fail");
        assert_eq!(Value::Object(out), json!({"name": null}));
    }

    #[test]
    fn test_empty_input_short_circuits() {
        let s = sanitizer(FieldFilters::new().field("name", "Nope"));
        let out = s.sanitize(InputMap::new()).expect("should not fail");
        assert!(out.is_empty());
    }

    #[test]
    fn test_key_order_is_kept() {
        let s = sanitizer(FieldFilters::new().field("b", "StringTrim"));
        let out = s
            .sanitize(input(json!({"c": 1, "b": " x ", "a": 2})))
            .expect("should not fail");
        let keys: Vec<&str> = out.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_fields_run_in_declaration_order() {
        let filters = FieldFilters::from_json_value(&json!({
            "tags.0": [{"Truncate": {"length": 2}}],
            "tags": "StringTrim"
        }))
        .expect("should not fail");
        let out = sanitizer(filters)
            .sanitize(input(json!({"tags": [" ab", "c "]})))
            .expect("should not fail");
        assert_eq!(out.get("tags"), Some(&json!(["a", "c"])));
    }

    #[test]
    fn test_unknown_filter_aborts() {
        let s = sanitizer(
            FieldFilters::new()
                .field("a", "StringTrim")
                .field("b", "DoesNotExist"),
        );
        let err = s
            .sanitize(input(json!({"a": " x ", "b": "y"})))
            .unwrap_err();
        assert!(matches!(
            err,
            SanitizeError::Filter(FilterError::Unknown { .. })
        ));
    }

    #[test]
    fn test_sanitize_raw_rejects_non_mapping() {
        let err = InputSanitizer::sanitize_raw(
            &FilterRegistry::with_builtins(),
            input(json!({"a": 1})),
            &json!("not-a-map"),
        )
        .unwrap_err();
        assert!(matches!(err, SanitizeError::InvalidArgument { .. }));
    }

    #[test]
    fn test_sanitize_raw_applies_mapping() {
        let out = InputSanitizer::sanitize_raw(
            &FilterRegistry::with_builtins(),
            input(json!({"tags": [" X ", " Y "]})),
            &json!({"tags": ["Trim", "Lowercase"]}),
        )
        .expect("should not fail");
        assert_eq!(out.get("tags"), Some(&json!(["x", "y"])));
    }
}
