//! Filtered accessors over a request's body and query inputs

use super::sanitizer::InputSanitizer;
use super::spec::FieldFilters;
use super::InputMap;
use crate::core::error::SanitizeResult;
use crate::core::path;
use serde_json::{Map, Value};

/// A request's raw inputs paired with the filters its handler declares
///
/// Every accessor sanitizes afresh; results are not cached between calls.
#[derive(Debug, Clone)]
pub struct FilteredRequest {
    body: InputMap,
    query: InputMap,
    sanitizer: InputSanitizer,
}

impl FilteredRequest {
    pub fn new(body: InputMap, query: InputMap, sanitizer: InputSanitizer) -> Self {
        Self {
            body,
            query,
            sanitizer,
        }
    }

    /// Sanitized body and query inputs combined
    pub fn all(&self) -> SanitizeResult<InputMap> {
        self.sanitizer.sanitize(self.merged())
    }

    /// Sanitized body and query inputs, or the value at `key`
    ///
    /// On a key present in both sources the body value wins. When `key` is
    /// given but absent, `default` (or null) is returned.
    pub fn input(&self, key: Option<&str>, default: Option<Value>) -> SanitizeResult<Value> {
        let inputs = self.sanitizer.sanitize(self.merged())?;
        Ok(lookup(inputs, key, default))
    }

    /// Sanitized query-string inputs only, or the value at `key`
    pub fn query(&self, key: Option<&str>, default: Option<Value>) -> SanitizeResult<Value> {
        let query = self.sanitizer.sanitize(self.query.clone())?;
        Ok(lookup(query, key, default))
    }

    /// The field filters declared for this request
    pub fn filters(&self) -> &FieldFilters {
        self.sanitizer.filters()
    }

    /// Unfiltered body inputs
    pub fn raw_body(&self) -> &InputMap {
        &self.body
    }

    /// Unfiltered query inputs
    pub fn raw_query(&self) -> &InputMap {
        &self.query
    }

    fn merged(&self) -> InputMap {
        let mut merged = self.body.clone();
        for (key, value) in &self.query {
            if !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }
}

fn lookup(inputs: InputMap, key: Option<&str>, default: Option<Value>) -> Value {
    match key {
        None => Value::Object(inputs),
        Some(key) => match path::get_in(&inputs, key) {
            Some(value) => value.clone(),
            None => default.unwrap_or(Value::Null),
        },
    }
}

/// Build an input map from decoded `key=value` pairs
///
/// Keys follow form conventions: `tags[]` appends to an array, `user[name]`
/// nests an object, and a repeated plain key keeps its last value.
pub fn input_map_from_pairs<I>(pairs: I) -> InputMap
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut map = InputMap::new();
    for (key, value) in pairs {
        let (base, segments) = parse_key(&key);
        if segments.is_empty() {
            map.insert(base.to_string(), Value::String(value));
            continue;
        }
        let slot = map.entry(base.to_string()).or_insert(Value::Null);
        insert_nested(slot, &segments, value);
    }
    map
}

fn parse_key(key: &str) -> (&str, Vec<&str>) {
    match key.find('[') {
        Some(open) if open > 0 && key.ends_with(']') => {
            let inner = &key[open + 1..key.len() - 1];
            (&key[..open], inner.split("][").collect())
        }
        _ => (key, Vec::new()),
    }
}

fn insert_nested(slot: &mut Value, segments: &[&str], value: String) {
    let Some((first, rest)) = segments.split_first() else {
        *slot = Value::String(value);
        return;
    };

    if first.is_empty() {
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(items) = slot {
            items.push(Value::Null);
            if let Some(last) = items.last_mut() {
                insert_nested(last, rest, value);
            }
        }
    } else {
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        if let Value::Object(map) = slot {
            let child = map.entry(first.to_string()).or_insert(Value::Null);
            insert_nested(child, rest, value);
        }
    }
}
