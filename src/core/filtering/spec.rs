//! Filter specifications: what runs on which field
//!
//! The configuration format is the one handlers declare statically:
//!
//! ```yaml
//! email: StringTrim
//! tags:
//!   - StringTrim
//!   - StringToLower
//! slug:
//!   - PregReplace:
//!       pattern: "[^a-z0-9]+"
//!       replacement: "-"
//! ```
//!
//! A field maps either to one filter name, or to an ordered list whose
//! entries are a bare name or a one-entry mapping from name to options.

use super::Options;
use crate::core::error::{ConfigError, SanitizeError, SanitizeResult};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;
use std::path::Path;

const NOT_A_MAPPING: &str = "filters only accepts array/mapping as its value";

/// The filters declared for a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    /// One filter applied with empty options
    Single(String),

    /// Filters applied in order, each consuming the previous output
    Chain(Vec<ChainEntry>),
}

/// One step of a filter chain
#[derive(Debug, Clone, PartialEq)]
pub enum ChainEntry {
    /// A filter applied with empty options
    Name(String),

    /// A filter built from explicit options
    WithOptions { identifier: String, options: Options },
}

impl ChainEntry {
    pub fn name(identifier: impl Into<String>) -> Self {
        ChainEntry::Name(identifier.into())
    }

    pub fn with_options(identifier: impl Into<String>, options: Options) -> Self {
        ChainEntry::WithOptions {
            identifier: identifier.into(),
            options,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            ChainEntry::Name(identifier) => identifier,
            ChainEntry::WithOptions { identifier, .. } => identifier,
        }
    }

    /// Options for this step, `None` meaning empty
    pub fn options(&self) -> Option<&Options> {
        match self {
            ChainEntry::Name(_) => None,
            ChainEntry::WithOptions { options, .. } => Some(options),
        }
    }

    fn from_value(value: &Value) -> SanitizeResult<Self> {
        match value {
            Value::String(identifier) => Ok(ChainEntry::Name(identifier.clone())),
            Value::Object(map) if map.len() == 1 => {
                let Some((identifier, options)) = map.iter().next() else {
                    return Err(SanitizeError::invalid_argument(NOT_A_MAPPING));
                };
                Ok(ChainEntry::WithOptions {
                    identifier: identifier.clone(),
                    options: options_from(identifier, options)?,
                })
            }
            Value::Object(map) => Err(SanitizeError::invalid_argument(format!(
                "a filter chain entry must map exactly one filter name to its options, got {} keys",
                map.len()
            ))),
            other => Err(SanitizeError::invalid_argument(format!(
                "a filter chain entry must be a filter name or a mapping, got {}",
                other
            ))),
        }
    }
}

impl From<&str> for ChainEntry {
    fn from(identifier: &str) -> Self {
        ChainEntry::Name(identifier.to_string())
    }
}

impl From<String> for ChainEntry {
    fn from(identifier: String) -> Self {
        ChainEntry::Name(identifier)
    }
}

impl<S: Into<String>> From<(S, Options)> for ChainEntry {
    fn from((identifier, options): (S, Options)) -> Self {
        ChainEntry::with_options(identifier, options)
    }
}

fn options_from(identifier: &str, value: &Value) -> SanitizeResult<Options> {
    match value {
        Value::Object(options) => Ok(options.clone()),
        Value::Null => Ok(Options::new()),
        Value::Array(items) if items.is_empty() => Ok(Options::new()),
        other => Err(SanitizeError::invalid_argument(format!(
            "options for filter '{}' must be a mapping, got {}",
            identifier, other
        ))),
    }
}

/// One entry of the mapping form
///
/// An integer key marks a positional entry whose value is a bare filter
/// name, so `{"0": "StringTrim", "Truncate": {...}}` mixes both styles.
fn map_entry(key: &str, value: &Value) -> SanitizeResult<ChainEntry> {
    if key.parse::<i64>().is_ok() {
        return match value {
            Value::String(identifier) => Ok(ChainEntry::Name(identifier.clone())),
            other => Err(SanitizeError::invalid_argument(format!(
                "positional filter entry '{}' must be a filter name, got {}",
                key, other
            ))),
        };
    }
    Ok(ChainEntry::WithOptions {
        identifier: key.to_string(),
        options: options_from(key, value)?,
    })
}

impl FilterSpec {
    pub fn single(identifier: impl Into<String>) -> Self {
        FilterSpec::Single(identifier.into())
    }

    pub fn chain<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<ChainEntry>,
    {
        FilterSpec::Chain(entries.into_iter().map(Into::into).collect())
    }

    /// Number of filters this spec runs
    pub fn len(&self) -> usize {
        match self {
            FilterSpec::Single(_) => 1,
            FilterSpec::Chain(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a spec from its untyped configuration form
    ///
    /// Besides a name or a list, an ordered mapping of names to options is
    /// accepted as a chain.
    pub fn from_value(value: &Value) -> SanitizeResult<Self> {
        match value {
            Value::String(identifier) => Ok(FilterSpec::Single(identifier.clone())),
            Value::Array(entries) => entries
                .iter()
                .map(ChainEntry::from_value)
                .collect::<SanitizeResult<Vec<_>>>()
                .map(FilterSpec::Chain),
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| map_entry(key, value))
                .collect::<SanitizeResult<Vec<_>>>()
                .map(FilterSpec::Chain),
            other => Err(SanitizeError::invalid_argument(format!(
                "a field filter must be a filter name or a list of filters, got {}",
                other
            ))),
        }
    }
}

impl Serialize for ChainEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ChainEntry::Name(identifier) => serializer.serialize_str(identifier),
            ChainEntry::WithOptions {
                identifier,
                options,
            } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(identifier, options)?;
                map.end()
            }
        }
    }
}

impl Serialize for FilterSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterSpec::Single(identifier) => serializer.serialize_str(identifier),
            FilterSpec::Chain(entries) => {
                let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                for entry in entries {
                    seq.serialize_element(entry)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FilterSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FilterSpec::from_value(&value).map_err(de::Error::custom)
    }
}

/// The per-handler map from field path to filter spec
///
/// Declaration order is kept and is the order fields are filtered in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldFilters {
    fields: IndexMap<String, FilterSpec>,
}

impl FieldFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field declaration
    pub fn field(mut self, path: impl Into<String>, spec: impl Into<FilterSpec>) -> Self {
        self.insert(path, spec);
        self
    }

    /// Declare or replace the spec for a path
    pub fn insert(&mut self, path: impl Into<String>, spec: impl Into<FilterSpec>) {
        self.fields.insert(path.into(), spec.into());
    }

    pub fn get(&self, path: &str) -> Option<&FilterSpec> {
        self.fields.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterSpec)> {
        self.fields.iter().map(|(path, spec)| (path.as_str(), spec))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlay `other` on top of this set, field by field
    pub fn extend(&mut self, other: FieldFilters) {
        self.fields.extend(other.fields);
    }

    /// Build from an untyped value
    ///
    /// Fails with [`SanitizeError::InvalidArgument`] unless `value` is a
    /// mapping (an empty list is accepted as "no filters").
    pub fn from_json_value(value: &Value) -> SanitizeResult<Self> {
        match value {
            Value::Object(map) => {
                let mut fields = IndexMap::with_capacity(map.len());
                for (path, spec) in map {
                    fields.insert(path.clone(), FilterSpec::from_value(spec)?);
                }
                Ok(Self { fields })
            }
            Value::Array(items) if items.is_empty() => Ok(Self::default()),
            _ => Err(SanitizeError::invalid_argument(NOT_A_MAPPING)),
        }
    }

    pub fn from_json_str(json: &str) -> SanitizeResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json_value(&value)
    }

    pub fn from_yaml_str(yaml: &str) -> SanitizeResult<Self> {
        let value: Value = serde_yaml::from_str(yaml)?;
        Self::from_json_value(&value)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> SanitizeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let value: Value = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        Self::from_json_value(&value)
    }
}

impl<'de> Deserialize<'de> for FieldFilters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldFilters::from_json_value(&value).map_err(de::Error::custom)
    }
}

impl From<&str> for FilterSpec {
    fn from(identifier: &str) -> Self {
        FilterSpec::single(identifier)
    }
}

impl From<String> for FilterSpec {
    fn from(identifier: String) -> Self {
        FilterSpec::Single(identifier)
    }
}

impl From<Vec<ChainEntry>> for FilterSpec {
    fn from(entries: Vec<ChainEntry>) -> Self {
        FilterSpec::Chain(entries)
    }
}

impl<P: Into<String>, S: Into<FilterSpec>> FromIterator<(P, S)> for FieldFilters {
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        let mut filters = FieldFilters::new();
        for (path, spec) in iter {
            filters.insert(path, spec);
        }
        filters
    }
}
