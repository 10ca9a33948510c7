//! Declarative input filtering
//!
//! Request handlers declare, per field path, a filter or an ordered chain of
//! filters. Before validation runs, the [`InputSanitizer`] walks that
//! declaration over the request's input map and replaces each present field
//! with its filtered value. Everything else in the map is left alone.
//!
//! ```rust,ignore
//! let filters = FieldFilters::new()
//!     .field("email", FilterSpec::single("StringTrim"))
//!     .field("tags", FilterSpec::chain(["StringTrim", "StringToLower"]));
//!
//! let sanitizer = InputSanitizer::new(FilterRegistry::shared(), Arc::new(filters));
//! let clean = sanitizer.sanitize(input)?;
//! ```

pub mod chain;
pub mod extractor;
pub mod filters;
pub mod registry;
pub mod request;
pub mod sanitizer;
pub mod spec;

pub use chain::{FilterChainApplier, broadcast};
pub use extractor::{Filtered, FormFilters, Sanitized};
pub use registry::{FilterFactory, FilterRegistry};
pub use request::FilteredRequest;
pub use sanitizer::InputSanitizer;
pub use spec::{ChainEntry, FieldFilters, FilterSpec};

use serde_json::{Map, Value};

/// One request's combined body and query data
pub type InputMap = Map<String, Value>;

/// Construction options handed verbatim to a filter factory
pub type Options = Map<String, Value>;

/// A value transformation that can sit in a filter chain
///
/// Any type implementing this trait can be registered, built-in or not.
/// Closures of the shape `Fn(Value) -> anyhow::Result<Value>` implement it
/// directly.
pub trait Filterable: Send + Sync {
    /// Transform a single value
    fn filter(&self, value: Value) -> anyhow::Result<Value>;
}

impl<F> Filterable for F
where
    F: Fn(Value) -> anyhow::Result<Value> + Send + Sync,
{
    fn filter(&self, value: Value) -> anyhow::Result<Value> {
        self(value)
    }
}
