//! Core module containing the filtering engine and its supporting types

pub mod error;
pub mod filtering;
pub mod path;

pub use error::{ConfigError, FilterError, RequestError, SanitizeError, SanitizeResult};
pub use filtering::{
    ChainEntry, FieldFilters, FilterChainApplier, FilterRegistry, FilterSpec, Filterable,
    Filtered, FilteredRequest, FormFilters, InputMap, InputSanitizer, Options, Sanitized,
};
