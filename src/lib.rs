//! # This-Filters
//!
//! Declarative input filtering for axum request handlers.
//!
//! ## Features
//!
//! - **Filter chains**: each field maps to one filter or an ordered chain
//! - **Options**: filters are built from per-entry options
//! - **Array broadcast**: array values are filtered element by element
//! - **Dot-paths**: nested fields such as `user.email` or `items.0.sku`
//! - **Pluggable registry**: register your own `Filterable` next to the built-ins
//! - **Configuration-Based**: declare filters in code, YAML or JSON
//! - **Axum integration**: `Filtered<T>` and `Sanitized<T>` extractors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_filters::prelude::*;
//!
//! struct SignupForm;
//!
//! impl FormFilters for SignupForm {
//!     fn filters() -> Arc<FieldFilters> {
//!         Arc::new(
//!             FieldFilters::new()
//!                 .field("email", "StringTrim")
//!                 .field("tags", FilterSpec::chain(["StringTrim", "StringToLower"])),
//!         )
//!     }
//! }
//!
//! async fn signup(form: Filtered<SignupForm>) -> Result<Json<Value>, SanitizeError> {
//!     Ok(Json(form.input(None, None)?))
//! }
//! ```

pub mod config;
pub mod core;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Engine ===
    pub use crate::core::filtering::{
        ChainEntry, FieldFilters, FilterChainApplier, FilterFactory, FilterRegistry, FilterSpec,
        Filterable, InputMap, InputSanitizer, Options, broadcast,
    };

    // === Request integration ===
    pub use crate::core::filtering::{Filtered, FilteredRequest, FormFilters, Sanitized};

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, FilterError, RequestError, SanitizeError, SanitizeResult,
    };

    // === Config ===
    pub use crate::config::FiltersConfig;

    // === External dependencies ===
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;

    // === Axum ===
    pub use axum::{Json, Router, routing::post};
}
