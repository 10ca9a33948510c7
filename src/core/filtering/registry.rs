//! Filter registry: resolves a filter name plus options to a live filter

use super::{Filterable, Options, filters};
use crate::core::error::FilterError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Builds a filter instance from its options
pub type FilterFactory =
    Arc<dyn Fn(&Options) -> anyhow::Result<Box<dyn Filterable>> + Send + Sync>;

/// Namespace prefixes accepted in front of a filter name
const NAMESPACE_PREFIXES: &[&str] = &["Zend\\Filter\\", "Laminas\\Filter\\"];

/// Registry mapping filter identifiers to factories
///
/// Every resolution builds a fresh instance; nothing is cached.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    factories: HashMap<String, FilterFactory>,
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

impl FilterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding the built-in filters
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        filters::register_builtins(&mut registry);
        registry
    }

    /// Process-wide registry of built-in filters
    pub fn shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<FilterRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(FilterRegistry::with_builtins()))
            .clone()
    }

    /// Register a factory under `name`, replacing any previous one
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Options) -> anyhow::Result<Box<dyn Filterable>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a filter that takes no options
    pub fn register_fn<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + Clone + 'static,
    {
        self.register(name, move |_: &Options| {
            Ok(Box::new(filter.clone()) as Box<dyn Filterable>)
        });
    }

    /// Make `alias` resolve to the same factory as `target`
    ///
    /// Returns `false` if `target` is not registered.
    pub fn alias(&mut self, alias: impl Into<String>, target: &str) -> bool {
        match self.factories.get(target).cloned() {
            Some(factory) => {
                self.factories.insert(alias.into(), factory);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(normalize_identifier(identifier))
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the filter registered as `identifier` from `options`
    pub fn resolve(
        &self,
        identifier: &str,
        options: &Options,
    ) -> Result<Box<dyn Filterable>, FilterError> {
        let name = normalize_identifier(identifier);
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| FilterError::Unknown {
                identifier: identifier.to_string(),
            })?;

        factory(options).map_err(|e| FilterError::InvalidOptions {
            identifier: identifier.to_string(),
            message: e.to_string(),
        })
    }
}

/// Strip a leading `\` and any known filter namespace from a name
pub fn normalize_identifier(identifier: &str) -> &str {
    let name = identifier.trim_start_matches('\\');
    NAMESPACE_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}
