//! Configuration loading for form filters
//!
//! A filters file groups the field filters of several forms:
//!
//! ```yaml
//! forms:
//!   signup:
//!     email: StringTrim
//!     tags: [StringTrim, StringToLower]
//!   search:
//!     q: [StringTrim, StripTags]
//! ```

use crate::core::error::{ConfigError, SanitizeResult};
use crate::core::filtering::FieldFilters;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Field filters for a set of named forms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Form name -> field filters
    #[serde(default)]
    pub forms: IndexMap<String, FieldFilters>,
}

impl FiltersConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> SanitizeResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.display().to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> SanitizeResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Filters declared for `name`
    pub fn form(&self, name: &str) -> Option<&FieldFilters> {
        self.forms.get(name)
    }

    /// Filters declared for `name`, ready to hand to a sanitizer
    ///
    /// Unknown forms get an empty filter set.
    pub fn shared_form(&self, name: &str) -> Arc<FieldFilters> {
        Arc::new(self.forms.get(name).cloned().unwrap_or_default())
    }

    /// Merge several configurations
    ///
    /// Forms are combined field by field; when two configurations declare
    /// the same field of the same form, the later one wins.
    pub fn merge(configs: Vec<FiltersConfig>) -> Self {
        let mut merged = FiltersConfig::default();

        for config in configs {
            for (name, filters) in config.forms {
                merged.forms.entry(name).or_default().extend(filters);
            }
        }

        merged
    }
}
