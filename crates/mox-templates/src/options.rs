//! Per-(object type, template) options.
//!
//! The table is sparse: most pairs use the defaults, a few swap in a mixin
//! that adds type-specific SQL (document variants, case journal entries).

use indexmap::IndexMap;
use mox_core::ObjectTypeName;
use serde::Deserialize;

use crate::error::TemplateError;

/// Mixin rendered when a pair has no override.
pub const EMPTY_MIXIN: &str = "empty";

const BUILTIN_OPTIONS: &str = include_str!("../template_options.yaml");

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairOptions {
    #[serde(default)]
    pub include_mixin: Option<String>,
}

/// Object type, then template name, to options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateOptions {
    entries: IndexMap<ObjectTypeName, IndexMap<String, PairOptions>>,
}

impl TemplateOptions {
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_yaml_str(BUILTIN_OPTIONS)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, TemplateError> {
        let raw: IndexMap<String, IndexMap<String, PairOptions>> =
            serde_yaml::from_str(yaml).map_err(|e| TemplateError::Options(e.to_string()))?;
        let entries = raw
            .into_iter()
            .map(|(name, pairs)| (ObjectTypeName::new(name), pairs))
            .collect();
        Ok(Self { entries })
    }

    /// Mixin for a pair, defaulting to [`EMPTY_MIXIN`].
    pub fn include_mixin(&self, object_type: &str, template: &str) -> &str {
        self.entries
            .get(object_type)
            .and_then(|pairs| pairs.get(template))
            .and_then(|opts| opts.include_mixin.as_deref())
            .unwrap_or(EMPTY_MIXIN)
    }

    /// Every mixin named anywhere in the table.
    pub fn mixins(&self) -> impl Iterator<Item = &str> {
        self.entries
            .values()
            .flat_map(|pairs| pairs.values())
            .filter_map(|opts| opts.include_mixin.as_deref())
    }
}
