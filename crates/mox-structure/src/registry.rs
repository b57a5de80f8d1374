//! # Structure Registry
//!
//! Keyed table from normalized object-type name to
//! [`ObjectTypeDescription`]. The built-in structure is embedded at compile
//! time; callers may load a replacement document from disk or apply an
//! [`Extension`] at runtime.
//!
//! The registry itself is plain data. Derived caches (generated schemas,
//! name indexes) are owned by the consumers and rebuilt from a fresh
//! snapshot whenever the registry changes.

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use mox_core::{ObjectTypeName, UnknownTypeError};
use serde::{Deserialize, Serialize};

use crate::description::ObjectTypeDescription;
use crate::error::StructureError;
use crate::metadata::{FieldScope, MetadataResolver, ResolvedType};

const BUILTIN_STRUCTURE: &str = include_str!("../structure/db_structure.yaml");

/// The process-wide table of object-type descriptions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureRegistry {
    types: BTreeMap<ObjectTypeName, ObjectTypeDescription>,
}

impl StructureRegistry {
    /// Registry with no object types.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in structure shipped with the crate.
    pub fn builtin() -> Result<Self, StructureError> {
        Self::from_yaml_str("builtin db_structure.yaml", BUILTIN_STRUCTURE)
    }

    /// Parse a structure document.
    ///
    /// The document is a mapping from object-type name to description.
    /// Names are normalized to lower case; every description is checked
    /// against the registry invariants.
    pub fn from_yaml_str(source_name: &str, yaml: &str) -> Result<Self, StructureError> {
        let raw: IndexMap<String, ObjectTypeDescription> =
            serde_yaml::from_str(yaml).map_err(|e| StructureError::Load {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;

        let mut registry = Self::empty();
        for (name, description) in raw {
            let name = ObjectTypeName::new(name);
            if registry.types.contains_key(&name) {
                return Err(StructureError::Load {
                    source_name: source_name.to_string(),
                    reason: format!("object type '{name}' is declared more than once"),
                });
            }
            registry.insert(name, description)?;
        }

        tracing::debug!(source = source_name, types = registry.len(), "loaded structure");
        Ok(registry)
    }

    /// Load a structure document from a YAML file.
    pub fn from_path(path: &Path) -> Result<Self, StructureError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&path.display().to_string(), &content)
    }

    /// Insert or replace one description after checking its invariants.
    pub fn insert(
        &mut self,
        name: impl Into<ObjectTypeName>,
        description: ObjectTypeDescription,
    ) -> Result<(), StructureError> {
        let name = name.into();
        description.check(name.as_str())?;
        self.types.insert(name, description);
        Ok(())
    }

    /// Look up a description by (case-insensitive) name.
    pub fn describe(&self, object_type: &str) -> Result<&ObjectTypeDescription, StructureError> {
        let name = ObjectTypeName::new(object_type);
        self.types
            .get(&name)
            .ok_or_else(|| UnknownTypeError::new(name.as_str()).into())
    }

    /// Look up a description together with its normalized key.
    pub fn entry(
        &self,
        object_type: &str,
    ) -> Result<(&ObjectTypeName, &ObjectTypeDescription), StructureError> {
        let name = ObjectTypeName::new(object_type);
        self.types
            .get_key_value(&name)
            .ok_or_else(|| UnknownTypeError::new(name.as_str()).into())
    }

    pub fn contains(&self, object_type: &str) -> bool {
        self.types.contains_key(&ObjectTypeName::new(object_type))
    }

    /// Registered object types in sorted order.
    pub fn object_types(&self) -> impl Iterator<Item = &ObjectTypeName> {
        self.types.keys()
    }

    /// Registered descriptions in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectTypeName, &ObjectTypeDescription)> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Metadata resolver for one object type.
    pub fn resolver(&self, object_type: &str) -> Result<MetadataResolver<'_>, StructureError> {
        let (name, description) = self.entry(object_type)?;
        Ok(MetadataResolver::new(name.as_str(), description))
    }

    /// Resolve a field's type through the two-level metadata lookup.
    pub fn resolve_field_type(
        &self,
        object_type: &str,
        scope: FieldScope<'_>,
        field: &str,
    ) -> Result<ResolvedType, StructureError> {
        self.resolver(object_type)?.resolve_field_type(scope, field)
    }

    /// Sorted mandatory fields of a group.
    pub fn mandatory_fields(
        &self,
        object_type: &str,
        scope: FieldScope<'_>,
    ) -> Result<Vec<String>, StructureError> {
        Ok(self.resolver(object_type)?.mandatory_fields(scope))
    }

    /// Return a new registry with `extension` applied.
    ///
    /// The receiver is left untouched, so a failed extension never leaves a
    /// half-applied registry behind.
    pub fn extended(&self, extension: &Extension) -> Result<Self, StructureError> {
        let mut next = self.clone();
        for (name, description) in &extension.types {
            let name = ObjectTypeName::new(name);
            if extension.mode == ExtensionMode::Merge {
                if let Some(existing) = next.types.get_mut(&name) {
                    existing.merge(description);
                    existing.check(name.as_str())?;
                    continue;
                }
            }
            next.insert(name, description.clone())?;
        }
        Ok(next)
    }
}

/// How an [`Extension`] combines with existing descriptions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionMode {
    /// Merge into existing descriptions (new types are inserted).
    #[default]
    Merge,
    /// Replace whole descriptions.
    Replace,
}

/// A batch of description changes applied as one registry mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extension {
    #[serde(default)]
    pub mode: ExtensionMode,
    #[serde(default)]
    pub types: IndexMap<String, ObjectTypeDescription>,
}

impl Extension {
    pub fn merge(types: IndexMap<String, ObjectTypeDescription>) -> Self {
        Self {
            mode: ExtensionMode::Merge,
            types,
        }
    }

    pub fn replace(types: IndexMap<String, ObjectTypeDescription>) -> Self {
        Self {
            mode: ExtensionMode::Replace,
            types,
        }
    }

    /// Parse an extension document.
    pub fn from_yaml_str(source_name: &str, yaml: &str) -> Result<Self, StructureError> {
        serde_yaml::from_str(yaml).map_err(|e| StructureError::Load {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }
}
