//! # Name Indexes
//!
//! Flattened lookups derived from one registry snapshot: attribute fields
//! by full attribute name (`<type><group>`, e.g. `klasseegenskaber`), the
//! sorted attribute names per type, state names and relation names.
//!
//! An index is never patched in place. Whoever owns a registry snapshot
//! builds a fresh index from it.

use std::collections::HashMap;

use mox_core::{ObjectTypeName, UnknownTypeError};

use crate::description::WILDCARD;
use crate::error::StructureError;
use crate::registry::StructureRegistry;

/// Implicit validity field appended to every attribute group.
pub const VIRKNING_FIELD: &str = "virkning";

/// Relations carried by document parts, which live outside the object-type
/// table.
pub const DOCUMENT_PART_RELATION_NAMES: &[&str] = &["underredigeringaf"];

const DEFAULT_FIELD_TYPE: &str = "text";

#[derive(Debug, Clone, Default)]
struct TypeNames {
    attributes: Vec<String>,
    states: Vec<String>,
    relations: Vec<String>,
}

/// Name lookups for one registry snapshot.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    attribute_fields: HashMap<String, Vec<String>>,
    attribute_field_types: HashMap<(String, String), String>,
    relation_field_types: HashMap<(ObjectTypeName, String), String>,
    types: HashMap<ObjectTypeName, TypeNames>,
}

impl NameIndex {
    pub fn build(registry: &StructureRegistry) -> Self {
        let mut index = Self::default();

        for (name, description) in registry.iter() {
            let mut attributes = Vec::with_capacity(description.attributes.len());
            for (group, fields) in &description.attributes {
                let full_name = format!("{name}{group}");
                let mut with_virkning = fields.clone();
                with_virkning.push(VIRKNING_FIELD.to_string());
                index.attribute_fields.insert(full_name.clone(), with_virkning);

                for (meta_group, metas) in &description.attribute_metadata {
                    if meta_group != group && meta_group != WILDCARD {
                        continue;
                    }
                    for (field, meta) in metas {
                        let Some(type_name) = &meta.type_name else {
                            continue;
                        };
                        let key = (full_name.clone(), field.clone());
                        // Group-specific entries override the wildcard.
                        if meta_group == group || !index.attribute_field_types.contains_key(&key) {
                            index.attribute_field_types.insert(key, type_name.clone());
                        }
                    }
                }

                attributes.push(full_name);
            }
            attributes.sort();

            for metas in description.relation_metadata.values() {
                for (field, meta) in metas {
                    if let Some(type_name) = &meta.type_name {
                        index
                            .relation_field_types
                            .entry((name.clone(), field.clone()))
                            .or_insert_with(|| type_name.clone());
                    }
                }
            }

            index.types.insert(
                name.clone(),
                TypeNames {
                    attributes,
                    states: description.states.keys().cloned().collect(),
                    relations: description.relations().map(|r| r.name.to_string()).collect(),
                },
            );
        }

        index
    }

    fn names(&self, object_type: &str) -> Result<&TypeNames, StructureError> {
        let name = ObjectTypeName::new(object_type);
        self.types
            .get(&name)
            .ok_or_else(|| UnknownTypeError::new(name.as_str()).into())
    }

    /// Fields of a full attribute name, with `virkning` last.
    pub fn attribute_fields(&self, attribute_name: &str) -> Option<&[String]> {
        self.attribute_fields
            .get(&attribute_name.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Full attribute names of a type, sorted.
    pub fn attribute_names(&self, object_type: &str) -> Result<&[String], StructureError> {
        Ok(&self.names(object_type)?.attributes)
    }

    /// State names of a type, in declared order.
    pub fn state_names(&self, object_type: &str) -> Result<&[String], StructureError> {
        Ok(&self.names(object_type)?.states)
    }

    /// Relation names of a type: zero-to-one first, then zero-to-many.
    pub fn relation_names(&self, object_type: &str) -> Result<&[String], StructureError> {
        Ok(&self.names(object_type)?.relations)
    }

    pub fn document_part_relation_names(&self) -> &'static [&'static str] {
        DOCUMENT_PART_RELATION_NAMES
    }

    /// Declared type name of an attribute field, `text` when undeclared.
    pub fn field_type(&self, attribute_name: &str, field: &str) -> &str {
        self.attribute_field_types
            .get(&(attribute_name.to_lowercase(), field.to_string()))
            .map(String::as_str)
            .unwrap_or(DEFAULT_FIELD_TYPE)
    }

    /// Declared type name of a relation property, `text` when undeclared.
    pub fn relation_field_type(&self, object_type: &str, field: &str) -> &str {
        self.relation_field_types
            .get(&(ObjectTypeName::new(object_type), field.to_string()))
            .map(String::as_str)
            .unwrap_or(DEFAULT_FIELD_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> NameIndex {
        NameIndex::build(&StructureRegistry::builtin().unwrap())
    }

    #[test]
    fn attribute_fields_end_with_virkning() {
        let index = index();
        let fields = index.attribute_fields("KlassifikationEgenskaber").unwrap();
        assert_eq!(fields.first().map(String::as_str), Some("brugervendtnoegle"));
        assert_eq!(fields.last().map(String::as_str), Some(VIRKNING_FIELD));
    }

    #[test]
    fn attribute_names_are_prefixed_and_sorted() {
        let index = index();
        assert_eq!(index.attribute_names("klasse").unwrap(), ["klasseegenskaber"]);
    }

    #[test]
    fn relation_names_put_zero_to_one_first() {
        let index = index();
        let names = index.relation_names("klassifikation").unwrap();
        assert_eq!(names, ["ansvarlig", "ejer"]);
        let facet = index.relation_names("facet").unwrap();
        assert_eq!(facet.last().map(String::as_str), Some("redaktoerer"));
    }

    #[test]
    fn state_names_keep_declared_order() {
        let index = index();
        assert_eq!(index.state_names("aktivitet").unwrap(), ["status", "publiceret"]);
    }

    #[test]
    fn field_types_default_to_text() {
        let index = index();
        assert_eq!(index.field_type("sagegenskaber", "afleveret"), "boolean");
        assert_eq!(index.field_type("sagegenskaber", "titel"), "text");
        assert_eq!(index.relation_field_type("aktivitet", "aktoerattr"), "aktoerattr");
        assert_eq!(index.relation_field_type("aktivitet", "nothing"), "text");
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(index().relation_names("rumskib").is_err());
    }

    #[test]
    fn document_parts_have_their_own_relations() {
        assert_eq!(index().document_part_relation_names(), ["underredigeringaf"]);
    }
}
