//! # Object-Type Descriptions
//!
//! The declarative description of one object type. YAML keys follow the
//! registry's payload vocabulary (`attributter`, `tilstande`,
//! `relationer_nul_til_en`, …) so that a structure document reads the same
//! as the payloads it governs.
//!
//! Ordered maps ([`IndexMap`]) preserve declaration order; the generated
//! persistence code depends on it.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::StructureError;
use crate::relation::{Addressing, Cardinality, RelationSpec};

/// Metadata key that applies to every field of a group (attributes) or to
/// every relation (relations).
pub const WILDCARD: &str = "*";

/// Per-field override: logical type, enum constraint, mandatory flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldMetadata {
    /// Name from the primitive type table (e.g. `boolean`, `timestamptz`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Permitted values. Takes precedence over `type_name`.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mandatory: bool,
}

/// Group (or relation) name, then field name, to metadata.
pub type MetadataTable = IndexMap<String, IndexMap<String, FieldMetadata>>;

/// Declarative description of one object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectTypeDescription {
    /// Attribute-group name to ordered field names.
    #[serde(rename = "attributter", default)]
    pub attributes: IndexMap<String, Vec<String>>,

    #[serde(rename = "attributter_metadata", default, skip_serializing_if = "IndexMap::is_empty")]
    pub attribute_metadata: MetadataTable,

    /// State name to permitted enumerated values.
    #[serde(rename = "tilstande", default)]
    pub states: IndexMap<String, Vec<String>>,

    #[serde(rename = "relationer_nul_til_en", default)]
    pub relations_single: Vec<String>,

    #[serde(rename = "relationer_nul_til_mange", default)]
    pub relations_many: Vec<String>,

    #[serde(rename = "relationer_metadata", default, skip_serializing_if = "IndexMap::is_empty")]
    pub relation_metadata: MetadataTable,

    /// Declared addressing restrictions. Relations not listed accept both
    /// identifier and name references.
    #[serde(rename = "relationer_adressering", default, skip_serializing_if = "IndexMap::is_empty")]
    pub relation_addressing: IndexMap<String, Addressing>,

    /// Accept any JSON object for this type instead of a generated schema.
    #[serde(rename = "skemaundtaget", default, skip_serializing_if = "std::ops::Not::not")]
    pub unconstrained: bool,
}

impl ObjectTypeDescription {
    /// All relations, zero-to-one first, each in declared order.
    pub fn relations(&self) -> impl Iterator<Item = RelationSpec<'_>> {
        let single = self
            .relations_single
            .iter()
            .map(|name| (name, Cardinality::ZeroToOne));
        let many = self
            .relations_many
            .iter()
            .map(|name| (name, Cardinality::ZeroToMany));

        single.chain(many).map(move |(name, cardinality)| RelationSpec {
            name,
            cardinality,
            addressing: self
                .relation_addressing
                .get(name)
                .copied()
                .unwrap_or_default(),
        })
    }

    /// Cardinality of a declared relation.
    pub fn cardinality_of(&self, relation: &str) -> Option<Cardinality> {
        self.relations()
            .find(|spec| spec.name == relation)
            .map(|spec| spec.cardinality)
    }

    /// Merge another description into this one.
    ///
    /// Attribute groups are extended with unseen fields, relations are
    /// unioned, states, metadata and addressing are overridden per key.
    pub fn merge(&mut self, other: &ObjectTypeDescription) {
        for (group, fields) in &other.attributes {
            let entry = self.attributes.entry(group.clone()).or_default();
            for field in fields {
                if !entry.contains(field) {
                    entry.push(field.clone());
                }
            }
        }

        merge_metadata(&mut self.attribute_metadata, &other.attribute_metadata);
        merge_metadata(&mut self.relation_metadata, &other.relation_metadata);

        for (state, values) in &other.states {
            self.states.insert(state.clone(), values.clone());
        }

        for name in &other.relations_single {
            if !self.relations_single.contains(name) {
                self.relations_single.push(name.clone());
            }
        }
        for name in &other.relations_many {
            if !self.relations_many.contains(name) {
                self.relations_many.push(name.clone());
            }
        }

        for (relation, addressing) in &other.relation_addressing {
            self.relation_addressing.insert(relation.clone(), *addressing);
        }

        self.unconstrained |= other.unconstrained;
    }

    /// Check the registry invariants for this description.
    pub fn check(&self, object_type: &str) -> Result<(), StructureError> {
        let invalid = |reason: String| StructureError::InvalidDescription {
            object_type: object_type.to_string(),
            reason,
        };

        for (group, fields) in &self.attributes {
            let mut seen = HashSet::new();
            for field in fields {
                if !seen.insert(field.as_str()) {
                    return Err(invalid(format!(
                        "attribute group '{group}' lists field '{field}' twice"
                    )));
                }
            }
            if self.states.contains_key(group) {
                return Err(invalid(format!(
                    "'{group}' is declared both as attribute group and state"
                )));
            }
        }

        for (state, values) in &self.states {
            if values.is_empty() {
                return Err(invalid(format!("state '{state}' has no permitted values")));
            }
        }

        let mut relations = HashSet::new();
        for name in self.relations_single.iter().chain(&self.relations_many) {
            if !relations.insert(name.as_str()) {
                return Err(invalid(format!(
                    "relation '{name}' is declared more than once across cardinalities"
                )));
            }
        }

        for (group, fields) in &self.attribute_metadata {
            if group == WILDCARD {
                continue;
            }
            let declared = self.attributes.get(group).ok_or_else(|| {
                invalid(format!("metadata for undeclared attribute group '{group}'"))
            })?;
            if let Some(field) = fields.keys().find(|f| !declared.contains(f)) {
                return Err(invalid(format!(
                    "metadata for undeclared field '{field}' in attribute group '{group}'"
                )));
            }
        }

        for relation in self.relation_metadata.keys() {
            if relation != WILDCARD && !relations.contains(relation.as_str()) {
                return Err(invalid(format!(
                    "metadata for undeclared relation '{relation}'"
                )));
            }
        }

        for relation in self.relation_addressing.keys() {
            if !relations.contains(relation.as_str()) {
                return Err(invalid(format!(
                    "addressing declared for undeclared relation '{relation}'"
                )));
            }
        }

        Ok(())
    }
}

fn merge_metadata(target: &mut MetadataTable, source: &MetadataTable) {
    for (group, fields) in source {
        let entry = target.entry(group.clone()).or_default();
        for (field, meta) in fields {
            entry.insert(field.clone(), meta.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ObjectTypeDescription {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn relations_iterate_single_then_many() {
        let d = parse(
            "relationer_nul_til_en: [ejer, ansvarlig]\nrelationer_nul_til_mange: [redaktoerer]\n",
        );
        let names: Vec<_> = d.relations().map(|r| (r.name, r.cardinality)).collect();
        assert_eq!(
            names,
            vec![
                ("ejer", Cardinality::ZeroToOne),
                ("ansvarlig", Cardinality::ZeroToOne),
                ("redaktoerer", Cardinality::ZeroToMany),
            ]
        );
    }

    #[test]
    fn relation_in_both_cardinalities_is_rejected() {
        let d = parse("relationer_nul_til_en: [ejer]\nrelationer_nul_til_mange: [ejer]\n");
        let err = d.check("facet").unwrap_err();
        assert!(err.to_string().contains("ejer"));
    }

    #[test]
    fn duplicate_attribute_field_is_rejected() {
        let d = parse("attributter:\n  egenskaber: [a, b, a]\n");
        assert!(d.check("x").is_err());
    }

    #[test]
    fn empty_state_is_rejected() {
        let d = parse("tilstande:\n  publiceret: []\n");
        assert!(d.check("x").is_err());
    }

    #[test]
    fn metadata_for_undeclared_field_is_rejected() {
        let d = parse(
            "attributter:\n  egenskaber: [a]\nattributter_metadata:\n  egenskaber:\n    b:\n      mandatory: true\n",
        );
        assert!(d.check("x").is_err());
    }

    #[test]
    fn wildcard_metadata_needs_no_declaration() {
        let d = parse(
            "relationer_nul_til_mange: [r]\nrelationer_metadata:\n  \"*\":\n    indeks:\n      type: int\n",
        );
        assert!(d.check("x").is_ok());
    }

    #[test]
    fn addressing_for_unknown_relation_is_rejected() {
        let d = parse("relationer_adressering:\n  ghost: urn_only\n");
        assert!(d.check("x").is_err());
    }

    #[test]
    fn merge_extends_groups_and_unions_relations() {
        let mut base = parse(
            "attributter:\n  egenskaber: [a, b]\ntilstande:\n  s: [X]\nrelationer_nul_til_en: [ejer]\n",
        );
        let ext = parse(
            "attributter:\n  egenskaber: [b, c]\n  udvidelser: [d]\ntilstande:\n  s: [Y, Z]\nrelationer_nul_til_en: [ejer, leder]\n",
        );
        base.merge(&ext);

        assert_eq!(base.attributes["egenskaber"], vec!["a", "b", "c"]);
        assert_eq!(base.attributes["udvidelser"], vec!["d"]);
        assert_eq!(base.states["s"], vec!["Y", "Z"]);
        assert_eq!(base.relations_single, vec!["ejer", "leder"]);
    }
}
