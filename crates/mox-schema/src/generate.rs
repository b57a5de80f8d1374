//! # Validation Document Generation
//!
//! Derives one JSON Schema document per object type from its
//! [`ObjectTypeDescription`]. Generation is pure: the same description
//! always yields the same document.
//!
//! Document shape:
//!
//! ```text
//! attributter   { <type><group>: [ {fields..., virkning} ] }
//! tilstande     { <type><state>: [ {<state>: enum, virkning} ] }
//! relationer    { <relation>: [ oneOf(uuid branch, urn branch) ] }
//! note          string
//! ```

use mox_core::ObjectTypeName;
use mox_structure::{
    Cardinality, FieldScope, MetadataResolver, ObjectTypeDescription, RelationSpec,
    StructureRegistry, INDEX_FIELD,
};
use serde_json::{json, Map, Value};

use crate::error::SchemaError;
use crate::types::{
    definitions, integer, reference, resolved_schema, schema_array, schema_object, string,
    string_enum, SCHEMA_DIALECT,
};

const VIRKNING: &str = "virkning";
const SUBTYPE: &str = "objekttype";
const NOTE: &str = "note";

/// A generated document for one object type.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationDocument {
    object_type: ObjectTypeName,
    schema: Value,
    unconstrained: bool,
}

impl ValidationDocument {
    pub fn object_type(&self) -> &ObjectTypeName {
        &self.object_type
    }

    pub fn as_value(&self) -> &Value {
        &self.schema
    }

    pub fn into_value(self) -> Value {
        self.schema
    }

    /// True when the type is exempt and the document accepts any object.
    pub fn is_unconstrained(&self) -> bool {
        self.unconstrained
    }
}

/// One addressing branch of a relation entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchSchema {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl BranchSchema {
    fn with_target(target: &str) -> Self {
        let mut properties = Map::new();
        properties.insert(target.to_string(), reference(target));
        properties.insert(VIRKNING.to_string(), reference(VIRKNING));
        properties.insert(SUBTYPE.to_string(), string());
        Self {
            properties,
            required: vec![target.to_string(), VIRKNING.to_string()],
        }
    }

    /// Branch addressing the target by UUID.
    pub fn identifier() -> Self {
        Self::with_target("uuid")
    }

    /// Branch addressing the target by URN.
    pub fn name() -> Self {
        Self::with_target("urn")
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    fn set_property(&mut self, field: &str, schema: Value) {
        self.properties.insert(field.to_string(), schema);
    }

    fn ensure_property(&mut self, field: &str) {
        if !self.properties.contains_key(field) {
            self.properties.insert(field.to_string(), string());
        }
    }

    fn require(&mut self, field: &str) {
        if !self.required.iter().any(|r| r == field) {
            self.required.push(field.to_string());
        }
    }

    fn remove_property(&mut self, field: &str) {
        self.properties.remove(field);
        self.required.retain(|r| r != field);
    }

    pub fn to_value(&self) -> Value {
        schema_object(self.properties.clone(), &self.required)
    }
}

/// Typed model of one relation's schema before rendering.
///
/// A disabled addressing branch is `None`; a relation always keeps at least
/// one branch.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationSchema {
    pub cardinality: Cardinality,
    pub identifier: Option<BranchSchema>,
    pub name: Option<BranchSchema>,
}

impl RelationSchema {
    /// Base schema for a declared relation, before metadata is applied.
    pub fn new(spec: RelationSpec<'_>) -> Self {
        let mut schema = Self {
            cardinality: spec.cardinality,
            identifier: spec.addressing.identifier_enabled().then(BranchSchema::identifier),
            name: spec.addressing.name_enabled().then(BranchSchema::name),
        };
        if spec.cardinality.allows_index() {
            for branch in schema.branches_mut() {
                branch.set_property(INDEX_FIELD, integer());
            }
        }
        schema
    }

    pub fn branches(&self) -> impl Iterator<Item = &BranchSchema> {
        self.identifier.iter().chain(self.name.iter())
    }

    fn branches_mut(&mut self) -> impl Iterator<Item = &mut BranchSchema> {
        self.identifier.iter_mut().chain(self.name.iter_mut())
    }

    /// Apply relation metadata (wildcard and relation-specific) to every
    /// enabled branch. Ordering fields are dropped from zero-to-one
    /// relations.
    fn apply_metadata(
        &mut self,
        resolver: &MetadataResolver<'_>,
        relation: &str,
    ) -> Result<(), SchemaError> {
        let scope = FieldScope::Relation(relation);
        for field in resolver.fields_with_metadata(scope) {
            let Some(meta) = resolver.lookup(scope, field) else {
                continue;
            };
            let declares_type = meta.type_name.is_some() || meta.enum_values.is_some();
            let schema = if declares_type {
                Some(resolved_schema(&resolver.resolve_field_type(scope, field)?))
            } else {
                None
            };
            for branch in self.branches_mut() {
                match &schema {
                    Some(schema) => branch.set_property(field, schema.clone()),
                    None => branch.ensure_property(field),
                }
                if meta.mandatory {
                    branch.require(field);
                }
            }
        }
        if !self.cardinality.allows_index() {
            for branch in self.branches_mut() {
                branch.remove_property(INDEX_FIELD);
            }
        }
        Ok(())
    }

    pub fn to_value(&self) -> Value {
        let items = match (&self.identifier, &self.name) {
            (Some(id), Some(name)) => json!({"oneOf": [id.to_value(), name.to_value()]}),
            (Some(only), None) | (None, Some(only)) => only.to_value(),
            (None, None) => json!({"type": "object"}),
        };
        schema_array(items, self.cardinality.max_items())
    }
}

/// Generates validation documents from a registry.
#[derive(Debug, Clone, Copy)]
pub struct SchemaGenerator<'a> {
    registry: &'a StructureRegistry,
}

impl<'a> SchemaGenerator<'a> {
    pub fn new(registry: &'a StructureRegistry) -> Self {
        Self { registry }
    }

    /// Generate the document for `object_type`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownType`] for unregistered types and
    /// [`SchemaError::SchemaBuild`] when metadata names an unknown
    /// primitive type.
    pub fn generate(&self, object_type: &str) -> Result<ValidationDocument, SchemaError> {
        let name = ObjectTypeName::new(object_type);
        let description = self.registry.describe(name.as_str())?;

        if description.unconstrained {
            tracing::warn!(
                object_type = %name,
                "object type is exempt from schema validation; any object is accepted"
            );
            return Ok(ValidationDocument {
                object_type: name,
                schema: json!({"type": "object"}),
                unconstrained: true,
            });
        }

        let resolver = MetadataResolver::new(name.as_str(), description);

        let mut properties = Map::new();
        properties.insert(
            "attributter".into(),
            attributes_schema(name.as_str(), description, &resolver)?,
        );
        properties.insert("tilstande".into(), states_schema(name.as_str(), description));
        properties.insert("relationer".into(), relations_schema(description, &resolver)?);
        properties.insert(NOTE.into(), string());

        let mut schema = schema_object(
            properties,
            &["attributter".to_string(), "tilstande".to_string()],
        );
        if let Value::Object(root) = &mut schema {
            root.insert("$schema".into(), json!(SCHEMA_DIALECT));
            root.insert("definitions".into(), definitions());
        }

        tracing::debug!(object_type = %name, "generated validation document");
        Ok(ValidationDocument {
            object_type: name,
            schema,
            unconstrained: false,
        })
    }
}

fn attributes_schema(
    object_type: &str,
    description: &ObjectTypeDescription,
    resolver: &MetadataResolver<'_>,
) -> Result<Value, SchemaError> {
    let mut groups = Map::new();
    let mut required_groups = Vec::new();

    for (group, fields) in &description.attributes {
        let scope = FieldScope::Attribute(group);
        let mut properties = Map::new();
        for field in fields {
            let resolved = resolver.resolve_field_type(scope, field)?;
            properties.insert(field.clone(), resolved_schema(&resolved));
        }
        properties.insert(VIRKNING.into(), reference(VIRKNING));

        let mandatory = resolver.mandatory_fields(scope);
        let full_name = format!("{object_type}{group}");
        if !mandatory.is_empty() {
            required_groups.push(full_name.clone());
        }
        let mut required = mandatory;
        required.push(VIRKNING.to_string());

        groups.insert(
            full_name,
            schema_array(schema_object(properties, &required), None),
        );
    }

    Ok(schema_object(groups, &required_groups))
}

fn states_schema(object_type: &str, description: &ObjectTypeDescription) -> Value {
    let mut states: Vec<(&String, &Vec<String>)> = description.states.iter().collect();
    states.sort_by(|a, b| a.0.cmp(b.0));

    let mut properties = Map::new();
    let mut required = Vec::with_capacity(states.len());
    for (state, values) in states {
        let full_name = format!("{object_type}{state}");
        let mut entry = Map::new();
        entry.insert(state.clone(), string_enum(values));
        entry.insert(VIRKNING.into(), reference(VIRKNING));
        properties.insert(
            full_name.clone(),
            schema_array(
                schema_object(entry, &[state.clone(), VIRKNING.to_string()]),
                None,
            ),
        );
        required.push(full_name);
    }
    schema_object(properties, &required)
}

fn relations_schema(
    description: &ObjectTypeDescription,
    resolver: &MetadataResolver<'_>,
) -> Result<Value, SchemaError> {
    let mut properties = Map::new();
    for spec in description.relations() {
        let mut relation = RelationSchema::new(spec);
        relation.apply_metadata(resolver, spec.name)?;
        properties.insert(spec.name.to_string(), relation.to_value());
    }
    Ok(schema_object(properties, &[]))
}
