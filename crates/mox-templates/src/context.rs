//! # Projection Context
//!
//! The data handed to a template for one (object type, template) pair.
//! Groups and states are serialized as arrays rather than maps so their
//! declared order survives the trip through the template engine.

use mox_structure::{FieldScope, MetadataResolver, ObjectTypeDescription, INDEX_FIELD};
use serde::Serialize;

use crate::catalog::template_file;
use crate::error::TemplateError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldContext {
    pub name: String,
    pub sql_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeContext {
    /// Group name, e.g. `egenskaber`.
    pub name: String,
    /// `<type><group>`, the payload key.
    pub full_name: String,
    /// Composite SQL type of one group row.
    pub type_name: String,
    pub table: String,
    pub fields: Vec<FieldContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateContext {
    pub name: String,
    pub full_name: String,
    /// SQL enum holding the permitted values.
    pub sql_type: String,
    pub table: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationContext {
    pub name: String,
    pub zero_to_many: bool,
    /// Metadata-driven columns beyond target, validity and ordering.
    pub fields: Vec<FieldContext>,
}

/// Everything a template may reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionContext {
    pub oio_type: String,
    /// `oio_type` with its first letter upper-cased, for SQL type names.
    pub type_name: String,
    pub script_signature: String,
    pub template_file: String,
    pub include_mixin: String,
    #[serde(rename = "attributter")]
    pub attributes: Vec<AttributeContext>,
    #[serde(rename = "attributter_revorder")]
    pub attributes_reversed: Vec<AttributeContext>,
    #[serde(rename = "tilstande")]
    pub states: Vec<StateContext>,
    #[serde(rename = "tilstande_revorder")]
    pub states_reversed: Vec<StateContext>,
    #[serde(rename = "relationer")]
    pub relations: Vec<RelationContext>,
    /// Union of all relation columns, first occurrence wins.
    pub relation_fields: Vec<FieldContext>,
    #[serde(rename = "relationer_nul_til_en")]
    pub relations_single: Vec<String>,
    #[serde(rename = "relationer_nul_til_mange")]
    pub relations_many: Vec<String>,
    /// Text of the rendered mixin, filled in by the engine.
    pub mixin: String,
}

pub(crate) fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ProjectionContext {
    /// Build the context for `template` over one normalized object type.
    pub fn build(
        oio_type: &str,
        description: &ObjectTypeDescription,
        template: &str,
        include_mixin: &str,
    ) -> Result<Self, TemplateError> {
        let resolver = MetadataResolver::new(oio_type, description);
        let type_name = capitalize(oio_type);

        let attributes = description
            .attributes
            .iter()
            .map(|(group, fields)| {
                let scope = FieldScope::Attribute(group);
                let fields = fields
                    .iter()
                    .map(|field| {
                        Ok(FieldContext {
                            name: field.clone(),
                            sql_type: resolver.resolve_field_type(scope, field)?.sql_type().into(),
                        })
                    })
                    .collect::<Result<Vec<_>, TemplateError>>()?;
                Ok(AttributeContext {
                    name: group.clone(),
                    full_name: format!("{oio_type}{group}"),
                    type_name: format!("{type_name}{}AttrType", capitalize(group)),
                    table: format!("{oio_type}_attr_{group}"),
                    fields,
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let states: Vec<StateContext> = description
            .states
            .iter()
            .map(|(state, values)| StateContext {
                name: state.clone(),
                full_name: format!("{oio_type}{state}"),
                sql_type: format!("{type_name}{}Tils", capitalize(state)),
                table: format!("{oio_type}_tils_{state}"),
                values: values.clone(),
            })
            .collect();

        let relations = description
            .relations()
            .map(|spec| {
                let scope = FieldScope::Relation(spec.name);
                let fields = resolver
                    .fields_with_metadata(scope)
                    .into_iter()
                    .filter(|field| *field != INDEX_FIELD)
                    .map(|field| {
                        Ok(FieldContext {
                            name: field.to_string(),
                            sql_type: resolver.resolve_field_type(scope, field)?.sql_type().into(),
                        })
                    })
                    .collect::<Result<Vec<_>, TemplateError>>()?;
                Ok(RelationContext {
                    name: spec.name.to_string(),
                    zero_to_many: spec.cardinality.allows_index(),
                    fields,
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let mut relation_fields: Vec<FieldContext> = Vec::new();
        for field in relations.iter().flat_map(|r| &r.fields) {
            if !relation_fields.iter().any(|f| f.name == field.name) {
                relation_fields.push(field.clone());
            }
        }

        let file = template_file(template);
        Ok(Self {
            oio_type: oio_type.to_string(),
            type_name,
            script_signature: format!("mox apply-templates {oio_type} {file}"),
            template_file: file,
            include_mixin: include_mixin.to_string(),
            attributes_reversed: attributes.iter().rev().cloned().collect(),
            attributes,
            states_reversed: states.iter().rev().cloned().collect(),
            states,
            relations,
            relation_fields,
            relations_single: description.relations_single.clone(),
            relations_many: description.relations_many.clone(),
            mixin: String::new(),
        })
    }
}
