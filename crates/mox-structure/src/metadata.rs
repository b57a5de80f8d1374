//! # Type & Metadata Resolution
//!
//! Field metadata is looked up in two levels: the exact group (or relation)
//! first, then the wildcard entry `"*"` that applies to every group of the
//! same scope. A field with no metadata is plain text.
//!
//! An `enum` override wins over a declared `type`; the field is then
//! string-shaped with a closed value set.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;

use crate::description::{FieldMetadata, MetadataTable, ObjectTypeDescription, WILDCARD};
use crate::error::StructureError;

/// The known primitive type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Text,
    Boolean,
    Date,
    Int,
    Interval,
    TextArray,
    Timestamptz,
    /// Search keywords: `[identifier, description, category]` tuples.
    Soegeord,
    /// Public-access exemption: alternative title plus legal basis.
    OffentlighedUndtaget,
    JournalNotat,
    JournalDokument,
    /// Actor attributes on activity relations.
    AktoerAttr,
    /// Expected/nominal value pair on state value relations.
    VaerdiRelationAttr,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 13] = [
        Self::Text,
        Self::Boolean,
        Self::Date,
        Self::Int,
        Self::Interval,
        Self::TextArray,
        Self::Timestamptz,
        Self::Soegeord,
        Self::OffentlighedUndtaget,
        Self::JournalNotat,
        Self::JournalDokument,
        Self::AktoerAttr,
        Self::VaerdiRelationAttr,
    ];

    /// Name used in structure documents.
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Int => "int",
            Self::Interval => "interval(0)",
            Self::TextArray => "text[]",
            Self::Timestamptz => "timestamptz",
            Self::Soegeord => "soegeord",
            Self::OffentlighedUndtaget => "offentlighedundtagettype",
            Self::JournalNotat => "journalnotat",
            Self::JournalDokument => "journaldokument",
            Self::AktoerAttr => "aktoerattr",
            Self::VaerdiRelationAttr => "vaerdirelationattr",
        }
    }

    /// Column type in the generated persistence code.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Int => "int",
            Self::Interval => "interval(0)",
            Self::TextArray => "text[]",
            Self::Timestamptz => "ClearableTimestamptz",
            Self::Soegeord => "KlasseSoegeordType[]",
            Self::OffentlighedUndtaget => "OffentlighedUndtagetType",
            Self::JournalNotat => "JournalNotatType",
            Self::JournalDokument => "JournalPostDokumentAttrType",
            Self::AktoerAttr => "AktivitetAktoerAttr",
            Self::VaerdiRelationAttr => "TilstandVaerdiRelationAttrType",
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which metadata table a lookup goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope<'a> {
    /// Fields of an attribute group.
    Attribute(&'a str),
    /// Extra properties of a relation's entries.
    Relation(&'a str),
}

impl FieldScope<'_> {
    pub fn group(&self) -> &str {
        match self {
            Self::Attribute(g) | Self::Relation(g) => g,
        }
    }
}

/// A field's validator-ready type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive(PrimitiveType),
    Enum(Vec<String>),
}

impl ResolvedType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Primitive(p) => p.sql_type(),
            Self::Enum(_) => "text",
        }
    }

    pub fn is_default_text(&self) -> bool {
        matches!(self, Self::Primitive(PrimitiveType::Text))
    }
}

/// Resolves field metadata for one object type.
#[derive(Debug, Clone, Copy)]
pub struct MetadataResolver<'a> {
    object_type: &'a str,
    description: &'a ObjectTypeDescription,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(object_type: &'a str, description: &'a ObjectTypeDescription) -> Self {
        Self {
            object_type,
            description,
        }
    }

    fn table(&self, scope: FieldScope<'_>) -> &'a MetadataTable {
        match scope {
            FieldScope::Attribute(_) => &self.description.attribute_metadata,
            FieldScope::Relation(_) => &self.description.relation_metadata,
        }
    }

    /// Field-specific metadata, falling back to the wildcard entry.
    pub fn lookup(&self, scope: FieldScope<'_>, field: &str) -> Option<&'a FieldMetadata> {
        let table = self.table(scope);
        table
            .get(scope.group())
            .and_then(|fields| fields.get(field))
            .or_else(|| table.get(WILDCARD).and_then(|fields| fields.get(field)))
    }

    /// Resolve a field to its primitive type or enum constraint.
    ///
    /// # Errors
    ///
    /// [`StructureError::UnknownPrimitiveType`] if metadata names a type
    /// outside [`PrimitiveType::ALL`].
    pub fn resolve_field_type(
        &self,
        scope: FieldScope<'_>,
        field: &str,
    ) -> Result<ResolvedType, StructureError> {
        let Some(meta) = self.lookup(scope, field) else {
            return Ok(ResolvedType::Primitive(PrimitiveType::Text));
        };

        if let Some(values) = &meta.enum_values {
            return Ok(ResolvedType::Enum(values.clone()));
        }

        match &meta.type_name {
            None => Ok(ResolvedType::Primitive(PrimitiveType::Text)),
            Some(name) => name.parse().map(ResolvedType::Primitive).map_err(|type_name| {
                StructureError::UnknownPrimitiveType {
                    object_type: self.object_type.to_string(),
                    group: scope.group().to_string(),
                    field: field.to_string(),
                    type_name,
                }
            }),
        }
    }

    /// Fields that carry any metadata in this scope.
    ///
    /// For attribute groups this is the subset of declared fields with
    /// metadata. For relations it is every property the metadata injects:
    /// wildcard entries first, then relation-specific ones, in declared
    /// order.
    pub fn fields_with_metadata(&self, scope: FieldScope<'_>) -> Vec<&'a str> {
        let table = self.table(scope);
        match scope {
            FieldScope::Attribute(group) => self
                .description
                .attributes
                .get(group)
                .map(|fields| {
                    fields
                        .iter()
                        .filter(|f| self.lookup(scope, f).is_some())
                        .map(String::as_str)
                        .collect()
                })
                .unwrap_or_default(),
            FieldScope::Relation(relation) => {
                let mut names: IndexSet<&'a str> = IndexSet::new();
                for key in [WILDCARD, relation] {
                    if let Some(fields) = table.get(key) {
                        names.extend(fields.keys().map(String::as_str));
                    }
                }
                names.into_iter().collect()
            }
        }
    }

    /// Mandatory fields of a group, sorted by plain byte order.
    ///
    /// A field is mandatory only when its resolved metadata explicitly sets
    /// `mandatory: true`.
    pub fn mandatory_fields(&self, scope: FieldScope<'_>) -> Vec<String> {
        let mut mandatory: Vec<String> = self
            .fields_with_metadata(scope)
            .into_iter()
            .filter(|f| self.lookup(scope, f).is_some_and(|m| m.mandatory))
            .map(str::to_string)
            .collect();
        mandatory.sort();
        mandatory.dedup();
        mandatory
    }
}
