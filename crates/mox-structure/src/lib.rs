//! # mox-structure — The Structure Registry
//!
//! Single source of truth for every object type the registry stores. Each
//! [`ObjectTypeDescription`] declares attribute groups, states, relations
//! (split by cardinality) and per-field metadata overrides. Both the schema
//! generator (`mox-schema`) and the template projection engine
//! (`mox-templates`) read exclusively from here.
//!
//! ## Modules
//!
//! - [`description`] — the declarative description and its invariants.
//! - [`registry`] — keyed table of descriptions, YAML loading, extension.
//! - [`metadata`] — primitive type table and the field metadata resolver.
//! - [`relation`] — cardinality and dual-addressing model.
//! - [`index`] — derived name lookups, rebuilt per registry snapshot.
//!
//! ## Crate Policy
//!
//! - Pure data and lookups; no I/O except the explicit `from_path` loader.
//! - Object-type names are always normalized through
//!   [`mox_core::ObjectTypeName`].

pub mod description;
pub mod error;
pub mod index;
pub mod metadata;
pub mod registry;
pub mod relation;

pub use description::{FieldMetadata, MetadataTable, ObjectTypeDescription, WILDCARD};
pub use error::StructureError;
pub use index::{NameIndex, DOCUMENT_PART_RELATION_NAMES, VIRKNING_FIELD};
pub use metadata::{FieldScope, MetadataResolver, PrimitiveType, ResolvedType};
pub use registry::{Extension, ExtensionMode, StructureRegistry};
pub use relation::{Addressing, Cardinality, RelationSpec, INDEX_FIELD};
