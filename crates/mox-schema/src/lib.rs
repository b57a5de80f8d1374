//! # mox-schema — Schema Generation & Validation
//!
//! Turns structure registry entries into JSON Schema (draft-04) documents
//! and validates registration payloads against them.
//!
//! ## Generation (`generate`)
//!
//! [`SchemaGenerator`] walks one [`ObjectTypeDescription`] and emits the
//! `attributter` / `tilstande` / `relationer` document. Relations are
//! modelled as a typed two-branch union ([`RelationSchema`]) before being
//! rendered, so branch suppression is a flag rather than a key deletion.
//!
//! ## Caching (`compiler`)
//!
//! [`SchemaCompiler`] owns the current registry [`Snapshot`]. Each snapshot
//! carries its own name index, document cache and compiled validator cache.
//! A registry mutation swaps in a brand-new snapshot, so readers either see
//! the old registry with its caches or the new one with empty caches, never
//! a mix.
//!
//! ## Validation (`validate`)
//!
//! Validation is a trust boundary: invalid payloads are rejected with
//! structured [`Violation`]s carrying the instance path, schema path and
//! message.
//!
//! ## Content references (`content`)
//!
//! `field:<name>` references in write operations are handed to a
//! [`ContentStore`] and replaced by the stored object's URL.
//!
//! [`ObjectTypeDescription`]: mox_structure::ObjectTypeDescription

pub mod compiler;
pub mod content;
pub mod error;
pub mod generate;
pub mod registration;
pub mod types;
pub mod validate;

pub use compiler::{SchemaCompiler, Snapshot};
pub use content::{
    ContentError, ContentResolver, ContentStore, FileContentStore, Operation, Upload,
    CONTENT_FIELD,
};
pub use error::SchemaError;
pub use generate::{BranchSchema, RelationSchema, SchemaGenerator, ValidationDocument};
pub use registration::RelationView;
pub use validate::{ValidationViolations, Violation};
