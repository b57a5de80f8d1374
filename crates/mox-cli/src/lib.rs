//! # mox-cli — Object Model Command-Line Interface
//!
//! Front end over the structure registry, the schema compiler and the
//! template engine.
//!
//! ## Subcommands
//!
//! - `types` lists object types or describes one
//! - `schema` prints the validation document for an object type
//! - `validate` checks a registration payload, resolving uploaded content
//! - `apply-templates` renders the SQL script, or checks it for drift
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when input is rejected or an operation fails, `2`
//! when the requested object type is not registered.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed args.
//! - Handlers delegate to the domain crates and only format output.

pub mod config;
pub mod schema;
pub mod templates;
pub mod types;
pub mod validate;

use mox_core::UnknownTypeError;
use mox_schema::SchemaError;
use mox_structure::StructureError;
use mox_templates::TemplateError;
use sha2::{Digest, Sha256};

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let unknown_type = err.chain().any(|cause| {
        cause.is::<UnknownTypeError>()
            || matches!(cause.downcast_ref::<SchemaError>(), Some(SchemaError::UnknownType(_)))
            || matches!(cause.downcast_ref::<StructureError>(), Some(StructureError::UnknownType(_)))
            || matches!(cause.downcast_ref::<TemplateError>(), Some(TemplateError::UnknownType(_)))
    });
    if unknown_type {
        2
    } else {
        1
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
