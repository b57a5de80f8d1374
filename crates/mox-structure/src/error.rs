use mox_core::UnknownTypeError;
use thiserror::Error;

/// Errors raised while loading, extending or querying the structure registry.
#[derive(Error, Debug)]
pub enum StructureError {
    /// The requested object type is not registered.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// Field metadata names a primitive type outside the known type table.
    #[error(
        "object type '{object_type}': field '{field}' in '{group}' references unknown type '{type_name}'"
    )]
    UnknownPrimitiveType {
        object_type: String,
        group: String,
        field: String,
        type_name: String,
    },

    /// A description violates one of the registry invariants.
    #[error("invalid description for object type '{object_type}': {reason}")]
    InvalidDescription { object_type: String, reason: String },

    /// A structure document could not be parsed.
    #[error("structure load error for '{source_name}': {reason}")]
    Load { source_name: String, reason: String },

    /// IO error reading a structure document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
