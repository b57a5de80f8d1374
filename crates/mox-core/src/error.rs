//! # Error Types
//!
//! Errors shared across the workspace. Crate-specific failures
//! (`StructureError`, `SchemaError`, `TemplateError`) live next to the code
//! that raises them and wrap [`UnknownTypeError`] where a registry lookup
//! can miss.

use thiserror::Error;

/// An object type was requested that the structure registry does not know.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown object type '{object_type}'")]
pub struct UnknownTypeError {
    /// The normalized (lower-cased) name that was looked up.
    pub object_type: String,
}

impl UnknownTypeError {
    /// Build the error for a normalized object-type name.
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
        }
    }
}

/// Top-level error type for the core primitives.
#[derive(Error, Debug)]
pub enum MoxError {
    /// Registry lookup for an unregistered object type.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// An identifier (UUID or URN) did not have the expected shape.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A validity interval could not be interpreted.
    #[error("invalid virkning: {0}")]
    InvalidVirkning(String),

    /// A payload fragment could not be converted to a typed view.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
