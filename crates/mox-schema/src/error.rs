use mox_core::{MoxError, UnknownTypeError};
use mox_structure::StructureError;
use thiserror::Error;

use crate::content::ContentError;
use crate::validate::ValidationViolations;

/// Errors from schema generation and payload validation.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The requested object type is not registered.
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    /// The registry describes something the schema vocabulary cannot
    /// express (e.g. an unknown primitive type). Fatal at generation time.
    #[error("schema build error for '{object_type}': {reason}")]
    SchemaBuild { object_type: String, reason: String },

    /// The payload did not conform to the generated document.
    #[error("validation failed for '{object_type}':\n{violations}")]
    ValidationFailed {
        object_type: String,
        violations: ValidationViolations,
    },

    /// A content reference could not be resolved.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// A structurally valid payload could not be read into typed entries.
    #[error("invalid payload for '{object_type}': {source}")]
    Payload {
        object_type: String,
        #[source]
        source: MoxError,
    },

    /// A registry mutation was rejected.
    #[error("registry mutation rejected: {0}")]
    Structure(StructureError),
}

impl SchemaError {
    /// True for request-scoped failures the caller can fix by correcting input.
    pub fn is_validation_failure(&self) -> bool {
        match self {
            Self::ValidationFailed { .. } | Self::Payload { .. } => true,
            Self::Content(e) => e.is_validation_failure(),
            _ => false,
        }
    }
}

impl From<StructureError> for SchemaError {
    fn from(err: StructureError) -> Self {
        match err {
            StructureError::UnknownType(e) => Self::UnknownType(e),
            StructureError::UnknownPrimitiveType { ref object_type, .. } => Self::SchemaBuild {
                object_type: object_type.clone(),
                reason: err.to_string(),
            },
            other => Self::Structure(other),
        }
    }
}
