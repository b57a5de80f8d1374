use mox_core::UnknownTypeError;
use mox_structure::StructureError;
use thiserror::Error;

/// Errors from template projection. All of them abort the build run.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{0}' is not registered")]
    TemplateNotFound(String),

    #[error("mixin '{mixin}' requested by {object_type}/{template} is not registered")]
    MixinNotFound {
        object_type: String,
        template: String,
        mixin: String,
    },

    #[error("failed to render {object_type}/{template}: {reason}")]
    Render {
        object_type: String,
        template: String,
        reason: String,
    },

    #[error("template '{name}' does not parse: {reason}")]
    Parse { name: String, reason: String },

    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    #[error("structure error: {0}")]
    Structure(StructureError),

    #[error("invalid template options: {0}")]
    Options(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StructureError> for TemplateError {
    fn from(err: StructureError) -> Self {
        match err {
            StructureError::UnknownType(e) => Self::UnknownType(e),
            other => Self::Structure(other),
        }
    }
}
