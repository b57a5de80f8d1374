//! # Payload Validation
//!
//! Compiles generated documents into `jsonschema` validators (draft-04)
//! and turns validation errors into structured [`Violation`]s.
//!
//! Validation is a trust boundary: a payload that fails is rejected with
//! the instance path, the schema path and a message for every violation,
//! never with a bare boolean.

use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::Value;

use crate::error::SchemaError;
use crate::generate::ValidationDocument;

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the payload.
    pub instance_path: String,
    /// JSON Pointer path within the generated document.
    pub schema_path: String,
    pub message: String,
    /// Name of the missing property, for `required` violations.
    pub missing_property: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }

    /// Names of all properties reported missing.
    pub fn missing_properties(&self) -> impl Iterator<Item = &str> {
        self.violations
            .iter()
            .filter_map(|v| v.missing_property.as_deref())
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Compile a generated document into a validator.
///
/// # Errors
///
/// [`SchemaError::SchemaBuild`] if `jsonschema` rejects the document.
pub fn compile(document: &ValidationDocument) -> Result<Validator, SchemaError> {
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft4)
        .build(document.as_value())
        .map_err(|e| SchemaError::SchemaBuild {
            object_type: document.object_type().to_string(),
            reason: e.to_string(),
        })
}

/// Collect every violation of `instance` against `validator`.
pub fn violations(validator: &Validator, instance: &Value) -> Vec<Violation> {
    validator
        .iter_errors(instance)
        .map(|e| {
            let missing_property = match &e.kind {
                ValidationErrorKind::Required { property } => {
                    property.as_str().map(str::to_string)
                }
                _ => None,
            };
            Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
                missing_property,
            }
        })
        .collect()
}

/// Validate `instance`, failing with every violation found.
///
/// # Errors
///
/// [`SchemaError::ValidationFailed`] listing each violation.
pub fn check(
    object_type: &str,
    validator: &Validator,
    instance: &Value,
) -> Result<(), SchemaError> {
    let found = violations(validator, instance);
    if found.is_empty() {
        Ok(())
    } else {
        tracing::debug!(object_type, count = found.len(), "payload rejected");
        Err(SchemaError::ValidationFailed {
            object_type: object_type.to_string(),
            violations: ValidationViolations { violations: found },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_display_format() {
        let v = Violation {
            instance_path: "/attributter/klassifikationegenskaber/0".to_string(),
            schema_path: "/properties/attributter/required".to_string(),
            message: r#""brugervendtnoegle" is a required property"#.to_string(),
            missing_property: Some("brugervendtnoegle".to_string()),
        };
        let display = v.to_string();
        assert!(display.contains("/attributter/klassifikationegenskaber/0"));
        assert!(display.contains("required property"));
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""tilstande" is a required property"#.to_string(),
            missing_property: Some("tilstande".to_string()),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn missing_properties_are_listed() {
        let violations = ValidationViolations {
            violations: vec![
                Violation {
                    instance_path: String::new(),
                    schema_path: "/required".into(),
                    message: "m".into(),
                    missing_property: Some("tilstande".into()),
                },
                Violation {
                    instance_path: "/note".into(),
                    schema_path: "/properties/note/type".into(),
                    message: "m".into(),
                    missing_property: None,
                },
            ],
        };
        assert_eq!(violations.missing_properties().collect::<Vec<_>>(), ["tilstande"]);
        assert_eq!(violations.to_string().lines().count(), 2);
    }
}
