//! # Identity Newtypes
//!
//! [`ObjectTypeName`] is the registry key for an object type. [`Urn`] is the
//! name-based half of relation addressing; the identifier-based half is a
//! plain [`uuid::Uuid`].

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MoxError;

/// Lower-cased object-type name (e.g. `organisation`, `klasse`).
///
/// Construction always normalizes, so two names that differ only in case
/// compare equal and hash to the same registry slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ObjectTypeName(String);

impl ObjectTypeName {
    /// Normalize a raw name into a registry key.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    /// Access the normalized name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ObjectTypeName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ObjectTypeName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ObjectTypeName> for String {
    fn from(value: ObjectTypeName) -> Self {
        value.0
    }
}

impl Borrow<str> for ObjectTypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ObjectTypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A name-based relation target, e.g. `urn:dk:cpr:person:0101501234`.
///
/// Matches the `^urn:.` pattern the generated schemas use: the literal
/// `urn:` prefix followed by at least one character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn(String);

impl Urn {
    /// Parse a URN, rejecting anything without the `urn:` prefix.
    pub fn parse(value: impl Into<String>) -> Result<Self, MoxError> {
        let value = value.into();
        match value.strip_prefix("urn:") {
            Some(rest) if !rest.is_empty() => Ok(Self(value)),
            _ => Err(MoxError::InvalidIdentifier(format!(
                "URN must start with 'urn:' followed by a name, got {value:?}"
            ))),
        }
    }

    /// Access the full URN string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Urn {
    type Error = MoxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Urn> for String {
    fn from(value: Urn) -> Self {
        value.0
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn object_type_name_is_lower_cased() {
        assert_eq!(ObjectTypeName::new("Organisation").as_str(), "organisation");
        assert_eq!(ObjectTypeName::new("  KLASSE ").as_str(), "klasse");
    }

    #[test]
    fn object_type_name_deserializes_normalized() {
        let name: ObjectTypeName = serde_json::from_str("\"Facet\"").unwrap();
        assert_eq!(name, ObjectTypeName::new("facet"));
    }

    #[test]
    fn urn_requires_prefix_and_name() {
        assert!(Urn::parse("urn:dk:cvr:12345678").is_ok());
        assert!(Urn::parse("urn:").is_err());
        assert!(Urn::parse("URN:x").is_err());
        assert!(Urn::parse("http://example.com").is_err());
    }

    #[test]
    fn urn_rejected_during_deserialization() {
        let result: Result<Urn, _> = serde_json::from_str("\"not-a-urn\"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent_and_case_blind(name in "[A-Za-z]{1,20}") {
            let once = ObjectTypeName::new(&name);
            let twice = ObjectTypeName::new(once.as_str());
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(once, ObjectTypeName::new(name.to_uppercase()));
        }
    }
}
