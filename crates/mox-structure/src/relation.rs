//! # Relation Cardinality & Addressing
//!
//! Two cardinalities exist: zero-to-one (at most one current target) and
//! zero-to-many (any number of concurrent targets, ordered by `indeks`).
//!
//! Every relation is addressed through a two-branch union: by identifier
//! (`uuid`) or by name (`urn`). A branch can only be switched off by an
//! explicit [`Addressing`] declaration in the structure document; nothing
//! infers it.

use serde::{Deserialize, Serialize};

/// Property name of the ordering discriminator on zero-to-many entries.
pub const INDEX_FIELD: &str = "indeks";

/// How many concurrent targets a relation may have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    ZeroToOne,
    ZeroToMany,
}

impl Cardinality {
    /// Structural cap on the entry array, if any.
    pub fn max_items(self) -> Option<u64> {
        match self {
            Self::ZeroToOne => Some(1),
            Self::ZeroToMany => None,
        }
    }

    /// Whether entries may carry the `indeks` discriminator.
    pub fn allows_index(self) -> bool {
        matches!(self, Self::ZeroToMany)
    }
}

/// Which branches of the addressing union are enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Addressing {
    #[default]
    Both,
    UuidOnly,
    UrnOnly,
}

impl Addressing {
    pub fn identifier_enabled(self) -> bool {
        matches!(self, Self::Both | Self::UuidOnly)
    }

    pub fn name_enabled(self) -> bool {
        matches!(self, Self::Both | Self::UrnOnly)
    }
}

/// A declared relation with its resolved cardinality and addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationSpec<'a> {
    pub name: &'a str,
    pub cardinality: Cardinality,
    pub addressing: Addressing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_to_one_is_capped_and_unindexed() {
        assert_eq!(Cardinality::ZeroToOne.max_items(), Some(1));
        assert!(!Cardinality::ZeroToOne.allows_index());
        assert_eq!(Cardinality::ZeroToMany.max_items(), None);
        assert!(Cardinality::ZeroToMany.allows_index());
    }

    #[test]
    fn default_addressing_enables_both_branches() {
        let a = Addressing::default();
        assert!(a.identifier_enabled() && a.name_enabled());
    }

    #[test]
    fn urn_only_suppresses_identifier_branch() {
        let a: Addressing = serde_yaml::from_str("urn_only").unwrap();
        assert!(!a.identifier_enabled());
        assert!(a.name_enabled());
    }
}
