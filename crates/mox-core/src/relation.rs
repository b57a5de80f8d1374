//! # Typed Relation Entries
//!
//! A relation entry references another object either by identifier
//! (`uuid`) or by name (`urn`). The wire form carries both keys as
//! optional siblings; [`RelationEntry`] collapses them into the closed
//! [`RelationTarget`] union and rejects entries that set both or neither.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::MoxError;
use crate::identity::Urn;
use crate::temporal::Virkning;

/// Where a relation points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationTarget {
    /// Reference by identifier.
    Uuid(Uuid),
    /// Reference by name.
    Urn(Urn),
}

/// One time-versioned relation entry.
///
/// `extra` keeps metadata-driven properties (e.g. `journalpostkode`,
/// `aktoerattr`) that only some relations carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRelationEntry", into = "RawRelationEntry")]
pub struct RelationEntry {
    pub target: RelationTarget,
    pub virkning: Virkning,
    pub object_subtype: Option<String>,
    /// Ordering discriminator; only zero-to-many relations carry it.
    pub index: Option<i64>,
    pub extra: Map<String, Value>,
}

impl RelationEntry {
    /// Parse a single entry from a JSON payload fragment.
    pub fn from_value(value: &Value) -> Result<Self, MoxError> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawRelationEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uuid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    urn: Option<String>,
    virkning: Virkning,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objekttype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    indeks: Option<i64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawRelationEntry> for RelationEntry {
    type Error = MoxError;

    fn try_from(raw: RawRelationEntry) -> Result<Self, Self::Error> {
        let target = match (raw.uuid, raw.urn) {
            (Some(uuid), None) => RelationTarget::Uuid(uuid),
            (None, Some(urn)) => RelationTarget::Urn(Urn::parse(urn)?),
            (Some(_), Some(_)) => {
                return Err(MoxError::InvalidIdentifier(
                    "relation entry has both 'uuid' and 'urn'".to_string(),
                ))
            }
            (None, None) => {
                return Err(MoxError::InvalidIdentifier(
                    "relation entry has neither 'uuid' nor 'urn'".to_string(),
                ))
            }
        };

        Ok(Self {
            target,
            virkning: raw.virkning,
            object_subtype: raw.objekttype,
            index: raw.indeks,
            extra: raw.extra,
        })
    }
}

impl From<RelationEntry> for RawRelationEntry {
    fn from(entry: RelationEntry) -> Self {
        let (uuid, urn) = match entry.target {
            RelationTarget::Uuid(u) => (Some(u), None),
            RelationTarget::Urn(u) => (None, Some(String::from(u))),
        };
        Self {
            uuid,
            urn,
            virkning: entry.virkning,
            objekttype: entry.object_subtype,
            indeks: entry.index,
            extra: entry.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn virkning() -> Value {
        json!({"from": "2017-01-01", "to": "infinity"})
    }

    #[test]
    fn uuid_entry_parses() {
        let entry = RelationEntry::from_value(&json!({
            "uuid": "4b0b1b7e-5ee6-4b4c-9b3c-7f2a3a1e0f11",
            "virkning": virkning(),
            "objekttype": "Bruger"
        }))
        .unwrap();
        assert!(matches!(entry.target, RelationTarget::Uuid(_)));
        assert_eq!(entry.object_subtype.as_deref(), Some("Bruger"));
        assert!(entry.index.is_none());
    }

    #[test]
    fn urn_entry_keeps_extra_properties() {
        let entry = RelationEntry::from_value(&json!({
            "urn": "urn:dk:cvr:12345678",
            "virkning": virkning(),
            "indeks": 2,
            "journalpostkode": "journalnotat"
        }))
        .unwrap();
        assert!(matches!(entry.target, RelationTarget::Urn(ref u) if u.as_str() == "urn:dk:cvr:12345678"));
        assert_eq!(entry.index, Some(2));
        assert_eq!(entry.extra["journalpostkode"], "journalnotat");
    }

    #[test]
    fn both_targets_rejected() {
        let result = RelationEntry::from_value(&json!({
            "uuid": "4b0b1b7e-5ee6-4b4c-9b3c-7f2a3a1e0f11",
            "urn": "urn:x",
            "virkning": virkning()
        }));
        assert!(result.is_err());
    }

    #[test]
    fn missing_target_rejected() {
        let result = RelationEntry::from_value(&json!({"virkning": virkning()}));
        assert!(result.is_err());
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let entry = RelationEntry::from_value(&json!({
            "urn": "urn:a",
            "virkning": virkning()
        }))
        .unwrap();
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["urn"], "urn:a");
        assert!(value.get("uuid").is_none());
        assert!(value.get("indeks").is_none());
    }
}
