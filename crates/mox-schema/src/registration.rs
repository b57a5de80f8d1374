//! Typed view over the relations of a payload that already passed
//! structural validation.

use mox_core::{MoxError, RelationEntry};
use mox_structure::{Cardinality, ObjectTypeDescription};
use serde_json::Value;

use crate::error::SchemaError;

/// The entries supplied for one declared relation.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationView {
    pub name: String,
    pub cardinality: Cardinality,
    pub entries: Vec<RelationEntry>,
}

impl RelationView {
    /// Read the `relationer` block of `payload` in declaration order.
    ///
    /// Relations absent from the payload are skipped. An entry whose
    /// validity bounds both parse must have `from` no later than `to`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Payload`] when an entry cannot be typed or carries an
    /// inverted interval.
    pub fn collect(
        object_type: &str,
        description: &ObjectTypeDescription,
        payload: &Value,
    ) -> Result<Vec<Self>, SchemaError> {
        let invalid = |source: MoxError| SchemaError::Payload {
            object_type: object_type.to_string(),
            source,
        };
        let Some(relations) = payload.get("relationer") else {
            return Ok(Vec::new());
        };

        let mut views = Vec::new();
        for spec in description.relations() {
            let Some(Value::Array(items)) = relations.get(spec.name) else {
                continue;
            };
            let entries = items
                .iter()
                .map(|item| {
                    let entry = RelationEntry::from_value(item)?;
                    entry.virkning.check_order()?;
                    Ok(entry)
                })
                .collect::<Result<Vec<_>, MoxError>>()
                .map_err(invalid)?;
            views.push(Self {
                name: spec.name.to_string(),
                cardinality: spec.cardinality,
                entries,
            });
        }
        Ok(views)
    }
}
