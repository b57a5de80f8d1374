//! # Schema Building Blocks
//!
//! Small constructors for draft-04 schema fragments, the mapping from the
//! primitive type table to schema shapes, and the shared `definitions`.

use mox_structure::{PrimitiveType, ResolvedType};
use serde_json::{json, Map, Value};

/// Schema dialect stamped on every constrained document.
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-04/schema#";

pub const UUID_PATTERN: &str =
    "^[a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12}$";
pub const URN_PATTERN: &str = "^urn:.";

pub fn string() -> Value {
    json!({"type": "string"})
}

pub fn boolean() -> Value {
    json!({"type": "boolean"})
}

pub fn integer() -> Value {
    json!({"type": "integer"})
}

/// `$ref` into the shared definitions.
pub fn reference(definition: &str) -> Value {
    json!({"$ref": format!("#/definitions/{definition}")})
}

pub fn string_enum(values: &[String]) -> Value {
    json!({"type": "string", "enum": values})
}

/// Array of `items`, optionally capped.
pub fn schema_array(items: Value, max_items: Option<u64>) -> Value {
    let mut array = Map::new();
    array.insert("type".into(), json!("array"));
    array.insert("items".into(), items);
    if let Some(max) = max_items {
        array.insert("maxItems".into(), json!(max));
    }
    Value::Object(array)
}

/// Closed object schema. `required` is omitted when empty; draft-04
/// rejects an empty `required` array.
pub fn schema_object(properties: Map<String, Value>, required: &[String]) -> Value {
    let mut object = Map::new();
    object.insert("type".into(), json!("object"));
    object.insert("properties".into(), Value::Object(properties));
    object.insert("additionalProperties".into(), json!(false));
    if !required.is_empty() {
        object.insert("required".into(), json!(required));
    }
    Value::Object(object)
}

fn closed_object(properties: &[(&str, Value)]) -> Value {
    let required: Vec<String> = properties.iter().map(|(k, _)| k.to_string()).collect();
    let properties = properties
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    schema_object(properties, &required)
}

/// Schema shape of a primitive type.
pub fn primitive_schema(primitive: PrimitiveType) -> Value {
    match primitive {
        PrimitiveType::Text
        | PrimitiveType::Date
        | PrimitiveType::Interval
        | PrimitiveType::Timestamptz => string(),
        PrimitiveType::Boolean => boolean(),
        PrimitiveType::Int => integer(),
        PrimitiveType::TextArray => schema_array(string(), None),
        PrimitiveType::Soegeord => schema_array(schema_array(string(), None), Some(2)),
        PrimitiveType::OffentlighedUndtaget => reference("offentlighedundtaget"),
        PrimitiveType::JournalNotat => closed_object(&[
            ("titel", string()),
            ("notat", string()),
            ("format", string()),
        ]),
        PrimitiveType::JournalDokument => closed_object(&[
            ("dokumenttitel", string()),
            ("offentlighedundtaget", reference("offentlighedundtaget")),
        ]),
        PrimitiveType::AktoerAttr => closed_object(&[
            ("accepteret", string()),
            ("obligatorisk", string()),
            ("repraesentation_uuid", reference("uuid")),
        ]),
        PrimitiveType::VaerdiRelationAttr => closed_object(&[
            ("forventet", boolean()),
            ("nominelvaerdi", string()),
        ]),
    }
}

pub fn resolved_schema(resolved: &ResolvedType) -> Value {
    match resolved {
        ResolvedType::Primitive(p) => primitive_schema(*p),
        ResolvedType::Enum(values) => string_enum(values),
    }
}

/// The `definitions` block shared by every generated document.
pub fn definitions() -> Value {
    let mut virkning = Map::new();
    virkning.insert("from".into(), string());
    virkning.insert("to".into(), string());
    virkning.insert("from_included".into(), boolean());
    virkning.insert("to_included".into(), boolean());
    virkning.insert("aktoerref".into(), reference("uuid"));
    virkning.insert("aktoertypekode".into(), string());
    virkning.insert("notetekst".into(), string());

    json!({
        "urn": {"type": "string", "pattern": URN_PATTERN},
        "uuid": {"type": "string", "pattern": UUID_PATTERN},
        "virkning": schema_object(virkning, &["from".to_string(), "to".to_string()]),
        "offentlighedundtaget": closed_object(&[
            ("alternativtitel", string()),
            ("hjemmel", string()),
        ]),
    })
}
