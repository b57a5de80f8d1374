//! Integration test: documents generated from the built-in structure accept
//! well-formed registrations and reject malformed ones.

use std::sync::Arc;

use mox_schema::{RelationView, SchemaCompiler, SchemaError};
use mox_structure::Extension;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const UUID: &str = "3a87187c-f25a-40a1-8d42-312b2e2b43bd";

fn virkning() -> Value {
    json!({"from": "2017-01-01", "to": "infinity"})
}

/// Smallest instance satisfying `schema`: only required properties, one
/// item per array, first branch of each union.
fn sample(schema: &Value, definitions: &Value) -> Value {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        let name = reference.trim_start_matches("#/definitions/");
        return match name {
            "uuid" => json!(UUID),
            "urn" => json!("urn:dk:sample"),
            _ => sample(&definitions[name], definitions),
        };
    }
    if let Some(branches) = schema.get("oneOf").and_then(Value::as_array) {
        return sample(&branches[0], definitions);
    }
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return values[0].clone();
    }
    match schema.get("type").and_then(Value::as_str) {
        Some("object") => {
            let mut object = Map::new();
            for key in schema["required"].as_array().into_iter().flatten() {
                let key = key.as_str().unwrap();
                object.insert(
                    key.to_string(),
                    sample(&schema["properties"][key], definitions),
                );
            }
            Value::Object(object)
        }
        Some("array") => json!([sample(&schema["items"], definitions)]),
        Some("boolean") => json!(true),
        Some("integer") => json!(1),
        _ => json!("x"),
    }
}

fn klassifikation() -> Value {
    json!({
        "attributter": {
            "klassifikationegenskaber": [{
                "brugervendtnoegle": "Organisation",
                "beskrivelse": "Organisationens klassifikation",
                "kaldenavn": "KL",
                "virkning": {
                    "from": "2014-05-19 12:02:32",
                    "to": "infinity",
                    "aktoerref": "ddc99abd-c1b0-48c2-aef7-74fea841adae",
                    "aktoertypekode": "Bruger",
                    "notetekst": "Oprettet"
                }
            }]
        },
        "tilstande": {
            "klassifikationpubliceret": [{
                "publiceret": "Publiceret",
                "virkning": virkning()
            }]
        },
        "relationer": {
            "ansvarlig": [{"uuid": UUID, "objekttype": "organisation", "virkning": virkning()}],
            "ejer": [{"urn": "urn:dk:kommune:0101", "virkning": virkning()}]
        }
    })
}

fn expect_violations(result: Result<(), SchemaError>) -> mox_schema::ValidationViolations {
    match result {
        Err(SchemaError::ValidationFailed { violations, .. }) => violations,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn every_constrained_builtin_type_accepts_its_minimal_payload() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let snapshot = compiler.snapshot();
    for name in snapshot.registry().object_types() {
        let document = snapshot.document(name.as_str()).unwrap();
        if document.is_unconstrained() {
            continue;
        }
        let schema = document.as_value();
        let payload = sample(schema, &schema["definitions"]);
        snapshot
            .validate(name.as_str(), &payload)
            .unwrap_or_else(|e| panic!("{name}: {e}\npayload: {payload:#}"));
    }
}

#[test]
fn every_constrained_builtin_type_rejects_each_dropped_requirement() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let snapshot = compiler.snapshot();
    for name in snapshot.registry().object_types() {
        let document = snapshot.document(name.as_str()).unwrap();
        if document.is_unconstrained() {
            continue;
        }
        let schema = document.as_value();
        let payload = sample(schema, &schema["definitions"]);
        let assert_missing = |candidate: Value, key: &str| {
            let violations = expect_violations(snapshot.validate(name.as_str(), &candidate));
            assert!(
                violations.missing_properties().any(|p| p == key),
                "{name}: dropping '{key}' was not reported\n{violations}"
            );
        };

        let groups = payload["attributter"].as_object().unwrap();
        for (group, entries) in groups {
            let mut without_group = payload.clone();
            without_group["attributter"].as_object_mut().unwrap().remove(group);
            assert_missing(without_group, group);

            for field in entries[0].as_object().unwrap().keys() {
                let mut without_field = payload.clone();
                without_field["attributter"][group][0]
                    .as_object_mut()
                    .unwrap()
                    .remove(field);
                assert_missing(without_field, field);
            }
        }

        for state in payload["tilstande"].as_object().unwrap().keys() {
            let mut without_state = payload.clone();
            without_state["tilstande"].as_object_mut().unwrap().remove(state);
            assert_missing(without_state, state);
        }
    }
}

#[test]
fn every_builtin_document_is_draft4_and_closed() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let snapshot = compiler.snapshot();
    for name in snapshot.registry().object_types() {
        let document = snapshot.document(name.as_str()).unwrap();
        if document.is_unconstrained() {
            continue;
        }
        let schema = document.as_value();
        assert_eq!(schema["$schema"], json!("http://json-schema.org/draft-04/schema#"));
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["required"], json!(["attributter", "tilstande"]));
        assert!(schema.get("id").is_none());
    }
}

#[test]
fn klassifikation_registration_is_accepted() {
    let compiler = SchemaCompiler::builtin().unwrap();
    compiler.validate("klassifikation", &klassifikation()).unwrap();
}

#[test]
fn accepted_registration_with_postgres_timestamps_reads_its_relations() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let mut payload = klassifikation();
    payload["relationer"]["ejer"][0]["virkning"] =
        json!({"from": "2014-05-19 12:02:32", "to": "infinity"});
    payload["relationer"]["ansvarlig"][0]["virkning"] =
        json!({"from": "2015-05-19 12:02:32+02", "to": "2016-01-01"});
    compiler.validate("klassifikation", &payload).unwrap();

    let snapshot = compiler.snapshot();
    let description = snapshot.registry().describe("klassifikation").unwrap();
    let views = RelationView::collect("klassifikation", description, &payload).unwrap();
    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|v| v.entries.len() == 1));
}

#[test]
fn undeclared_attribute_is_rejected() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let mut payload = klassifikation();
    payload["attributter"]["klassifikationegenskaber"][0]["farve"] = json!("blaa");
    let violations = expect_violations(compiler.validate("klassifikation", &payload));
    assert!(violations
        .violations()
        .iter()
        .any(|v| v.instance_path.starts_with("/attributter/klassifikationegenskaber/0")));
}

#[test]
fn missing_mandatory_attribute_is_named() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let mut payload = klassifikation();
    payload["attributter"]["klassifikationegenskaber"][0]
        .as_object_mut()
        .unwrap()
        .remove("brugervendtnoegle");
    let violations = expect_violations(compiler.validate("klassifikation", &payload));
    assert!(violations.missing_properties().any(|p| p == "brugervendtnoegle"));
}

#[test]
fn state_value_outside_enum_is_rejected() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let mut payload = klassifikation();
    payload["tilstande"]["klassifikationpubliceret"][0]["publiceret"] = json!("Kladde");
    expect_violations(compiler.validate("klassifikation", &payload));
}

#[test]
fn missing_state_is_rejected() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let mut payload = klassifikation();
    payload["tilstande"] = json!({});
    let violations = expect_violations(compiler.validate("klassifikation", &payload));
    assert!(violations
        .missing_properties()
        .any(|p| p == "klassifikationpubliceret"));
}

#[test]
fn relation_entry_must_use_exactly_one_address() {
    let compiler = SchemaCompiler::builtin().unwrap();

    let mut both = klassifikation();
    both["relationer"]["ejer"][0]["uuid"] = json!(UUID);
    expect_violations(compiler.validate("klassifikation", &both));

    let mut neither = klassifikation();
    neither["relationer"]["ejer"][0]
        .as_object_mut()
        .unwrap()
        .remove("urn");
    expect_violations(compiler.validate("klassifikation", &neither));
}

#[test]
fn zero_to_one_relation_accepts_at_most_one_entry() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let mut payload = klassifikation();
    payload["relationer"]["ejer"] = json!([
        {"urn": "urn:a", "virkning": virkning()},
        {"urn": "urn:b", "virkning": virkning()}
    ]);
    expect_violations(compiler.validate("klassifikation", &payload));
}

fn sag() -> Value {
    json!({
        "attributter": {
            "sagegenskaber": [{
                "brugervendtnoegle": "SAG-1",
                "kassationskode": "K",
                "sagsnummer": "1",
                "titel": "Byggesag",
                "principiel": true,
                "offentlighedundtaget": {"alternativtitel": "Hemmelig", "hjemmel": "Lov"},
                "virkning": virkning()
            }]
        },
        "tilstande": {
            "sagfremdrift": [{"fremdrift": "Opstaaet", "virkning": virkning()}]
        },
        "relationer": {
            "ejer": [{"uuid": UUID, "virkning": virkning()}],
            "andresager": [{"uuid": UUID, "indeks": 1, "virkning": virkning()}],
            "journalpost": [{
                "urn": "urn:dk:journal:1",
                "indeks": 2,
                "journalpostkode": "journalnotat",
                "journalnotat": {"titel": "Notat", "notat": "tekst", "format": "internal"},
                "virkning": virkning()
            }]
        }
    })
}

#[test]
fn sag_with_journal_entries_is_accepted() {
    let compiler = SchemaCompiler::builtin().unwrap();
    compiler.validate("sag", &sag()).unwrap();
}

#[test]
fn index_is_rejected_on_zero_to_one_relation() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let mut payload = sag();
    payload["relationer"]["ejer"][0]["indeks"] = json!(1);
    expect_violations(compiler.validate("sag", &payload));
}

#[test]
fn relation_metadata_enum_and_mandatory_apply() {
    let compiler = SchemaCompiler::builtin().unwrap();

    let mut bad_code = sag();
    bad_code["relationer"]["journalpost"][0]["journalpostkode"] = json!("andet");
    expect_violations(compiler.validate("sag", &bad_code));

    let mut missing_code = sag();
    missing_code["relationer"]["journalpost"][0]
        .as_object_mut()
        .unwrap()
        .remove("journalpostkode");
    let violations = expect_violations(compiler.validate("sag", &missing_code));
    assert!(violations.missing_properties().any(|p| p == "journalpostkode"));
}

#[test]
fn state_value_relation_is_name_addressed_only() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let base = json!({
        "attributter": {
            "tilstandegenskaber": [{"brugervendtnoegle": "T", "virkning": virkning()}]
        },
        "tilstande": {
            "tilstandstatus": [{"status": "Aktiv", "virkning": virkning()}],
            "tilstandpubliceret": [{"publiceret": "Normal", "virkning": virkning()}]
        }
    });

    let mut by_name = base.clone();
    by_name["relationer"] = json!({"tilstandsvaerdi": [{
        "urn": "urn:dk:vaerdi:gul",
        "indeks": 1,
        "tilstandsvaerdiattr": {"forventet": true, "nominelvaerdi": "gul"},
        "virkning": virkning()
    }]});
    compiler.validate("tilstand", &by_name).unwrap();

    let mut by_id = base;
    by_id["relationer"] = json!({"tilstandsvaerdi": [{"uuid": UUID, "virkning": virkning()}]});
    expect_violations(compiler.validate("tilstand", &by_id));
}

#[test]
fn wildcard_relation_metadata_reaches_every_relation() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let document = compiler.generate("aktivitet").unwrap();
    let relations = document.as_value()["properties"]["relationer"]["properties"]
        .as_object()
        .unwrap();
    for (name, relation) in relations {
        for branch in relation["items"]["oneOf"].as_array().unwrap() {
            assert!(
                branch["properties"].get("aktoerattr").is_some(),
                "{name} lacks aktoerattr"
            );
        }
    }
}

#[test]
fn document_type_accepts_any_object() {
    let compiler = SchemaCompiler::builtin().unwrap();
    let document = compiler.generate("dokument").unwrap();
    assert!(document.is_unconstrained());
    compiler
        .validate("dokument", &json!({"varianter": [{"varianttekst": "PDF"}]}))
        .unwrap();
    expect_violations(compiler.validate("dokument", &json!([1, 2])));
}

#[test]
fn unknown_type_is_an_error() {
    let compiler = SchemaCompiler::builtin().unwrap();
    assert!(matches!(
        compiler.generate("bogus"),
        Err(SchemaError::UnknownType(_))
    ));
}

#[test]
fn generation_is_deterministic_across_compilers() {
    let a = SchemaCompiler::builtin().unwrap();
    let b = SchemaCompiler::builtin().unwrap();
    for name in ["klassifikation", "sag", "tilstand", "aktivitet"] {
        assert_eq!(
            a.generate(name).unwrap().as_value(),
            b.generate(name).unwrap().as_value()
        );
    }
}

#[test]
fn concurrent_readers_see_old_or_new_document() {
    let compiler = Arc::new(SchemaCompiler::builtin().unwrap());
    let old = compiler.generate("klassifikation").unwrap().as_value().clone();
    let ext = Extension::from_yaml_str(
        "ext",
        "types:\n  klassifikation:\n    relationer_nul_til_mange: [tilknyttedeklasser]\n",
    )
    .unwrap();

    std::thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let compiler = Arc::clone(&compiler);
                scope.spawn(move || {
                    (0..50)
                        .map(|_| compiler.generate("klassifikation").unwrap().as_value().clone())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        compiler.mutate(&ext).unwrap();

        let new = compiler.generate("klassifikation").unwrap().as_value().clone();
        assert_ne!(old, new);
        for reader in readers {
            for seen in reader.join().unwrap() {
                assert!(seen == old || seen == new);
            }
        }
    });
}

proptest! {
    #[test]
    fn gyldighed_rejects_values_outside_enum(value in "[A-Za-z ]{1,12}") {
        prop_assume!(value != "Aktiv" && value != "Inaktiv");
        let compiler = SchemaCompiler::builtin().unwrap();
        let payload = json!({
            "attributter": {
                "organisationegenskaber": [{"brugervendtnoegle": "O", "virkning": virkning()}]
            },
            "tilstande": {
                "organisationgyldighed": [{"gyldighed": value, "virkning": virkning()}]
            }
        });
        prop_assert!(compiler.validate("organisation", &payload).is_err());
    }
}
