//! Integration test: projecting the built-in structure through the
//! built-in templates.

use indexmap::IndexMap;
use mox_structure::{ObjectTypeDescription, StructureRegistry};
use mox_templates::{ProjectionContext, TemplateEngine, TEMPLATES};
use proptest::prelude::*;

const HEADER: &str = "-- Generated by mox apply-templates ";

fn project_builtin() -> String {
    let registry = StructureRegistry::builtin().unwrap();
    TemplateEngine::builtin()
        .unwrap()
        .project_all_to_string(&registry)
        .unwrap()
}

#[test]
fn every_builtin_pair_renders() {
    let registry = StructureRegistry::builtin().unwrap();
    let engine = TemplateEngine::builtin().unwrap();
    for name in registry.object_types() {
        for template in TEMPLATES {
            let text = engine
                .project(&registry, name.as_str(), template)
                .unwrap_or_else(|e| panic!("{name}/{template}: {e}"));
            assert!(text.starts_with(HEADER), "{name}/{template}");
        }
    }
}

#[test]
fn whole_run_is_ordered_by_type_then_template() {
    let output = project_builtin();
    let registry = StructureRegistry::builtin().unwrap();

    let expected: Vec<String> = registry
        .object_types()
        .flat_map(|name| {
            TEMPLATES
                .iter()
                .map(move |t| format!("{HEADER}{name} {t}.sql.hbs. Do not edit."))
        })
        .collect();
    let headers: Vec<&str> = output.lines().filter(|l| l.starts_with(HEADER)).collect();
    assert_eq!(headers, expected);
}

#[test]
fn outputs_are_separated_by_exactly_one_blank_line() {
    let output = project_builtin();
    assert!(output.starts_with(HEADER));
    assert!(output.ends_with('\n') && !output.ends_with("\n\n"));
    for (i, _) in output.match_indices(HEADER).skip(1) {
        assert_eq!(&output[i - 2..i], "\n\n");
        assert_ne!(&output[i - 3..i], "\n\n\n");
    }
}

#[test]
fn projection_is_deterministic() {
    assert_eq!(project_builtin(), project_builtin());
}

#[test]
fn mixins_apply_only_to_their_pairs() {
    let registry = StructureRegistry::builtin().unwrap();
    let engine = TemplateEngine::builtin().unwrap();

    let dokument = engine.project(&registry, "dokument", "as_search").unwrap();
    assert!(dokument.contains("_as_search_dokument_varianter"));

    let klasse = engine.project(&registry, "klasse", "as_search").unwrap();
    assert!(!klasse.contains("varianter"));

    let sag = engine.project(&registry, "sag", "as_search").unwrap();
    assert!(sag.contains("journalpostkode"));
}

#[test]
fn sql_types_follow_metadata() {
    let registry = StructureRegistry::builtin().unwrap();
    let engine = TemplateEngine::builtin().unwrap();
    let text = engine.project(&registry, "sag", "dbtyper-specific").unwrap();
    assert!(text.contains("afleveret boolean"));
    assert!(text.contains("offentlighedundtaget OffentlighedUndtagetType"));
    assert!(text.contains("journalnotat JournalNotatType"));
    assert!(text.contains("CREATE TYPE SagFremdriftTils AS ENUM ('Opstaaet', "));
}

#[test]
fn run_writes_to_a_file_sink() {
    let registry = StructureRegistry::builtin().unwrap();
    let engine = TemplateEngine::builtin().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let pairs = engine.project_all(&registry, file.as_file_mut()).unwrap();
    assert_eq!(pairs, registry.len() * TEMPLATES.len());
    let written = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(written, project_builtin());
}

fn description(groups: &[String]) -> ObjectTypeDescription {
    let attributes: IndexMap<String, Vec<String>> = groups
        .iter()
        .map(|g| (g.clone(), vec!["brugervendtnoegle".to_string()]))
        .collect();
    ObjectTypeDescription {
        attributes,
        states: IndexMap::from([("publiceret".to_string(), vec!["Publiceret".to_string()])]),
        ..ObjectTypeDescription::default()
    }
}

fn group_names(ctx_groups: &[mox_templates::context::AttributeContext]) -> Vec<String> {
    ctx_groups.iter().map(|g| g.name.clone()).collect()
}

proptest! {
    #[test]
    fn reversing_groups_only_swaps_the_reversed_view(
        raw in prop::collection::vec("g[a-z]{2,6}", 1..6)
    ) {
        let mut groups = Vec::new();
        for g in raw {
            if !groups.contains(&g) {
                groups.push(g);
            }
        }
        let mut reversed = groups.clone();
        reversed.reverse();

        let ctx = ProjectionContext::build("x", &description(&groups), "as_update", "empty").unwrap();
        let rev = ProjectionContext::build("x", &description(&reversed), "as_update", "empty").unwrap();

        prop_assert_eq!(group_names(&ctx.attributes), groups.clone());
        prop_assert_eq!(group_names(&ctx.attributes_reversed), reversed.clone());
        prop_assert_eq!(group_names(&rev.attributes), reversed);
        prop_assert_eq!(group_names(&rev.attributes_reversed), groups);
    }
}
