//! Tests for snapshot deserialisation and model helpers.

use super::*;
use rstest::rstest;

#[rstest]
#[case("executable", TargetKind::Executable, true)]
#[case("static_library", TargetKind::StaticLibrary, true)]
#[case("shared_library", TargetKind::SharedLibrary, true)]
#[case("module_library", TargetKind::ModuleLibrary, true)]
#[case("object_library", TargetKind::ObjectLibrary, true)]
#[case("utility", TargetKind::Utility, true)]
#[case("other", TargetKind::Other, false)]
fn target_kinds_deserialise(
    #[case] raw: &str,
    #[case] expected: TargetKind,
    #[case] buildable: bool,
) {
    let yaml = format!(
        "home_output_dir: /b\npartitions:\n  - output_dir: /b\n    targets:\n      - name: t\n        kind: {raw}\n"
    );
    let snapshot = from_str(&yaml).expect("parse");
    let target = snapshot
        .partitions
        .first()
        .and_then(|p| p.targets.first())
        .expect("target present");
    assert_eq!(target.kind, expected);
    assert_eq!(target.kind.is_buildable(), buildable);
}

#[rstest]
fn unknown_fields_are_rejected() {
    let yaml = "home_output_dir: /b\nbogus: 1\n";
    let err = from_str(yaml).expect_err("unknown field must fail");
    assert!(matches!(
        err.downcast_ref::<GraphError>(),
        Some(GraphError::Parse { .. })
    ));
}

#[rstest]
fn default_directory_uses_target_name() {
    let target = Target {
        name: "core".into(),
        kind: TargetKind::StaticLibrary,
        imported: false,
        directory: None,
        properties: Properties::new(),
        sources: Vec::new(),
        configurations: IndexMap::new(),
    };
    assert_eq!(target.directory(), "CMakeFiles/core.dir");
}

#[rstest]
fn configuration_lookup_prefers_exact_then_ignores_case() {
    let mut configurations = IndexMap::new();
    configurations.insert(
        "Debug".to_owned(),
        TargetConfiguration {
            languages: vec!["C".into()],
            ..TargetConfiguration::default()
        },
    );
    configurations.insert(
        "DEBUG".to_owned(),
        TargetConfiguration {
            languages: vec!["CXX".into()],
            ..TargetConfiguration::default()
        },
    );
    let target = Target {
        name: "t".into(),
        kind: TargetKind::Executable,
        imported: false,
        directory: None,
        properties: Properties::new(),
        sources: Vec::new(),
        configurations,
    };
    let exact = target.configuration("DEBUG").expect("exact match");
    assert_eq!(exact.languages, ["CXX"]);
    let folded = target.configuration("debug").expect("case-insensitive match");
    assert_eq!(folded.languages, ["C"]);
    assert!(target.configuration("Release").is_none());
    assert!(target.configuration("").is_none());
}

#[rstest]
fn link_items_accept_targets_and_libraries() {
    let yaml = concat!(
        "home_output_dir: /b\n",
        "partitions:\n",
        "  - output_dir: /b\n",
        "    targets:\n",
        "      - name: app\n",
        "        kind: executable\n",
        "        configurations:\n",
        "          \"\":\n",
        "            languages: [C]\n",
        "            link_items:\n",
        "              - target: lib\n",
        "              - library: m\n",
    );
    let snapshot = from_str(yaml).expect("parse");
    let target = snapshot
        .partitions
        .first()
        .and_then(|p| p.targets.first())
        .expect("target present");
    let config = target.configuration("").expect("empty configuration");
    let items = config.link_items.as_deref().expect("link items");
    assert_eq!(
        items,
        [
            LinkItem::Target {
                target: "lib".into()
            },
            LinkItem::Library {
                library: "m".into()
            },
        ]
    );
    assert_eq!(items.first().and_then(LinkItem::target_name), Some("lib"));
}

#[rstest]
#[case(StringOrList::Empty, &[])]
#[case(StringOrList::String("A;B=1".into()), &["A", "B=1"])]
#[case(StringOrList::List(vec!["A;B".into(), "C".into()]), &["A", "B", "C"])]
fn string_or_list_expands(#[case] value: StringOrList, #[case] expected: &[&str]) {
    assert_eq!(value.expand(), expected);
}

#[rstest]
fn source_accessors_filter_empty_values() {
    let mut properties = Properties::new();
    properties.insert(
        OBJECT_OUTPUTS.into(),
        StringOrList::String("a.h;b.h".into()),
    );
    let source = SourceFile {
        path: "/s/a.c".into(),
        language: Some(String::new()),
        object: Some(Utf8PathBuf::new()),
        properties,
    };
    assert_eq!(source.language(), None);
    assert_eq!(source.object(), None);
    assert_eq!(source.object_outputs(), ["a.h", "b.h"]);
}

#[rstest]
fn partition_definition_ignores_empty_values() {
    let mut definitions = IndexMap::new();
    definitions.insert("CMAKE_C_COMPILER_ID".to_owned(), "GNU".to_owned());
    definitions.insert("CMAKE_CXX_COMPILER_ID".to_owned(), String::new());
    let partition = Partition {
        output_dir: "/b".into(),
        properties: Properties::new(),
        definitions,
        targets: Vec::new(),
    };
    assert_eq!(partition.definition("CMAKE_C_COMPILER_ID"), Some("GNU"));
    assert_eq!(partition.definition("CMAKE_CXX_COMPILER_ID"), None);
    assert_eq!(partition.definition("CMAKE_ASM_COMPILER_ID"), None);
}
