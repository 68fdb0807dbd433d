//! Unit tests for the runner module's path resolution helpers.

use super::*;
use rstest::rstest;
use std::path::PathBuf;

fn cli(args: &[&str]) -> Cli {
    crate::cli::parse_from(args).expect("parse").0
}

#[rstest]
#[case(&["depinfo"], "depinfo-graph.yml")]
#[case(&["depinfo", "-C", "work"], "work/depinfo-graph.yml")]
#[case(&["depinfo", "-C", "work", "-f", "/tmp/g.yml"], "/tmp/g.yml")]
fn graph_path_respects_directory(#[case] args: &[&str], #[case] expected: &str) {
    let resolved = resolve_graph_path(&cli(args)).expect("resolve");
    assert_eq!(resolved, expected);
}

#[rstest]
#[case(None, "out.cmake", "out.cmake")]
#[case(Some("work"), "out.cmake", "work/out.cmake")]
#[case(Some("work"), "/tmp/out.cmake", "/tmp/out.cmake")]
fn resolve_output_path_respects_directory(
    #[case] directory: Option<&str>,
    #[case] input: &str,
    #[case] expected: &str,
) {
    let mut parsed = cli(&["depinfo"]);
    parsed.directory = directory.map(PathBuf::from);
    let resolved = resolve_output_path(&parsed, Path::new(input)).expect("utf-8 path");
    assert_eq!(resolved, expected);
}

#[rstest]
fn missing_graph_names_the_directory() {
    let parsed = cli(&["depinfo", "-C", "/nonexistent-depinfo-dir"]);
    let path = resolve_graph_path(&parsed).expect("resolve");
    let err = ensure_graph_exists_or_error(&parsed, &path).expect_err("must fail");
    assert_eq!(
        err.to_string(),
        "no build graph 'depinfo-graph.yml' found in directory '/nonexistent-depinfo-dir'"
    );
}
