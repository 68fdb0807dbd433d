//! Shared helpers for integration tests.
//!
//! Integration tests under `tests/` compile as independent crates. This module
//! is included via `mod common;` in individual test files to share fixtures and
//! helpers while keeping test modules small and avoiding duplication.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Placeholder in fixtures replaced with the scratch build directory.
const HOME_PLACEHOLDER: &str = "@HOME@";

/// A scratch build directory holding an instantiated graph fixture.
pub struct Project {
    /// Keeps the directory alive for the duration of the test.
    pub temp: tempfile::TempDir,
    /// Absolute path of the build directory.
    pub home: Utf8PathBuf,
    /// Path of the written `depinfo-graph.yml`.
    pub graph: Utf8PathBuf,
}

impl Project {
    /// Path under the build directory.
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.home.join(relative)
    }
}

/// Copy `tests/data/<fixture>` into a fresh temp dir as `depinfo-graph.yml`,
/// substituting the temp dir for `@HOME@`.
pub fn project(fixture: &str) -> Result<Project> {
    let temp = tempfile::tempdir().context("create temp dir for test project")?;
    let home = Utf8Path::from_path(temp.path())
        .context("temp dir is not valid UTF-8")?
        .to_owned();
    let source = format!("tests/data/{fixture}");
    let text = fs::read_to_string(&source).with_context(|| format!("read {source}"))?;
    let graph = home.join("depinfo-graph.yml");
    fs::write(&graph, text.replace(HOME_PLACEHOLDER, home.as_str()))
        .with_context(|| format!("write {graph}"))?;
    Ok(Project { temp, home, graph })
}
