//! Path resolution helpers for the runner module.
//!
//! Centralises graph and output path logic so the main runner module stays
//! focused on command dispatch.

use crate::cli::Cli;
use anyhow::{Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;

use super::RunnerError;

fn to_utf8(path: &Path) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|path| RunnerError::NonUtf8Path { path })
}

/// Determine the graph snapshot path respecting the CLI's directory option.
///
/// # Errors
/// Returns an error when the CLI `file` or `directory` paths are not valid
/// UTF-8 or the path has no file name.
pub(super) fn resolve_graph_path(cli: &Cli) -> Result<Utf8PathBuf> {
    let resolved = to_utf8(&cli.resolve_path(&cli.file))?;
    if resolved.file_name().is_none() {
        return Err(anyhow!("build graph path {resolved} has no file name"));
    }
    Ok(resolved)
}

/// Resolve an output path relative to the CLI working directory.
///
/// # Errors
/// Returns an error when the path is not valid UTF-8.
pub(super) fn resolve_output_path(cli: &Cli, path: &Path) -> Result<Utf8PathBuf, RunnerError> {
    to_utf8(&cli.resolve_path(path))
}

pub(super) fn ensure_graph_exists_or_error(cli: &Cli, graph_path: &Utf8Path) -> Result<()> {
    if graph_path.as_std_path().exists() {
        return Ok(());
    }
    // `resolve_graph_path()` validates that `file_name()` is Some.
    let graph_name = graph_path.file_name().unwrap_or(graph_path.as_str()).to_owned();
    let directory = if cli.directory.is_some() {
        let parent = graph_path
            .parent()
            .map_or_else(|| graph_path.as_str(), Utf8Path::as_str);
        format!("directory '{parent}'")
    } else {
        "the current directory".to_owned()
    };
    Err(RunnerError::GraphNotFound {
        graph_name,
        directory,
        path: graph_path.as_std_path().to_path_buf(),
    }
    .into())
}
