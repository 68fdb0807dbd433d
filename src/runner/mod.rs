//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! loads the build graph and runs the requested command against it.

mod error;

pub use error::RunnerError;

use crate::aggregate::{self, GenerateOptions};
use crate::cli::{Cli, Commands};
use crate::config;
use crate::error::DependInfoError;
use crate::graph::{self, BuildGraphSnapshot, TargetIndex};
use crate::output::{self, WriteOutcome};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

mod path_helpers;

use path_helpers::{ensure_graph_exists_or_error, resolve_graph_path, resolve_output_path};

/// Execute the command carried by the merged [`Cli`].
///
/// # Errors
///
/// Returns an error if the graph cannot be loaded or any manifest cannot be
/// generated or written.
pub fn run(cli: &Cli) -> Result<()> {
    let snapshot = load_graph(cli)?;
    let index = TargetIndex::new(&snapshot).context("indexing build graph")?;
    let options = config::generate_options(cli);
    debug!(?options, "resolved generation options");

    match cli.command.clone().unwrap_or(Commands::Generate) {
        Commands::Generate => {
            let summary = aggregate::generate_all(&index, &options)?;
            info!(
                written = summary.written,
                unchanged = summary.unchanged,
                "generation pass complete"
            );
            Ok(())
        }
        Commands::Target { name, file } => {
            let content = render_named_target(&index, &name, &options)?;
            emit(cli, &file, &content)
        }
        Commands::Manifest { file } => emit(cli, &file, &aggregate::aggregate(&index)),
    }
}

/// Resolve and parse the build graph referenced by `cli`.
///
/// # Errors
///
/// Returns an error if the snapshot is missing, unreadable, or invalid.
pub fn load_graph(cli: &Cli) -> Result<BuildGraphSnapshot> {
    let graph_path = resolve_graph_path(cli)?;
    ensure_graph_exists_or_error(cli, &graph_path)?;
    graph::from_path(&graph_path).with_context(|| format!("loading build graph {graph_path}"))
}

fn render_named_target(
    index: &TargetIndex<'_>,
    name: &str,
    options: &GenerateOptions,
) -> Result<String> {
    let target = index
        .get(name)
        .ok_or_else(|| DependInfoError::UnknownTarget { name: name.to_owned() })?;
    Ok(aggregate::render_target(index, target, options)?)
}

/// Write `content` to `file`, or stdout for `-`.
fn emit(cli: &Cli, file: &Path, content: &str) -> Result<()> {
    if output::is_stdout_path(file) {
        return output::write_stdout(content);
    }
    let path = resolve_output_path(cli, file)?;
    if output::write_if_changed(&path, content)? == WriteOutcome::Unchanged {
        info!("{path} is up to date");
    }
    Ok(())
}

#[cfg(test)]
mod tests;
