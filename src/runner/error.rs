//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised during command execution.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// The build graph snapshot does not exist at the expected path.
    #[error("no build graph '{graph_name}' found in {directory}")]
    #[diagnostic(
        code(depinfo::runner::graph_not_found),
        help("export the build graph first or pass its location with -f/--file")
    )]
    GraphNotFound {
        /// Name of the expected snapshot file.
        graph_name: String,
        /// Directory description (e.g., "the current directory").
        directory: String,
        /// The path that was attempted.
        path: PathBuf,
    },

    /// A command-line path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", .path.display())]
    #[diagnostic(code(depinfo::runner::non_utf8_path))]
    NonUtf8Path {
        /// The offending path.
        path: PathBuf,
    },
}
