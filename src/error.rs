//! Errors raised while resolving settings and generating dependency
//! manifests.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::path::PathBuf;
use std::sync::Arc;

use camino::Utf8PathBuf;
use miette::Diagnostic;
use ortho_config::OrthoError;
use thiserror::Error;

/// Fatal conditions for a target's manifest or for the whole pass.
#[derive(Debug, Error, Diagnostic)]
pub enum DependInfoError {
    /// The target has no link implementation for the active configuration.
    #[error("target '{target}' has no link implementation for configuration '{configuration}'")]
    #[diagnostic(
        code(depinfo::record::missing_link_implementation),
        help("add the configuration to the target's `configurations` map in the build graph")
    )]
    MissingLinkImplementation {
        /// Name of the target.
        target: String,
        /// Configuration that was requested (may be empty).
        configuration: String,
    },

    /// A manifest could not be written; nothing was left at `path`.
    #[error("cannot write {path}")]
    #[diagnostic(code(depinfo::output::unwritable_destination))]
    UnwritableDestination {
        /// Destination that was being written.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A target named on the command line is not part of the graph.
    #[error("target '{name}' is not in the build graph")]
    #[diagnostic(code(depinfo::runner::unknown_target))]
    UnknownTarget {
        /// The requested name.
        name: String,
    },

    /// A keep-going pass finished but some targets failed.
    #[error("dependency manifests failed for {} target(s): {}", .failures.len(), .failures.join(", "))]
    #[diagnostic(
        code(depinfo::aggregate::pass_failed),
        help("rerun with --verbose to see each failure")
    )]
    PassFailed {
        /// Names of the targets whose manifests were not written.
        failures: Vec<String>,
    },
}

/// Errors raised while loading the config file and merging setting layers.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file {}", .path.display())]
    #[diagnostic(code(depinfo::config::read))]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or holds unknown keys.
    #[error("invalid config file {}", .path.display())]
    #[diagnostic(
        code(depinfo::config::parse),
        help("supported keys: configuration, keep_going, reference_language, alias_languages, verbose")
    )]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: toml::de::Error,
    },

    /// Defaults, file, environment and command line could not be combined.
    #[error("cannot merge configuration layers")]
    #[diagnostic(
        code(depinfo::config::merge),
        help("check the DEPINFO_* environment variables for malformed values")
    )]
    Merge {
        /// Layer composition failure.
        #[source]
        source: Arc<OrthoError>,
    },
}
