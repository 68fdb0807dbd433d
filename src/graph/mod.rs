//! Build-graph snapshot structures.
//!
//! The generator never builds the dependency graph itself. It consumes a
//! read-only snapshot of one, deserialised from YAML, describing every
//! partition (directory scope), its targets, their sources, and the resolved
//! per-configuration link implementation. The shapes mirror the document
//! described below and are deserialised with `serde_saphyr`.
//!
//! ```rust
//! use depinfo::graph::{self, TargetKind};
//!
//! let yaml = concat!(
//!     "home_output_dir: /work/build\n",
//!     "partitions:\n",
//!     "  - output_dir: /work/build\n",
//!     "    targets:\n",
//!     "      - name: app\n",
//!     "        kind: executable\n",
//! );
//! let snapshot = graph::from_str(yaml)?;
//! let first = snapshot.partitions.first().and_then(|p| p.targets.first());
//! assert!(first.is_some_and(|t| t.kind == TargetKind::Executable));
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;

mod diagnostics;
mod index;

pub use diagnostics::{GraphError, GraphName, GraphSource, map_yaml_error};
pub use index::{TargetIndex, TargetRef};

use crate::paths::expand_list;

/// Property key listing additional outputs produced alongside an object file.
pub const OBJECT_OUTPUTS: &str = "OBJECT_OUTPUTS";

/// Named list-valued properties attached to a partition, target, or source.
pub type Properties = IndexMap<String, StringOrList>;

/// Top-level snapshot of the project build graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildGraphSnapshot {
    /// Root of the build tree. Project-relative paths are computed from here.
    pub home_output_dir: Utf8PathBuf,

    /// Directory scopes in generation order.
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

/// One directory scope of the build graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Partition {
    /// Output directory owning the partition's target directories.
    pub output_dir: Utf8PathBuf,

    /// Directory-scoped properties such as `COMPILE_DEFINITIONS`.
    #[serde(default)]
    pub properties: Properties,

    /// Variables visible in this scope, for example `CMAKE_C_COMPILER_ID`.
    #[serde(default)]
    pub definitions: IndexMap<String, String>,

    /// Targets in declaration order.
    #[serde(default)]
    pub targets: Vec<Target>,
}

impl Partition {
    /// Return a variable definition when it is set to a non-empty value.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&str> {
        self.definitions
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// A single buildable unit (or pseudo target).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    /// Unique name; used as the identity key throughout generation.
    pub name: String,

    /// What the target produces.
    pub kind: TargetKind,

    /// Declares that the target is provided by another project.
    #[serde(default)]
    pub imported: bool,

    /// Per-target directory relative to the partition output directory.
    /// Defaults to `CMakeFiles/<name>.dir`.
    #[serde(default)]
    pub directory: Option<Utf8PathBuf>,

    /// Target-scoped properties.
    #[serde(default)]
    pub properties: Properties,

    /// Sources in declaration order.
    #[serde(default)]
    pub sources: Vec<SourceFile>,

    /// Link implementation resolved for each configuration name. The empty
    /// name stands for "no configuration".
    #[serde(default)]
    pub configurations: IndexMap<String, TargetConfiguration>,
}

impl Target {
    /// Per-target directory relative to the owning partition's output.
    #[must_use]
    pub fn directory(&self) -> Utf8PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            Utf8PathBuf::from("CMakeFiles").join(format!("{}.dir", self.name))
        })
    }

    /// Look up the link implementation for `config`.
    ///
    /// An exact match wins; otherwise configuration names compare
    /// case-insensitively, matching how build types are spelled on the
    /// command line (`debug`) versus in properties (`DEBUG`).
    #[must_use]
    pub fn configuration(&self, config: &str) -> Option<&TargetConfiguration> {
        self.configurations.get(config).or_else(|| {
            self.configurations
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(config))
                .map(|(_, cfg)| cfg)
        })
    }
}

/// Kinds of target known to the build graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Linked executable.
    Executable,
    /// Static archive.
    StaticLibrary,
    /// Shared library.
    SharedLibrary,
    /// Loadable module.
    ModuleLibrary,
    /// Collection of object files without a link step.
    ObjectLibrary,
    /// Custom command target that produces no linked artefact.
    Utility,
    /// Anything else (interface libraries, global targets).
    Other,
}

impl TargetKind {
    /// Whether targets of this kind receive a dependency manifest.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A source file belonging to a target.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceFile {
    /// Full path of the source.
    pub path: Utf8PathBuf,

    /// Inferred language, if any. Headers and plain files have none.
    #[serde(default)]
    pub language: Option<String>,

    /// Primary object file, relative to the home output directory.
    #[serde(default)]
    pub object: Option<Utf8PathBuf>,

    /// Source-scoped properties such as `OBJECT_OUTPUTS`.
    #[serde(default)]
    pub properties: Properties,
}

impl SourceFile {
    /// The source's language when it has a non-empty one.
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|lang| !lang.is_empty())
    }

    /// The primary object path when the collaborator computed one.
    #[must_use]
    pub fn object(&self) -> Option<&Utf8Path> {
        self.object
            .as_deref()
            .filter(|path| !path.as_str().is_empty())
    }

    /// Additional outputs declared through `OBJECT_OUTPUTS`.
    #[must_use]
    pub fn object_outputs(&self) -> Vec<String> {
        self.properties
            .get(OBJECT_OUTPUTS)
            .map(StringOrList::expand)
            .unwrap_or_default()
    }
}

/// Link implementation of a target for one configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfiguration {
    /// Languages participating in the link, in link order.
    #[serde(default)]
    pub languages: Vec<String>,

    /// Flattened, already-transitive link items. `None` means the target has
    /// no link step for this configuration.
    #[serde(default)]
    pub link_items: Option<Vec<LinkItem>>,

    /// Include search directories keyed by language.
    #[serde(default)]
    pub include_directories: IndexMap<String, Vec<Utf8PathBuf>>,
}

/// An entry of a target's resolved link line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LinkItem {
    /// Another target in the graph, referenced by name.
    Target {
        /// Name of the linked target.
        target: String,
    },
    /// An external library token such as `m` or `/usr/lib/libz.so`.
    Library {
        /// Token passed to the linker.
        library: String,
    },
}

impl LinkItem {
    /// Name of the referenced target, if this item names one.
    #[must_use]
    pub fn target_name(&self) -> Option<&str> {
        match self {
            Self::Target { target } => Some(target),
            Self::Library { .. } => None,
        }
    }
}

/// A helper for properties that accept either a single string or a list of
/// strings.
///
/// A scalar is treated as a `;`-separated list. Each element of a sequence is
/// expanded the same way, so `["A;B", "C"]` yields three tokens.
///
/// ```yaml
/// # Scalar
/// COMPILE_DEFINITIONS: "A=1;B"
/// # Sequence
/// COMPILE_DEFINITIONS:
///   - A=1
///   - B
/// ```
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringOrList {
    /// No value provided.
    #[default]
    Empty,
    /// A single, possibly `;`-separated, string.
    String(String),
    /// A list of strings.
    List(Vec<String>),
}

impl StringOrList {
    /// Expand the value into individual list elements.
    #[must_use]
    pub fn expand(&self) -> Vec<String> {
        match self {
            Self::Empty => Vec::new(),
            Self::String(value) => expand_list(value),
            Self::List(values) => values.iter().flat_map(|v| expand_list(v)).collect(),
        }
    }
}

/// Parse a snapshot from a YAML string.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, does not match the snapshot
/// schema, or declares the same target name twice.
pub fn from_str(yaml: &str) -> Result<BuildGraphSnapshot> {
    from_str_named(yaml, &GraphName::from("build graph"))
}

/// Load a [`BuildGraphSnapshot`] from the given file path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails to parse.
pub fn from_path(path: &Utf8Path) -> Result<BuildGraphSnapshot> {
    let data = fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    from_str_named(&data, &GraphName::from(path.as_str()))
}

fn from_str_named(yaml: &str, name: &GraphName) -> Result<BuildGraphSnapshot> {
    let snapshot: BuildGraphSnapshot =
        serde_saphyr::from_str(yaml).map_err(|e| GraphError::Parse {
            source: map_yaml_error(e, &GraphSource::from(yaml), name),
        })?;
    // Building the index rejects duplicate target names up front.
    TargetIndex::new(&snapshot)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests;
