//! Translates snapshot parsing errors into actionable diagnostics.
//!
//! [`map_yaml_error`] converts `serde_saphyr` errors into [`miette`]
//! diagnostics carrying the offending span and, for common mistakes such as
//! tab indentation, a hint.

// Module-level suppression for version-dependent lint false positives from
// miette/thiserror derive macros. The unused_assignments lint fires in some
// Rust versions but not others, so `#[expect]` cannot be used here.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_saphyr::{Error as YamlError, Location};
use thiserror::Error;

/// YAML source text of a build-graph snapshot.
///
/// # Examples
/// ```rust
/// use depinfo::graph::GraphSource;
/// let source = GraphSource::from("partitions: []");
/// assert_eq!(source.as_str(), "partitions: []");
/// ```
#[derive(Debug, Clone)]
pub struct GraphSource(String);

impl GraphSource {
    /// Wrap the provided source text.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self(src.into())
    }

    /// Borrow the source text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for GraphSource {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for GraphSource {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Display name for a snapshot used in diagnostics, usually its path.
#[derive(Debug, Clone)]
pub struct GraphName(String);

impl GraphName {
    /// Wrap the provided display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the display name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for GraphName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for GraphName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Errors raised while loading or indexing a snapshot.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// The snapshot is not valid YAML or does not match the schema.
    #[error("build graph parse error")]
    #[diagnostic(code(depinfo::graph::parse))]
    Parse {
        /// Underlying YAML diagnostic.
        #[source]
        #[diagnostic_source]
        source: Box<dyn Diagnostic + Send + Sync + 'static>,
    },

    /// Two targets share a name, so identity-keyed lookups are ambiguous.
    #[error("target '{name}' is declared more than once")]
    #[diagnostic(
        code(depinfo::graph::duplicate_target),
        help("target names must be unique across all partitions")
    )]
    DuplicateTarget {
        /// The repeated name.
        name: String,
    },
}

const YAML_HINTS: [(&str, &str); 4] = [
    (
        "did not find expected '-'",
        "Start list items with '-' and ensure proper indentation.",
    ),
    (
        "unknown field",
        "Check the key spelling against the build graph schema.",
    ),
    (
        "unknown variant",
        "Target kinds are executable, static_library, shared_library, module_library, object_library, utility, or other.",
    ),
    (
        "mapping values are not allowed",
        "Check for a stray ':' or add quotes around values where needed.",
    ),
];

fn saturating_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn location_to_index(src: &GraphSource, loc: Location) -> usize {
    byte_index_components(src.as_ref(), loc.line(), loc.column())
}

/// Reconstruct a byte offset from the 1-based line and column reported by
/// `serde_saphyr`, clamping columns past the end of the line and tolerating
/// both `\n` and `\r\n` line endings.
fn byte_index_components(src: &str, line: u64, column: u64) -> usize {
    let target_line = saturating_usize(line.saturating_sub(1));
    let target_column = saturating_usize(column.saturating_sub(1));
    let mut offset = 0usize;
    for (idx, segment) in src.split_inclusive('\n').enumerate() {
        if idx == target_line {
            let without_newline = segment.strip_suffix('\n').unwrap_or(segment);
            let cleaned = without_newline
                .strip_suffix('\r')
                .unwrap_or(without_newline);
            let byte_index = cleaned
                .char_indices()
                .nth(target_column)
                .map_or(cleaned.len(), |(byte_idx, _)| byte_idx);
            return offset + byte_index;
        }
        offset += segment.len();
    }
    src.len()
}

fn to_span(src: &GraphSource, loc: Location) -> SourceSpan {
    let at = location_to_index(src, loc);
    let bytes = src.as_ref().as_bytes();
    let is_line_break = |b: u8| b == b'\n' || b == b'\r';
    let (start, end) = match bytes.get(at) {
        Some(&b) if !is_line_break(b) => (at, at + 1),
        _ => {
            let start = if at > 0 && bytes.get(at - 1).is_some_and(|p| !is_line_break(*p)) {
                at - 1
            } else {
                at
            };
            (start, at)
        }
    };
    SourceSpan::new(start.into(), end.saturating_sub(start))
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(depinfo::yaml::parse))]
struct YamlDiagnostic {
    #[source_code]
    src: NamedSource<String>,
    #[label("parse error here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    #[source]
    source: YamlError,
    message: String,
}

fn has_tab_indent(src: &GraphSource, loc: Option<Location>) -> bool {
    let Some(found) = loc else { return false };
    let line_idx = saturating_usize(found.line().saturating_sub(1));
    let line = src.as_ref().lines().nth(line_idx).unwrap_or("");
    line.chars()
        .take_while(|c| c.is_whitespace())
        .any(|c| c == '\t')
}

fn hint_for(err_str: &str, src: &GraphSource, loc: Option<Location>) -> Option<String> {
    if has_tab_indent(src, loc) {
        return Some("Use spaces for indentation; tabs are invalid in YAML.".into());
    }
    let lower = err_str.to_lowercase();
    YAML_HINTS
        .iter()
        .find(|(needle, _)| lower.contains(*needle))
        .map(|(_, hint)| (*hint).into())
}

/// Map a `serde_saphyr` error into a [`miette`] diagnostic with a span.
#[must_use]
pub fn map_yaml_error(
    err: YamlError,
    src: &GraphSource,
    name: &GraphName,
) -> Box<dyn Diagnostic + Send + Sync + 'static> {
    let loc = err.location();
    let (line, col, span) = loc.map_or((1, 1, None), |l| {
        (l.line(), l.column(), Some(to_span(src, l)))
    });
    let err_str = err.to_string();
    let hint = hint_for(&err_str, src, loc);
    let mut message = format!("YAML parse error at line {line}, column {col}: {err_str}");
    if let Some(ref h) = hint {
        message.push_str("\nhelp: ");
        message.push_str(h);
    }

    Box::new(YamlDiagnostic {
        src: NamedSource::new(name.as_ref(), src.as_ref().to_owned()),
        span,
        help: hint,
        source: err,
        message,
    })
}
