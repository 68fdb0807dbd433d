//! Layered list-property resolution.
//!
//! Compile definitions and include-transform rules may be set on the
//! project (partition) and on the target, each both globally and per
//! configuration. The four layers are folded left to right into one list:
//!
//! 1. project `NAME`
//! 2. target `NAME`
//! 3. project `NAME_<CONFIG>`
//! 4. target `NAME_<CONFIG>`
//!
//! Later layers append; nothing overrides and duplicates are kept.

use crate::graph::Properties;

/// Property holding preprocessor definitions.
pub const COMPILE_DEFINITIONS: &str = "COMPILE_DEFINITIONS";
/// Property holding include-transform rules for the dependency scanner.
pub const IMPLICIT_DEPENDS_INCLUDE_TRANSFORM: &str = "IMPLICIT_DEPENDS_INCLUDE_TRANSFORM";

/// Where a property layer is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The partition owning the target.
    Project,
    /// The target itself.
    Target,
}

/// Property tables visible to one target.
#[derive(Debug, Clone, Copy)]
pub struct PropertyScopes<'a> {
    /// Partition-level properties.
    pub project: &'a Properties,
    /// Target-level properties.
    pub target: &'a Properties,
}

impl PropertyScopes<'_> {
    fn table(&self, scope: Scope) -> &Properties {
        match scope {
            Scope::Project => self.project,
            Scope::Target => self.target,
        }
    }
}

/// The ordered `(scope, property name)` lookups for `base` under `config`.
///
/// An empty configuration name contributes no configuration-scoped layers.
#[must_use]
pub fn layers(base: &str, config: &str) -> Vec<(Scope, String)> {
    let mut out = vec![
        (Scope::Project, base.to_owned()),
        (Scope::Target, base.to_owned()),
    ];
    if !config.is_empty() {
        let scoped = format!("{base}_{}", config.to_ascii_uppercase());
        out.push((Scope::Project, scoped.clone()));
        out.push((Scope::Target, scoped));
    }
    out
}

/// Fold every layer of `base` into a single ordered token list.
#[must_use]
pub fn resolve(scopes: PropertyScopes<'_>, base: &str, config: &str) -> Vec<String> {
    layers(base, config)
        .iter()
        .fold(Vec::new(), |mut acc, (scope, name)| {
            if let Some(value) = scopes.table(*scope).get(name) {
                acc.extend(value.expand());
            }
            acc
        })
}

/// Merged `COMPILE_DEFINITIONS` for `config`.
#[must_use]
pub fn compile_definitions(scopes: PropertyScopes<'_>, config: &str) -> Vec<String> {
    resolve(scopes, COMPILE_DEFINITIONS, config)
}

/// Merged `IMPLICIT_DEPENDS_INCLUDE_TRANSFORM` rules for `config`.
#[must_use]
pub fn include_transforms(scopes: PropertyScopes<'_>, config: &str) -> Vec<String> {
    resolve(scopes, IMPLICIT_DEPENDS_INCLUDE_TRANSFORM, config)
}
