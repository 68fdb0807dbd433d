//! Per-target dependency records.
//!
//! A [`DependencyRecord`] gathers everything the dependency scanner needs for
//! one target: which languages to scan, which source produces which object,
//! the preprocessor definitions and include-transform rules, the manifests
//! of linked targets, and the include search path. It is built fresh for
//! every generation pass from the read-only graph snapshot and discarded once
//! serialised by [`crate::depinfo_gen`].

use tracing::debug;

use crate::classify::classify;
use crate::error::DependInfoError;
use crate::graph::{TargetIndex, TargetRef};
use crate::link_closure;
use crate::paths::{portable_join, relative_to, to_portable_path};
use crate::properties::{self, PropertyScopes};

/// Variable naming the active build type in a partition.
pub const BUILD_TYPE_VARIABLE: &str = "CMAKE_BUILD_TYPE";

/// Which language's include path is computed and which languages alias it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludePathPolicy {
    /// Language whose include directories are written out.
    pub reference_language: String,
    /// Languages whose include path variable refers to the reference list.
    pub alias_languages: Vec<String>,
}

impl Default for IncludePathPolicy {
    fn default() -> Self {
        Self {
            reference_language: "C".into(),
            alias_languages: vec!["CXX".into(), "Fortran".into(), "ASM".into()],
        }
    }
}

/// A (source, output) pair the scanner checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependPair {
    /// Absolute source path.
    pub source: String,
    /// Object or extra output path.
    pub output: String,
}

/// Scan inputs for one language of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    /// Language identifier, for example `CXX`.
    pub language: String,
    /// Pairs in source order; a source's primary pair precedes its extras.
    pub pairs: Vec<DependPair>,
    /// Compiler identifier when the partition defines one.
    pub compiler_id: Option<String>,
}

/// Include search path shared by every language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludePath {
    /// Language the directories were computed for.
    pub reference_language: String,
    /// Directories relative to the home output directory where possible.
    pub directories: Vec<String>,
    /// Languages bound to the same list.
    pub aliases: Vec<String>,
}

/// Everything written to one target's dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    /// Languages of the link implementation, in order, with their sources.
    pub languages: Vec<LanguageRecord>,
    /// Merged preprocessor definitions.
    pub definitions: Vec<String>,
    /// Merged include-transform rules.
    pub include_transforms: Vec<String>,
    /// Manifests of linked targets, deduplicated.
    pub linked_info_files: Vec<String>,
    /// Include search path.
    pub include_path: IncludePath,
}

/// Pick the configuration to generate for.
///
/// An explicit choice wins, then the partition's `CMAKE_BUILD_TYPE`;
/// otherwise the empty ("no configuration") name is used.
#[must_use]
pub fn active_configuration(explicit: Option<&str>, target: TargetRef<'_>) -> String {
    explicit
        .or_else(|| target.partition.definition(BUILD_TYPE_VARIABLE))
        .unwrap_or_default()
        .to_owned()
}

impl DependencyRecord {
    /// Build the record for `target` under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DependInfoError::MissingLinkImplementation`] when the target
    /// has no link implementation for `config`. No default configuration is
    /// substituted.
    pub fn build(
        index: &TargetIndex<'_>,
        target: TargetRef<'_>,
        config: &str,
        policy: &IncludePathPolicy,
    ) -> Result<Self, DependInfoError> {
        let TargetRef { partition, target: tgt } = target;
        let link = tgt.configuration(config).ok_or_else(|| {
            DependInfoError::MissingLinkImplementation {
                target: tgt.name.clone(),
                configuration: config.to_owned(),
            }
        })?;
        let home = index.snapshot().home_output_dir.as_path();

        let by_language = classify(&tgt.sources);
        let languages = link
            .languages
            .iter()
            .map(|language| {
                let sources = by_language
                    .get(language.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let mut pairs = Vec::new();
                for source in sources {
                    let source_path = to_portable_path(&source.path);
                    match source.object() {
                        Some(object) => pairs.push(DependPair {
                            source: source_path.clone(),
                            output: portable_join(home, object),
                        }),
                        None => debug!(
                            target_name = %tgt.name,
                            source = %source.path,
                            "source has no object path; skipping primary pair",
                        ),
                    }
                    for extra in source.object_outputs() {
                        pairs.push(DependPair {
                            source: source_path.clone(),
                            output: to_portable_path(extra),
                        });
                    }
                }
                LanguageRecord {
                    language: language.clone(),
                    pairs,
                    compiler_id: partition
                        .definition(&format!("CMAKE_{language}_COMPILER_ID"))
                        .map(str::to_owned),
                }
            })
            .collect();

        let scopes = PropertyScopes {
            project: &partition.properties,
            target: &tgt.properties,
        };
        let directories = link
            .include_directories
            .get(policy.reference_language.as_str())
            .map(|dirs| dirs.iter().map(|dir| relative_to(home, dir)).collect())
            .unwrap_or_default();
        let aliases = policy
            .alias_languages
            .iter()
            .filter(|lang| **lang != policy.reference_language)
            .cloned()
            .collect();

        Ok(Self {
            languages,
            definitions: properties::compile_definitions(scopes, config),
            include_transforms: properties::include_transforms(scopes, config),
            linked_info_files: link_closure::resolve(index, target, config),
            include_path: IncludePath {
                reference_language: policy.reference_language.clone(),
                directories,
                aliases,
            },
        })
    }
}
