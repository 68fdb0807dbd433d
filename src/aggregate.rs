//! Project-wide manifest generation.
//!
//! Walks every partition and target, writes each buildable target's
//! dependency manifest, and lists them all in the project manifest so the
//! scanner can find every per-target file in one place.

use camino::Utf8PathBuf;
use tracing::{error, info};

use crate::depinfo_gen::{self, DEPEND_INFO_MANIFEST_FILE};
use crate::error::DependInfoError;
use crate::graph::{TargetIndex, TargetRef};
use crate::output::{self, WriteOutcome};
use crate::paths::relative_to;
use crate::record::{DependencyRecord, IncludePathPolicy, active_configuration};

/// Settings for one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Configuration to generate for; `None` defers to each partition's
    /// `CMAKE_BUILD_TYPE`.
    pub configuration: Option<String>,
    /// Continue with the remaining targets after a failure.
    pub keep_going: bool,
    /// Include path language policy.
    pub include_policy: IncludePathPolicy,
}

/// Counts reported after a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Manifests whose content changed.
    pub written: usize,
    /// Manifests that already matched.
    pub unchanged: usize,
}

impl PassSummary {
    const fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

/// Targets that receive a manifest, in partition then declaration order.
///
/// Imported targets are built elsewhere and never get a manifest here.
pub fn buildable_targets<'a>(
    index: &TargetIndex<'a>,
) -> impl Iterator<Item = TargetRef<'a>> + use<'a> {
    index
        .iter()
        .filter(|r| r.target.kind.is_buildable() && !r.target.imported)
}

/// Manifest paths of every buildable target, relative to the home output
/// directory.
#[must_use]
pub fn manifest_paths(index: &TargetIndex<'_>) -> Vec<String> {
    let home = index.snapshot().home_output_dir.as_path();
    buildable_targets(index)
        .map(|r| relative_to(home, &r.manifest_path()))
        .collect()
}

/// Render the project manifest for the indexed graph.
#[must_use]
pub fn aggregate(index: &TargetIndex<'_>) -> String {
    depinfo_gen::generate_manifest(&manifest_paths(index))
}

/// Where the project manifest lives.
#[must_use]
pub fn project_manifest_path(index: &TargetIndex<'_>) -> Utf8PathBuf {
    index
        .snapshot()
        .home_output_dir
        .join("CMakeFiles")
        .join(DEPEND_INFO_MANIFEST_FILE)
}

/// Render one target's manifest under the pass options.
///
/// # Errors
///
/// Propagates [`DependInfoError::MissingLinkImplementation`].
pub fn render_target(
    index: &TargetIndex<'_>,
    target: TargetRef<'_>,
    options: &GenerateOptions,
) -> Result<String, DependInfoError> {
    let config = active_configuration(options.configuration.as_deref(), target);
    let record = DependencyRecord::build(index, target, &config, &options.include_policy)?;
    Ok(depinfo_gen::generate(&record))
}

fn write_target(
    index: &TargetIndex<'_>,
    target: TargetRef<'_>,
    options: &GenerateOptions,
) -> Result<WriteOutcome, DependInfoError> {
    let content = render_target(index, target, options)?;
    output::write_if_changed(&target.manifest_path(), &content)
}

/// Write every buildable target's manifest and then the project manifest.
///
/// Without `keep_going` the first failure aborts the pass before the project
/// manifest is written. With it, every target is attempted, the project
/// manifest is still written, and the failures are reported together.
///
/// # Errors
///
/// Returns the first target error, [`DependInfoError::PassFailed`] in
/// keep-going mode, or [`DependInfoError::UnwritableDestination`] for the
/// project manifest.
pub fn generate_all(
    index: &TargetIndex<'_>,
    options: &GenerateOptions,
) -> Result<PassSummary, DependInfoError> {
    let mut summary = PassSummary::default();
    let mut failures = Vec::new();
    for target in buildable_targets(index) {
        match write_target(index, target, options) {
            Ok(outcome) => summary.record(outcome),
            Err(err) if options.keep_going => {
                error!(
                    target_name = %target.target.name,
                    error = %err,
                    "manifest generation failed"
                );
                failures.push(target.target.name.clone());
            }
            Err(err) => return Err(err),
        }
    }

    let manifest = aggregate(index);
    summary.record(output::write_if_changed(
        &project_manifest_path(index),
        &manifest,
    )?);

    if !failures.is_empty() {
        return Err(DependInfoError::PassFailed { failures });
    }
    info!(
        written = summary.written,
        unchanged = summary.unchanged,
        "dependency manifests generated"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{self, BuildGraphSnapshot};
    use rstest::rstest;

    fn snapshot(home: &str) -> BuildGraphSnapshot {
        let yaml = format!(
            concat!(
                "home_output_dir: {home}\n",
                "partitions:\n",
                "  - output_dir: {home}\n",
                "    targets:\n",
                "      - name: app\n",
                "        kind: executable\n",
                "        configurations: {{ \"\": {{ languages: [C] }} }}\n",
                "      - {{ name: iface, kind: other }}\n",
                "  - output_dir: {home}/sub\n",
                "    targets:\n",
                "      - name: gen\n",
                "        kind: utility\n",
                "        configurations: {{ \"\": {{}} }}\n",
            ),
            home = home
        );
        graph::from_str(&yaml).expect("parse fixture")
    }

    #[rstest]
    fn manifest_lists_buildable_targets_relative_to_home() {
        let snap = snapshot("/b");
        let index = TargetIndex::new(&snap).expect("index");
        assert_eq!(
            manifest_paths(&index),
            [
                "CMakeFiles/app.dir/DependInfo.cmake",
                "sub/CMakeFiles/gen.dir/DependInfo.cmake",
            ]
        );
        assert_eq!(project_manifest_path(&index), "/b/CMakeFiles/Makefile.cmake");
    }

    #[rstest]
    fn render_target_defaults_to_empty_configuration() {
        let snap = snapshot("/b");
        let index = TargetIndex::new(&snap).expect("index");
        let target = index.get("gen").expect("gen indexed");
        let text = render_target(&index, target, &GenerateOptions::default()).expect("render");
        assert!(text.starts_with(
            "# The set of languages for which implicit dependencies are needed:\nSET(CMAKE_DEPENDS_LANGUAGES\n  )\n"
        ));
        assert!(text.contains("SET(CMAKE_TARGET_LINKED_INFO_FILES\n  )\n"));
    }
}
