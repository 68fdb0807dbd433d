//! Linked-target manifest resolution.
//!
//! The build graph supplies each target's link line already flattened to
//! include transitive items. Resolution is therefore a single ordered pass
//! that keeps the first occurrence of every linked target, skips imported
//! targets and plain library tokens, and maps each survivor to the path of
//! its own dependency manifest.

use std::collections::HashSet;

use tracing::debug;

use crate::graph::{LinkItem, TargetIndex, TargetRef};
use crate::paths::to_portable_path;

/// Manifest paths of the targets `target` links against in `config`.
///
/// Targets are deduplicated by name in first-seen order. A target without
/// link information for `config` yields an empty list.
#[must_use]
pub fn resolve(index: &TargetIndex<'_>, target: TargetRef<'_>, config: &str) -> Vec<String> {
    let items = target
        .target
        .configuration(config)
        .and_then(|cfg| cfg.link_items.as_deref())
        .unwrap_or_default();
    resolve_items(index, &target.target.name, items)
}

/// Resolve an explicit item list on behalf of the target named `owner`.
#[must_use]
pub fn resolve_items(index: &TargetIndex<'_>, owner: &str, items: &[LinkItem]) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for name in items.iter().filter_map(LinkItem::target_name) {
        let Some(linked) = index.get(name) else {
            debug!(
                target_name = owner,
                linked = name,
                "skipping link item that names no target in the graph",
            );
            continue;
        };
        if linked.target.imported {
            debug!(
                target_name = owner,
                linked = name,
                "skipping imported link target"
            );
            continue;
        }
        if visited.insert(linked.target.name.as_str()) {
            out.push(to_portable_path(linked.manifest_path()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{self, BuildGraphSnapshot};
    use rstest::{fixture, rstest};

    #[fixture]
    fn snapshot() -> BuildGraphSnapshot {
        let yaml = concat!(
            "home_output_dir: /b\n",
            "partitions:\n",
            "  - output_dir: /b\n",
            "    targets:\n",
            "      - { name: A, kind: static_library }\n",
            "      - { name: B, kind: static_library }\n",
            "      - { name: Ext, kind: shared_library, imported: true }\n",
            "  - output_dir: /b/lib\n",
            "    targets:\n",
            "      - { name: C, kind: static_library }\n",
            "      - name: T\n",
            "        kind: executable\n",
            "        configurations:\n",
            "          Debug:\n",
            "            languages: [C]\n",
            "            link_items:\n",
            "              - target: A\n",
            "              - target: B\n",
            "              - target: C\n",
            "              - target: C\n",
            "              - library: pthread\n",
            "              - target: Ext\n",
            "              - target: Ghost\n",
            "          Release:\n",
            "            languages: [C]\n",
        );
        graph::from_str(yaml).expect("parse fixture")
    }

    fn item(name: &str) -> LinkItem {
        LinkItem::Target {
            target: name.to_owned(),
        }
    }

    #[rstest]
    fn diamond_is_deduplicated_in_first_seen_order(snapshot: BuildGraphSnapshot) {
        let index = TargetIndex::new(&snapshot).expect("index");
        let target = index.get("T").expect("T indexed");
        assert_eq!(
            resolve(&index, target, "Debug"),
            [
                "/b/CMakeFiles/A.dir/DependInfo.cmake",
                "/b/CMakeFiles/B.dir/DependInfo.cmake",
                "/b/lib/CMakeFiles/C.dir/DependInfo.cmake",
            ]
        );
    }

    #[rstest]
    fn imported_and_unresolved_targets_are_excluded(snapshot: BuildGraphSnapshot) {
        let index = TargetIndex::new(&snapshot).expect("index");
        let out = resolve_items(&index, "T", &[item("Ext"), item("Ghost")]);
        assert!(out.is_empty(), "unexpected entries: {out:?}");
    }

    #[rstest]
    fn missing_link_information_yields_empty_list(snapshot: BuildGraphSnapshot) {
        let index = TargetIndex::new(&snapshot).expect("index");
        let target = index.get("T").expect("T indexed");
        assert!(resolve(&index, target, "Release").is_empty());
        assert!(resolve(&index, target, "Unknown").is_empty());
    }

    #[rstest]
    fn library_tokens_contribute_nothing(snapshot: BuildGraphSnapshot) {
        let index = TargetIndex::new(&snapshot).expect("index");
        let items = [LinkItem::Library {
            library: "A".into(),
        }];
        assert!(resolve_items(&index, "T", &items).is_empty());
    }

    #[rstest]
    fn repeated_runs_are_identical(snapshot: BuildGraphSnapshot) {
        let index = TargetIndex::new(&snapshot).expect("index");
        let target = index.get("T").expect("T indexed");
        assert_eq!(
            resolve(&index, target, "Debug"),
            resolve(&index, target, "Debug")
        );
    }
}
