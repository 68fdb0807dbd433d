//! Name-keyed lookup over a snapshot's targets.

use std::collections::HashMap;

use camino::Utf8PathBuf;

use super::{BuildGraphSnapshot, GraphError, Partition, Target};
use crate::depinfo_gen::DEPEND_INFO_FILE;

/// A target together with the partition that owns it.
#[derive(Debug, Clone, Copy)]
pub struct TargetRef<'a> {
    /// Owning partition.
    pub partition: &'a Partition,
    /// The target itself.
    pub target: &'a Target,
}

impl TargetRef<'_> {
    /// Absolute per-target directory.
    #[must_use]
    pub fn directory(&self) -> Utf8PathBuf {
        self.partition.output_dir.join(self.target.directory())
    }

    /// Absolute path of the target's dependency manifest.
    #[must_use]
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.directory().join(DEPEND_INFO_FILE)
    }
}

/// Resolves target names to their [`TargetRef`].
///
/// Names are the identity key for link resolution, so they must be unique
/// across the whole snapshot.
#[derive(Debug)]
pub struct TargetIndex<'a> {
    snapshot: &'a BuildGraphSnapshot,
    by_name: HashMap<&'a str, TargetRef<'a>>,
}

impl<'a> TargetIndex<'a> {
    /// Index every target of `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateTarget`] when two targets share a name.
    pub fn new(snapshot: &'a BuildGraphSnapshot) -> Result<Self, GraphError> {
        let mut by_name = HashMap::new();
        for partition in &snapshot.partitions {
            for target in &partition.targets {
                let entry = TargetRef { partition, target };
                if by_name.insert(target.name.as_str(), entry).is_some() {
                    return Err(GraphError::DuplicateTarget {
                        name: target.name.clone(),
                    });
                }
            }
        }
        Ok(Self { snapshot, by_name })
    }

    /// The indexed snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &'a BuildGraphSnapshot {
        self.snapshot
    }

    /// Look up a target by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TargetRef<'a>> {
        self.by_name.get(name).copied()
    }

    /// Every target in partition order, then declaration order.
    pub fn iter(&self) -> impl Iterator<Item = TargetRef<'a>> + use<'a> {
        self.snapshot.partitions.iter().flat_map(|partition| {
            partition
                .targets
                .iter()
                .map(move |target| TargetRef { partition, target })
        })
    }
}
