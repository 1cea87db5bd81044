//! Mirror coverage: which upstream repositories have no `mirror-<name>`
//! counterpart in the mirror organization.

use crate::model::Repository;
use std::collections::{BTreeMap, BTreeSet};

pub const MIRROR_PREFIX: &str = "mirror-";

/// Upstream names that have a mirror, derived once from the mirror
/// organization's listing. The prefix match is exact and case-sensitive.
#[derive(Debug, Default)]
pub struct MirrorIndex {
    mirrored: BTreeSet<String>,
}

impl MirrorIndex {
    pub fn from_mirrors(mirrors: &[Repository]) -> Self {
        let mirrored = mirrors
            .iter()
            .filter_map(|r| r.name.strip_prefix(MIRROR_PREFIX))
            .map(str::to_string)
            .collect();
        Self { mirrored }
    }

    pub fn is_mirrored(&self, upstream: &str) -> bool {
        self.mirrored.contains(upstream)
    }
}

/// Upstream repositories lacking a mirror and not ignored, deduplicated by
/// name (first occurrence kept) and sorted by byte-wise name order.
pub fn find_unmirrored(
    upstream: &[Repository],
    mirrors: &[Repository],
    ignore: &BTreeSet<String>,
) -> Vec<Repository> {
    let index = MirrorIndex::from_mirrors(mirrors);
    let mut missing: BTreeMap<&str, &Repository> = BTreeMap::new();

    for repo in upstream {
        if index.is_mirrored(&repo.name) || ignore.contains(&repo.name) {
            continue;
        }
        missing.entry(repo.name.as_str()).or_insert(repo);
    }

    missing.into_values().cloned().collect()
}
