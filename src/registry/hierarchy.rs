//! Three-level hierarchy view over the metadata table.

use crate::registry::types::{HierarchyNode, IdentifierMetadata};
use std::collections::BTreeMap;

/// Group records by namespace, then group, then subgroup. The view is
/// fully derived: it is rebuilt from scratch on every call and holds no
/// state of its own. Ordering is deterministic (lexicographic at every
/// level, ids sorted within each subgroup).
pub fn build_hierarchy<'a, I>(records: I) -> Vec<HierarchyNode>
where
    I: IntoIterator<Item = &'a IdentifierMetadata>,
{
    let mut tree: BTreeMap<&str, BTreeMap<&str, BTreeMap<&str, Vec<&str>>>> = BTreeMap::new();
    for meta in records {
        tree.entry(&meta.namespace)
            .or_default()
            .entry(&meta.group)
            .or_default()
            .entry(&meta.subgroup)
            .or_default()
            .push(&meta.id);
    }

    tree.into_iter()
        .map(|(namespace, groups)| HierarchyNode {
            namespace: namespace.to_string(),
            children: groups
                .into_iter()
                .map(|(group, subgroups)| {
                    (
                        group.to_string(),
                        subgroups
                            .into_iter()
                            .map(|(subgroup, mut ids)| {
                                ids.sort_unstable();
                                (
                                    subgroup.to_string(),
                                    ids.into_iter().map(str::to_string).collect(),
                                )
                            })
                            .collect(),
                    )
                })
                .collect(),
        })
        .collect()
}
