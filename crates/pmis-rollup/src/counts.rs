//! Deduplicated descendant counts
//!
//! A descendant reachable along several paths is counted once: the walk
//! collects into a set before counting.

use crate::plan::{walk_children, WalkMode};
use pmis_hierarchy::HierarchyView;
use pmis_model::{Category, NodeRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Distinct descendants of a root, by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCounts(BTreeMap<Category, usize>);

impl CategoryCounts {
    /// Count for one category, 0 if none
    #[must_use]
    pub fn get(&self, category: Category) -> usize {
        self.0.get(&category).copied().unwrap_or(0)
    }

    /// Sum over all categories
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Non-zero counts, in category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.0.iter().map(|(category, count)| (*category, *count))
    }
}

impl std::ops::Index<Category> for CategoryCounts {
    type Output = usize;

    fn index(&self, category: Category) -> &usize {
        self.0.get(&category).unwrap_or(&0)
    }
}

/// Every distinct node reachable from `root`, the root excluded
pub fn descendants<V: HierarchyView + ?Sized>(view: &V, root: NodeRef) -> BTreeSet<NodeRef> {
    let mut seen = BTreeSet::new();
    if !view.contains(root) {
        return seen;
    }
    let mode = WalkMode::for_root(root.category());
    let mut queue = VecDeque::from([root]);
    seen.insert(root);
    while let Some(node) = queue.pop_front() {
        for category in walk_children(node.category(), mode) {
            for child in view.children_of_type(node, *category) {
                if view.contains(child) && seen.insert(child) {
                    queue.push_back(child);
                }
            }
        }
    }
    seen.remove(&root);
    seen
}

/// Distinct descendants of `root` per category
pub fn compute_counts<V: HierarchyView + ?Sized>(view: &V, root: NodeRef) -> CategoryCounts {
    let mut counts = BTreeMap::new();
    for node in descendants(view, root) {
        *counts.entry(node.category()).or_insert(0) += 1;
    }
    CategoryCounts(counts)
}
