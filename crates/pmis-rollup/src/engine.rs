//! Percentage rollup
//!
//! A leaf carries its own score; every other node's percentage is the plain
//! mean of its visible children's percentages across the child categories
//! [`rollup_children`] names. Nodes without children read 0%.
//!
//! Everything here is a pure function of a [`HierarchyView`].

use crate::plan::{bottom_up_order, rollup_children};
use pmis_hierarchy::{HierarchyView, NumericField};
use pmis_model::{Category, NodeRef, Percent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Own score of a leaf node, `None` for aggregating nodes
pub fn leaf_percentage<V: HierarchyView + ?Sized>(view: &V, node: NodeRef) -> Option<Percent> {
    match node.category() {
        Category::Kpi | Category::ProgrammeIndicator => Some(
            view.measurement(node)
                .map_or(Percent::ZERO, |measurement| measurement.achievement()),
        ),
        Category::PiapAction => {
            let measured = view
                .measurement(node)
                .filter(|measurement| measurement.target > 0.0)
                .map(|measurement| measurement.achievement());
            Some(measured.unwrap_or_else(|| {
                Percent::new(view.numeric_field(node, NumericField::Progress).unwrap_or(0.0))
            }))
        }
        Category::ProgrammeDirectorateLink | Category::DivisionProgrammeLink => Some(Percent::new(
            view.numeric_field(node, NumericField::PerformanceScore)
                .unwrap_or(0.0),
        )),
        _ => None,
    }
}

/// Percentage of a single node
///
/// Nodes the view does not contain read 0%.
pub fn compute_node_percentage<V: HierarchyView + ?Sized>(view: &V, node: NodeRef) -> Percent {
    let mut memo = BTreeMap::new();
    percentage_memo(view, node, &mut memo)
}

fn percentage_memo<V: HierarchyView + ?Sized>(
    view: &V,
    node: NodeRef,
    memo: &mut BTreeMap<NodeRef, Percent>,
) -> Percent {
    if let Some(known) = memo.get(&node) {
        return *known;
    }
    let value = if !view.contains(node) {
        Percent::ZERO
    } else if let Some(own) = leaf_percentage(view, node) {
        own
    } else {
        let children: Vec<NodeRef> = rollup_children(node.category())
            .iter()
            .flat_map(|category| view.children_of_type(node, *category))
            .filter(|child| view.contains(*child))
            .collect();
        let values: Vec<Percent> = children
            .into_iter()
            .map(|child| percentage_memo(view, child, memo))
            .collect();
        Percent::mean(values)
    };
    memo.insert(node, value);
    value
}

/// Percentages of every visible node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollupTable {
    values: BTreeMap<NodeRef, Percent>,
}

impl RollupTable {
    /// Percentage of a node, 0% if absent
    #[must_use]
    pub fn get(&self, node: NodeRef) -> Percent {
        self.values.get(&node).copied().unwrap_or(Percent::ZERO)
    }

    /// Whether the node was computed
    #[must_use]
    pub fn contains(&self, node: NodeRef) -> bool {
        self.values.contains_key(&node)
    }

    /// Entries of one category, in id order
    #[must_use]
    pub fn of_category(&self, category: Category) -> Vec<(NodeRef, Percent)> {
        self.values
            .iter()
            .filter(|(node, _)| node.category() == category)
            .map(|(node, value)| (*node, *value))
            .collect()
    }

    /// All entries, in node order
    pub fn iter(&self) -> impl Iterator<Item = (NodeRef, Percent)> + '_ {
        self.values.iter().map(|(node, value)| (*node, *value))
    }

    /// Number of computed nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was computed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Recompute every visible node, leaves first
pub fn recompute<V: HierarchyView + ?Sized>(view: &V) -> RollupTable {
    let mut memo = BTreeMap::new();
    for category in bottom_up_order() {
        for node in view.nodes_of(category) {
            percentage_memo(view, node, &mut memo);
        }
    }
    memo.retain(|node, _| view.contains(*node));
    tracing::debug!(nodes = memo.len(), "rollup recomputed");
    RollupTable { values: memo }
}
