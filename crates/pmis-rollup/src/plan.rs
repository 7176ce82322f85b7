//! Static aggregation plans over [`Category`]
//!
//! - [`rollup_children`]: which child categories a node's percentage is the
//!   mean of
//! - [`walk_children`]: which child categories a descendant walk follows
//!
//! Both plans are expressed per category, never per record, so a cyclic
//! plan is detectable up front by topological sort.

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;
use pmis_model::Category;
use serde::{Deserialize, Serialize};

/// Child categories whose percentages a node of `category` averages
///
/// Empty for leaves, which carry their own score.
#[must_use]
pub const fn rollup_children(category: Category) -> &'static [Category] {
    use Category::{
        DivisionProgrammeLink, Intervention, Kpi, Kra, Outcome, Output, PiapAction,
        ProgrammeDirectorateLink, ProgrammeIndicator, ProgrammeObjective, StrategicObjective,
    };
    match category {
        Category::StrategicGoal => &[StrategicObjective, Kra],
        Category::StrategicObjective => &[Kra],
        Category::Kra => &[Kpi],
        Category::Programme => &[ProgrammeObjective, ProgrammeIndicator],
        Category::ProgrammeObjective => &[Outcome],
        Category::Outcome => &[ProgrammeIndicator, Intervention],
        Category::Intervention => &[Output],
        Category::Output => &[PiapAction, ProgrammeIndicator],
        Category::Directorate => &[Kpi, ProgrammeDirectorateLink],
        Category::Division => &[ProgrammeIndicator, DivisionProgrammeLink],
        Category::Kpi
        | Category::PiapAction
        | Category::ProgrammeIndicator
        | Category::ProgrammeDirectorateLink
        | Category::DivisionProgrammeLink => &[],
    }
}

/// Which relations a descendant walk follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkMode {
    /// Down the strategic and programme chains; units are terminal
    Strategic,
    /// From a unit into the programmes and indicators it answers for
    Organisational,
}

impl WalkMode {
    /// Mode a walk rooted at `category` uses
    #[must_use]
    pub const fn for_root(category: Category) -> Self {
        if category.is_unit() {
            Self::Organisational
        } else {
            Self::Strategic
        }
    }
}

/// Child categories a descendant walk follows from `category`
#[must_use]
pub const fn walk_children(category: Category, mode: WalkMode) -> &'static [Category] {
    use Category::{
        Directorate, Division, Intervention, Kpi, Kra, Outcome, Output, PiapAction, Programme,
        ProgrammeIndicator, ProgrammeObjective, StrategicObjective,
    };
    match (mode, category) {
        (WalkMode::Organisational, Category::Directorate) => {
            &[Division, Programme, Kpi, ProgrammeIndicator]
        }
        (WalkMode::Organisational, Category::Division) => &[Programme, ProgrammeIndicator],
        (WalkMode::Organisational, Category::Programme) => {
            &[ProgrammeObjective, ProgrammeIndicator]
        }
        (_, Category::StrategicGoal) => &[StrategicObjective, Kra],
        (_, Category::StrategicObjective) => &[Kra, Programme],
        (_, Category::Kra) => &[Kpi],
        (_, Category::Programme) => &[ProgrammeObjective, ProgrammeIndicator, Directorate, Division],
        (_, Category::ProgrammeObjective) => &[Outcome],
        (_, Category::Outcome) => &[Intervention, ProgrammeIndicator],
        (_, Category::Intervention) => &[Output],
        (_, Category::Output) => &[PiapAction, ProgrammeIndicator],
        _ => &[],
    }
}

fn rollup_plan_graph() -> DiGraphMap<Category, ()> {
    let mut graph = DiGraphMap::new();
    for category in Category::ALL {
        graph.add_node(category);
        for child in rollup_children(category) {
            graph.add_edge(category, *child, ());
        }
    }
    graph
}

/// Whether the rollup plan is free of cycles
#[must_use]
pub fn rollup_plan_is_acyclic() -> bool {
    !is_cyclic_directed(&rollup_plan_graph())
}

/// Categories ordered so every child category precedes its parents
#[must_use]
pub fn bottom_up_order() -> Vec<Category> {
    match toposort(&rollup_plan_graph(), None) {
        Ok(mut order) => {
            order.reverse();
            order
        }
        Err(cycle) => {
            tracing::error!(category = %cycle.node_id(), "rollup plan is cyclic");
            Category::ALL.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollup_plan_is_a_dag() {
        assert!(rollup_plan_is_acyclic());
    }

    #[test]
    fn children_precede_parents() {
        let order = bottom_up_order();
        assert_eq!(order.len(), Category::ALL.len());
        let position = |c: Category| order.iter().position(|x| *x == c).unwrap();
        for category in Category::ALL {
            for child in rollup_children(category) {
                assert!(position(*child) < position(category), "{child} before {category}");
            }
        }
    }

    #[test]
    fn units_walk_organisationally() {
        assert_eq!(WalkMode::for_root(Category::Division), WalkMode::Organisational);
        assert_eq!(WalkMode::for_root(Category::StrategicGoal), WalkMode::Strategic);
    }

    #[test]
    fn strategic_walk_stops_at_units() {
        assert!(walk_children(Category::Directorate, WalkMode::Strategic).is_empty());
        assert!(walk_children(Category::Division, WalkMode::Strategic).is_empty());
    }

    #[test]
    fn organisational_walk_does_not_climb_back_to_units() {
        let children = walk_children(Category::Programme, WalkMode::Organisational);
        assert!(!children.contains(&Category::Directorate));
        assert!(!children.contains(&Category::Division));
    }
}
