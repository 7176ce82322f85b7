//! KPI classification tags
//!
//! A KPI is tagged from its relational context:
//!
//! | Context                         | Level       | Parent type           |
//! |---------------------------------|-------------|-----------------------|
//! | KRA under a strategic objective | strategic   | strategic_objective   |
//! | KRA under a strategic goal      | strategic   | strategic_goal        |
//! | KRA with neither                | strategic   | kra                   |
//! | Responsible directorate         | directorate | directorate           |
//!
//! The directorate row wins over the KRA rows. A KPI with neither a KRA nor
//! a directorate gets no tags.

use pmis_hierarchy::HierarchyView;
use pmis_model::{Category, NodeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Level a KPI is reported at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLevel {
    /// Strategic plan
    Strategic,
    /// Directorate plan
    Directorate,
}

/// Kind of record a KPI hangs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentType {
    /// Strategic objective, through its KRA
    StrategicObjective,
    /// Strategic goal, through its KRA
    StrategicGoal,
    /// Unlinked KRA
    Kra,
    /// Responsible directorate
    Directorate,
}

impl ClassificationLevel {
    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strategic => "strategic",
            Self::Directorate => "directorate",
        }
    }
}

impl ParentType {
    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrategicObjective => "strategic_objective",
            Self::StrategicGoal => "strategic_goal",
            Self::Kra => "kra",
            Self::Directorate => "directorate",
        }
    }
}

/// Tags assigned to one KPI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassificationTags {
    /// `classification_level`
    pub classification_level: ClassificationLevel,
    /// `parent_type`
    pub parent_type: ParentType,
}

impl ClassificationTags {
    const fn new(classification_level: ClassificationLevel, parent_type: ParentType) -> Self {
        Self {
            classification_level,
            parent_type,
        }
    }
}

/// Tags for one KPI, `None` when it has no KRA and no directorate
pub fn classify_kpi<V: HierarchyView + ?Sized>(view: &V, kpi: NodeRef) -> Option<ClassificationTags> {
    if kpi.category() != Category::Kpi || !view.contains(kpi) {
        return None;
    }
    if view.parent_of_type(kpi, Category::Directorate).is_some() {
        return Some(ClassificationTags::new(
            ClassificationLevel::Directorate,
            ParentType::Directorate,
        ));
    }
    let kra = view.parent_of_type(kpi, Category::Kra)?;
    let parent_type = if view.parent_of_type(kra, Category::StrategicObjective).is_some() {
        ParentType::StrategicObjective
    } else if view.parent_of_type(kra, Category::StrategicGoal).is_some() {
        ParentType::StrategicGoal
    } else {
        ParentType::Kra
    };
    Some(ClassificationTags::new(ClassificationLevel::Strategic, parent_type))
}

/// Tags for every visible KPI that can be classified
pub fn classify_all<V: HierarchyView + ?Sized>(view: &V) -> BTreeMap<NodeRef, ClassificationTags> {
    let tags: BTreeMap<NodeRef, ClassificationTags> = view
        .nodes_of(Category::Kpi)
        .into_iter()
        .filter_map(|kpi| classify_kpi(view, kpi).map(|tags| (kpi, tags)))
        .collect();
    tracing::debug!(classified = tags.len(), "KPIs classified");
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmis_hierarchy::TreeBuilder;
    use pmis_model::{
        Directorate, DirectorateId, GoalId, Kpi, KpiId, Kra, KraId, KraParent, Measurement,
        ObjectiveId, StrategicGoal, StrategicObjective,
    };

    fn tags(level: ClassificationLevel, parent: ParentType) -> ClassificationTags {
        ClassificationTags::new(level, parent)
    }

    #[test]
    fn rules_in_order() {
        use ClassificationLevel::{Directorate as Dir, Strategic};

        let m = || Measurement::new(1.0, 1.0);
        let tree = TreeBuilder::new()
            .goal(StrategicGoal::new(GoalId(1), "G"))
            .objective(StrategicObjective::new(ObjectiveId(1), "O", Some(GoalId(1))))
            .kra(Kra::new(KraId(1), "Under objective", KraParent::Objective(ObjectiveId(1))))
            .kra(Kra::new(KraId(2), "Under goal", KraParent::Goal(GoalId(1))))
            .kra(Kra::new(KraId(3), "Loose", KraParent::Unlinked))
            .directorate(Directorate::new(DirectorateId(1), "Works"))
            .kpi(Kpi::new(KpiId(1), "a", Some(KraId(1)), m()))
            .kpi(Kpi::new(KpiId(2), "b", Some(KraId(2)), m()))
            .kpi(Kpi::new(KpiId(3), "c", Some(KraId(3)), m()))
            .kpi(Kpi::new(KpiId(4), "d", Some(KraId(1)), m()).with_directorate(DirectorateId(1)))
            .kpi(Kpi::new(KpiId(5), "e", None, m()))
            .build()
            .unwrap();

        let all = classify_all(&tree);
        assert_eq!(all[&NodeRef::Kpi(KpiId(1))], tags(Strategic, ParentType::StrategicObjective));
        assert_eq!(all[&NodeRef::Kpi(KpiId(2))], tags(Strategic, ParentType::StrategicGoal));
        assert_eq!(all[&NodeRef::Kpi(KpiId(3))], tags(Strategic, ParentType::Kra));
        assert_eq!(all[&NodeRef::Kpi(KpiId(4))], tags(Dir, ParentType::Directorate));
        assert!(!all.contains_key(&NodeRef::Kpi(KpiId(5))));
    }

    #[test]
    fn dangling_objective_reads_as_loose_kra() {
        let tree = TreeBuilder::new()
            .kra(Kra::new(KraId(1), "Orphan", KraParent::Objective(ObjectiveId(9))))
            .kpi(Kpi::new(KpiId(1), "a", Some(KraId(1)), Measurement::new(1.0, 0.0)))
            .build()
            .unwrap();
        assert_eq!(
            classify_kpi(&tree, NodeRef::Kpi(KpiId(1))),
            Some(tags(ClassificationLevel::Strategic, ParentType::Kra))
        );
    }
}
