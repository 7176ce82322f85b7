//! In-memory hierarchy snapshot
//!
//! [`PerformanceTree`] stores records in ordered maps keyed by their typed
//! identifiers and derives a directed relation graph from the identifier
//! fields. The graph is rebuilt after every structural change; value updates
//! (bulk updates, auto-calculation) leave it untouched.
//!
//! - Archived records are kept but invisible through [`HierarchyView`]
//! - References to missing records are reported, logged and ignored
//! - Removing a programme or unit removes the relationship rows touching it

mod calculate;
mod history;
mod update;
mod wiring;

pub use update::{BulkUpdateOutcome, UpdateKind, UpdateLine, UpdateScope, UpdateTarget, ValueChange};

use crate::document::TreeDocument;
use crate::error::TreeError;
use crate::relation::{DanglingReference, Relation};
use crate::view::{HierarchyView, NumericField};
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use pmis_model::{
    Category, DateWindow, Directorate, DirectorateId, Division, DivisionId, DivisionProgrammeLink,
    DivisionProgrammeLinkId, EdgeScores, Entity, GoalId, IndicatorAnchor, IndicatorId,
    Intervention, InterventionId, Kpi, KpiId, Kra, KraId, Measurement, NodeRef, ObjectiveId,
    Outcome, OutcomeId, Output, OutputId, PiapAction, PiapActionId, Programme,
    ProgrammeDirectorateLink, ProgrammeDirectorateLinkId, ProgrammeId, ProgrammeIndicator,
    ProgrammeObjective, ProgrammeObjectiveId, ScoreRecord, StrategicGoal, StrategicObjective,
};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Snapshot of the whole performance hierarchy
#[derive(Debug, Clone, Default)]
pub struct PerformanceTree {
    goals: BTreeMap<GoalId, StrategicGoal>,
    objectives: BTreeMap<ObjectiveId, StrategicObjective>,
    kras: BTreeMap<KraId, Kra>,
    kpis: BTreeMap<KpiId, Kpi>,
    programmes: BTreeMap<ProgrammeId, Programme>,
    programme_objectives: BTreeMap<ProgrammeObjectiveId, ProgrammeObjective>,
    outcomes: BTreeMap<OutcomeId, Outcome>,
    interventions: BTreeMap<InterventionId, Intervention>,
    outputs: BTreeMap<OutputId, Output>,
    piap_actions: BTreeMap<PiapActionId, PiapAction>,
    indicators: BTreeMap<IndicatorId, ProgrammeIndicator>,
    directorates: BTreeMap<DirectorateId, Directorate>,
    divisions: BTreeMap<DivisionId, Division>,
    programme_directorates: BTreeMap<ProgrammeDirectorateLinkId, ProgrammeDirectorateLink>,
    division_programmes: BTreeMap<DivisionProgrammeLinkId, DivisionProgrammeLink>,
    history: BTreeMap<NodeRef, Vec<ScoreRecord>>,
    relations: DiGraphMap<NodeRef, Relation>,
    dangling: Vec<DanglingReference>,
}

fn index<K: Ord, T: Entity>(
    records: Vec<T>,
    key: impl Fn(&T) -> K,
) -> Result<BTreeMap<K, T>, TreeError> {
    let mut map = BTreeMap::new();
    for record in records {
        match map.entry(key(&record)) {
            Entry::Occupied(_) => return Err(TreeError::DuplicateNode(record.node())),
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }
    Ok(map)
}

impl PerformanceTree {
    /// Empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from a document
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateNode`] when two records of one category
    /// share an identifier. Dangling references are not errors; see
    /// [`dangling_references`](Self::dangling_references).
    pub fn from_document(doc: TreeDocument) -> Result<Self, TreeError> {
        let mut tree = Self {
            goals: index(doc.goals, |r| r.id)?,
            objectives: index(doc.objectives, |r| r.id)?,
            kras: index(doc.kras, |r| r.id)?,
            kpis: index(doc.kpis, |r| r.id)?,
            programmes: index(doc.programmes, |r| r.id)?,
            programme_objectives: index(doc.programme_objectives, |r| r.id)?,
            outcomes: index(doc.outcomes, |r| r.id)?,
            interventions: index(doc.interventions, |r| r.id)?,
            outputs: index(doc.outputs, |r| r.id)?,
            piap_actions: index(doc.piap_actions, |r| r.id)?,
            indicators: index(doc.indicators, |r| r.id)?,
            directorates: index(doc.directorates, |r| r.id)?,
            divisions: index(doc.divisions, |r| r.id)?,
            programme_directorates: index(doc.programme_directorates, |r| r.id)?,
            division_programmes: index(doc.division_programmes, |r| r.id)?,
            history: history::group(doc.score_history),
            relations: DiGraphMap::new(),
            dangling: Vec::new(),
        };
        tree.rebuild_relations();
        tracing::debug!(
            records = tree.record_count(),
            relations = tree.relations.edge_count(),
            dangling = tree.dangling.len(),
            "hierarchy snapshot built"
        );
        Ok(tree)
    }

    /// Decode a JSON document and build a snapshot from it
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Document`] for malformed JSON and
    /// [`TreeError::DuplicateNode`] for repeated identifiers.
    pub fn from_json(text: &str) -> Result<Self, TreeError> {
        Self::from_document(TreeDocument::from_json(text)?)
    }

    /// Copy every record back into a document
    #[must_use]
    pub fn to_document(&self) -> TreeDocument {
        TreeDocument {
            goals: self.goals.values().cloned().collect(),
            objectives: self.objectives.values().cloned().collect(),
            kras: self.kras.values().cloned().collect(),
            kpis: self.kpis.values().cloned().collect(),
            programmes: self.programmes.values().cloned().collect(),
            programme_objectives: self.programme_objectives.values().cloned().collect(),
            outcomes: self.outcomes.values().cloned().collect(),
            interventions: self.interventions.values().cloned().collect(),
            outputs: self.outputs.values().cloned().collect(),
            piap_actions: self.piap_actions.values().cloned().collect(),
            indicators: self.indicators.values().cloned().collect(),
            directorates: self.directorates.values().cloned().collect(),
            divisions: self.divisions.values().cloned().collect(),
            programme_directorates: self.programme_directorates.values().cloned().collect(),
            division_programmes: self.division_programmes.values().cloned().collect(),
            score_history: self.history.values().flatten().cloned().collect(),
        }
    }

    fn rebuild_relations(&mut self) {
        let (relations, dangling) = wiring::wire(self);
        self.relations = relations;
        self.dangling = dangling;
    }

    /// Any record, active or archived
    #[must_use]
    pub fn entity(&self, node: NodeRef) -> Option<&dyn Entity> {
        fn erase<T: Entity>(record: &T) -> &dyn Entity {
            record
        }
        match node {
            NodeRef::StrategicGoal(id) => self.goals.get(&id).map(erase),
            NodeRef::StrategicObjective(id) => self.objectives.get(&id).map(erase),
            NodeRef::Kra(id) => self.kras.get(&id).map(erase),
            NodeRef::Kpi(id) => self.kpis.get(&id).map(erase),
            NodeRef::Programme(id) => self.programmes.get(&id).map(erase),
            NodeRef::ProgrammeObjective(id) => self.programme_objectives.get(&id).map(erase),
            NodeRef::Outcome(id) => self.outcomes.get(&id).map(erase),
            NodeRef::Intervention(id) => self.interventions.get(&id).map(erase),
            NodeRef::Output(id) => self.outputs.get(&id).map(erase),
            NodeRef::PiapAction(id) => self.piap_actions.get(&id).map(erase),
            NodeRef::ProgrammeIndicator(id) => self.indicators.get(&id).map(erase),
            NodeRef::Directorate(id) => self.directorates.get(&id).map(erase),
            NodeRef::Division(id) => self.divisions.get(&id).map(erase),
            NodeRef::ProgrammeDirectorateLink(id) => {
                self.programme_directorates.get(&id).map(erase)
            }
            NodeRef::DivisionProgrammeLink(id) => self.division_programmes.get(&id).map(erase),
        }
    }

    /// Strategic KPI by id
    #[inline]
    #[must_use]
    pub fn kpi(&self, id: KpiId) -> Option<&Kpi> {
        self.kpis.get(&id)
    }

    /// Programme indicator by id
    #[inline]
    #[must_use]
    pub fn indicator(&self, id: IndicatorId) -> Option<&ProgrammeIndicator> {
        self.indicators.get(&id)
    }

    /// Programme by id
    #[inline]
    #[must_use]
    pub fn programme(&self, id: ProgrammeId) -> Option<&Programme> {
        self.programmes.get(&id)
    }

    /// Division-programme row by id
    #[inline]
    #[must_use]
    pub fn division_programme(&self, id: DivisionProgrammeLinkId) -> Option<&DivisionProgrammeLink> {
        self.division_programmes.get(&id)
    }

    /// Programme an indicator ultimately belongs to, walking up its anchor
    #[must_use]
    pub fn indicator_programme(&self, id: IndicatorId) -> Option<ProgrammeId> {
        match self.indicators.get(&id)?.anchor {
            IndicatorAnchor::Programme(programme) => Some(programme),
            IndicatorAnchor::Outcome(outcome) => self.outcome_programme(outcome),
            IndicatorAnchor::Output(output) => {
                let intervention = self.outputs.get(&output)?.intervention;
                self.outcome_programme(self.interventions.get(&intervention)?.outcome)
            }
        }
    }

    fn outcome_programme(&self, id: OutcomeId) -> Option<ProgrammeId> {
        let objective = self.outcomes.get(&id)?.objective;
        self.programme_objectives.get(&objective).map(|o| o.programme)
    }

    /// Number of stored records, archived included
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.goals.len()
            + self.objectives.len()
            + self.kras.len()
            + self.kpis.len()
            + self.programmes.len()
            + self.programme_objectives.len()
            + self.outcomes.len()
            + self.interventions.len()
            + self.outputs.len()
            + self.piap_actions.len()
            + self.indicators.len()
            + self.directorates.len()
            + self.divisions.len()
            + self.programme_directorates.len()
            + self.division_programmes.len()
    }

    /// Number of relation edges
    #[inline]
    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.relations.edge_count()
    }

    /// Relation edges tallied by kind
    #[must_use]
    pub fn relation_summary(&self) -> BTreeMap<Relation, usize> {
        let mut summary = BTreeMap::new();
        for (_, _, relation) in self.relations.all_edges() {
            *summary.entry(*relation).or_insert(0) += 1;
        }
        summary
    }

    /// Kind of the relation from one node to another, if any
    #[inline]
    #[must_use]
    pub fn relation_between(&self, from: NodeRef, to: NodeRef) -> Option<Relation> {
        self.relations.edge_weight(from, to).copied()
    }

    /// References to records missing from the snapshot
    #[inline]
    #[must_use]
    pub fn dangling_references(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Delete a record together with the relationship rows touching it
    ///
    /// The record's score history goes with it. Children pointing at the
    /// removed record keep their pointer, which then reads as a dangling
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFound`] if the record does not exist.
    pub fn remove(&mut self, node: NodeRef) -> Result<Vec<NodeRef>, TreeError> {
        let existed = match node {
            NodeRef::StrategicGoal(id) => self.goals.remove(&id).is_some(),
            NodeRef::StrategicObjective(id) => self.objectives.remove(&id).is_some(),
            NodeRef::Kra(id) => self.kras.remove(&id).is_some(),
            NodeRef::Kpi(id) => self.kpis.remove(&id).is_some(),
            NodeRef::Programme(id) => self.programmes.remove(&id).is_some(),
            NodeRef::ProgrammeObjective(id) => self.programme_objectives.remove(&id).is_some(),
            NodeRef::Outcome(id) => self.outcomes.remove(&id).is_some(),
            NodeRef::Intervention(id) => self.interventions.remove(&id).is_some(),
            NodeRef::Output(id) => self.outputs.remove(&id).is_some(),
            NodeRef::PiapAction(id) => self.piap_actions.remove(&id).is_some(),
            NodeRef::ProgrammeIndicator(id) => self.indicators.remove(&id).is_some(),
            NodeRef::Directorate(id) => self.directorates.remove(&id).is_some(),
            NodeRef::Division(id) => self.divisions.remove(&id).is_some(),
            NodeRef::ProgrammeDirectorateLink(id) => {
                self.programme_directorates.remove(&id).is_some()
            }
            NodeRef::DivisionProgrammeLink(id) => self.division_programmes.remove(&id).is_some(),
        };
        if !existed {
            return Err(TreeError::NotFound(node));
        }

        self.history.remove(&node);
        let mut removed = vec![node];
        let touches_programme_directorate = |link: &ProgrammeDirectorateLink| match node {
            NodeRef::Programme(id) => link.programme == id,
            NodeRef::Directorate(id) => link.directorate == id,
            _ => false,
        };
        let stale: Vec<_> = self
            .programme_directorates
            .values()
            .filter(|link| touches_programme_directorate(*link))
            .map(|link| link.id)
            .collect();
        for id in stale {
            self.programme_directorates.remove(&id);
            removed.push(NodeRef::ProgrammeDirectorateLink(id));
        }

        let touches_division_programme = |link: &DivisionProgrammeLink| match node {
            NodeRef::Programme(id) => link.programme == id,
            NodeRef::Division(id) => link.division == id,
            _ => false,
        };
        let stale: Vec<_> = self
            .division_programmes
            .values()
            .filter(|link| touches_division_programme(*link))
            .map(|link| link.id)
            .collect();
        for id in stale {
            self.division_programmes.remove(&id);
            removed.push(NodeRef::DivisionProgrammeLink(id));
        }

        self.rebuild_relations();
        tracing::info!(node = %node, removed = removed.len(), "record removed");
        Ok(removed)
    }

    fn display_name(&self, node: NodeRef) -> String {
        self.entity(node)
            .map_or_else(|| node.to_string(), |entity| entity.name().into_owned())
    }
}

fn measured(measurement: &Measurement, field: NumericField) -> Option<f64> {
    match field {
        NumericField::Baseline => Some(measurement.baseline),
        NumericField::Target => Some(measurement.target),
        NumericField::Current => Some(measurement.current),
        _ => None,
    }
}

fn scored(scores: &EdgeScores, field: NumericField) -> Option<f64> {
    match field {
        NumericField::PerformanceScore => Some(scores.performance_score),
        NumericField::BudgetUtilization => Some(scores.budget_utilization),
        NumericField::CompletionPercentage => Some(scores.completion_percentage),
        _ => None,
    }
}

fn active_nodes<'a, T: Entity + 'a>(records: impl Iterator<Item = &'a T>) -> Vec<NodeRef> {
    records
        .filter(|record| record.is_active())
        .map(|record| record.node())
        .collect()
}

impl HierarchyView for PerformanceTree {
    fn contains(&self, node: NodeRef) -> bool {
        let active = self.entity(node).is_some_and(|entity| entity.is_active());
        // Rows whose endpoints are gone or archived are not wired
        active && (!node.category().is_link() || self.relations.contains_node(node))
    }

    fn nodes_of(&self, category: Category) -> Vec<NodeRef> {
        match category {
            Category::StrategicGoal => active_nodes(self.goals.values()),
            Category::StrategicObjective => active_nodes(self.objectives.values()),
            Category::Kra => active_nodes(self.kras.values()),
            Category::Kpi => active_nodes(self.kpis.values()),
            Category::Programme => active_nodes(self.programmes.values()),
            Category::ProgrammeObjective => active_nodes(self.programme_objectives.values()),
            Category::Outcome => active_nodes(self.outcomes.values()),
            Category::Intervention => active_nodes(self.interventions.values()),
            Category::Output => active_nodes(self.outputs.values()),
            Category::PiapAction => active_nodes(self.piap_actions.values()),
            Category::ProgrammeIndicator => active_nodes(self.indicators.values()),
            Category::Directorate => active_nodes(self.directorates.values()),
            Category::Division => active_nodes(self.divisions.values()),
            Category::ProgrammeDirectorateLink | Category::DivisionProgrammeLink => {
                let mut nodes: Vec<NodeRef> = self
                    .relations
                    .nodes()
                    .filter(|node| node.category() == category)
                    .collect();
                nodes.sort_unstable();
                nodes
            }
        }
    }

    fn children_of_type(&self, node: NodeRef, category: Category) -> Vec<NodeRef> {
        let mut children: Vec<NodeRef> = self
            .relations
            .neighbors_directed(node, Direction::Outgoing)
            .filter(|child| child.category() == category)
            .collect();
        children.sort_unstable();
        children
    }

    fn parent_of_type(&self, node: NodeRef, category: Category) -> Option<NodeRef> {
        self.relations
            .neighbors_directed(node, Direction::Incoming)
            .filter(|parent| parent.category() == category)
            .min()
    }

    fn numeric_field(&self, node: NodeRef, field: NumericField) -> Option<f64> {
        if !self.contains(node) {
            return None;
        }
        match node {
            NodeRef::StrategicGoal(id) => match field {
                NumericField::TargetPercentage => self.goals.get(&id).map(|g| g.target_percentage),
                _ => None,
            },
            NodeRef::Kpi(id) => {
                let kpi = self.kpis.get(&id)?;
                match field {
                    NumericField::Weight => Some(kpi.weight),
                    _ => measured(&kpi.measurement, field),
                }
            }
            NodeRef::ProgrammeIndicator(id) => {
                let indicator = self.indicators.get(&id)?;
                match field {
                    NumericField::ContributionWeight => Some(indicator.contribution_weight),
                    _ => measured(&indicator.measurement, field),
                }
            }
            NodeRef::PiapAction(id) => {
                let action = self.piap_actions.get(&id)?;
                match field {
                    NumericField::Progress => Some(action.progress),
                    NumericField::TotalBudget => Some(action.total_budget()),
                    _ => measured(&action.measurement, field),
                }
            }
            NodeRef::ProgrammeDirectorateLink(id) => {
                let link = self.programme_directorates.get(&id)?;
                match field {
                    NumericField::ResponsibilityPercentage => Some(link.responsibility_percentage),
                    _ => scored(&link.scores, field),
                }
            }
            NodeRef::DivisionProgrammeLink(id) => {
                scored(&self.division_programmes.get(&id)?.scores, field)
            }
            _ => None,
        }
    }

    fn measurement(&self, node: NodeRef) -> Option<Measurement> {
        if !self.contains(node) {
            return None;
        }
        match node {
            NodeRef::Kpi(id) => self.kpis.get(&id).map(|kpi| kpi.measurement.clone()),
            NodeRef::ProgrammeIndicator(id) => {
                self.indicators.get(&id).map(|i| i.measurement.clone())
            }
            NodeRef::PiapAction(id) => self.piap_actions.get(&id).map(|a| a.measurement.clone()),
            _ => None,
        }
    }

    fn validity(&self, node: NodeRef) -> DateWindow {
        self.entity(node)
            .map_or(DateWindow::OPEN, |entity| entity.window())
    }

    fn label(&self, node: NodeRef) -> Option<String> {
        match node {
            NodeRef::ProgrammeDirectorateLink(id) => {
                let link = self.programme_directorates.get(&id)?;
                Some(format!(
                    "{} / {}",
                    self.display_name(NodeRef::Programme(link.programme)),
                    self.display_name(NodeRef::Directorate(link.directorate))
                ))
            }
            NodeRef::DivisionProgrammeLink(id) => {
                let link = self.division_programmes.get(&id)?;
                Some(format!(
                    "{} / {}",
                    self.display_name(NodeRef::Division(link.division)),
                    self.display_name(NodeRef::Programme(link.programme))
                ))
            }
            _ => self.entity(node).map(|entity| entity.name().into_owned()),
        }
    }

    fn score_history(&self, node: NodeRef) -> Vec<ScoreRecord> {
        if !self.contains(node) {
            return Vec::new();
        }
        self.history.get(&node).cloned().unwrap_or_default()
    }
}
