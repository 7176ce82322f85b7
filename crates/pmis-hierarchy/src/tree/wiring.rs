//! Derives the relation graph from record identifier fields

use super::PerformanceTree;
use crate::relation::{DanglingReference, Relation};
use petgraph::graphmap::DiGraphMap;
use pmis_model::{Entity, IndicatorAnchor, KraParent, NodeRef};

struct Wiring<'a> {
    tree: &'a PerformanceTree,
    graph: DiGraphMap<NodeRef, Relation>,
    dangling: Vec<DanglingReference>,
}

impl Wiring<'_> {
    /// Whether `target` can be linked to; missing targets are recorded
    fn resolves(&mut self, referrer: NodeRef, target: NodeRef) -> bool {
        match self.tree.entity(target) {
            Some(entity) => entity.is_active(),
            None => {
                tracing::warn!(
                    referrer = %referrer,
                    missing = %target,
                    "dangling reference treated as no parent"
                );
                self.dangling.push(DanglingReference { referrer, target });
                false
            }
        }
    }

    /// `parent -> child` when the child's pointer resolves
    fn attach(&mut self, child: NodeRef, parent: NodeRef, relation: Relation) {
        if self.resolves(child, parent) {
            self.graph.add_edge(parent, child, relation);
        }
    }

    /// Programme and unit point at each other
    fn implement(&mut self, programme: NodeRef, unit: NodeRef) {
        self.graph.add_edge(programme, unit, Relation::ImplementedBy);
        self.graph.add_edge(unit, programme, Relation::Implements);
    }

    fn add<'r, T: Entity + 'r>(&mut self, records: impl Iterator<Item = &'r T>) {
        for record in records.filter(|record| record.is_active()) {
            self.graph.add_node(record.node());
        }
    }
}

pub(super) fn wire(tree: &PerformanceTree) -> (DiGraphMap<NodeRef, Relation>, Vec<DanglingReference>) {
    let mut w = Wiring {
        tree,
        graph: DiGraphMap::new(),
        dangling: Vec::new(),
    };

    w.add(tree.goals.values());
    w.add(tree.objectives.values());
    w.add(tree.kras.values());
    w.add(tree.kpis.values());
    w.add(tree.programmes.values());
    w.add(tree.programme_objectives.values());
    w.add(tree.outcomes.values());
    w.add(tree.interventions.values());
    w.add(tree.outputs.values());
    w.add(tree.piap_actions.values());
    w.add(tree.indicators.values());
    w.add(tree.directorates.values());
    w.add(tree.divisions.values());

    for objective in tree.objectives.values().filter(|o| o.active) {
        if let Some(goal) = objective.goal {
            w.attach(objective.node(), NodeRef::StrategicGoal(goal), Relation::Contains);
        }
    }

    for kra in tree.kras.values().filter(|k| k.active) {
        match kra.parent {
            KraParent::Goal(goal) => {
                w.attach(kra.node(), NodeRef::StrategicGoal(goal), Relation::Contains);
            }
            KraParent::Objective(objective) => w.attach(
                kra.node(),
                NodeRef::StrategicObjective(objective),
                Relation::Contains,
            ),
            KraParent::Unlinked => {}
        }
    }

    for kpi in tree.kpis.values().filter(|k| k.active) {
        let node = kpi.node();
        if let Some(kra) = kpi.kra {
            w.attach(node, NodeRef::Kra(kra), Relation::Contains);
        }
        if let Some(directorate) = kpi.directorate {
            w.attach(node, NodeRef::Directorate(directorate), Relation::Responsible);
        }
        for indicator in &kpi.contributing_indicators {
            let indicator = NodeRef::ProgrammeIndicator(*indicator);
            if w.resolves(node, indicator) {
                w.graph.add_edge(node, indicator, Relation::Contributes);
            }
        }
    }

    for programme in tree.programmes.values().filter(|p| p.active) {
        let node = programme.node();
        for objective in &programme.strategic_objectives {
            w.attach(node, NodeRef::StrategicObjective(*objective), Relation::Supports);
        }
        for directorate in programme.implementing_directorates() {
            let unit = NodeRef::Directorate(directorate);
            if w.resolves(node, unit) {
                w.implement(node, unit);
            }
        }
        if let Some(division) = programme.division {
            let unit = NodeRef::Division(division);
            if w.resolves(node, unit) {
                w.implement(node, unit);
            }
        }
    }

    for objective in tree.programme_objectives.values().filter(|o| o.active) {
        w.attach(objective.node(), NodeRef::Programme(objective.programme), Relation::Contains);
    }
    for outcome in tree.outcomes.values().filter(|o| o.active) {
        w.attach(
            outcome.node(),
            NodeRef::ProgrammeObjective(outcome.objective),
            Relation::Contains,
        );
    }
    for intervention in tree.interventions.values().filter(|i| i.active) {
        w.attach(intervention.node(), NodeRef::Outcome(intervention.outcome), Relation::Contains);
    }
    for output in tree.outputs.values().filter(|o| o.active) {
        w.attach(
            output.node(),
            NodeRef::Intervention(output.intervention),
            Relation::Contains,
        );
    }
    for action in tree.piap_actions.values().filter(|a| a.active) {
        w.attach(action.node(), NodeRef::Output(action.output), Relation::Contains);
    }

    for indicator in tree.indicators.values().filter(|i| i.active) {
        let node = indicator.node();
        let anchor = match indicator.anchor {
            IndicatorAnchor::Programme(id) => NodeRef::Programme(id),
            IndicatorAnchor::Outcome(id) => NodeRef::Outcome(id),
            IndicatorAnchor::Output(id) => NodeRef::Output(id),
        };
        w.attach(node, anchor, Relation::Contains);
        if let Some(directorate) = indicator.directorate {
            w.attach(node, NodeRef::Directorate(directorate), Relation::Responsible);
        }
        if let Some(division) = indicator.division {
            w.attach(node, NodeRef::Division(division), Relation::Responsible);
        }
        if let Some(kpi) = indicator.strategic_kpi {
            w.attach(node, NodeRef::Kpi(kpi), Relation::Contributes);
        }
    }

    for division in tree.divisions.values().filter(|d| d.active) {
        if let Some(directorate) = division.directorate {
            w.attach(division.node(), NodeRef::Directorate(directorate), Relation::Contains);
        }
    }

    for link in tree.programme_directorates.values().filter(|l| l.active) {
        let node = link.node();
        let programme = NodeRef::Programme(link.programme);
        let directorate = NodeRef::Directorate(link.directorate);
        let programme_ok = w.resolves(node, programme);
        let directorate_ok = w.resolves(node, directorate);
        if programme_ok && directorate_ok {
            w.graph.add_edge(programme, node, Relation::Joins);
            w.graph.add_edge(directorate, node, Relation::Joins);
            w.implement(programme, directorate);
        }
    }

    for link in tree.division_programmes.values().filter(|l| l.active) {
        let node = link.node();
        let division = NodeRef::Division(link.division);
        let programme = NodeRef::Programme(link.programme);
        let division_ok = w.resolves(node, division);
        let programme_ok = w.resolves(node, programme);
        if division_ok && programme_ok {
            w.graph.add_edge(division, node, Relation::Joins);
            w.graph.add_edge(programme, node, Relation::Joins);
            w.implement(programme, division);
        }
    }

    (w.graph, w.dangling)
}
