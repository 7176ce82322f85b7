//! Derived values written back to records
//!
//! - Auto-calculated KPIs take their current value from the programme
//!   indicators feeding them
//! - Division-programme rows take their scores from their delivery figures

use super::PerformanceTree;
use crate::relation::Relation;
use petgraph::Direction;
use pmis_model::{Contribution, DivisionProgrammeLinkId, KpiId, NodeRef};

impl PerformanceTree {
    /// Active programme indicators feeding a KPI, in id order
    fn contributions(&self, kpi: KpiId) -> Vec<Contribution> {
        let from = NodeRef::Kpi(kpi);
        let mut contributors: Vec<NodeRef> = self
            .relations
            .neighbors_directed(from, Direction::Outgoing)
            .filter(|to| self.relations.edge_weight(from, *to) == Some(&Relation::Contributes))
            .collect();
        contributors.sort_unstable();
        contributors
            .into_iter()
            .filter_map(|node| match node {
                NodeRef::ProgrammeIndicator(id) => self.indicators.get(&id),
                _ => None,
            })
            .map(|indicator| Contribution {
                current: indicator.measurement.current,
                weight: indicator.contribution_weight,
                achievement: indicator.achievement(),
            })
            .collect()
    }

    /// Recalculate every auto-calculated KPI from its contributors
    ///
    /// Returns the KPIs whose current value changed.
    pub fn recalculate_kpis(&mut self) -> Vec<KpiId> {
        let pending: Vec<(KpiId, f64)> = self
            .kpis
            .values()
            .filter(|kpi| kpi.active)
            .filter_map(|kpi| {
                let method = kpi.calculation?;
                let value = method.evaluate(&self.contributions(kpi.id))?;
                Some((kpi.id, value))
            })
            .collect();

        let mut changed = Vec::new();
        for (id, value) in pending {
            if let Some(kpi) = self.kpis.get_mut(&id) {
                if (kpi.measurement.current - value).abs() >= f64::EPSILON {
                    kpi.measurement.current = value;
                    changed.push(id);
                }
            }
        }
        tracing::debug!(changed = changed.len(), "auto-calculated KPIs refreshed");
        changed
    }

    /// Recompute division-programme scores from their delivery figures
    ///
    /// Rows with no planned budget or beneficiaries keep their recorded
    /// scores. Returns the rows whose scores changed.
    pub fn refresh_link_scores(&mut self) -> Vec<DivisionProgrammeLinkId> {
        let changed: Vec<DivisionProgrammeLinkId> = self
            .division_programmes
            .values_mut()
            .filter(|link| link.active)
            .filter_map(|link| link.refresh_scores().then_some(link.id))
            .collect();
        tracing::debug!(changed = changed.len(), "division programme scores refreshed");
        changed
    }
}

#[cfg(test)]
mod tests {
    use crate::document::TreeDocument;
    use crate::tree::PerformanceTree;
    use pmis_model::{
        CalculationMethod, DeliveryFigures, Division, DivisionId, DivisionProgrammeLink,
        DivisionProgrammeLinkId, EdgeScores, IndicatorAnchor, IndicatorId, Kpi, KpiId,
        Measurement, Programme, ProgrammeId, ProgrammeIndicator,
    };

    fn doc() -> TreeDocument {
        let mut doc = TreeDocument::new();
        doc.programmes.push(Programme::new(ProgrammeId(1), "Mobility"));
        doc.indicators.push(
            ProgrammeIndicator::new(
                IndicatorId(1),
                "Km paved",
                IndicatorAnchor::Programme(ProgrammeId(1)),
                Measurement::new(10.0, 10.0),
            )
            .with_weight(3.0),
        );
        doc.indicators.push(ProgrammeIndicator::new(
            IndicatorId(2),
            "Bridges",
            IndicatorAnchor::Programme(ProgrammeId(1)),
            Measurement::new(10.0, 2.0),
        ));
        doc.kpis.push(
            Kpi::new(KpiId(1), "Network quality", None, Measurement::new(10.0, 0.0))
                .with_calculation(CalculationMethod::WeightedAverage, [IndicatorId(1), IndicatorId(2)]),
        );
        doc
    }

    #[test]
    fn weighted_average_recalculation() {
        let mut tree = PerformanceTree::from_document(doc()).unwrap();
        assert_eq!(tree.recalculate_kpis(), vec![KpiId(1)]);
        let current = tree.kpi(KpiId(1)).unwrap().measurement.current;
        assert!((current - 8.0).abs() < 1e-9);
        assert!(tree.recalculate_kpis().is_empty());
    }

    #[test]
    fn contributor_pointer_on_indicator_counts() {
        let mut doc = doc();
        doc.kpis[0].contributing_indicators.clear();
        doc.indicators[1].strategic_kpi = Some(KpiId(1));
        let mut tree = PerformanceTree::from_document(doc).unwrap();
        tree.recalculate_kpis();
        let current = tree.kpi(KpiId(1)).unwrap().measurement.current;
        assert!((current - 2.0).abs() < 1e-9);
    }

    #[test]
    fn manual_kpis_untouched() {
        let mut doc = doc();
        doc.kpis[0].calculation = None;
        let mut tree = PerformanceTree::from_document(doc).unwrap();
        assert!(tree.recalculate_kpis().is_empty());
    }

    #[test]
    fn link_scores_follow_delivery() {
        let mut doc = doc();
        doc.divisions.push(Division::new(DivisionId(1), "Roads", None));
        doc.division_programmes.push(
            DivisionProgrammeLink::new(
                DivisionProgrammeLinkId(1),
                DivisionId(1),
                ProgrammeId(1),
                EdgeScores::default(),
            )
            .with_delivery(DeliveryFigures {
                allocated_budget: 10.0,
                utilized_budget: 10.0,
                target_beneficiaries: 100.0,
                actual_beneficiaries: 100.0,
            }),
        );
        let mut tree = PerformanceTree::from_document(doc).unwrap();
        assert_eq!(tree.refresh_link_scores(), vec![DivisionProgrammeLinkId(1)]);
        let link = tree.division_programme(DivisionProgrammeLinkId(1)).unwrap();
        assert!((link.scores.performance_score - 100.0).abs() < 1e-9);
        assert!(tree.refresh_link_scores().is_empty());
    }

    #[test]
    fn recorded_scores_survive_refresh_without_delivery() {
        let mut doc = doc();
        doc.divisions.push(Division::new(DivisionId(1), "Roads", None));
        doc.division_programmes.push(DivisionProgrammeLink::new(
            DivisionProgrammeLinkId(1),
            DivisionId(1),
            ProgrammeId(1),
            EdgeScores::with_performance(115.0),
        ));
        let mut tree = PerformanceTree::from_document(doc).unwrap();
        assert!(tree.refresh_link_scores().is_empty());
        let link = tree.division_programme(DivisionProgrammeLinkId(1)).unwrap();
        assert_eq!(link.scores, EdgeScores::with_performance(115.0));
    }
}
