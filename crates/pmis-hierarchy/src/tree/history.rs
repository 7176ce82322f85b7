//! Dated indicator scores
//!
//! Scores are grouped per indicator and kept in date order. Recording takes
//! at most one score per indicator and day.

use super::PerformanceTree;
use crate::view::HierarchyView;
use chrono::NaiveDate;
use pmis_model::{Category, NodeRef, ScoreRecord};
use std::collections::BTreeMap;

pub(super) fn group(records: Vec<ScoreRecord>) -> BTreeMap<NodeRef, Vec<ScoreRecord>> {
    let mut history: BTreeMap<NodeRef, Vec<ScoreRecord>> = BTreeMap::new();
    for record in records {
        if !record.indicator.category().is_indicator() {
            tracing::warn!(record = %record.indicator, "score for a non-indicator ignored");
            continue;
        }
        history.entry(record.indicator).or_default().push(record);
    }
    for series in history.values_mut() {
        series.sort_by_key(|score| score.date);
    }
    history
}

impl PerformanceTree {
    /// Score every visible KPI and programme indicator on `date`
    ///
    /// Indicators already scored that day are skipped. Returns the
    /// indicators scored.
    pub fn record_scores(&mut self, date: NaiveDate) -> Vec<NodeRef> {
        let pending: Vec<ScoreRecord> = [Category::Kpi, Category::ProgrammeIndicator]
            .into_iter()
            .flat_map(|category| self.nodes_of(category))
            .filter(|node| {
                !self
                    .history
                    .get(node)
                    .is_some_and(|series| series.iter().any(|score| score.date == date))
            })
            .filter_map(|node| {
                self.measurement(node)
                    .map(|measurement| ScoreRecord::from_measurement(node, date, &measurement))
            })
            .collect();

        let scored: Vec<NodeRef> = pending.iter().map(|score| score.indicator).collect();
        for record in pending {
            let series = self.history.entry(record.indicator).or_default();
            let at = series.partition_point(|score| score.date <= record.date);
            series.insert(at, record);
        }
        tracing::info!(%date, scored = scored.len(), "indicator scores recorded");
        scored
    }

    /// Number of stored scores
    #[must_use]
    pub fn score_count(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::TreeBuilder;
    use crate::view::HierarchyView;
    use chrono::NaiveDate;
    use pmis_model::{
        IndicatorAnchor, IndicatorId, Kpi, KpiId, Measurement, NodeRef, Programme, ProgrammeId,
        ProgrammeIndicator, ScoreRecord,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn builder() -> TreeBuilder {
        TreeBuilder::new()
            .kpi(Kpi::new(KpiId(1), "Revenue", None, Measurement::new(100.0, 80.0)))
            .programme(Programme::new(ProgrammeId(1), "Mobility"))
            .indicator(ProgrammeIndicator::new(
                IndicatorId(1),
                "Km paved",
                IndicatorAnchor::Programme(ProgrammeId(1)),
                Measurement::new(10.0, 5.0),
            ))
    }

    #[test]
    fn history_is_kept_in_date_order() {
        let kpi = NodeRef::Kpi(KpiId(1));
        let tree = builder()
            .score(ScoreRecord::new(kpi, day(20), 70.0, 70.0))
            .score(ScoreRecord::new(kpi, day(3), 50.0, 50.0))
            .score(ScoreRecord::new(NodeRef::Programme(ProgrammeId(1)), day(3), 1.0, 1.0))
            .build()
            .unwrap();
        let dates: Vec<NaiveDate> = tree.score_history(kpi).iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(3), day(20)]);
        assert_eq!(tree.score_count(), 2);
    }

    #[test]
    fn recording_scores_once_per_day() {
        let mut tree = builder().build().unwrap();
        let scored = tree.record_scores(day(10));
        assert_eq!(
            scored,
            vec![NodeRef::Kpi(KpiId(1)), NodeRef::ProgrammeIndicator(IndicatorId(1))]
        );
        assert!(tree.record_scores(day(10)).is_empty());

        let history = tree.score_history(NodeRef::ProgrammeIndicator(IndicatorId(1)));
        assert_eq!(history.len(), 1);
        assert!((history[0].achievement_percentage - 50.0).abs() < 1e-9);

        tree.record_scores(day(4));
        let dates: Vec<NaiveDate> = tree
            .score_history(NodeRef::Kpi(KpiId(1)))
            .iter()
            .map(|s| s.date)
            .collect();
        assert_eq!(dates, vec![day(4), day(10)]);
    }

    #[test]
    fn archived_indicator_history_is_hidden() {
        let mut kpi = Kpi::new(KpiId(2), "Archived", None, Measurement::new(10.0, 1.0));
        kpi.active = false;
        let node = NodeRef::Kpi(KpiId(2));
        let tree = builder()
            .kpi(kpi)
            .score(ScoreRecord::new(node, day(1), 1.0, 10.0))
            .build()
            .unwrap();
        assert!(tree.score_history(node).is_empty());
        assert_eq!(tree.to_document().score_history.len(), 1);
    }

    #[test]
    fn removal_drops_history() {
        let kpi = NodeRef::Kpi(KpiId(1));
        let mut tree = builder()
            .score(ScoreRecord::new(kpi, day(1), 60.0, 60.0))
            .build()
            .unwrap();
        tree.remove(kpi).unwrap();
        assert_eq!(tree.score_count(), 0);
        assert!(tree.to_document().score_history.is_empty());
    }
}
