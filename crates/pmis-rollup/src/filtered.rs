//! Filtered read-only views
//!
//! [`FilteredView`] wraps any [`HierarchyView`] and hides the nodes a
//! [`DashboardFilters`] set excludes. The rollup, summary and count
//! functions run on it unchanged, so a filtered summary is computed exactly
//! like an unfiltered one over fewer nodes.
//!
//! A node is visible when it is visible in the inner view and:
//!
//! - its validity window intersects the period window
//! - it lies in the scope subtree, when an entity is selected
//! - for indicators, its family passes the data type and its achievement
//!   falls in the selected band
//! - for relationship rows, both endpoints are visible
//!
//! Score histories of visible indicators keep only the scores dated inside
//! the period window.

use crate::config::RollupConfig;
use crate::counts::descendants;
use crate::filter::{DashboardFilters, DataType, EntityFilter};
use crate::summary::{summarize, Summary};
use pmis_hierarchy::{HierarchyView, NumericField};
use pmis_model::{
    Category, DateWindow, Measurement, NodeRef, Percent, PerformanceBand, ScoreRecord,
};
use std::collections::BTreeSet;

/// A view restricted by dashboard filters
pub struct FilteredView<'a, V: HierarchyView + ?Sized> {
    inner: &'a V,
    filters: DashboardFilters,
    window: Option<DateWindow>,
    subtree: Option<BTreeSet<NodeRef>>,
}

impl<V: HierarchyView + ?Sized> std::fmt::Debug for FilteredView<'_, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteredView")
            .field("filters", &self.filters)
            .field("window", &self.window)
            .field("subtree", &self.subtree.as_ref().map(BTreeSet::len))
            .finish_non_exhaustive()
    }
}

impl<'a, V: HierarchyView + ?Sized> FilteredView<'a, V> {
    /// Apply `filters` to `inner`
    ///
    /// An entity that does not exist leaves the view empty.
    pub fn new(inner: &'a V, filters: DashboardFilters, config: &RollupConfig) -> Self {
        let window = filters.period.window(config.fiscal_year_start_month);
        if window.is_none() && filters.period != crate::filter::PeriodFilter::All {
            tracing::warn!(
                period = %filters.period,
                month = config.fiscal_year_start_month,
                "period has no window for this fiscal start month, not restricting"
            );
        }

        let subtree = match (filters.scope.category(), filters.entity) {
            (Some(category), EntityFilter::Id(raw)) => {
                let root = NodeRef::new(category, raw);
                if inner.contains(root) {
                    let mut nodes = descendants(inner, root);
                    nodes.insert(root);
                    Some(nodes)
                } else {
                    tracing::warn!(entity = %root, "filter entity not found, view is empty");
                    Some(BTreeSet::new())
                }
            }
            _ => None,
        };

        Self {
            inner,
            filters,
            window,
            subtree,
        }
    }

    /// Filters in effect
    #[must_use]
    pub fn filters(&self) -> &DashboardFilters {
        &self.filters
    }

    /// Unfiltered view
    #[must_use]
    pub fn inner(&self) -> &V {
        self.inner
    }

    fn in_period(&self, node: NodeRef) -> bool {
        self.window
            .as_ref()
            .map_or(true, |window| self.inner.validity(node).intersects(window))
    }

    fn in_subtree(&self, node: NodeRef) -> bool {
        self.subtree
            .as_ref()
            .map_or(true, |nodes| nodes.contains(&node))
    }

    fn indicator_passes(&self, node: NodeRef) -> bool {
        if !self.filters.data_type.admits_indicator(node.category()) {
            return false;
        }
        let achievement = self
            .inner
            .measurement(node)
            .map_or(Percent::ZERO, |measurement| measurement.achievement());
        self.filters.performance.admits(PerformanceBand::of(achievement))
    }

    fn link_endpoints_visible(&self, link: NodeRef) -> bool {
        let unit = match link.category() {
            Category::ProgrammeDirectorateLink => Category::Directorate,
            _ => Category::Division,
        };
        let programme = self.inner.parent_of_type(link, Category::Programme);
        let unit = self.inner.parent_of_type(link, unit);
        match (programme, unit) {
            (Some(programme), Some(unit)) => self.contains(programme) && self.contains(unit),
            _ => false,
        }
    }
}

impl<V: HierarchyView + ?Sized> HierarchyView for FilteredView<'_, V> {
    fn contains(&self, node: NodeRef) -> bool {
        if !self.inner.contains(node) || !self.in_period(node) {
            return false;
        }
        let category = node.category();
        if category.is_link() {
            return self.link_endpoints_visible(node);
        }
        if !self.in_subtree(node) {
            return false;
        }
        !category.is_indicator() || self.indicator_passes(node)
    }

    fn nodes_of(&self, category: Category) -> Vec<NodeRef> {
        self.inner
            .nodes_of(category)
            .into_iter()
            .filter(|node| self.contains(*node))
            .collect()
    }

    fn children_of_type(&self, node: NodeRef, category: Category) -> Vec<NodeRef> {
        if !self.contains(node) {
            return Vec::new();
        }
        self.inner
            .children_of_type(node, category)
            .into_iter()
            .filter(|child| self.contains(*child))
            .collect()
    }

    fn parent_of_type(&self, node: NodeRef, category: Category) -> Option<NodeRef> {
        self.inner
            .parent_of_type(node, category)
            .filter(|parent| self.contains(*parent))
    }

    fn numeric_field(&self, node: NodeRef, field: NumericField) -> Option<f64> {
        if self.contains(node) {
            self.inner.numeric_field(node, field)
        } else {
            None
        }
    }

    fn measurement(&self, node: NodeRef) -> Option<Measurement> {
        if self.contains(node) {
            self.inner.measurement(node)
        } else {
            None
        }
    }

    fn validity(&self, node: NodeRef) -> DateWindow {
        self.inner.validity(node)
    }

    fn label(&self, node: NodeRef) -> Option<String> {
        self.inner.label(node)
    }

    fn score_history(&self, node: NodeRef) -> Vec<ScoreRecord> {
        if !self.contains(node) {
            return Vec::new();
        }
        let mut history = self.inner.score_history(node);
        if let Some(window) = &self.window {
            history.retain(|score| window.contains(score.date));
        }
        history
    }
}

/// Summary of the nodes `filters` leaves visible
///
/// A category data type also narrows the category table to that category.
pub fn filtered_summarize<V: HierarchyView + ?Sized>(
    view: &V,
    filters: DashboardFilters,
    config: &RollupConfig,
) -> Summary {
    let filtered = FilteredView::new(view, filters, config);
    let mut summary = summarize(&filtered, config);
    restrict_categories(&mut summary, filters.data_type);
    summary
}

pub(crate) fn restrict_categories(summary: &mut Summary, data_type: DataType) {
    if let DataType::Category(only) = data_type {
        summary.categories.retain(|category, _| *category == only);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{BandFilter, PeriodFilter, Scope};
    use pmis_hierarchy::TreeBuilder;
    use pmis_model::{
        Directorate, DirectorateId, FiscalYear, Kpi, KpiId, Kra, KraId, KraParent,
        ProgrammeDirectorateLink, ProgrammeDirectorateLinkId, Programme, ProgrammeId, EdgeScores,
    };

    fn tree() -> pmis_hierarchy::PerformanceTree {
        let d2024 = "2024-08-01..2024-12-31".parse::<DateWindow>().unwrap();
        TreeBuilder::new()
            .kra(Kra::new(KraId(1), "Revenue", KraParent::Unlinked))
            .kpi(
                Kpi::new(KpiId(1), "High", Some(KraId(1)), Measurement::new(10.0, 10.0))
                    .with_window(d2024),
            )
            .kpi(Kpi::new(KpiId(2), "Low", Some(KraId(1)), Measurement::new(10.0, 1.0)))
            .directorate(Directorate::new(DirectorateId(1), "Works"))
            .programme(Programme::new(ProgrammeId(1), "Roads"))
            .programme_directorate(ProgrammeDirectorateLink::new(
                ProgrammeDirectorateLinkId(1),
                ProgrammeId(1),
                DirectorateId(1),
                EdgeScores::with_performance(70.0),
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn band_filter_hides_indicators() {
        let tree = tree();
        let filters = DashboardFilters::new().with_performance(BandFilter::Band(PerformanceBand::Poor));
        let view = FilteredView::new(&tree, filters, &RollupConfig::default());
        assert_eq!(view.nodes_of(Category::Kpi), vec![NodeRef::Kpi(KpiId(2))]);
    }

    #[test]
    fn period_excludes_disjoint_records() {
        let tree = tree();
        let filters =
            DashboardFilters::new().with_period(PeriodFilter::FiscalYear(FiscalYear::new(2025)));
        let view = FilteredView::new(&tree, filters, &RollupConfig::default());
        assert!(!view.contains(NodeRef::Kpi(KpiId(1))));
        assert!(view.contains(NodeRef::Kpi(KpiId(2))));
    }

    #[test]
    fn missing_entity_empties_view() {
        let tree = tree();
        let filters = DashboardFilters::new().with_scope(Scope::StrategicGoal, EntityFilter::Id(42));
        let view = FilteredView::new(&tree, filters, &RollupConfig::default());
        assert!(view.nodes_of(Category::Kpi).is_empty());
        assert!(view.nodes_of(Category::ProgrammeDirectorateLink).is_empty());
    }

    #[test]
    fn scope_keeps_link_rows_with_visible_endpoints() {
        let tree = tree();
        let filters = DashboardFilters::new().with_scope(Scope::Programme, EntityFilter::Id(1));
        let view = FilteredView::new(&tree, filters, &RollupConfig::default());
        let link = NodeRef::ProgrammeDirectorateLink(ProgrammeDirectorateLinkId(1));
        assert!(view.contains(link));
        assert!(!view.contains(NodeRef::Kra(KraId(1))));
    }

    #[test]
    fn category_data_type_narrows_table() {
        let tree = tree();
        let filters = DashboardFilters::new().with_data_type(DataType::Category(Category::Kra));
        let summary = filtered_summarize(&tree, filters, &RollupConfig::default());
        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.count(Category::Kra), 1);
    }

    #[test]
    fn period_trims_score_history() {
        let kpi = NodeRef::Kpi(KpiId(2));
        let day = |y, m| chrono::NaiveDate::from_ymd_opt(y, m, 15).unwrap();
        let tree = TreeBuilder::new()
            .kpi(Kpi::new(KpiId(2), "Low", None, Measurement::new(10.0, 1.0)))
            .score(ScoreRecord::new(kpi, day(2024, 3), 1.0, 10.0))
            .score(ScoreRecord::new(kpi, day(2024, 9), 2.0, 20.0))
            .score(ScoreRecord::new(kpi, day(2025, 8), 3.0, 30.0))
            .build()
            .unwrap();
        let filters =
            DashboardFilters::new().with_period(PeriodFilter::FiscalYear(FiscalYear::new(2024)));
        let view = FilteredView::new(&tree, filters, &RollupConfig::default());
        let dates: Vec<_> = view.score_history(kpi).iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(2024, 9)]);
        assert_eq!(tree.score_history(kpi).len(), 3);
    }
}
