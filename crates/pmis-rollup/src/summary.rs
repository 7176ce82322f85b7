//! Whole-view summary
//!
//! Per-category counts and average percentages, plus the overall indicator
//! average and band distribution over strategic KPIs and programme
//! indicators together.

use crate::config::RollupConfig;
use crate::engine::{recompute, RollupTable};
use pmis_hierarchy::HierarchyView;
use pmis_model::{Category, IndicatorStatus, Percent, PerformanceBand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Count and mean percentage of one category
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Visible records
    pub count: usize,
    /// Mean percentage, 0 for none
    pub average: Percent,
}

/// Indicators per performance band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Distribution {
    /// At least 90%
    pub excellent: usize,
    /// At least 70%
    pub good: usize,
    /// At least 50%
    pub fair: usize,
    /// Below 50%
    pub poor: usize,
    /// Not started and left out of every band
    pub excluded: usize,
}

impl Distribution {
    fn record(&mut self, band: PerformanceBand) {
        match band {
            PerformanceBand::Excellent => self.excellent += 1,
            PerformanceBand::Good => self.good += 1,
            PerformanceBand::Fair => self.fair += 1,
            PerformanceBand::Poor => self.poor += 1,
        }
    }

    /// Indicators in one band
    #[must_use]
    pub const fn get(&self, band: PerformanceBand) -> usize {
        match band {
            PerformanceBand::Excellent => self.excellent,
            PerformanceBand::Good => self.good,
            PerformanceBand::Fair => self.fair,
            PerformanceBand::Poor => self.poor,
        }
    }

    /// Indicators in any band
    #[must_use]
    pub const fn banded(&self) -> usize {
        self.excellent + self.good + self.fair + self.poor
    }
}

/// Summary of a view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Per-category statistics
    pub categories: BTreeMap<Category, CategoryStats>,
    /// Strategic KPIs plus programme indicators
    pub indicator_count: usize,
    /// Mean achievement over those indicators
    pub avg_performance: Percent,
    /// Band distribution over those indicators
    pub distribution: Distribution,
}

impl Summary {
    /// Record count of a category, 0 if absent
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.categories.get(&category).map_or(0, |stats| stats.count)
    }

    /// Mean percentage of a category, 0 if absent
    #[must_use]
    pub fn average(&self, category: Category) -> Percent {
        self.categories
            .get(&category)
            .map_or(Percent::ZERO, |stats| stats.average)
    }

    /// Whether nothing is visible
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|stats| stats.count == 0)
    }
}

/// Summarize every visible node of a view
pub fn summarize<V: HierarchyView + ?Sized>(view: &V, config: &RollupConfig) -> Summary {
    let table = recompute(view);
    summarize_table(view, &table, config)
}

/// Summary from an already computed table
pub(crate) fn summarize_table<V: HierarchyView + ?Sized>(
    view: &V,
    table: &RollupTable,
    config: &RollupConfig,
) -> Summary {
    let mut summary = Summary::default();
    let mut indicators = Vec::new();

    for category in Category::ALL {
        let values: Vec<Percent> = view
            .nodes_of(category)
            .into_iter()
            .map(|node| table.get(node))
            .collect();
        if category.is_indicator() {
            indicators.extend(values.iter().copied());
        }
        summary.categories.insert(
            category,
            CategoryStats {
                count: values.len(),
                average: Percent::mean(values),
            },
        );
    }

    for achievement in &indicators {
        if config.exclude_not_started
            && IndicatorStatus::from_achievement(*achievement) == IndicatorStatus::NotStarted
        {
            summary.distribution.excluded += 1;
        } else {
            summary.distribution.record(PerformanceBand::of(*achievement));
        }
    }
    summary.indicator_count = indicators.len();
    summary.avg_performance = Percent::mean(indicators);

    tracing::debug!(
        indicators = summary.indicator_count,
        average = %summary.avg_performance,
        "summary computed"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmis_hierarchy::TreeBuilder;
    use pmis_model::{Kpi, KpiId, Kra, KraId, KraParent, Measurement};

    fn tree() -> pmis_hierarchy::PerformanceTree {
        TreeBuilder::new()
            .kra(Kra::new(KraId(1), "Revenue", KraParent::Unlinked))
            .kpi(Kpi::new(KpiId(1), "A", Some(KraId(1)), Measurement::new(100.0, 95.0)))
            .kpi(Kpi::new(KpiId(2), "B", Some(KraId(1)), Measurement::new(100.0, 70.0)))
            .kpi(Kpi::new(KpiId(3), "C", Some(KraId(1)), Measurement::new(100.0, 0.0)))
            .build()
            .unwrap()
    }

    #[test]
    fn bands_and_average() {
        let summary = summarize(&tree(), &RollupConfig::default());
        assert_eq!(summary.indicator_count, 3);
        assert_eq!(summary.distribution.excellent, 1);
        assert_eq!(summary.distribution.good, 1);
        assert_eq!(summary.distribution.poor, 1);
        assert!((summary.avg_performance.value() - 55.0).abs() < 1e-9);
        assert_eq!(summary.count(Category::Kra), 1);
        assert!((summary.average(Category::Kra).value() - 55.0).abs() < 1e-9);
    }

    #[test]
    fn not_started_can_be_excluded() {
        let config = RollupConfig::default().with_exclude_not_started(true);
        let summary = summarize(&tree(), &config);
        assert_eq!(summary.distribution.poor, 0);
        assert_eq!(summary.distribution.excluded, 1);
        assert_eq!(summary.distribution.banded(), 2);
    }

    #[test]
    fn empty_view_is_all_zero() {
        let tree = TreeBuilder::new().build().unwrap();
        let summary = summarize(&tree, &RollupConfig::default());
        assert!(summary.is_empty());
        assert_eq!(summary.avg_performance, Percent::ZERO);
        assert_eq!(summary.distribution, Distribution::default());
    }
}
