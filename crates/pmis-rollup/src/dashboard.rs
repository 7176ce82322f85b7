//! Dashboard report and period options
//!
//! [`build_dashboard`] gathers everything a dashboard page shows for one
//! filter combination from a single recompute of the filtered view.

use crate::config::RollupConfig;
use crate::counts::descendants;
use crate::engine::{recompute, RollupTable};
use crate::filter::DashboardFilters;
use crate::filtered::{restrict_categories, FilteredView};
use crate::summary::{summarize, summarize_table, Summary};
use chrono::{DateTime, Utc};
use pmis_hierarchy::{HierarchyView, NumericField};
use pmis_model::{Category, FiscalYear, NodeRef, Percent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest span of fiscal years one record contributes options for
const MAX_OPTION_SPAN: usize = 50;

/// Performance of one KRA or goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePerformance {
    /// Record
    pub node: NodeRef,
    /// Display name
    pub name: String,
    /// Rolled-up percentage
    pub percentage: Percent,
    /// KPIs beneath it
    pub kpi_count: usize,
    /// Parent label, for KRAs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Target percentage, for goals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
}

/// One entry of the top indicator list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorEntry {
    /// KPI or programme indicator
    pub node: NodeRef,
    /// Display name
    pub name: String,
    /// Achievement
    pub achievement: Percent,
}

/// Contribution of one directorate or division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitContribution {
    /// Directorate or division
    pub node: NodeRef,
    /// Display name
    pub name: String,
    /// Mean percentage of the programmes it implements
    pub programme_progress: Percent,
    /// Mean achievement of the indicators it answers for
    pub indicator_achievement: Percent,
    /// Indicators at or above the on-target threshold
    pub on_target: usize,
    /// Indicators counted
    pub total_indicators: usize,
}

/// Everything a dashboard shows for one filter combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    /// Filters applied
    pub filters: DashboardFilters,
    /// Summary of the filtered view
    pub summary: Summary,
    /// KRAs with at least one visible KPI
    pub kras: Vec<NodePerformance>,
    /// Goals
    pub goals: Vec<NodePerformance>,
    /// Highest achievers, best first
    pub top_indicators: Vec<IndicatorEntry>,
    /// Directorates, KPI based
    pub directorates: Vec<UnitContribution>,
    /// Divisions, programme indicator based
    pub divisions: Vec<UnitContribution>,
}

fn label_of<V: HierarchyView + ?Sized>(view: &V, node: NodeRef) -> String {
    view.label(node).unwrap_or_else(|| node.to_string())
}

fn contribution<V: HierarchyView + ?Sized>(
    view: &V,
    table: &RollupTable,
    config: &RollupConfig,
    unit: NodeRef,
    indicators: &BTreeSet<NodeRef>,
) -> UnitContribution {
    let programmes = view.children_of_type(unit, Category::Programme);
    let achievements: Vec<Percent> = indicators.iter().map(|node| table.get(*node)).collect();
    UnitContribution {
        node: unit,
        name: label_of(view, unit),
        programme_progress: Percent::mean(programmes.iter().map(|p| table.get(*p))),
        indicator_achievement: Percent::mean(achievements.iter().copied()),
        on_target: achievements
            .iter()
            .filter(|a| a.value() >= config.on_target_threshold)
            .count(),
        total_indicators: achievements.len(),
    }
}

/// Build the dashboard for a filter combination
pub fn build_dashboard<V: HierarchyView + ?Sized>(
    view: &V,
    filters: DashboardFilters,
    config: &RollupConfig,
) -> DashboardReport {
    let filtered = FilteredView::new(view, filters, config);
    let table = recompute(&filtered);
    let mut summary = summarize_table(&filtered, &table, config);
    restrict_categories(&mut summary, filters.data_type);

    let kras = filtered
        .nodes_of(Category::Kra)
        .into_iter()
        .filter_map(|kra| {
            let kpis = filtered.children_of_type(kra, Category::Kpi);
            if kpis.is_empty() {
                return None;
            }
            let parent = filtered
                .parent_of_type(kra, Category::StrategicObjective)
                .or_else(|| filtered.parent_of_type(kra, Category::StrategicGoal))
                .map(|parent| label_of(&filtered, parent));
            Some(NodePerformance {
                node: kra,
                name: label_of(&filtered, kra),
                percentage: table.get(kra),
                kpi_count: kpis.len(),
                parent,
                target: None,
            })
        })
        .collect();

    let goals = filtered
        .nodes_of(Category::StrategicGoal)
        .into_iter()
        .map(|goal| NodePerformance {
            node: goal,
            name: label_of(&filtered, goal),
            percentage: table.get(goal),
            kpi_count: descendants(&filtered, goal)
                .iter()
                .filter(|node| node.category() == Category::Kpi)
                .count(),
            parent: None,
            target: Some(
                filtered
                    .numeric_field(goal, NumericField::TargetPercentage)
                    .unwrap_or(100.0),
            ),
        })
        .collect();

    let mut top_indicators: Vec<IndicatorEntry> = [Category::Kpi, Category::ProgrammeIndicator]
        .into_iter()
        .flat_map(|category| filtered.nodes_of(category))
        .map(|node| IndicatorEntry {
            node,
            name: label_of(&filtered, node),
            achievement: table.get(node),
        })
        .filter(|entry| !entry.achievement.is_zero())
        .collect();
    top_indicators.sort_by(|a, b| {
        b.achievement
            .value()
            .total_cmp(&a.achievement.value())
            .then_with(|| a.node.cmp(&b.node))
    });
    top_indicators.truncate(config.top_indicator_limit);

    let directorates = filtered
        .nodes_of(Category::Directorate)
        .into_iter()
        .map(|directorate| {
            let kpis: BTreeSet<NodeRef> = filtered
                .children_of_type(directorate, Category::Kpi)
                .into_iter()
                .collect();
            contribution(&filtered, &table, config, directorate, &kpis)
        })
        .collect();

    let divisions = filtered
        .nodes_of(Category::Division)
        .into_iter()
        .map(|division| {
            let indicators: BTreeSet<NodeRef> = filtered
                .children_of_type(division, Category::Programme)
                .into_iter()
                .flat_map(|programme| descendants(&filtered, programme))
                .filter(|node| node.category() == Category::ProgrammeIndicator)
                .collect();
            contribution(&filtered, &table, config, division, &indicators)
        })
        .collect();

    tracing::debug!(filters = ?filters, "dashboard built");
    DashboardReport {
        filters,
        summary,
        kras,
        goals,
        top_indicators,
        directorates,
        divisions,
    }
}

/// Summary stamped with the time it was taken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// When the snapshot was taken
    pub generated_at: DateTime<Utc>,
    /// Unfiltered summary
    pub summary: Summary,
}

impl DashboardSnapshot {
    /// Summarize a view now
    #[must_use]
    pub fn capture<V: HierarchyView + ?Sized>(
        view: &V,
        config: &RollupConfig,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at,
            summary: summarize(view, config),
        }
    }

    /// Whether the snapshot is older than `max_age` at `now`
    #[must_use]
    pub fn is_older_than(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.generated_at > max_age
    }
}

/// Selectable value of the period filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOption {
    /// Filter text, as accepted by `PeriodFilter`
    pub value: String,
    /// Human label
    pub label: String,
}

impl PeriodOption {
    fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Period filter options for the fiscal years dated records touch
///
/// `all` first, then every fiscal year ascending, then the quarters of the
/// latest year.
pub fn period_options<V: HierarchyView + ?Sized>(view: &V, config: &RollupConfig) -> Vec<PeriodOption> {
    let month = config.fiscal_year_start_month;
    let mut years = BTreeSet::new();
    for category in Category::ALL {
        for node in view.nodes_of(category) {
            let window = view.validity(node);
            let first = window.start.map(|day| FiscalYear::containing(day, month));
            let last = window.end.map(|day| FiscalYear::containing(day, month));
            match (first, last) {
                (Some(first), Some(last)) => years.extend(
                    (first.start_year()..=last.start_year())
                        .take(MAX_OPTION_SPAN)
                        .map(FiscalYear::new),
                ),
                (Some(year), None) | (None, Some(year)) => {
                    years.insert(year);
                }
                (None, None) => {}
            }
        }
    }

    let mut options = vec![PeriodOption::new("all", "All periods")];
    options.extend(
        years
            .iter()
            .map(|year| PeriodOption::new(format!("fy:{year}"), format!("FY {year}"))),
    );
    if let Some(latest) = years.last() {
        options.extend(latest.quarters().into_iter().map(|quarter| {
            PeriodOption::new(
                quarter.to_string(),
                format!("Q{} FY {}", quarter.number(), quarter.year()),
            )
        }));
    }
    options
}
