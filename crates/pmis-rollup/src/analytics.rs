//! Performance analytics report
//!
//! [`build_analytics`] runs trend analysis, the risk assessment and decline
//! alerts over one filtered view as of a given day.

use crate::config::RollupConfig;
use crate::filter::DashboardFilters;
use crate::filtered::FilteredView;
use crate::risk::{assess_risk, decline_alerts, DeclineAlert, RiskAssessment};
use crate::trend::{indicator_trends, IndicatorTrend};
use chrono::NaiveDate;
use pmis_hierarchy::HierarchyView;
use serde::{Deserialize, Serialize};

/// Trends, risk and alerts for one filter combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Day the analysis looks back from
    pub as_of: NaiveDate,
    /// Filters applied
    pub filters: DashboardFilters,
    /// Indicators with enough recent scores
    pub trends: Vec<IndicatorTrend>,
    /// Organisation risk
    pub risk: RiskAssessment,
    /// KPIs behind or at risk
    pub alerts: Vec<DeclineAlert>,
}

/// Build the analytics report for a filter combination
pub fn build_analytics<V: HierarchyView + ?Sized>(
    view: &V,
    filters: DashboardFilters,
    as_of: NaiveDate,
    config: &RollupConfig,
) -> AnalyticsReport {
    let filtered = FilteredView::new(view, filters, config);
    let report = AnalyticsReport {
        as_of,
        filters,
        trends: indicator_trends(&filtered, as_of, config),
        risk: assess_risk(&filtered),
        alerts: decline_alerts(&filtered),
    };
    tracing::info!(
        %as_of,
        trends = report.trends.len(),
        alerts = report.alerts.len(),
        risk = %report.risk.risk_level,
        "analytics built"
    );
    report
}
