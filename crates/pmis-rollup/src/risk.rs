//! Risk levels, organisation risk assessment and decline alerts
//!
//! A KPI is at risk when its status is `behind` or `at_risk`. The share of
//! at-risk KPIs sets the organisation's risk level:
//!
//! | share of visible KPIs | level    |
//! |-----------------------|----------|
//! | above 30%             | critical |
//! | above 20%             | high     |
//! | above 10%             | medium   |
//! | otherwise             | low      |

use pmis_hierarchy::HierarchyView;
use pmis_model::{Category, IndicatorStatus, NodeRef, Percent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Risk level, lowest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Nothing to act on
    #[default]
    Low,
    /// Worth watching
    Medium,
    /// Needs corrective action
    High,
    /// Widespread underperformance
    Critical,
}

impl RiskLevel {
    /// Level for a share of at-risk KPIs
    #[must_use]
    pub fn from_share(share: Percent) -> Self {
        let share = share.value();
        if share > 30.0 {
            Self::Critical
        } else if share > 20.0 {
            Self::High
        } else if share > 10.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a decline alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// KPI at risk
    Warning,
    /// KPI behind
    Critical,
}

impl AlertSeverity {
    /// Severity for a KPI status, `None` when no alert is due
    #[must_use]
    pub const fn for_status(status: IndicatorStatus) -> Option<Self> {
        match status {
            IndicatorStatus::Behind => Some(Self::Critical),
            IndicatorStatus::AtRisk => Some(Self::Warning),
            _ => None,
        }
    }

    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

/// A KPI whose performance is declining
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclineAlert {
    /// KPI
    pub node: NodeRef,
    /// Display name
    pub name: String,
    /// Current status
    pub status: IndicatorStatus,
    /// Alert severity
    pub severity: AlertSeverity,
    /// Current achievement
    pub achievement: Percent,
    /// Responsible directorate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directorate: Option<NodeRef>,
}

/// Organisation-wide risk over visible KPIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Visible KPIs
    pub total_kpis: usize,
    /// KPIs behind or at risk, in id order
    pub at_risk: Vec<NodeRef>,
    /// At-risk KPIs over visible KPIs
    pub risk_share: Percent,
    /// Level for that share
    pub risk_level: RiskLevel,
    /// At-risk KPIs per responsible directorate
    pub by_directorate: BTreeMap<NodeRef, Vec<NodeRef>>,
}

fn kpi_status<V: HierarchyView + ?Sized>(view: &V, kpi: NodeRef) -> IndicatorStatus {
    view.measurement(kpi)
        .map_or(IndicatorStatus::NotStarted, |measurement| measurement.status())
}

fn is_at_risk(status: IndicatorStatus) -> bool {
    matches!(status, IndicatorStatus::Behind | IndicatorStatus::AtRisk)
}

/// Risk assessment over the visible KPIs
#[allow(clippy::cast_precision_loss)]
pub fn assess_risk<V: HierarchyView + ?Sized>(view: &V) -> RiskAssessment {
    let kpis = view.nodes_of(Category::Kpi);
    let at_risk: Vec<NodeRef> = kpis
        .iter()
        .copied()
        .filter(|kpi| is_at_risk(kpi_status(view, *kpi)))
        .collect();

    let mut by_directorate: BTreeMap<NodeRef, Vec<NodeRef>> = BTreeMap::new();
    for kpi in &at_risk {
        if let Some(directorate) = view.parent_of_type(*kpi, Category::Directorate) {
            by_directorate.entry(directorate).or_default().push(*kpi);
        }
    }

    let risk_share = Percent::ratio(at_risk.len() as f64, kpis.len() as f64);
    let risk_level = RiskLevel::from_share(risk_share);
    tracing::debug!(
        total = kpis.len(),
        at_risk = at_risk.len(),
        level = %risk_level,
        "risk assessed"
    );
    RiskAssessment {
        total_kpis: kpis.len(),
        at_risk,
        risk_share,
        risk_level,
        by_directorate,
    }
}

/// Decline alerts for visible KPIs, critical first then by id
pub fn decline_alerts<V: HierarchyView + ?Sized>(view: &V) -> Vec<DeclineAlert> {
    let mut alerts: Vec<DeclineAlert> = view
        .nodes_of(Category::Kpi)
        .into_iter()
        .filter_map(|kpi| {
            let measurement = view.measurement(kpi)?;
            let status = measurement.status();
            let severity = AlertSeverity::for_status(status)?;
            Some(DeclineAlert {
                node: kpi,
                name: view.label(kpi).unwrap_or_else(|| kpi.to_string()),
                status,
                severity,
                achievement: measurement.achievement(),
                directorate: view.parent_of_type(kpi, Category::Directorate),
            })
        })
        .collect();
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.node.cmp(&b.node)));
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmis_hierarchy::TreeBuilder;
    use pmis_model::{Directorate, DirectorateId, Kpi, KpiId, Measurement};

    fn kpi(id: u64, current: f64) -> Kpi {
        Kpi::new(KpiId(id), format!("K{id}"), None, Measurement::new(100.0, current))
    }

    #[test]
    fn share_thresholds_are_exclusive() {
        assert_eq!(RiskLevel::from_share(Percent::new(10.0)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_share(Percent::new(10.5)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_share(Percent::new(20.0)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_share(Percent::new(30.0)), RiskLevel::High);
        assert_eq!(RiskLevel::from_share(Percent::new(31.0)), RiskLevel::Critical);
    }

    #[test]
    fn severity_follows_status() {
        assert_eq!(
            AlertSeverity::for_status(IndicatorStatus::Behind),
            Some(AlertSeverity::Critical)
        );
        assert_eq!(
            AlertSeverity::for_status(IndicatorStatus::AtRisk),
            Some(AlertSeverity::Warning)
        );
        assert_eq!(AlertSeverity::for_status(IndicatorStatus::OnTrack), None);
        assert_eq!(AlertSeverity::for_status(IndicatorStatus::NotStarted), None);
    }

    #[test]
    fn assessment_groups_by_directorate() {
        let tree = TreeBuilder::new()
            .directorate(Directorate::new(DirectorateId(1), "Works"))
            .kpi(kpi(1, 30.0).with_directorate(DirectorateId(1)))
            .kpi(kpi(2, 65.0))
            .kpi(kpi(3, 90.0))
            .kpi(kpi(4, 100.0))
            .kpi(kpi(5, 0.0))
            .build()
            .unwrap();
        let risk = assess_risk(&tree);
        assert_eq!(risk.total_kpis, 5);
        assert_eq!(risk.at_risk, vec![NodeRef::Kpi(KpiId(1)), NodeRef::Kpi(KpiId(2))]);
        assert_eq!(risk.risk_share, Percent::new(40.0));
        assert_eq!(risk.risk_level, RiskLevel::Critical);
        assert_eq!(
            risk.by_directorate.get(&NodeRef::Directorate(DirectorateId(1))),
            Some(&vec![NodeRef::Kpi(KpiId(1))])
        );
    }

    #[test]
    fn empty_view_is_low_risk() {
        let tree = TreeBuilder::new().build().unwrap();
        let risk = assess_risk(&tree);
        assert_eq!(risk.total_kpis, 0);
        assert_eq!(risk.risk_share, Percent::ZERO);
        assert_eq!(risk.risk_level, RiskLevel::Low);
    }

    #[test]
    fn alerts_put_critical_first() {
        let tree = TreeBuilder::new()
            .kpi(kpi(1, 65.0))
            .kpi(kpi(2, 30.0))
            .kpi(kpi(3, 95.0))
            .build()
            .unwrap();
        let alerts = decline_alerts(&tree);
        let order: Vec<(NodeRef, AlertSeverity)> =
            alerts.iter().map(|alert| (alert.node, alert.severity)).collect();
        assert_eq!(
            order,
            vec![
                (NodeRef::Kpi(KpiId(2)), AlertSeverity::Critical),
                (NodeRef::Kpi(KpiId(1)), AlertSeverity::Warning),
            ]
        );
        assert_eq!(alerts[0].status, IndicatorStatus::Behind);
        assert_eq!(alerts[0].name, "K2");
    }
}
