//! Strategic plan records
//!
//! Strategic goal → strategic objective → key result area → KPI. A KRA may
//! hang off an objective, directly off a goal, or nothing at all.

use crate::entity::{default_active, default_weight, named_entity};
use crate::ids::{DirectorateId, GoalId, IndicatorId, KpiId, KraId, ObjectiveId};
use crate::measurement::Measurement;
use crate::percent::Percent;
use crate::period::DateWindow;
use serde::{Deserialize, Serialize};

fn default_goal_target() -> f64 {
    100.0
}

/// Top-level strategic goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicGoal {
    /// Identifier
    pub id: GoalId,
    /// Name
    pub name: String,
    /// Short code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Planned achievement for the goal, in percent
    #[serde(default = "default_goal_target")]
    pub target_percentage: f64,
    /// Validity window
    #[serde(flatten)]
    pub window: DateWindow,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl StrategicGoal {
    /// Active goal with a 100% target
    #[must_use]
    pub fn new(id: GoalId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            target_percentage: default_goal_target(),
            window: DateWindow::OPEN,
            active: true,
        }
    }

    /// With validity window
    #[inline]
    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }
}

named_entity!(StrategicGoal, StrategicGoal, dated);

/// Strategic objective, optionally under a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicObjective {
    /// Identifier
    pub id: ObjectiveId,
    /// Name
    pub name: String,
    /// Owning goal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalId>,
    /// Validity window
    #[serde(flatten)]
    pub window: DateWindow,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl StrategicObjective {
    /// Active objective
    #[must_use]
    pub fn new(id: ObjectiveId, name: impl Into<String>, goal: Option<GoalId>) -> Self {
        Self {
            id,
            name: name.into(),
            goal,
            window: DateWindow::OPEN,
            active: true,
        }
    }

    /// With validity window
    #[inline]
    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }
}

named_entity!(StrategicObjective, StrategicObjective, dated);

/// Where a key result area hangs in the strategic plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum KraParent {
    /// Not linked to the plan
    #[default]
    Unlinked,
    /// Directly under a goal
    Goal(GoalId),
    /// Under an objective
    Objective(ObjectiveId),
}

/// Key result area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kra {
    /// Identifier
    pub id: KraId,
    /// Name
    pub name: String,
    /// Position in the plan
    #[serde(default)]
    pub parent: KraParent,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Kra {
    /// Active KRA
    #[must_use]
    pub fn new(id: KraId, name: impl Into<String>, parent: KraParent) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
            active: true,
        }
    }
}

named_entity!(Kra, Kra);

/// How an auto-calculated KPI derives its current value from contributing
/// programme indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Contribution-weighted mean of current values; plain mean without weights
    WeightedAverage,
    /// Sum of current values
    Sum,
    /// Share of contributors at or above 100% achievement
    PercentageComplete,
    /// Number of contributors at or above 80% achievement
    MilestoneCount,
}

/// One contributing indicator as seen by a [`CalculationMethod`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// Current value
    pub current: f64,
    /// Contribution weight
    pub weight: f64,
    /// Achievement
    pub achievement: Percent,
}

impl CalculationMethod {
    /// Derived current value, `None` without contributors
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(self, contributions: &[Contribution]) -> Option<f64> {
        if contributions.is_empty() {
            return None;
        }
        let count = contributions.len() as f64;
        let value = match self {
            Self::WeightedAverage => {
                let total_weight: f64 = contributions.iter().map(|c| c.weight).sum();
                if total_weight > 0.0 {
                    contributions
                        .iter()
                        .map(|c| c.current * c.weight)
                        .sum::<f64>()
                        / total_weight
                } else {
                    contributions.iter().map(|c| c.current).sum::<f64>() / count
                }
            }
            Self::Sum => contributions.iter().map(|c| c.current).sum(),
            Self::PercentageComplete => {
                let complete = contributions
                    .iter()
                    .filter(|c| c.achievement.value() >= 100.0)
                    .count();
                complete as f64 / count * 100.0
            }
            Self::MilestoneCount => contributions
                .iter()
                .filter(|c| c.achievement.value() >= 80.0)
                .count() as f64,
        };
        Some(value)
    }
}

/// Strategic key performance indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    /// Identifier
    pub id: KpiId,
    /// Name
    pub name: String,
    /// Short code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Owning key result area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kra: Option<KraId>,
    /// Responsible directorate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directorate: Option<DirectorateId>,
    /// Baseline, target and current values
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Relative weight within its KRA
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Programme indicators feeding this KPI
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contributing_indicators: Vec<IndicatorId>,
    /// Auto-calculation from contributors, when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<CalculationMethod>,
    /// Validity window
    #[serde(flatten)]
    pub window: DateWindow,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Kpi {
    /// Active KPI under a KRA
    #[must_use]
    pub fn new(id: KpiId, name: impl Into<String>, kra: Option<KraId>, measurement: Measurement) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            kra,
            directorate: None,
            measurement,
            weight: default_weight(),
            contributing_indicators: Vec::new(),
            calculation: None,
            window: DateWindow::OPEN,
            active: true,
        }
    }

    /// With responsible directorate
    #[inline]
    #[must_use]
    pub fn with_directorate(mut self, directorate: DirectorateId) -> Self {
        self.directorate = Some(directorate);
        self
    }

    /// With validity window
    #[inline]
    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Auto-calculated from the given indicators
    #[must_use]
    pub fn with_calculation(
        mut self,
        method: CalculationMethod,
        indicators: impl IntoIterator<Item = IndicatorId>,
    ) -> Self {
        self.calculation = Some(method);
        self.contributing_indicators = indicators.into_iter().collect();
        self
    }

    /// Achievement percentage
    #[inline]
    #[must_use]
    pub fn achievement(&self) -> Percent {
        self.measurement.achievement()
    }
}

named_entity!(Kpi, Kpi, dated);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::NodeRef;

    fn contribution(current: f64, weight: f64, achievement: f64) -> Contribution {
        Contribution {
            current,
            weight,
            achievement: Percent::new(achievement),
        }
    }

    #[test]
    fn weighted_average_uses_weights() {
        let value = CalculationMethod::WeightedAverage
            .evaluate(&[contribution(10.0, 3.0, 0.0), contribution(20.0, 1.0, 0.0)])
            .unwrap();
        assert!((value - 12.5).abs() < 1e-9);
    }

    #[test]
    fn weighted_average_without_weights_is_plain_mean() {
        let value = CalculationMethod::WeightedAverage
            .evaluate(&[contribution(10.0, 0.0, 0.0), contribution(20.0, 0.0, 0.0)])
            .unwrap();
        assert!((value - 15.0).abs() < 1e-9);
    }

    #[test]
    fn completion_methods_count_achievers() {
        let contributors = [
            contribution(0.0, 1.0, 100.0),
            contribution(0.0, 1.0, 85.0),
            contribution(0.0, 1.0, 10.0),
            contribution(0.0, 1.0, 100.0),
        ];
        let pct = CalculationMethod::PercentageComplete
            .evaluate(&contributors)
            .unwrap();
        assert!((pct - 50.0).abs() < 1e-9);
        let milestones = CalculationMethod::MilestoneCount
            .evaluate(&contributors)
            .unwrap();
        assert!((milestones - 3.0).abs() < 1e-9);
    }

    #[test]
    fn no_contributors_no_value() {
        assert_eq!(CalculationMethod::Sum.evaluate(&[]), None);
    }

    #[test]
    fn kra_parent_json_shape() {
        let kra: Kra = serde_json::from_str(
            r#"{"id": 4, "name": "Revenue", "parent": {"kind": "objective", "id": 2}}"#,
        )
        .unwrap();
        assert_eq!(kra.parent, KraParent::Objective(ObjectiveId(2)));
        assert!(kra.active);

        let unlinked: Kra = serde_json::from_str(r#"{"id": 5, "name": "Misc"}"#).unwrap();
        assert_eq!(unlinked.parent, KraParent::Unlinked);
    }

    #[test]
    fn kpi_flattens_measurement() {
        let kpi: Kpi = serde_json::from_str(
            r#"{"id": 1, "name": "Revenue collected", "kra": 4,
                "target_value": 200, "current_value": 150, "start_date": "2024-07-01"}"#,
        )
        .unwrap();
        assert_eq!(kpi.achievement(), Percent::new(75.0));
        assert!(kpi.window.start.is_some());
        assert_eq!(kpi.node(), NodeRef::Kpi(KpiId(1)));
        assert!((kpi.weight - 1.0).abs() < f64::EPSILON);
    }
}
