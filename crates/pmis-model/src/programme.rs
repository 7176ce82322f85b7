//! Programme results-chain records
//!
//! Programme → programme objective → intermediate outcome → intervention →
//! output → PIAP action, with programme performance indicators anchored at
//! the programme, outcome or output level.

use crate::entity::{default_active, default_weight, named_entity};
use crate::ids::{
    DirectorateId, DivisionId, IndicatorId, InterventionId, KpiId, ObjectiveId, OutcomeId,
    OutputId, PiapActionId, ProgrammeId, ProgrammeObjectiveId,
};
use crate::measurement::{AchievementLevel, Measurement};
use crate::percent::Percent;
use crate::period::{DateWindow, FiscalBudget, FiscalYear};
use serde::{Deserialize, Serialize};

/// Programme of the development plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Programme {
    /// Identifier
    pub id: ProgrammeId,
    /// Name
    pub name: String,
    /// Short code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Strategic objectives the programme supports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strategic_objectives: Vec<ObjectiveId>,
    /// Implementing directorates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directorates: Vec<DirectorateId>,
    /// Single lead directorate kept from older records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_directorate: Option<DirectorateId>,
    /// Single implementing division kept from older records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<DivisionId>,
    /// Validity window
    #[serde(flatten)]
    pub window: DateWindow,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Programme {
    /// Active programme with no links
    #[must_use]
    pub fn new(id: ProgrammeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            strategic_objectives: Vec::new(),
            directorates: Vec::new(),
            lead_directorate: None,
            division: None,
            window: DateWindow::OPEN,
            active: true,
        }
    }

    /// Supporting a strategic objective
    #[must_use]
    pub fn with_objective(mut self, objective: ObjectiveId) -> Self {
        self.strategic_objectives.push(objective);
        self
    }

    /// Implemented by a directorate
    #[must_use]
    pub fn with_directorate(mut self, directorate: DirectorateId) -> Self {
        self.directorates.push(directorate);
        self
    }

    /// Implemented by a division
    #[inline]
    #[must_use]
    pub fn with_division(mut self, division: DivisionId) -> Self {
        self.division = Some(division);
        self
    }

    /// With validity window
    #[inline]
    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Every directorate named on the record, lead first, without repeats
    #[must_use]
    pub fn implementing_directorates(&self) -> Vec<DirectorateId> {
        let mut out: Vec<DirectorateId> = self.lead_directorate.into_iter().collect();
        for directorate in &self.directorates {
            if !out.contains(directorate) {
                out.push(*directorate);
            }
        }
        out
    }
}

named_entity!(Programme, Programme, dated);

/// Objective within a programme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeObjective {
    /// Identifier
    pub id: ProgrammeObjectiveId,
    /// Name
    pub name: String,
    /// Owning programme
    pub programme: ProgrammeId,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

named_entity!(ProgrammeObjective, ProgrammeObjective);

/// Intermediate outcome under a programme objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Identifier
    pub id: OutcomeId,
    /// Name
    pub name: String,
    /// Owning programme objective
    pub objective: ProgrammeObjectiveId,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

named_entity!(Outcome, Outcome);

/// Intervention under an outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// Identifier
    pub id: InterventionId,
    /// Name
    pub name: String,
    /// Owning outcome
    pub outcome: OutcomeId,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

named_entity!(Intervention, Intervention);

/// Output under an intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Identifier
    pub id: OutputId,
    /// Name
    pub name: String,
    /// Owning intervention
    pub intervention: InterventionId,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

named_entity!(Output, Output);

/// Execution state of a PIAP action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiapStatus {
    /// Not started
    #[default]
    NotStarted,
    /// Under way
    InProgress,
    /// Done
    Completed,
    /// Paused
    OnHold,
    /// Dropped
    Cancelled,
}

/// Programme implementation action plan item under an output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiapAction {
    /// Identifier
    pub id: PiapActionId,
    /// Name
    pub name: String,
    /// Owning output
    pub output: OutputId,
    /// Recorded progress in percent
    #[serde(default)]
    pub progress: f64,
    /// Execution state
    #[serde(default)]
    pub status: PiapStatus,
    /// Baseline, target and current values
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Budget per fiscal year
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub budgets: Vec<FiscalBudget>,
    /// Validity window
    #[serde(flatten)]
    pub window: DateWindow,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl PiapAction {
    /// Active action with recorded progress and no measurement
    #[must_use]
    pub fn new(id: PiapActionId, name: impl Into<String>, output: OutputId, progress: f64) -> Self {
        Self {
            id,
            name: name.into(),
            output,
            progress,
            status: PiapStatus::default(),
            measurement: Measurement::default(),
            budgets: Vec::new(),
            window: DateWindow::OPEN,
            active: true,
        }
    }

    /// With a measured target
    #[must_use]
    pub fn with_measurement(mut self, measurement: Measurement) -> Self {
        self.measurement = measurement;
        self
    }

    /// With a budget for one fiscal year
    #[must_use]
    pub fn with_budget(mut self, fiscal_year: FiscalYear, amount: f64) -> Self {
        self.budgets.push(FiscalBudget {
            fiscal_year,
            amount,
        });
        self
    }

    /// Sum of the fiscal-year budgets
    #[must_use]
    pub fn total_budget(&self) -> f64 {
        self.budgets.iter().map(|budget| budget.amount).sum()
    }

    /// Measured achievement when a positive target exists, recorded progress otherwise
    #[must_use]
    pub fn effective_progress(&self) -> Percent {
        if self.measurement.target > 0.0 {
            self.measurement.achievement()
        } else {
            Percent::new(self.progress)
        }
    }
}

named_entity!(PiapAction, PiapAction, dated);

/// Level of the results chain a programme indicator measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum IndicatorAnchor {
    /// Programme-level indicator
    Programme(ProgrammeId),
    /// Outcome-level indicator
    Outcome(OutcomeId),
    /// Output-level indicator
    Output(OutputId),
}

/// Programme performance indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeIndicator {
    /// Identifier
    pub id: IndicatorId,
    /// Name
    pub name: String,
    /// Results-chain level
    pub anchor: IndicatorAnchor,
    /// Baseline, target and current values
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Weight when feeding a strategic KPI or a directorate rollup
    #[serde(default = "default_weight")]
    pub contribution_weight: f64,
    /// Responsible directorate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directorate: Option<DirectorateId>,
    /// Responsible division
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<DivisionId>,
    /// Strategic KPI this indicator feeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_kpi: Option<KpiId>,
    /// Validity window
    #[serde(flatten)]
    pub window: DateWindow,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ProgrammeIndicator {
    /// Active indicator with unit contribution weight
    #[must_use]
    pub fn new(
        id: IndicatorId,
        name: impl Into<String>,
        anchor: IndicatorAnchor,
        measurement: Measurement,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            anchor,
            measurement,
            contribution_weight: default_weight(),
            directorate: None,
            division: None,
            strategic_kpi: None,
            window: DateWindow::OPEN,
            active: true,
        }
    }

    /// With responsible division
    #[inline]
    #[must_use]
    pub fn with_division(mut self, division: DivisionId) -> Self {
        self.division = Some(division);
        self
    }

    /// With responsible directorate
    #[inline]
    #[must_use]
    pub fn with_directorate(mut self, directorate: DirectorateId) -> Self {
        self.directorate = Some(directorate);
        self
    }

    /// With contribution weight
    #[inline]
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.contribution_weight = weight;
        self
    }

    /// With validity window
    #[inline]
    #[must_use]
    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Achievement percentage
    #[inline]
    #[must_use]
    pub fn achievement(&self) -> Percent {
        self.measurement.achievement()
    }

    /// Coarse achievement level
    #[inline]
    #[must_use]
    pub fn achievement_level(&self) -> AchievementLevel {
        AchievementLevel::from_achievement(self.achievement())
    }
}

named_entity!(ProgrammeIndicator, ProgrammeIndicator, dated);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piap_falls_back_to_progress() {
        let action = PiapAction::new(PiapActionId(1), "Procure vehicles", OutputId(1), 140.0);
        assert_eq!(action.effective_progress(), Percent::FULL);

        let measured = action.with_measurement(Measurement::new(10.0, 4.0));
        assert_eq!(measured.effective_progress(), Percent::new(40.0));
    }

    #[test]
    fn piap_total_budget_sums_years() {
        let action = PiapAction::new(PiapActionId(1), "Roads", OutputId(1), 0.0)
            .with_budget(FiscalYear::new(2024), 1.5)
            .with_budget(FiscalYear::new(2025), 2.0);
        assert!((action.total_budget() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn implementing_directorates_dedupes_lead() {
        let mut programme = Programme::new(ProgrammeId(1), "Urban mobility")
            .with_directorate(DirectorateId(2))
            .with_directorate(DirectorateId(3));
        programme.lead_directorate = Some(DirectorateId(3));
        assert_eq!(
            programme.implementing_directorates(),
            vec![DirectorateId(3), DirectorateId(2)]
        );
    }

    #[test]
    fn indicator_anchor_json_shape() {
        let indicator: ProgrammeIndicator = serde_json::from_str(
            r#"{"id": 9, "name": "Km paved", "anchor": {"kind": "output", "id": 3},
                "target_value": 10, "current_value": 6}"#,
        )
        .unwrap();
        assert_eq!(indicator.anchor, IndicatorAnchor::Output(OutputId(3)));
        assert_eq!(indicator.achievement_level(), AchievementLevel::Medium);
    }
}
