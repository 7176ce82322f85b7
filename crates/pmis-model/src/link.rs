//! Relationship rows between programmes and organisational units
//!
//! Both kinds of row carry their own scores. Scores are stored as recorded
//! and only ever read through the `effective_*` accessors, which clamp to
//! `[0, 100]`.

use crate::category::NodeRef;
use crate::entity::{default_active, Entity};
use crate::ids::{
    DirectorateId, DivisionId, DivisionProgrammeLinkId, ProgrammeDirectorateLinkId, ProgrammeId,
};
use crate::percent::Percent;
use crate::period::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Scores recorded on a relationship row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeScores {
    /// Overall performance score
    #[serde(default)]
    pub performance_score: f64,
    /// Share of the allocated budget spent
    #[serde(default)]
    pub budget_utilization: f64,
    /// Share of planned delivery completed
    #[serde(default)]
    pub completion_percentage: f64,
}

impl EdgeScores {
    /// Scores with the given raw performance score and nothing else
    #[inline]
    #[must_use]
    pub fn with_performance(performance_score: f64) -> Self {
        Self {
            performance_score,
            ..Self::default()
        }
    }

    /// Performance score, clamped
    #[inline]
    #[must_use]
    pub fn effective_performance(&self) -> Percent {
        Percent::new(self.performance_score)
    }

    /// Budget utilisation, clamped
    #[inline]
    #[must_use]
    pub fn effective_budget_utilization(&self) -> Percent {
        Percent::new(self.budget_utilization)
    }

    /// Completion, clamped
    #[inline]
    #[must_use]
    pub fn effective_completion(&self) -> Percent {
        Percent::new(self.completion_percentage)
    }

    /// Scores derived from delivery figures
    ///
    /// Performance weighs completion 40%, budget utilisation 30% and
    /// beneficiary achievement 30%.
    #[must_use]
    pub fn from_delivery(delivery: &DeliveryFigures) -> Self {
        let budget = delivery.budget_utilization();
        let beneficiaries = delivery.beneficiary_achievement();
        let completion = beneficiaries;
        let performance =
            completion.value() * 0.4 + budget.value() * 0.3 + beneficiaries.value() * 0.3;
        Self {
            performance_score: performance,
            budget_utilization: budget.value(),
            completion_percentage: completion.value(),
        }
    }
}

/// Budget and beneficiary figures of a division's programme delivery
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DeliveryFigures {
    /// Budget allocated to the division for the programme
    #[serde(default)]
    pub allocated_budget: f64,
    /// Budget spent
    #[serde(default)]
    pub utilized_budget: f64,
    /// Planned beneficiaries
    #[serde(default)]
    pub target_beneficiaries: f64,
    /// Beneficiaries reached
    #[serde(default)]
    pub actual_beneficiaries: f64,
}

impl DeliveryFigures {
    /// Spent over allocated
    #[inline]
    #[must_use]
    pub fn budget_utilization(&self) -> Percent {
        Percent::ratio(self.utilized_budget, self.allocated_budget)
    }

    /// Reached over planned beneficiaries
    #[inline]
    #[must_use]
    pub fn beneficiary_achievement(&self) -> Percent {
        Percent::ratio(self.actual_beneficiaries, self.target_beneficiaries)
    }

    /// Whether any budget or beneficiaries were planned
    #[inline]
    #[must_use]
    pub fn is_planned(&self) -> bool {
        self.allocated_budget > 0.0 || self.target_beneficiaries > 0.0
    }
}

/// Role of a directorate in implementing a programme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationRole {
    /// Primary implementer
    #[default]
    Primary,
    /// Supporting implementer
    Supporting,
    /// Coordinating role
    Coordinating,
    /// Monitoring role
    Monitoring,
}

/// Programme-directorate relationship row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgrammeDirectorateLink {
    /// Identifier
    pub id: ProgrammeDirectorateLinkId,
    /// Programme end
    pub programme: ProgrammeId,
    /// Directorate end
    pub directorate: DirectorateId,
    /// Role of the directorate
    #[serde(default)]
    pub role: ImplementationRole,
    /// Share of responsibility in percent
    #[serde(default)]
    pub responsibility_percentage: f64,
    /// Recorded scores
    #[serde(flatten)]
    pub scores: EdgeScores,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl ProgrammeDirectorateLink {
    /// Active primary-role row with the given scores
    #[must_use]
    pub fn new(
        id: ProgrammeDirectorateLinkId,
        programme: ProgrammeId,
        directorate: DirectorateId,
        scores: EdgeScores,
    ) -> Self {
        Self {
            id,
            programme,
            directorate,
            role: ImplementationRole::default(),
            responsibility_percentage: 0.0,
            scores,
            active: true,
        }
    }
}

impl Entity for ProgrammeDirectorateLink {
    fn node(&self) -> NodeRef {
        NodeRef::ProgrammeDirectorateLink(self.id)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "programme {} / directorate {}",
            self.programme, self.directorate
        ))
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Implementation state of a division's programme delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationStatus {
    /// Not started
    #[default]
    NotStarted,
    /// Planning phase
    Planning,
    /// Implementing
    Implementing,
    /// Monitoring
    Monitoring,
    /// Completed
    Completed,
    /// Suspended
    Suspended,
}

/// Priority of a division's programme delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low
    Low,
    /// Medium
    #[default]
    Medium,
    /// High
    High,
    /// Critical
    Critical,
}

/// Health flags of a division's programme delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeHealth {
    /// Score at least 70 while implementing or monitoring
    pub on_track: bool,
    /// Score below 50, or suspended
    pub delayed: bool,
    /// Score in `[50, 70)`, or not started
    pub requires_attention: bool,
}

impl EdgeHealth {
    /// Flags for a score and status
    #[must_use]
    pub fn assess(score: Percent, status: ImplementationStatus) -> Self {
        let score = score.value();
        Self {
            on_track: score >= 70.0
                && matches!(
                    status,
                    ImplementationStatus::Implementing | ImplementationStatus::Monitoring
                ),
            delayed: score < 50.0 || status == ImplementationStatus::Suspended,
            requires_attention: (50.0..70.0).contains(&score)
                || status == ImplementationStatus::NotStarted,
        }
    }
}

/// Division-programme relationship row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionProgrammeLink {
    /// Identifier
    pub id: DivisionProgrammeLinkId,
    /// Division end
    pub division: DivisionId,
    /// Programme end
    pub programme: ProgrammeId,
    /// Direct implementation, as opposed to support
    #[serde(default)]
    pub is_direct: bool,
    /// Implementation state
    #[serde(default)]
    pub status: ImplementationStatus,
    /// Priority
    #[serde(default)]
    pub priority: Priority,
    /// Budget and beneficiary figures
    #[serde(flatten)]
    pub delivery: DeliveryFigures,
    /// Recorded scores
    #[serde(flatten)]
    pub scores: EdgeScores,
    /// Implementation window
    #[serde(flatten)]
    pub window: DateWindow,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl DivisionProgrammeLink {
    /// Active direct row with the given scores
    #[must_use]
    pub fn new(
        id: DivisionProgrammeLinkId,
        division: DivisionId,
        programme: ProgrammeId,
        scores: EdgeScores,
    ) -> Self {
        Self {
            id,
            division,
            programme,
            is_direct: true,
            status: ImplementationStatus::default(),
            priority: Priority::default(),
            delivery: DeliveryFigures::default(),
            scores,
            window: DateWindow::OPEN,
            active: true,
        }
    }

    /// With delivery figures
    #[must_use]
    pub fn with_delivery(mut self, delivery: DeliveryFigures) -> Self {
        self.delivery = delivery;
        self
    }

    /// Recompute the scores from the delivery figures
    ///
    /// Rows without planned delivery keep their recorded scores. Returns
    /// whether the scores changed.
    pub fn refresh_scores(&mut self) -> bool {
        if !self.delivery.is_planned() {
            return false;
        }
        let before = self.scores;
        self.scores = EdgeScores::from_delivery(&self.delivery);
        self.scores != before
    }

    /// Health flags from the current score and status
    #[must_use]
    pub fn health(&self) -> EdgeHealth {
        EdgeHealth::assess(self.scores.effective_performance(), self.status)
    }

    /// Move to implementing, opening the window on `today`
    pub fn start(&mut self, today: NaiveDate) {
        self.status = ImplementationStatus::Implementing;
        self.window.start = Some(today);
    }

    /// Mark completed, closing the window on `today`
    pub fn complete(&mut self, today: NaiveDate) {
        self.status = ImplementationStatus::Completed;
        self.scores.completion_percentage = 100.0;
        self.window.end = Some(today);
    }

    /// Suspend delivery
    pub fn suspend(&mut self) {
        self.status = ImplementationStatus::Suspended;
    }
}

impl Entity for DivisionProgrammeLink {
    fn node(&self) -> NodeRef {
        NodeRef::DivisionProgrammeLink(self.id)
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "division {} / programme {}",
            self.division, self.programme
        ))
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn window(&self) -> DateWindow {
        self.window
    }
}
