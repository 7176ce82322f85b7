//! Bulk value updates
//!
//! The update flow loads one line per KPI and/or programme indicator in a
//! scope, lets the caller edit `new_value` and `selected`, and applies the
//! selected lines to `current_value`. Nothing is recomputed here: callers
//! re-summarise afterwards.

use super::PerformanceTree;
use crate::error::TreeError;
use pmis_model::{DirectorateId, IndicatorId, KpiId, Measurement, NodeRef, Percent, ProgrammeId};
use serde::{Deserialize, Serialize};

/// Which records an update session covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Strategic KPIs only
    Kpi,
    /// Programme indicators only
    PerformanceIndicator,
    /// Both
    #[default]
    Both,
}

impl UpdateKind {
    const fn covers_kpis(self) -> bool {
        matches!(self, Self::Kpi | Self::Both)
    }

    const fn covers_indicators(self) -> bool {
        matches!(self, Self::PerformanceIndicator | Self::Both)
    }
}

/// Scope of an update session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateScope {
    /// Record kinds to load
    #[serde(default)]
    pub kind: UpdateKind,
    /// Only records this directorate answers for
    #[serde(default)]
    pub directorate: Option<DirectorateId>,
    /// Only indicators of this programme
    #[serde(default)]
    pub programme: Option<ProgrammeId>,
}

impl UpdateScope {
    /// Every KPI and indicator
    #[inline]
    #[must_use]
    pub fn new(kind: UpdateKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Restricted to a directorate
    #[inline]
    #[must_use]
    pub fn with_directorate(mut self, directorate: DirectorateId) -> Self {
        self.directorate = Some(directorate);
        self
    }

    /// Restricted to a programme
    #[inline]
    #[must_use]
    pub fn with_programme(mut self, programme: ProgrammeId) -> Self {
        self.programme = Some(programme);
        self
    }
}

/// Record a line updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum UpdateTarget {
    /// Strategic KPI
    Kpi(KpiId),
    /// Programme indicator
    Indicator(IndicatorId),
}

impl UpdateTarget {
    /// Node of the target record
    #[must_use]
    pub const fn node(self) -> NodeRef {
        match self {
            Self::Kpi(id) => NodeRef::Kpi(id),
            Self::Indicator(id) => NodeRef::ProgrammeIndicator(id),
        }
    }
}

/// One editable line of an update session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLine {
    /// Record to update
    pub target: UpdateTarget,
    /// Record name at load time
    pub name: String,
    /// Current value at load time
    pub current_value: f64,
    /// Target value at load time
    pub target_value: f64,
    /// Value to write
    pub new_value: f64,
    /// Whether to apply this line
    #[serde(default = "selected_by_default")]
    pub selected: bool,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn selected_by_default() -> bool {
    true
}

impl UpdateLine {
    fn load(target: UpdateTarget, name: &str, measurement: &Measurement) -> Self {
        Self {
            target,
            name: name.to_string(),
            current_value: measurement.current,
            target_value: measurement.target,
            new_value: measurement.current,
            selected: true,
            notes: None,
        }
    }

    /// With a new value
    #[inline]
    #[must_use]
    pub fn with_new_value(mut self, value: f64) -> Self {
        self.new_value = value;
        self
    }

    /// Deselected
    #[inline]
    #[must_use]
    pub fn deselected(mut self) -> Self {
        self.selected = false;
        self
    }
}

/// One applied value change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    /// Updated record
    pub target: UpdateTarget,
    /// Value before
    pub previous: f64,
    /// Value after
    pub new: f64,
    /// Achievement before
    pub achievement_before: Percent,
    /// Achievement after
    pub achievement_after: Percent,
}

/// Result of applying an update session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdateOutcome {
    /// Applied changes, in line order
    pub changes: Vec<ValueChange>,
    /// Selected lines whose value did not change
    pub unchanged: usize,
    /// Lines not selected
    pub deselected: usize,
    /// Selected lines naming a missing or archived record, or a non-finite value
    pub skipped: Vec<UpdateTarget>,
}

impl BulkUpdateOutcome {
    /// Number of records changed
    #[inline]
    #[must_use]
    pub fn applied(&self) -> usize {
        self.changes.len()
    }
}

impl PerformanceTree {
    /// Editable lines for every active KPI and indicator in scope
    #[must_use]
    pub fn load_update_lines(&self, scope: &UpdateScope) -> Vec<UpdateLine> {
        let mut lines = Vec::new();
        if scope.kind.covers_kpis() {
            lines.extend(
                self.kpis
                    .values()
                    .filter(|kpi| kpi.active)
                    .filter(|kpi| scope.directorate.map_or(true, |d| kpi.directorate == Some(d)))
                    .map(|kpi| UpdateLine::load(UpdateTarget::Kpi(kpi.id), &kpi.name, &kpi.measurement)),
            );
        }
        if scope.kind.covers_indicators() {
            lines.extend(
                self.indicators
                    .values()
                    .filter(|indicator| indicator.active)
                    .filter(|indicator| {
                        scope
                            .directorate
                            .map_or(true, |d| indicator.directorate == Some(d))
                    })
                    .filter(|indicator| {
                        scope
                            .programme
                            .map_or(true, |p| self.indicator_programme(indicator.id) == Some(p))
                    })
                    .map(|indicator| {
                        UpdateLine::load(
                            UpdateTarget::Indicator(indicator.id),
                            &indicator.name,
                            &indicator.measurement,
                        )
                    }),
            );
        }
        lines
    }

    /// Write the selected lines' new values to `current_value`
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::EmptyUpdate`] when `lines` is empty.
    pub fn apply_bulk_update(&mut self, lines: &[UpdateLine]) -> Result<BulkUpdateOutcome, TreeError> {
        if lines.is_empty() {
            return Err(TreeError::EmptyUpdate);
        }

        let mut outcome = BulkUpdateOutcome::default();
        for line in lines {
            if !line.selected {
                outcome.deselected += 1;
                continue;
            }
            let measurement = match line.target {
                UpdateTarget::Kpi(id) => self
                    .kpis
                    .get_mut(&id)
                    .filter(|kpi| kpi.active)
                    .map(|kpi| &mut kpi.measurement),
                UpdateTarget::Indicator(id) => self
                    .indicators
                    .get_mut(&id)
                    .filter(|indicator| indicator.active)
                    .map(|indicator| &mut indicator.measurement),
            };
            let Some(measurement) = measurement.filter(|_| line.new_value.is_finite()) else {
                tracing::warn!(record = %line.target.node(), "skipping update line");
                outcome.skipped.push(line.target);
                continue;
            };
            if (measurement.current - line.new_value).abs() < f64::EPSILON {
                outcome.unchanged += 1;
                continue;
            }
            let achievement_before = measurement.achievement();
            let previous = measurement.current;
            measurement.current = line.new_value;
            outcome.changes.push(ValueChange {
                target: line.target,
                previous,
                new: line.new_value,
                achievement_before,
                achievement_after: measurement.achievement(),
            });
        }

        tracing::info!(
            applied = outcome.applied(),
            unchanged = outcome.unchanged,
            skipped = outcome.skipped.len(),
            "bulk update applied"
        );
        Ok(outcome)
    }
}
