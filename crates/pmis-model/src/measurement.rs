//! Indicator measurements and derived achievement
//!
//! A [`Measurement`] is the baseline/target/current triple carried by
//! strategic KPIs, programme indicators and PIAP actions. Achievement is
//! derived from it according to the indicator direction ([`KpiType`]):
//!
//! - `increasing`: `current / target`
//! - `decreasing`: met when `current <= target`, otherwise the share of the
//!   baseline-to-target span already covered
//! - `target`: penalised by the relative distance from the target
//!
//! A non-positive target cannot be divided by. For increasing and target
//! indicators, any positive current value then counts as fully achieved and
//! anything else as 0. Decreasing indicators fall back to the
//! baseline-to-target span, or 0 without one.

use crate::error::ParseError;
use crate::percent::Percent;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Direction in which an indicator improves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiType {
    /// Higher is better
    #[default]
    Increasing,
    /// Lower is better
    Decreasing,
    /// Exact match is best
    Target,
}

/// Baseline, target and current values of an indicator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    /// Value at the start of the plan period
    #[serde(default, rename = "baseline_value")]
    pub baseline: f64,
    /// Planned value
    #[serde(default, rename = "target_value")]
    pub target: f64,
    /// Latest recorded value
    #[serde(default, rename = "current_value")]
    pub current: f64,
    /// Improvement direction
    #[serde(default, rename = "kpi_type")]
    pub kind: KpiType,
    /// Unit label (`%`, `number`, `UGX bn`, ...)
    #[serde(default, rename = "measurement_unit")]
    pub unit: String,
}

impl Measurement {
    /// Increasing measurement with no baseline
    #[inline]
    #[must_use]
    pub fn new(target: f64, current: f64) -> Self {
        Self {
            target,
            current,
            ..Self::default()
        }
    }

    /// With baseline
    #[inline]
    #[must_use]
    pub fn with_baseline(mut self, baseline: f64) -> Self {
        self.baseline = baseline;
        self
    }

    /// With direction
    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: KpiType) -> Self {
        self.kind = kind;
        self
    }

    /// With unit
    #[inline]
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Achievement percentage, always in `[0, 100]`
    #[must_use]
    pub fn achievement(&self) -> Percent {
        let (baseline, target, current) = (self.baseline, self.target, self.current);
        if !target.is_finite() || !current.is_finite() {
            return Percent::ZERO;
        }
        match self.kind {
            KpiType::Decreasing => {
                if target > 0.0 && current <= target {
                    Percent::FULL
                } else if baseline.is_finite() && baseline > target {
                    Percent::new((baseline - current) / (baseline - target) * 100.0)
                } else {
                    Percent::ZERO
                }
            }
            KpiType::Increasing | KpiType::Target if target <= 0.0 => {
                if current > 0.0 {
                    Percent::FULL
                } else {
                    Percent::ZERO
                }
            }
            KpiType::Increasing => Percent::ratio(current, target),
            KpiType::Target => Percent::new(100.0 - (current - target).abs() / target * 100.0),
        }
    }

    /// Status implied by the achievement
    #[inline]
    #[must_use]
    pub fn status(&self) -> IndicatorStatus {
        IndicatorStatus::from_achievement(self.achievement())
    }
}

/// Reporting status of an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorStatus {
    /// No progress recorded
    #[default]
    NotStarted,
    /// At least 80%
    OnTrack,
    /// At least 60%
    AtRisk,
    /// Below 60%
    Behind,
    /// Target reached
    Achieved,
}

impl IndicatorStatus {
    /// Classify an achievement percentage
    #[must_use]
    pub fn from_achievement(achievement: Percent) -> Self {
        let value = achievement.value();
        if achievement.is_zero() {
            Self::NotStarted
        } else if value >= 100.0 {
            Self::Achieved
        } else if value >= 80.0 {
            Self::OnTrack
        } else if value >= 60.0 {
            Self::AtRisk
        } else {
            Self::Behind
        }
    }

    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::OnTrack => "on_track",
            Self::AtRisk => "at_risk",
            Self::Behind => "behind",
            Self::Achieved => "achieved",
        }
    }
}

impl std::fmt::Display for IndicatorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse achievement level shown on programme indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementLevel {
    /// Nothing achieved
    #[default]
    None,
    /// Below 50%
    Low,
    /// At least 50%
    Medium,
    /// At least 80%
    High,
}

impl AchievementLevel {
    /// Classify an achievement percentage
    #[must_use]
    pub fn from_achievement(achievement: Percent) -> Self {
        let value = achievement.value();
        if achievement.is_zero() {
            Self::None
        } else if value >= 80.0 {
            Self::High
        } else if value >= 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Dashboard distribution band
///
/// Boundaries belong to the upper band: exactly 90 is excellent, exactly 70
/// is good, exactly 50 is fair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceBand {
    /// At least 90%
    Excellent,
    /// At least 70%
    Good,
    /// At least 50%
    Fair,
    /// Below 50%
    Poor,
}

impl PerformanceBand {
    /// All bands, best first
    pub const ALL: [PerformanceBand; 4] = [Self::Excellent, Self::Good, Self::Fair, Self::Poor];

    /// Band containing a percentage
    #[must_use]
    pub fn of(percent: Percent) -> Self {
        let value = percent.value();
        if value >= 90.0 {
            Self::Excellent
        } else if value >= 70.0 {
            Self::Good
        } else if value >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceBand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|band| band.as_str() == normalized)
            .ok_or_else(|| ParseError::unknown("performance band", s))
    }
}
