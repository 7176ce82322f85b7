//! Dated score history of indicators
//!
//! A [`ScoreRecord`] freezes one indicator's value and achievement on a day.
//! Trend analysis reads a series of them in date order.

use crate::category::NodeRef;
use crate::measurement::{IndicatorStatus, Measurement};
use crate::percent::Percent;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One dated score of a KPI or programme indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Scored indicator
    pub indicator: NodeRef,
    /// Day of the score
    pub date: NaiveDate,
    /// Indicator value on that day
    pub value: f64,
    /// Achievement on that day, as recorded
    pub achievement_percentage: f64,
    /// Target at the time of scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
}

impl ScoreRecord {
    /// Score with a recorded value and achievement
    #[inline]
    #[must_use]
    pub fn new(indicator: NodeRef, date: NaiveDate, value: f64, achievement_percentage: f64) -> Self {
        Self {
            indicator,
            date,
            value,
            achievement_percentage,
            target_value: None,
        }
    }

    /// Snapshot of a measurement on `date`
    #[must_use]
    pub fn from_measurement(indicator: NodeRef, date: NaiveDate, measurement: &Measurement) -> Self {
        Self {
            indicator,
            date,
            value: measurement.current,
            achievement_percentage: measurement.achievement().value(),
            target_value: Some(measurement.target),
        }
    }

    /// With the target at the time of scoring
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target_value = Some(target);
        self
    }

    /// Recorded achievement, clamped
    #[inline]
    #[must_use]
    pub fn achievement(&self) -> Percent {
        Percent::new(self.achievement_percentage)
    }

    /// Status the score had on its day
    #[inline]
    #[must_use]
    pub fn status(&self) -> IndicatorStatus {
        IndicatorStatus::from_achievement(self.achievement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{IndicatorId, KpiId};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    #[test]
    fn recorded_achievement_reads_clamped() {
        let score = ScoreRecord::new(NodeRef::Kpi(KpiId(1)), day(1), 130.0, 130.0);
        assert_eq!(score.achievement(), Percent::FULL);
        assert_eq!(score.status(), IndicatorStatus::Achieved);

        let score = ScoreRecord::new(NodeRef::Kpi(KpiId(1)), day(1), 5.0, 65.0);
        assert_eq!(score.status(), IndicatorStatus::AtRisk);
    }

    #[test]
    fn snapshot_of_measurement() {
        let measurement = Measurement::new(200.0, 50.0);
        let score =
            ScoreRecord::from_measurement(NodeRef::ProgrammeIndicator(IndicatorId(4)), day(2), &measurement);
        assert!((score.value - 50.0).abs() < f64::EPSILON);
        assert!((score.achievement_percentage - 25.0).abs() < 1e-9);
        assert_eq!(score.target_value, Some(200.0));
        assert_eq!(score.status(), IndicatorStatus::Behind);
    }

    #[test]
    fn text_form_of_indicator() {
        let score: ScoreRecord = serde_json::from_str(
            r#"{"indicator": "kpi:3", "date": "2024-09-05", "value": 8.0, "achievement_percentage": 80.0}"#,
        )
        .unwrap();
        assert_eq!(score.indicator, NodeRef::Kpi(KpiId(3)));
        assert_eq!(score.date, day(5));
        assert_eq!(score.target_value, None);
        assert_eq!(score.status(), IndicatorStatus::OnTrack);
    }
}
