//! Trend analysis over indicator score history
//!
//! A series is read oldest first. Its direction compares the mean of the
//! last three scores with the mean of the first three (the last and first
//! score for shorter series); volatility is the sample standard deviation.
//!
//! - **Declining**: high risk below a 70% recent mean, medium otherwise
//! - **Improving**: low risk
//! - **Stable or too short**: medium risk below an 80% overall mean, low
//!   otherwise
//!
//! Confidence grows with the number of scores and reaches 100% at twelve.

use crate::config::RollupConfig;
use crate::risk::RiskLevel;
use chrono::{Days, NaiveDate};
use pmis_hierarchy::HierarchyView;
use pmis_model::{Category, NodeRef, Percent};
use serde::{Deserialize, Serialize};

/// Scores compared at each end of a series
const EDGE_SPAN: usize = 3;

/// Scores giving full confidence
const FULL_CONFIDENCE_POINTS: f64 = 12.0;

/// Differences of means smaller than this count as stable
const STABLE_EPSILON: f64 = 1e-9;

/// Direction of a score series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Recent scores above early ones
    Improving,
    /// Recent scores below early ones
    Declining,
    /// No change
    Stable,
    /// Fewer than two scores
    InsufficientData,
}

impl TrendDirection {
    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analysing one score series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Direction
    pub direction: TrendDirection,
    /// Latest score
    pub current: Percent,
    /// Mean of all scores
    pub average: Percent,
    /// Sample standard deviation, in percentage points
    pub volatility: f64,
    /// Scores analysed
    pub data_points: usize,
    /// Risk implied by the direction
    pub risk_level: RiskLevel,
    /// Confidence in the result
    pub confidence: Percent,
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[allow(clippy::cast_precision_loss)]
fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Analyse a series of scores, oldest first
///
/// Returns `None` for an empty series.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_trend(series: &[Percent]) -> Option<TrendAnalysis> {
    let values: Vec<f64> = series.iter().map(|score| score.value()).collect();
    let current = *values.last()?;
    let average = mean(&values);

    let (earlier, recent) = if values.len() >= EDGE_SPAN {
        (
            mean(&values[..EDGE_SPAN]),
            mean(&values[values.len() - EDGE_SPAN..]),
        )
    } else {
        (values[0], current)
    };
    let direction = if values.len() < 2 {
        TrendDirection::InsufficientData
    } else if recent - earlier > STABLE_EPSILON {
        TrendDirection::Improving
    } else if earlier - recent > STABLE_EPSILON {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    let risk_level = match direction {
        TrendDirection::Declining if recent < 70.0 => RiskLevel::High,
        TrendDirection::Declining => RiskLevel::Medium,
        TrendDirection::Improving => RiskLevel::Low,
        TrendDirection::Stable | TrendDirection::InsufficientData if average < 80.0 => {
            RiskLevel::Medium
        }
        TrendDirection::Stable | TrendDirection::InsufficientData => RiskLevel::Low,
    };

    Some(TrendAnalysis {
        direction,
        current: Percent::new(current),
        average: Percent::new(average),
        volatility: sample_std_dev(&values, average),
        data_points: values.len(),
        risk_level,
        confidence: Percent::new(values.len() as f64 / FULL_CONFIDENCE_POINTS * 100.0),
    })
}

/// Trend of one indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTrend {
    /// KPI or programme indicator
    pub node: NodeRef,
    /// Display name
    pub name: String,
    /// Analysis of its recent scores
    pub analysis: TrendAnalysis,
}

/// Trends of every visible indicator with enough recent scores
///
/// Scores dated within `trend_window_days` up to and including `as_of` are
/// analysed; indicators with fewer than `trend_min_points` of them are
/// skipped. KPIs come first, each family in id order.
pub fn indicator_trends<V: HierarchyView + ?Sized>(
    view: &V,
    as_of: NaiveDate,
    config: &RollupConfig,
) -> Vec<IndicatorTrend> {
    let since = as_of
        .checked_sub_days(Days::new(u64::from(config.trend_window_days)))
        .unwrap_or(NaiveDate::MIN);
    let min_points = config.trend_min_points.max(1);

    let trends: Vec<IndicatorTrend> = [Category::Kpi, Category::ProgrammeIndicator]
        .into_iter()
        .flat_map(|category| view.nodes_of(category))
        .filter_map(|node| {
            let series: Vec<Percent> = view
                .score_history(node)
                .iter()
                .filter(|score| score.date >= since && score.date <= as_of)
                .map(|score| score.achievement())
                .collect();
            if series.len() < min_points {
                return None;
            }
            Some(IndicatorTrend {
                node,
                name: view.label(node).unwrap_or_else(|| node.to_string()),
                analysis: analyze_trend(&series)?,
            })
        })
        .collect();
    tracing::debug!(%as_of, trends = trends.len(), "indicator trends analysed");
    trends
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmis_hierarchy::TreeBuilder;
    use pmis_model::{Kpi, KpiId, Measurement, ScoreRecord};

    fn series(values: &[f64]) -> Vec<Percent> {
        values.iter().copied().map(Percent::new).collect()
    }

    #[test]
    fn empty_series_has_no_trend() {
        assert_eq!(analyze_trend(&[]), None);
    }

    #[test]
    fn single_score_is_insufficient() {
        let trend = analyze_trend(&series(&[90.0])).unwrap();
        assert_eq!(trend.direction, TrendDirection::InsufficientData);
        assert!(trend.volatility.abs() < f64::EPSILON);
        assert_eq!(trend.risk_level, RiskLevel::Low);

        let trend = analyze_trend(&series(&[50.0])).unwrap();
        assert_eq!(trend.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn two_scores_compare_ends() {
        let trend = analyze_trend(&series(&[80.0, 60.0])).unwrap();
        assert_eq!(trend.direction, TrendDirection::Declining);
        assert_eq!(trend.risk_level, RiskLevel::High);
        assert_eq!(trend.current, Percent::new(60.0));
    }

    #[test]
    fn edge_means_set_direction() {
        // first three mean 60, last three mean 80
        let trend = analyze_trend(&series(&[50.0, 60.0, 70.0, 70.0, 80.0, 90.0])).unwrap();
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert_eq!(trend.risk_level, RiskLevel::Low);
        assert_eq!(trend.average, Percent::new(70.0));
        assert_eq!(trend.confidence, Percent::new(50.0));
        assert!((trend.volatility - 200.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn declining_above_seventy_is_medium() {
        let trend = analyze_trend(&series(&[95.0, 90.0, 85.0, 80.0, 75.0])).unwrap();
        assert_eq!(trend.direction, TrendDirection::Declining);
        assert_eq!(trend.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn stable_series_uses_overall_mean() {
        let trend = analyze_trend(&series(&[75.0, 75.0, 75.0])).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.risk_level, RiskLevel::Medium);

        let trend = analyze_trend(&series(&[85.0, 85.0, 85.0])).unwrap();
        assert_eq!(trend.risk_level, RiskLevel::Low);
    }

    #[test]
    fn three_scores_share_both_ends() {
        let trend = analyze_trend(&series(&[90.0, 60.0, 30.0])).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn confidence_saturates() {
        let trend = analyze_trend(&series(&[50.0; 20])).unwrap();
        assert_eq!(trend.confidence, Percent::FULL);
    }

    #[test]
    fn indicator_trends_use_recent_scores() {
        let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let kpi = NodeRef::Kpi(KpiId(1));
        let sparse = NodeRef::Kpi(KpiId(2));
        let tree = TreeBuilder::new()
            .kpi(Kpi::new(KpiId(1), "Revenue", None, Measurement::new(100.0, 40.0)))
            .kpi(Kpi::new(KpiId(2), "Permits", None, Measurement::new(100.0, 90.0)))
            .score(ScoreRecord::new(kpi, day(1, 10), 99.0, 99.0))
            .score(ScoreRecord::new(kpi, day(7, 1), 80.0, 80.0))
            .score(ScoreRecord::new(kpi, day(8, 1), 60.0, 60.0))
            .score(ScoreRecord::new(kpi, day(8, 15), 50.0, 50.0))
            .score(ScoreRecord::new(kpi, day(9, 1), 40.0, 40.0))
            .score(ScoreRecord::new(sparse, day(9, 1), 90.0, 90.0))
            .build()
            .unwrap();

        let trends = indicator_trends(&tree, day(9, 15), &RollupConfig::default());
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].node, kpi);
        assert_eq!(trends[0].name, "Revenue");
        assert_eq!(trends[0].analysis.data_points, 4);
        assert_eq!(trends[0].analysis.direction, TrendDirection::Declining);
        assert_eq!(trends[0].analysis.risk_level, RiskLevel::High);

        let loose = RollupConfig::default().with_trend_window(365, 1);
        assert_eq!(indicator_trends(&tree, day(9, 15), &loose).len(), 2);
    }
}
