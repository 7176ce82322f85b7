//! Dashboard filters
//!
//! Five independent components, each with a textual form:
//!
//! - **period**: `all`, `fy:2024-2025`, `q2:2024-2025`, or a date range
//!   `2024-01-01..2024-06-30` with either side optional
//! - **scope** and **entity**: a root category and the id of the record to
//!   restrict to, or `all`
//! - **performance**: a band name or `all`
//! - **data_type**: `all`, `strategic`, `programme`, or a category name
//!
//! [`DashboardFilters::from_json`] is lenient: malformed values are logged
//! and replaced by their defaults. [`DashboardFilters::try_from_json`]
//! rejects them. Both ignore unknown keys.

use pmis_model::{
    Category, DateWindow, FiscalQuarter, FiscalYear, ParseError, PerformanceBand,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Invalid filter input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// Filters were not a JSON object
    #[error("filters must be a JSON object")]
    NotAnObject,

    /// A filter value was neither a string nor a number
    #[error("invalid value for filter '{key}': {value}")]
    InvalidValue {
        /// Filter key
        key: String,
        /// Rejected JSON
        value: String,
    },

    /// Unknown scope name
    #[error("unknown scope '{0}'")]
    UnknownScope(String),

    /// Unknown data type name
    #[error("unknown data type '{0}'")]
    UnknownDataType(String),

    /// Entity neither an id nor `all`
    #[error("invalid entity '{0}', expected an id or 'all'")]
    InvalidEntity(String),

    /// Malformed period or band
    #[error(transparent)]
    Parse(#[from] ParseError),
}

macro_rules! text_serde {
    ($ty:ty) => {
        impl TryFrom<String> for $ty {
            type Error = FilterError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.to_string()
            }
        }
    };
}

/// Time restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PeriodFilter {
    /// No restriction
    #[default]
    All,
    /// One fiscal year
    FiscalYear(FiscalYear),
    /// One fiscal quarter
    Quarter(FiscalQuarter),
    /// Explicit date range
    Range(DateWindow),
}

impl PeriodFilter {
    /// Date window the period covers, `None` when unrestricted
    ///
    /// A start month outside 1..=12 leaves fiscal periods unrestricted.
    #[must_use]
    pub fn window(self, fiscal_start_month: u32) -> Option<DateWindow> {
        match self {
            Self::All => None,
            Self::FiscalYear(year) => year.window(fiscal_start_month),
            Self::Quarter(quarter) => quarter.window(fiscal_start_month),
            Self::Range(window) => Some(window),
        }
    }
}

impl fmt::Display for PeriodFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::FiscalYear(year) => write!(f, "fy:{year}"),
            Self::Quarter(quarter) => write!(f, "{quarter}"),
            Self::Range(window) => write!(f, "{window}"),
        }
    }
}

impl FromStr for PeriodFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if let Some(year) = text.strip_prefix("fy:").or_else(|| text.strip_prefix("FY:")) {
            return Ok(Self::FiscalYear(year.parse()?));
        }
        if text.starts_with(['q', 'Q']) && text.contains(':') {
            return Ok(Self::Quarter(text.parse()?));
        }
        Ok(Self::Range(text.parse()?))
    }
}

text_serde!(PeriodFilter);

/// Root category a dashboard is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scope {
    /// Whole organisation
    #[default]
    Organization,
    /// One strategic goal
    StrategicGoal,
    /// One strategic objective
    StrategicObjective,
    /// One programme
    Programme,
    /// One directorate
    Directorate,
    /// One division
    Division,
}

impl Scope {
    /// Category of the scope root, `None` for the whole organisation
    #[must_use]
    pub const fn category(self) -> Option<Category> {
        match self {
            Self::Organization => None,
            Self::StrategicGoal => Some(Category::StrategicGoal),
            Self::StrategicObjective => Some(Category::StrategicObjective),
            Self::Programme => Some(Category::Programme),
            Self::Directorate => Some(Category::Directorate),
            Self::Division => Some(Category::Division),
        }
    }

    /// Canonical name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::StrategicGoal => "strategic_goal",
            Self::StrategicObjective => "strategic_objective",
            Self::Programme => "programme",
            Self::Directorate => "directorate",
            Self::Division => "division",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "organization" | "organisation" | "all" => Ok(Self::Organization),
            "strategic_goal" | "goal" => Ok(Self::StrategicGoal),
            "strategic_objective" | "objective" => Ok(Self::StrategicObjective),
            "programme" | "program" => Ok(Self::Programme),
            "directorate" => Ok(Self::Directorate),
            "division" => Ok(Self::Division),
            _ => Err(FilterError::UnknownScope(s.to_string())),
        }
    }
}

text_serde!(Scope);

/// Record a scope is rooted at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityFilter {
    /// Every record of the scope
    #[default]
    All,
    /// One record
    Id(u64),
}

impl fmt::Display for EntityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for EntityFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        text.parse()
            .map(Self::Id)
            .map_err(|_| FilterError::InvalidEntity(s.to_string()))
    }
}

text_serde!(EntityFilter);

/// Performance band restriction on indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BandFilter {
    /// Every band
    #[default]
    All,
    /// Indicators in one band
    Band(PerformanceBand),
}

impl BandFilter {
    /// Whether a band passes
    #[must_use]
    pub fn admits(self, band: PerformanceBand) -> bool {
        match self {
            Self::All => true,
            Self::Band(only) => only == band,
        }
    }
}

impl fmt::Display for BandFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Band(band) => write!(f, "{band}"),
        }
    }
}

impl FromStr for BandFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Ok(Self::Band(text.parse()?))
    }
}

text_serde!(BandFilter);

/// Which indicator families and categories a dashboard shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    /// Everything
    #[default]
    All,
    /// Strategic KPIs only
    Strategic,
    /// Programme indicators only
    Programme,
    /// One category's table row only
    Category(Category),
}

impl DataType {
    /// Whether indicators of `category` pass
    #[must_use]
    pub fn admits_indicator(self, category: Category) -> bool {
        match self {
            Self::All => true,
            Self::Strategic => category == Category::Kpi,
            Self::Programme => category == Category::ProgrammeIndicator,
            Self::Category(only) => !only.is_indicator() || only == category,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Strategic => f.write_str("strategic"),
            Self::Programme => f.write_str("programme"),
            Self::Category(category) => write!(f, "{category}"),
        }
    }
}

impl FromStr for DataType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "strategic" => Ok(Self::Strategic),
            "programme" | "program" => Ok(Self::Programme),
            other => other
                .parse()
                .map(Self::Category)
                .map_err(|_| FilterError::UnknownDataType(s.to_string())),
        }
    }
}

text_serde!(DataType);

/// Complete filter set for a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardFilters {
    /// Time restriction
    pub period: PeriodFilter,
    /// Root category
    pub scope: Scope,
    /// Root record
    pub entity: EntityFilter,
    /// Band restriction on indicators
    pub performance: BandFilter,
    /// Indicator family or category restriction
    pub data_type: DataType,
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

impl DashboardFilters {
    /// No restriction
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a period
    #[inline]
    #[must_use]
    pub fn with_period(mut self, period: PeriodFilter) -> Self {
        self.period = period;
        self
    }

    /// Restricted to one record and its descendants
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: Scope, entity: EntityFilter) -> Self {
        self.scope = scope;
        self.entity = entity;
        self
    }

    /// With a band restriction
    #[inline]
    #[must_use]
    pub fn with_performance(mut self, performance: BandFilter) -> Self {
        self.performance = performance;
        self
    }

    /// With a data type restriction
    #[inline]
    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Whether no component restricts anything
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), FilterError> {
        let text = text_of(value).ok_or_else(|| FilterError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        match key {
            "period" => self.period = text.parse()?,
            "scope" => self.scope = text.parse()?,
            "entity" => self.entity = text.parse()?,
            "performance" => self.performance = text.parse()?,
            "data_type" => self.data_type = text.parse()?,
            _ => tracing::debug!(key, "ignoring unknown filter"),
        }
        Ok(())
    }

    /// Strict parse of a JSON object
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] for a non-object or any malformed value.
    pub fn try_from_json(value: &Value) -> Result<Self, FilterError> {
        let object = value.as_object().ok_or(FilterError::NotAnObject)?;
        let mut filters = Self::default();
        for (key, value) in object {
            filters.set(key, value)?;
        }
        Ok(filters)
    }

    /// Lenient parse of a JSON object; malformed values fall back to defaults
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            tracing::warn!("filters are not an object, using defaults");
            return Self::default();
        };
        let mut filters = Self::default();
        for (key, value) in object {
            if let Err(error) = filters.set(key, value) {
                tracing::warn!(key = key.as_str(), %error, "ignoring malformed filter");
            }
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn period_forms() {
        assert_eq!("all".parse::<PeriodFilter>().unwrap(), PeriodFilter::All);
        assert_eq!(
            "fy:2024-2025".parse::<PeriodFilter>().unwrap(),
            PeriodFilter::FiscalYear(FiscalYear::new(2024))
        );
        let quarter: PeriodFilter = "q2:2024-2025".parse().unwrap();
        assert!(matches!(quarter, PeriodFilter::Quarter(q) if q.number() == 2));
        assert!(matches!(
            "2024-01-01..2024-03-31".parse::<PeriodFilter>().unwrap(),
            PeriodFilter::Range(_)
        ));
        assert!("fy:2024-2026".parse::<PeriodFilter>().is_err());
        assert!("fy:2147483647-0".parse::<PeriodFilter>().is_err());
        let lenient = DashboardFilters::from_json(&json!({"period": "fy:2147483647-0"}));
        assert_eq!(lenient.period, PeriodFilter::All);
    }

    #[test]
    fn period_text_round_trip() {
        for text in ["all", "fy:2023-2024", "q4:2023-2024"] {
            assert_eq!(text.parse::<PeriodFilter>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn data_type_admits() {
        assert!(DataType::Strategic.admits_indicator(Category::Kpi));
        assert!(!DataType::Strategic.admits_indicator(Category::ProgrammeIndicator));
        assert!(DataType::Category(Category::Kra).admits_indicator(Category::Kpi));
        assert!(!DataType::Category(Category::Kpi).admits_indicator(Category::ProgrammeIndicator));
        assert_eq!("kra".parse::<DataType>().unwrap(), DataType::Category(Category::Kra));
        assert_eq!("programme".parse::<DataType>().unwrap(), DataType::Programme);
    }

    #[test]
    fn strict_json_rejects_bad_values() {
        let err = DashboardFilters::try_from_json(&json!({"performance": "stellar"})).unwrap_err();
        assert!(matches!(err, FilterError::Parse(_)));
        assert_eq!(
            DashboardFilters::try_from_json(&json!([1])).unwrap_err(),
            FilterError::NotAnObject
        );
    }

    #[test]
    fn lenient_json_keeps_good_values() {
        let filters = DashboardFilters::from_json(&json!({
            "scope": "directorate",
            "entity": 4,
            "performance": "stellar",
            "colour": "blue"
        }));
        assert_eq!(filters.scope, Scope::Directorate);
        assert_eq!(filters.entity, EntityFilter::Id(4));
        assert_eq!(filters.performance, BandFilter::All);
    }

    #[test]
    fn serde_uses_text_forms() {
        let filters = DashboardFilters::new()
            .with_period(PeriodFilter::FiscalYear(FiscalYear::new(2024)))
            .with_performance(BandFilter::Band(PerformanceBand::Good));
        let value = serde_json::to_value(filters).unwrap();
        assert_eq!(value["period"], "fy:2024-2025");
        assert_eq!(value["performance"], "good");
        let back: DashboardFilters = serde_json::from_value(value).unwrap();
        assert_eq!(back, filters);
        assert!(DashboardFilters::new().is_unrestricted());
    }
}
