//! Record categories and typed node references
//!
//! - [`Category`]: the kind of a record in the hierarchy
//! - [`NodeRef`]: a typed identifier for any record, usable as a graph node
//!
//! `NodeRef` renders as `category:id` (for example `kra:12`), which is also
//! its serialized form so it can key JSON maps.

use crate::error::ParseError;
use crate::ids::{
    DirectorateId, DivisionId, DivisionProgrammeLinkId, GoalId, IndicatorId, InterventionId,
    KpiId, KraId, ObjectiveId, OutcomeId, OutputId, PiapActionId, ProgrammeDirectorateLinkId,
    ProgrammeId, ProgrammeObjectiveId,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of record in the performance hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Strategic goal
    StrategicGoal,
    /// Strategic objective
    StrategicObjective,
    /// Key result area
    Kra,
    /// Strategic KPI
    Kpi,
    /// Programme
    Programme,
    /// Programme objective
    ProgrammeObjective,
    /// Intermediate outcome
    Outcome,
    /// Intervention
    Intervention,
    /// Output
    Output,
    /// PIAP action
    PiapAction,
    /// Programme performance indicator
    ProgrammeIndicator,
    /// Directorate
    Directorate,
    /// Division
    Division,
    /// Programme-directorate relationship row
    ProgrammeDirectorateLink,
    /// Division-programme relationship row
    DivisionProgrammeLink,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 15] = [
        Category::StrategicGoal,
        Category::StrategicObjective,
        Category::Kra,
        Category::Kpi,
        Category::Programme,
        Category::ProgrammeObjective,
        Category::Outcome,
        Category::Intervention,
        Category::Output,
        Category::PiapAction,
        Category::ProgrammeIndicator,
        Category::Directorate,
        Category::Division,
        Category::ProgrammeDirectorateLink,
        Category::DivisionProgrammeLink,
    ];

    /// Snake-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StrategicGoal => "strategic_goal",
            Self::StrategicObjective => "strategic_objective",
            Self::Kra => "kra",
            Self::Kpi => "kpi",
            Self::Programme => "programme",
            Self::ProgrammeObjective => "programme_objective",
            Self::Outcome => "outcome",
            Self::Intervention => "intervention",
            Self::Output => "output",
            Self::PiapAction => "piap_action",
            Self::ProgrammeIndicator => "programme_indicator",
            Self::Directorate => "directorate",
            Self::Division => "division",
            Self::ProgrammeDirectorateLink => "programme_directorate_link",
            Self::DivisionProgrammeLink => "division_programme_link",
        }
    }

    /// Finest-grained measured records (strategic KPIs and programme indicators)
    #[inline]
    #[must_use]
    pub const fn is_indicator(self) -> bool {
        matches!(self, Self::Kpi | Self::ProgrammeIndicator)
    }

    /// Relationship rows
    #[inline]
    #[must_use]
    pub const fn is_link(self) -> bool {
        matches!(
            self,
            Self::ProgrammeDirectorateLink | Self::DivisionProgrammeLink
        )
    }

    /// Organisational units
    #[inline]
    #[must_use]
    pub const fn is_unit(self) -> bool {
        matches!(self, Self::Directorate | Self::Division)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "goal" => return Ok(Self::StrategicGoal),
            "objective" => return Ok(Self::StrategicObjective),
            "indicator" => return Ok(Self::ProgrammeIndicator),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ParseError::unknown("category", s))
    }
}

/// Typed reference to one record of the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[allow(missing_docs)]
pub enum NodeRef {
    StrategicGoal(GoalId),
    StrategicObjective(ObjectiveId),
    Kra(KraId),
    Kpi(KpiId),
    Programme(ProgrammeId),
    ProgrammeObjective(ProgrammeObjectiveId),
    Outcome(OutcomeId),
    Intervention(InterventionId),
    Output(OutputId),
    PiapAction(PiapActionId),
    ProgrammeIndicator(IndicatorId),
    Directorate(DirectorateId),
    Division(DivisionId),
    ProgrammeDirectorateLink(ProgrammeDirectorateLinkId),
    DivisionProgrammeLink(DivisionProgrammeLinkId),
}

impl NodeRef {
    /// Build a reference from a category and a raw identifier
    #[must_use]
    pub const fn new(category: Category, raw: u64) -> Self {
        match category {
            Category::StrategicGoal => Self::StrategicGoal(GoalId(raw)),
            Category::StrategicObjective => Self::StrategicObjective(ObjectiveId(raw)),
            Category::Kra => Self::Kra(KraId(raw)),
            Category::Kpi => Self::Kpi(KpiId(raw)),
            Category::Programme => Self::Programme(ProgrammeId(raw)),
            Category::ProgrammeObjective => Self::ProgrammeObjective(ProgrammeObjectiveId(raw)),
            Category::Outcome => Self::Outcome(OutcomeId(raw)),
            Category::Intervention => Self::Intervention(InterventionId(raw)),
            Category::Output => Self::Output(OutputId(raw)),
            Category::PiapAction => Self::PiapAction(PiapActionId(raw)),
            Category::ProgrammeIndicator => Self::ProgrammeIndicator(IndicatorId(raw)),
            Category::Directorate => Self::Directorate(DirectorateId(raw)),
            Category::Division => Self::Division(DivisionId(raw)),
            Category::ProgrammeDirectorateLink => {
                Self::ProgrammeDirectorateLink(ProgrammeDirectorateLinkId(raw))
            }
            Category::DivisionProgrammeLink => {
                Self::DivisionProgrammeLink(DivisionProgrammeLinkId(raw))
            }
        }
    }

    /// Category of the referenced record
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::StrategicGoal(_) => Category::StrategicGoal,
            Self::StrategicObjective(_) => Category::StrategicObjective,
            Self::Kra(_) => Category::Kra,
            Self::Kpi(_) => Category::Kpi,
            Self::Programme(_) => Category::Programme,
            Self::ProgrammeObjective(_) => Category::ProgrammeObjective,
            Self::Outcome(_) => Category::Outcome,
            Self::Intervention(_) => Category::Intervention,
            Self::Output(_) => Category::Output,
            Self::PiapAction(_) => Category::PiapAction,
            Self::ProgrammeIndicator(_) => Category::ProgrammeIndicator,
            Self::Directorate(_) => Category::Directorate,
            Self::Division(_) => Category::Division,
            Self::ProgrammeDirectorateLink(_) => Category::ProgrammeDirectorateLink,
            Self::DivisionProgrammeLink(_) => Category::DivisionProgrammeLink,
        }
    }

    /// Raw identifier, without its category
    #[must_use]
    pub const fn raw_id(self) -> u64 {
        match self {
            Self::StrategicGoal(id) => id.0,
            Self::StrategicObjective(id) => id.0,
            Self::Kra(id) => id.0,
            Self::Kpi(id) => id.0,
            Self::Programme(id) => id.0,
            Self::ProgrammeObjective(id) => id.0,
            Self::Outcome(id) => id.0,
            Self::Intervention(id) => id.0,
            Self::Output(id) => id.0,
            Self::PiapAction(id) => id.0,
            Self::ProgrammeIndicator(id) => id.0,
            Self::Directorate(id) => id.0,
            Self::Division(id) => id.0,
            Self::ProgrammeDirectorateLink(id) => id.0,
            Self::DivisionProgrammeLink(id) => id.0,
        }
    }
}

impl std::fmt::Display for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category(), self.raw_id())
    }
}

impl FromStr for NodeRef {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, raw) = s
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidNodeRef(s.to_string()))?;
        let category: Category = category.parse()?;
        let raw: u64 = raw
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidNodeRef(s.to_string()))?;
        Ok(Self::new(category, raw))
    }
}

impl TryFrom<String> for NodeRef {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeRef> for String {
    fn from(node: NodeRef) -> Self {
        node.to_string()
    }
}
