//! Serializable snapshot document
//!
//! The persistence layer hands the engine a [`TreeDocument`]: flat lists of
//! records per category, with relations expressed as identifier fields.

use crate::error::TreeError;
use pmis_model::{
    Directorate, Division, DivisionProgrammeLink, Intervention, Kpi, Kra, Outcome, Output,
    PiapAction, Programme, ProgrammeDirectorateLink, ProgrammeIndicator, ProgrammeObjective,
    ScoreRecord, StrategicGoal, StrategicObjective,
};
use serde::{Deserialize, Serialize};

/// Flat list of records per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct TreeDocument {
    pub goals: Vec<StrategicGoal>,
    pub objectives: Vec<StrategicObjective>,
    pub kras: Vec<Kra>,
    pub kpis: Vec<Kpi>,
    pub programmes: Vec<Programme>,
    pub programme_objectives: Vec<ProgrammeObjective>,
    pub outcomes: Vec<Outcome>,
    pub interventions: Vec<Intervention>,
    pub outputs: Vec<Output>,
    pub piap_actions: Vec<PiapAction>,
    pub indicators: Vec<ProgrammeIndicator>,
    pub directorates: Vec<Directorate>,
    pub divisions: Vec<Division>,
    pub programme_directorates: Vec<ProgrammeDirectorateLink>,
    pub division_programmes: Vec<DivisionProgrammeLink>,
    pub score_history: Vec<ScoreRecord>,
}

impl TreeDocument {
    /// Empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode from JSON
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Document`] for malformed input.
    pub fn from_json(text: &str) -> Result<Self, TreeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Document`] if a record cannot be encoded.
    pub fn to_json_pretty(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Total number of records, score history excluded
    #[must_use]
    pub fn len(&self) -> usize {
        self.goals.len()
            + self.objectives.len()
            + self.kras.len()
            + self.kpis.len()
            + self.programmes.len()
            + self.programme_objectives.len()
            + self.outcomes.len()
            + self.interventions.len()
            + self.outputs.len()
            + self.piap_actions.len()
            + self.indicators.len()
            + self.directorates.len()
            + self.divisions.len()
            + self.programme_directorates.len()
            + self.division_programmes.len()
    }

    /// Whether the document has no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
