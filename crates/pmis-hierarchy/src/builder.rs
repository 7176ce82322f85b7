//! Chainable construction of a snapshot

use crate::document::TreeDocument;
use crate::error::TreeError;
use crate::tree::PerformanceTree;
use pmis_model::{
    Directorate, Division, DivisionProgrammeLink, Intervention, Kpi, Kra, Outcome, Output,
    PiapAction, Programme, ProgrammeDirectorateLink, ProgrammeIndicator, ProgrammeObjective,
    ScoreRecord, StrategicGoal, StrategicObjective,
};

/// Collects records, then builds a [`PerformanceTree`]
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    doc: TreeDocument,
}

macro_rules! push_record {
    ($(#[$meta:meta])* $method:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        #[must_use]
        pub fn $method(mut self, record: $ty) -> Self {
            self.doc.$field.push(record);
            self
        }
    };
}

impl TreeBuilder {
    /// Empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    push_record!(
        /// Add a strategic goal
        goal, goals, StrategicGoal
    );
    push_record!(
        /// Add a strategic objective
        objective, objectives, StrategicObjective
    );
    push_record!(
        /// Add a key result area
        kra, kras, Kra
    );
    push_record!(
        /// Add a strategic KPI
        kpi, kpis, Kpi
    );
    push_record!(
        /// Add a programme
        programme, programmes, Programme
    );
    push_record!(
        /// Add a programme objective
        programme_objective, programme_objectives, ProgrammeObjective
    );
    push_record!(
        /// Add an intermediate outcome
        outcome, outcomes, Outcome
    );
    push_record!(
        /// Add an intervention
        intervention, interventions, Intervention
    );
    push_record!(
        /// Add an output
        output, outputs, Output
    );
    push_record!(
        /// Add a PIAP action
        piap_action, piap_actions, PiapAction
    );
    push_record!(
        /// Add a programme indicator
        indicator, indicators, ProgrammeIndicator
    );
    push_record!(
        /// Add a directorate
        directorate, directorates, Directorate
    );
    push_record!(
        /// Add a division
        division, divisions, Division
    );
    push_record!(
        /// Add a programme-directorate row
        programme_directorate, programme_directorates, ProgrammeDirectorateLink
    );
    push_record!(
        /// Add a division-programme row
        division_programme, division_programmes, DivisionProgrammeLink
    );
    push_record!(
        /// Add a dated indicator score
        score, score_history, ScoreRecord
    );

    /// Collected records as a document
    #[must_use]
    pub fn into_document(self) -> TreeDocument {
        self.doc
    }

    /// Build the snapshot
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::DuplicateNode`] for repeated identifiers.
    pub fn build(self) -> Result<PerformanceTree, TreeError> {
        PerformanceTree::from_document(self.doc)
    }
}
