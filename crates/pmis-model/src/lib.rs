//! PMIS Model
//!
//! Typed records of an organisation's performance hierarchy.
//!
//! # Overview
//!
//! - **Strategic plan**: goals, objectives, key result areas and KPIs
//! - **Programme results chain**: programmes, objectives, outcomes,
//!   interventions, outputs, PIAP actions and programme indicators
//! - **Organisation**: directorates, divisions and the relationship rows
//!   linking them to programmes
//! - **Values**: [`Percent`], [`Measurement`] and [`PerformanceBand`], with
//!   achievement derived and clamped to `[0, 100]`
//! - **Periods**: validity windows and July-June fiscal years
//! - **History**: dated [`ScoreRecord`]s of indicator achievement
//!
//! # Example
//!
//! ```rust
//! use pmis_model::{Measurement, Percent, PerformanceBand};
//!
//! let revenue = Measurement::new(100.0, 150.0);
//! assert_eq!(revenue.achievement(), Percent::FULL);
//! assert_eq!(PerformanceBand::of(revenue.achievement()), PerformanceBand::Excellent);
//! ```

#![warn(missing_docs)]

pub mod category;
pub mod entity;
pub mod error;
pub mod history;
pub mod ids;
pub mod link;
pub mod measurement;
pub mod org;
pub mod percent;
pub mod period;
pub mod programme;
pub mod strategic;

// Re-exports
pub use category::{Category, NodeRef};
pub use entity::Entity;
pub use error::ParseError;
pub use history::ScoreRecord;
pub use ids::{
    DirectorateId, DivisionId, DivisionProgrammeLinkId, GoalId, IndicatorId, InterventionId,
    KpiId, KraId, ObjectiveId, OutcomeId, OutputId, PiapActionId, ProgrammeDirectorateLinkId,
    ProgrammeId, ProgrammeObjectiveId,
};
pub use link::{
    DeliveryFigures, DivisionProgrammeLink, EdgeHealth, EdgeScores, ImplementationRole,
    ImplementationStatus, Priority, ProgrammeDirectorateLink,
};
pub use measurement::{AchievementLevel, IndicatorStatus, KpiType, Measurement, PerformanceBand};
pub use org::{Directorate, Division};
pub use percent::Percent;
pub use period::{DateWindow, FiscalBudget, FiscalQuarter, FiscalYear, DEFAULT_FISCAL_START_MONTH};
pub use programme::{
    IndicatorAnchor, Intervention, Outcome, Output, PiapAction, PiapStatus, Programme,
    ProgrammeIndicator, ProgrammeObjective,
};
pub use strategic::{
    CalculationMethod, Contribution, Kpi, Kra, KraParent, StrategicGoal, StrategicObjective,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with hierarchy records
    pub use crate::{
        Category, DateWindow, Entity, FiscalYear, IndicatorStatus, Measurement, NodeRef, Percent,
        PerformanceBand,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
