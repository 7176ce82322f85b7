//! Read-only access to a hierarchy snapshot
//!
//! [`HierarchyView`] is the only surface the rollup engine reads through.
//! Parents hold their children as relation edges; looking a parent up from a
//! child is a lookup over those edges, never an owning pointer.

use pmis_model::{Category, DateWindow, Measurement, NodeRef, ScoreRecord};
use serde::{Deserialize, Serialize};

/// Numeric fields readable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    /// Measurement baseline
    Baseline,
    /// Measurement target
    Target,
    /// Measurement current value
    Current,
    /// KPI weight within its KRA
    Weight,
    /// Programme indicator contribution weight
    ContributionWeight,
    /// PIAP action recorded progress
    Progress,
    /// PIAP action budget over all fiscal years
    TotalBudget,
    /// Goal planned achievement
    TargetPercentage,
    /// Relationship row performance score
    PerformanceScore,
    /// Relationship row budget utilisation
    BudgetUtilization,
    /// Relationship row completion
    CompletionPercentage,
    /// Programme-directorate share of responsibility
    ResponsibilityPercentage,
}

/// Read-only view over a snapshot of the hierarchy
///
/// Implementations hide archived records: a node that is not
/// [`contains`](HierarchyView::contains)ed never appears in any listing.
/// Listings are sorted so results are deterministic.
pub trait HierarchyView {
    /// Whether the node is visible
    fn contains(&self, node: NodeRef) -> bool;

    /// Visible nodes of one category
    fn nodes_of(&self, category: Category) -> Vec<NodeRef>;

    /// Visible nodes of `category` that `node` has an outgoing relation to
    fn children_of_type(&self, node: NodeRef, category: Category) -> Vec<NodeRef>;

    /// First visible node of `category` with a relation to `node`
    fn parent_of_type(&self, node: NodeRef, category: Category) -> Option<NodeRef>;

    /// Raw numeric field, `None` if the node lacks it
    fn numeric_field(&self, node: NodeRef, field: NumericField) -> Option<f64>;

    /// Measurement of a KPI, programme indicator or PIAP action
    fn measurement(&self, node: NodeRef) -> Option<Measurement>;

    /// Validity window, open for undated records
    fn validity(&self, node: NodeRef) -> DateWindow;

    /// Display label
    fn label(&self, node: NodeRef) -> Option<String>;

    /// Dated scores of a visible indicator, oldest first
    fn score_history(&self, node: NodeRef) -> Vec<ScoreRecord>;
}
