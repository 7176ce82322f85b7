//! Relation graph edge kinds

use pmis_model::NodeRef;
use serde::{Deserialize, Serialize};

/// Kind of a directed relation between two records
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Structural ownership (goal → objective, output → PIAP action, ...)
    Contains,
    /// Strategic objective → programme supporting it
    Supports,
    /// Unit → programme it implements
    Implements,
    /// Programme → implementing unit
    ImplementedBy,
    /// Unit → KPI or indicator it answers for
    Responsible,
    /// KPI → programme indicator feeding it
    Contributes,
    /// Endpoint → relationship row
    Joins,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Contains => "contains",
            Self::Supports => "supports",
            Self::Implements => "implements",
            Self::ImplementedBy => "implemented_by",
            Self::Responsible => "responsible",
            Self::Contributes => "contributes",
            Self::Joins => "joins",
        };
        f.write_str(name)
    }
}

/// A record pointing at another record that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DanglingReference {
    /// Record holding the pointer
    pub referrer: NodeRef,
    /// Missing record
    pub target: NodeRef,
}

impl std::fmt::Display for DanglingReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} (missing)", self.referrer, self.target)
    }
}
