//! Organisational units

use crate::entity::{default_active, named_entity};
use crate::ids::{DirectorateId, DivisionId};
use serde::{Deserialize, Serialize};

/// Directorate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directorate {
    /// Identifier
    pub id: DirectorateId,
    /// Name
    pub name: String,
    /// Short code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Directorate {
    /// Active directorate
    #[must_use]
    pub fn new(id: DirectorateId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            active: true,
        }
    }
}

named_entity!(Directorate, Directorate);

/// Division, usually inside a directorate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    /// Identifier
    pub id: DivisionId,
    /// Name
    pub name: String,
    /// Short code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Parent directorate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directorate: Option<DirectorateId>,
    /// Active flag
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Division {
    /// Active division
    #[must_use]
    pub fn new(id: DivisionId, name: impl Into<String>, directorate: Option<DirectorateId>) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            directorate,
            active: true,
        }
    }
}

named_entity!(Division, Division);
