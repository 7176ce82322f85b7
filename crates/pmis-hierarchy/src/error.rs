//! Error types for the hierarchy snapshot

use pmis_model::NodeRef;

/// Hierarchy snapshot error
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// Two records of the same category share an identifier
    #[error("duplicate record {0}")]
    DuplicateNode(NodeRef),

    /// Record not present in the snapshot
    #[error("record {0} not found")]
    NotFound(NodeRef),

    /// Bulk update submitted without any lines
    #[error("bulk update has no lines to apply")]
    EmptyUpdate,

    /// Snapshot document could not be decoded or encoded
    #[error("invalid snapshot document: {0}")]
    Document(#[from] serde_json::Error),
}
