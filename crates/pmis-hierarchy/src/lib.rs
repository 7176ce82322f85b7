//! PMIS Hierarchy
//!
//! Snapshot of the performance hierarchy with an explicit relation graph.
//!
//! # Overview
//!
//! - **HierarchyView**: the read-only surface rollups are computed through
//! - **PerformanceTree**: in-memory snapshot backed by a petgraph relation graph
//! - **TreeDocument**: serializable flat form of a snapshot
//! - **Bulk updates**: load, edit and apply current values in batch
//!
//! # Example
//!
//! ```rust
//! use pmis_hierarchy::{HierarchyView, TreeBuilder};
//! use pmis_model::{Category, Kpi, KpiId, Kra, KraId, KraParent, Measurement, NodeRef};
//!
//! let tree = TreeBuilder::new()
//!     .kra(Kra::new(KraId(1), "Revenue", KraParent::Unlinked))
//!     .kpi(Kpi::new(KpiId(1), "Collections", Some(KraId(1)), Measurement::new(100.0, 80.0)))
//!     .build()
//!     .unwrap();
//!
//! let kpis = tree.children_of_type(NodeRef::Kra(KraId(1)), Category::Kpi);
//! assert_eq!(kpis, vec![NodeRef::Kpi(KpiId(1))]);
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod document;
pub mod error;
pub mod relation;
pub mod tree;
pub mod view;

// Re-exports
pub use builder::TreeBuilder;
pub use document::TreeDocument;
pub use error::TreeError;
pub use relation::{DanglingReference, Relation};
pub use tree::{
    BulkUpdateOutcome, PerformanceTree, UpdateKind, UpdateLine, UpdateScope, UpdateTarget,
    ValueChange,
};
pub use view::{HierarchyView, NumericField};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and reading snapshots
    pub use crate::{HierarchyView, NumericField, PerformanceTree, TreeBuilder, TreeDocument};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
