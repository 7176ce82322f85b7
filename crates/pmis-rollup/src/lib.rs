//! PMIS Rollup
//!
//! Pure aggregation over a [`pmis_hierarchy::HierarchyView`].
//!
//! # Overview
//!
//! - **Rollup**: node percentages as the mean of their children's
//! - **Counts**: distinct descendants per category
//! - **Summary**: per-category statistics, indicator average and band
//!   distribution
//! - **Filters**: period, scope, entity, band and data type restrictions
//!   applied through a [`FilteredView`]
//! - **Classification**: KPI level and parent type tags
//! - **Dashboard**: report sections and period options
//! - **Analytics**: score trends, organisation risk and decline alerts
//!
//! Nothing here mutates the view or keeps state between calls.
//!
//! # Example
//!
//! ```rust
//! use pmis_hierarchy::TreeBuilder;
//! use pmis_model::{Category, Kpi, KpiId, Kra, KraId, KraParent, Measurement};
//! use pmis_rollup::{summarize, RollupConfig};
//!
//! let tree = TreeBuilder::new()
//!     .kra(Kra::new(KraId(1), "Revenue", KraParent::Unlinked))
//!     .kpi(Kpi::new(KpiId(1), "Collections", Some(KraId(1)), Measurement::new(100.0, 80.0)))
//!     .build()
//!     .unwrap();
//!
//! let summary = summarize(&tree, &RollupConfig::default());
//! assert_eq!(summary.indicator_count, 1);
//! assert_eq!(summary.average(Category::Kra).value(), 80.0);
//! ```

#![warn(missing_docs)]

pub mod analytics;
pub mod classify;
pub mod config;
pub mod counts;
pub mod dashboard;
pub mod engine;
pub mod filter;
pub mod filtered;
pub mod plan;
pub mod risk;
pub mod summary;
pub mod trend;

// Re-exports
pub use analytics::{build_analytics, AnalyticsReport};
pub use classify::{classify_all, classify_kpi, ClassificationLevel, ClassificationTags, ParentType};
pub use config::{ConfigError, RollupConfig};
pub use counts::{compute_counts, descendants, CategoryCounts};
pub use dashboard::{
    build_dashboard, period_options, DashboardReport, DashboardSnapshot, IndicatorEntry,
    NodePerformance, PeriodOption, UnitContribution,
};
pub use engine::{compute_node_percentage, leaf_percentage, recompute, RollupTable};
pub use filter::{
    BandFilter, DashboardFilters, DataType, EntityFilter, FilterError, PeriodFilter, Scope,
};
pub use filtered::{filtered_summarize, FilteredView};
pub use plan::WalkMode;
pub use risk::{assess_risk, decline_alerts, AlertSeverity, DeclineAlert, RiskAssessment, RiskLevel};
pub use summary::{summarize, CategoryStats, Distribution, Summary};
pub use trend::{analyze_trend, indicator_trends, IndicatorTrend, TrendAnalysis, TrendDirection};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for computing summaries and dashboards
    pub use crate::{
        build_analytics, build_dashboard, compute_counts, compute_node_percentage,
        filtered_summarize, summarize, DashboardFilters, RollupConfig, Summary,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
