//! SocialFlow - keyword-driven query engine over social post metrics
//!
//! SocialFlow loads a tabular dataset of post engagement metrics and answers
//! free-text questions about it through a deterministic pipeline: CSV ingest
//! → immutable dataset store → intent classification → aggregate formatting.
//!
//! ## Modules
//!
//! - **Dataset Store**: row-tolerant CSV ingest and pure aggregation
//!   primitives (mean, argmax, sum, grouped sums)
//! - **Query Resolver**: priority-ordered substring intents over the store
//! - **Chart Views**: grouped-sum tables for an external charting layer

pub mod dataset;
pub mod error;
pub mod record;
pub mod resolver;
pub mod views;

pub use dataset::{Dataset, LoadReport, RowError, TypeTotals};
pub use error::MetricsError;
pub use record::{Metric, PostRecord, KNOWN_POST_TYPES};
pub use resolver::{Intent, QueryResolver, NOT_APPLICABLE, SENTINEL};
pub use views::{EngagementByType, LikesBreakdown, ViewBuilder};

/// SocialFlow version embedded in CLI reports
pub const SOCIALFLOW_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI reports
pub const PRODUCER_NAME: &str = "socialflow";
