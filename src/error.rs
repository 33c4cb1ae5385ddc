//! Error types for SocialFlow

use thiserror::Error;

/// Errors that can occur while loading or serializing metrics data.
///
/// Query resolution never produces one of these: unrecognized queries are
/// answered with a sentinel string and empty aggregates with a "no data"
/// message, so all variants here surface at the load or output boundary.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Dataset contains no usable records")]
    EmptyDataset,
}
