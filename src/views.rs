//! Chart view encoding
//!
//! Builds the aggregate tables an external charting layer renders: grouped
//! engagement sums per post type (bar charts) and the proportional likes
//! breakdown (pie chart). Views carry numbers only; rendering stays outside
//! this crate.

use serde::Serialize;

use crate::dataset::{Dataset, TypeTotals};
use crate::error::MetricsError;

/// Grouped sums of likes, shares, and comments per post type.
///
/// Rows keep the first-occurrence order of the dataset so repeated builds
/// over the same data are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngagementByType {
    pub rows: Vec<TypeTotals>,
}

/// One slice of the likes pie: a post type's share of the likes grand total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikesSlice {
    pub post_type: String,
    pub likes: u64,
    /// Share of the likes grand total, percent to one decimal
    pub percent: f64,
}

/// Proportional breakdown of total likes by post type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikesBreakdown {
    pub slices: Vec<LikesSlice>,
}

/// Builder for the chart views over a loaded dataset
pub struct ViewBuilder<'a> {
    dataset: &'a Dataset,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Per-type engagement sums, one row per post type
    pub fn engagement_by_type(&self) -> EngagementByType {
        EngagementByType {
            rows: self.dataset.group_sums_by_type(),
        }
    }

    /// Likes share per post type.
    ///
    /// An empty dataset or an all-zero likes column yields an empty
    /// breakdown; percents are never NaN.
    pub fn likes_breakdown(&self) -> LikesBreakdown {
        let groups = self.dataset.group_sums_by_type();
        let grand_total: u64 = groups.iter().map(|g| g.likes).sum();

        if grand_total == 0 {
            return LikesBreakdown { slices: Vec::new() };
        }

        let slices = groups
            .into_iter()
            .map(|g| {
                let raw = g.likes as f64 / grand_total as f64 * 100.0;
                LikesSlice {
                    post_type: g.post_type,
                    likes: g.likes,
                    // One decimal, matching the pie chart's percent labels.
                    percent: (raw * 10.0).round() / 10.0,
                }
            })
            .collect();

        LikesBreakdown { slices }
    }
}

impl EngagementByType {
    pub fn to_json(&self) -> Result<String, MetricsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl LikesBreakdown {
    pub fn to_json(&self) -> Result<String, MetricsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
