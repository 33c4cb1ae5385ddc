//! Post record schema
//!
//! Defines the one-row unit of the dataset: a single social media post with
//! its engagement metrics, plus the `Metric` selector used by every
//! aggregation primitive.

use serde::{Deserialize, Serialize};

/// Post-type literals recognized in queries, checked in this order.
///
/// Matching is case-insensitive substring containment, so the order matters
/// when a query mentions more than one type: the first hit wins.
pub const KNOWN_POST_TYPES: [&str; 3] = ["Reels", "Post", "Story"];

/// One row of the dataset: a single post and its engagement metrics.
///
/// Numeric fields are optional because the source CSV tolerates missing
/// cells; a `None` is excluded from every aggregate rather than treated as
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    /// Unique post identifier (required, never empty)
    pub post_id: String,
    /// Post type label (enum-like: "Reels", "Post", "Story", or other)
    pub post_type: String,
    /// Like count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    /// Share count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<u64>,
    /// Comment count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<u64>,
    /// Average sentiment score, typically in [-1, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_sentiment_score: Option<f64>,
}

impl PostRecord {
    /// True if `post_type` contains `fragment`, ignoring case.
    ///
    /// This mirrors the substring semantics of the query language: "average
    /// likes for reels" matches a record typed "Reels".
    pub fn type_matches(&self, fragment: &str) -> bool {
        self.post_type
            .to_lowercase()
            .contains(&fragment.to_lowercase())
    }
}

/// Selector for the numeric columns aggregates operate over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Likes,
    Shares,
    Comments,
    Sentiment,
}

impl Metric {
    /// Column value for `record`, as a float for uniform aggregation.
    ///
    /// Missing cells come back as `None` so callers exclude them instead of
    /// counting zeros.
    pub fn value_of(&self, record: &PostRecord) -> Option<f64> {
        match self {
            Metric::Likes => record.likes.map(|v| v as f64),
            Metric::Shares => record.shares.map(|v| v as f64),
            Metric::Comments => record.comments.map(|v| v as f64),
            Metric::Sentiment => record.avg_sentiment_score,
        }
    }

    /// Human-readable singular noun for answer strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Likes => "likes",
            Metric::Shares => "shares",
            Metric::Comments => "comments",
            Metric::Sentiment => "sentiment",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> PostRecord {
        PostRecord {
            post_id: "P1".to_string(),
            post_type: "Reels".to_string(),
            likes: Some(100),
            shares: Some(20),
            comments: None,
            avg_sentiment_score: Some(0.4),
        }
    }

    #[test]
    fn test_metric_value_of() {
        let r = record();
        assert_eq!(Metric::Likes.value_of(&r), Some(100.0));
        assert_eq!(Metric::Shares.value_of(&r), Some(20.0));
        assert_eq!(Metric::Comments.value_of(&r), None);
        assert_eq!(Metric::Sentiment.value_of(&r), Some(0.4));
    }

    #[test]
    fn test_type_matches_is_case_insensitive_substring() {
        let r = record();
        assert!(r.type_matches("reels"));
        assert!(r.type_matches("REEL"));
        assert!(!r.type_matches("story"));
    }
}
