//! Query resolution
//!
//! Maps a free-text query to one of a fixed set of intents via
//! case-insensitive substring matching, computes the requested statistic
//! against an injected [`Dataset`], and formats a human-readable answer.
//!
//! Classification is priority-ordered and first-match-wins: a query that
//! contains several trigger phrases resolves to the earliest rule in
//! [`Intent::classify`]. Resolution is total over arbitrary input — an
//! unmatched query answers with [`SENTINEL`], an empty aggregate with a
//! "no data" message, never an error.

use crate::dataset::Dataset;
use crate::record::{Metric, PostRecord, KNOWN_POST_TYPES};

/// Answer returned when no rule matches the query
pub const SENTINEL: &str = "Sorry, I didn't understand the query.";

/// Marker substituted for a ratio whose denominator is zero
pub const NOT_APPLICABLE: &str = "N/A";

/// The class of question a query resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Mean likes, optionally filtered to one known post type
    AverageLikes { post_type: Option<&'static str> },
    MostLikes,
    MostShares,
    MostComments,
    TotalLikes,
    TotalShares,
    TotalComments,
    AverageSentiment,
    /// Likes-to-shares and likes-to-comments ratios
    EngagementRatios,
    /// No rule matched
    Unknown,
}

impl Intent {
    /// Classify a raw query string.
    ///
    /// Rules are checked in a fixed priority order and the first hit wins,
    /// so overlapping trigger phrases in one query resolve deterministically.
    /// Reordering these checks is a behavior change.
    pub fn classify(query: &str) -> Intent {
        let query = query.to_lowercase();

        if query.contains("average likes") {
            Intent::AverageLikes {
                post_type: detect_post_type(&query),
            }
        } else if query.contains("most likes") {
            Intent::MostLikes
        } else if query.contains("most shares") {
            Intent::MostShares
        } else if query.contains("most comments") {
            Intent::MostComments
        } else if query.contains("total likes") {
            Intent::TotalLikes
        } else if query.contains("total shares") {
            Intent::TotalShares
        } else if query.contains("total comments") {
            Intent::TotalComments
        } else if query.contains("average sentiment") {
            Intent::AverageSentiment
        } else if query.contains("ratio of likes shares comments") {
            Intent::EngagementRatios
        } else {
            Intent::Unknown
        }
    }
}

/// First known post-type literal contained in the lower-cased query, if any
fn detect_post_type(lowered_query: &str) -> Option<&'static str> {
    KNOWN_POST_TYPES
        .iter()
        .find(|t| lowered_query.contains(&t.to_lowercase()))
        .copied()
}

/// Resolves free-text queries against an injected dataset.
///
/// Holds only a borrow of the dataset; every resolution is a pure read, so
/// one resolver can serve any number of queries.
pub struct QueryResolver<'a> {
    dataset: &'a Dataset,
}

impl<'a> QueryResolver<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Resolve a query to a formatted answer string
    pub fn resolve(&self, query: &str) -> String {
        match Intent::classify(query) {
            Intent::AverageLikes { post_type } => self.answer_average_likes(post_type),
            Intent::MostLikes => self.answer_most(Metric::Likes),
            Intent::MostShares => self.answer_most(Metric::Shares),
            Intent::MostComments => self.answer_most_comments(),
            Intent::TotalLikes => self.answer_total_likes(),
            Intent::TotalShares => self.answer_plain_total(Metric::Shares),
            Intent::TotalComments => self.answer_plain_total(Metric::Comments),
            Intent::AverageSentiment => self.answer_average_sentiment(),
            Intent::EngagementRatios => self.answer_ratios(),
            Intent::Unknown => SENTINEL.to_string(),
        }
    }

    fn answer_average_likes(&self, post_type: Option<&'static str>) -> String {
        match post_type {
            Some(post_type) => {
                let mean = self
                    .dataset
                    .mean_where(Metric::Likes, |r| r.type_matches(post_type));
                match mean {
                    Some(mean) => format!("The average likes for {post_type} are {mean:.2}."),
                    None => format!("No {post_type} posts with likes data were found."),
                }
            }
            None => match self.dataset.mean_of(Metric::Likes) {
                Some(mean) => format!("The average likes for all posts are {mean:.2}."),
                None => "No posts with likes data were found.".to_string(),
            },
        }
    }

    fn answer_most(&self, metric: Metric) -> String {
        match self.dataset.arg_max(metric) {
            Some(record) => format_most(metric, record),
            None => format!("No posts with {} data were found.", metric.as_str()),
        }
    }

    fn answer_most_comments(&self) -> String {
        let Some(record) = self.dataset.arg_max(Metric::Comments) else {
            return "No posts with comments data were found.".to_string();
        };

        let mut answer = format_most(Metric::Comments, record);

        let comments = self.dataset.sum_of(Metric::Comments);
        let clauses: Vec<String> = [
            compare_phrase("Comments", comments, self.dataset.sum_of(Metric::Likes), "likes"),
            compare_phrase("Comments", comments, self.dataset.sum_of(Metric::Shares), "shares"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !clauses.is_empty() {
            answer.push(' ');
            answer.push_str(&clauses.join(" and "));
            answer.push('.');
        }

        answer
    }

    fn answer_total_likes(&self) -> String {
        let likes = self.dataset.sum_of(Metric::Likes);
        let mut answer = format!("Total likes in the dataset: {}.", likes as u64);

        let clauses: Vec<String> = [
            compare_phrase("Likes", likes, self.dataset.sum_of(Metric::Shares), "shares"),
            compare_phrase("Likes", likes, self.dataset.sum_of(Metric::Comments), "comments"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !clauses.is_empty() {
            answer.push(' ');
            answer.push_str(&clauses.join(" and "));
            answer.push('.');
        }

        answer
    }

    fn answer_plain_total(&self, metric: Metric) -> String {
        let total = self.dataset.sum_of(metric) as u64;
        format!("Total {} in the dataset: {total}", metric.as_str())
    }

    fn answer_average_sentiment(&self) -> String {
        match self.dataset.mean_of(Metric::Sentiment) {
            Some(mean) => format!("The average sentiment score for all posts is {mean:.2}."),
            None => "No posts with sentiment data were found.".to_string(),
        }
    }

    fn answer_ratios(&self) -> String {
        let likes = self.dataset.sum_of(Metric::Likes);
        let shares = self.dataset.sum_of(Metric::Shares);
        let comments = self.dataset.sum_of(Metric::Comments);

        format!(
            "Ratio of likes to shares: {}, Ratio of likes to comments: {}",
            format_ratio(likes, shares),
            format_ratio(likes, comments)
        )
    }
}

fn format_most(metric: Metric, record: &PostRecord) -> String {
    let noun = metric.as_str();
    let value = metric.value_of(record).unwrap_or(0.0) as u64;
    format!(
        "Post with the most {noun}: {} with {value} {noun}.",
        record.post_id
    )
}

/// Percentage comparison of `value` against `reference`, computed from the
/// live aggregates (the original shipped these as hardcoded constants).
/// `None` when the reference total is zero.
fn compare_phrase(subject: &str, value: f64, reference: f64, object: &str) -> Option<String> {
    if reference <= 0.0 {
        return None;
    }

    let percent = (value / reference - 1.0) * 100.0;
    let direction = if percent >= 0.0 { "greater" } else { "less" };
    Some(format!(
        "{subject} are {:.2}% {direction} than {object}",
        percent.abs()
    ))
}

fn format_ratio(numerator: f64, denominator: f64) -> String {
    if denominator > 0.0 {
        format!("{:.2}", numerator / denominator)
    } else {
        NOT_APPLICABLE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(
        post_id: &str,
        post_type: &str,
        likes: u64,
        shares: u64,
        comments: u64,
    ) -> PostRecord {
        PostRecord {
            post_id: post_id.to_string(),
            post_type: post_type.to_string(),
            likes: Some(likes),
            shares: Some(shares),
            comments: Some(comments),
            avg_sentiment_score: None,
        }
    }

    /// The two-record dataset from the worked example: totals are 150 likes,
    /// 80 shares, 15 comments.
    fn example_dataset() -> Dataset {
        Dataset::from_records(vec![
            record("P1", "Reels", 100, 20, 5),
            record("P2", "Post", 50, 60, 10),
        ])
    }

    #[test]
    fn test_classify_priority_order() {
        // Both trigger phrases present; the earlier rule wins.
        assert_eq!(
            Intent::classify("average likes and most likes please"),
            Intent::AverageLikes { post_type: None }
        );
        assert_eq!(Intent::classify("show me the MOST LIKES"), Intent::MostLikes);
        assert_eq!(Intent::classify("banana"), Intent::Unknown);
    }

    #[test]
    fn test_classify_detects_post_type() {
        assert_eq!(
            Intent::classify("what is the average likes for reels?"),
            Intent::AverageLikes {
                post_type: Some("Reels")
            }
        );
        // "Reels" is checked before "Story" when both appear.
        assert_eq!(
            Intent::classify("average likes for story vs reels"),
            Intent::AverageLikes {
                post_type: Some("Reels")
            }
        );
    }

    #[test]
    fn test_average_likes_for_type_matches_store_mean() {
        let ds = example_dataset();
        let resolver = QueryResolver::new(&ds);

        let mean = ds
            .mean_where(Metric::Likes, |r| r.type_matches("Reels"))
            .unwrap();
        assert_eq!(
            resolver.resolve("average likes for reels"),
            format!("The average likes for Reels are {mean:.2}.")
        );
        assert_eq!(
            resolver.resolve("average likes"),
            "The average likes for all posts are 75.00."
        );
    }

    #[test]
    fn test_most_shares_worked_example() {
        let ds = example_dataset();
        let resolver = QueryResolver::new(&ds);
        assert_eq!(
            resolver.resolve("most shares"),
            "Post with the most shares: P2 with 60 shares."
        );
    }

    #[test]
    fn test_most_likes_tie_returns_first() {
        let ds = Dataset::from_records(vec![
            record("A", "Post", 70, 1, 1),
            record("B", "Reels", 70, 2, 2),
        ]);
        let resolver = QueryResolver::new(&ds);
        assert_eq!(
            resolver.resolve("most likes"),
            "Post with the most likes: A with 70 likes."
        );
    }

    #[test]
    fn test_total_likes_with_computed_commentary() {
        let ds = example_dataset();
        let resolver = QueryResolver::new(&ds);
        // 150 vs 80 shares = 87.50% greater; 150 vs 15 comments = 900% greater.
        assert_eq!(
            resolver.resolve("total likes"),
            "Total likes in the dataset: 150. \
             Likes are 87.50% greater than shares and Likes are 900.00% greater than comments."
        );
    }

    #[test]
    fn test_total_likes_omits_commentary_for_zero_totals() {
        let ds = Dataset::from_records(vec![record("P1", "Post", 150, 0, 0)]);
        let resolver = QueryResolver::new(&ds);
        assert_eq!(
            resolver.resolve("total likes"),
            "Total likes in the dataset: 150."
        );
    }

    #[test]
    fn test_most_comments_with_computed_commentary() {
        let ds = example_dataset();
        let resolver = QueryResolver::new(&ds);
        // 15 comments vs 150 likes = 90% less; vs 80 shares = 81.25% less.
        assert_eq!(
            resolver.resolve("most comments"),
            "Post with the most comments: P2 with 10 comments. \
             Comments are 90.00% less than likes and Comments are 81.25% less than shares."
        );
    }

    #[test]
    fn test_plain_totals() {
        let ds = example_dataset();
        let resolver = QueryResolver::new(&ds);
        assert_eq!(
            resolver.resolve("total shares"),
            "Total shares in the dataset: 80"
        );
        assert_eq!(
            resolver.resolve("total comments"),
            "Total comments in the dataset: 15"
        );
    }

    #[test]
    fn test_average_sentiment() {
        let ds = Dataset::from_records(vec![
            PostRecord {
                avg_sentiment_score: Some(0.8),
                ..record("P1", "Reels", 1, 1, 1)
            },
            PostRecord {
                avg_sentiment_score: Some(0.2),
                ..record("P2", "Post", 1, 1, 1)
            },
        ]);
        let resolver = QueryResolver::new(&ds);
        assert_eq!(
            resolver.resolve("average sentiment"),
            "The average sentiment score for all posts is 0.50."
        );
    }

    #[test]
    fn test_ratios_with_zero_denominator() {
        let ds = Dataset::from_records(vec![record("P1", "Post", 100, 0, 4)]);
        let resolver = QueryResolver::new(&ds);
        assert_eq!(
            resolver.resolve("ratio of likes shares comments"),
            "Ratio of likes to shares: N/A, Ratio of likes to comments: 25.00"
        );
    }

    #[test]
    fn test_unmatched_query_returns_sentinel() {
        let ds = example_dataset();
        let resolver = QueryResolver::new(&ds);
        assert_eq!(resolver.resolve("banana"), SENTINEL);
        assert_eq!(resolver.resolve(""), SENTINEL);
    }

    #[test]
    fn test_empty_dataset_answers_no_data() {
        let ds = Dataset::default();
        let resolver = QueryResolver::new(&ds);
        assert_eq!(
            resolver.resolve("average likes"),
            "No posts with likes data were found."
        );
        assert_eq!(
            resolver.resolve("most likes"),
            "No posts with likes data were found."
        );
        assert_eq!(
            resolver.resolve("average likes for story"),
            "No Story posts with likes data were found."
        );
    }
}
