//! Dataset store
//!
//! Loads post records into an immutable, ordered dataset and exposes the
//! aggregation primitives the query resolver and chart views are built on:
//! mean, argmax, sum, and per-type grouped sums. All operations are pure
//! reads in O(number of records).
//!
//! CSV ingest is row-tolerant: a malformed row is skipped and reported, not
//! fatal. Only a missing required column aborts the load.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::MetricsError;
use crate::record::{Metric, PostRecord};

/// Column set a source CSV must declare in its header row
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "post_id",
    "post_type",
    "likes",
    "shares",
    "comments",
    "avg_sentiment_score",
];

/// Per-type sums of the three engagement counters.
///
/// Groups are keyed by the exact `post_type` string and ordered by first
/// occurrence in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    pub post_type: String,
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

/// A row rejected during ingest, with enough context to report it
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    /// 1-based line number in the source file (header is line 1)
    pub line: usize,
    /// post_id of the rejected row, when one was present
    pub post_id: Option<String>,
    pub message: String,
}

/// Outcome of a CSV load: the usable dataset plus row-level diagnostics
#[derive(Debug)]
pub struct LoadReport {
    pub dataset: Dataset,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

/// An ordered, immutable collection of post records.
///
/// Built once at startup and never mutated, so it can be shared freely
/// across query evaluations.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<PostRecord>,
}

impl Dataset {
    /// Build a dataset directly from records (fixtures, tests, callers that
    /// ingest elsewhere)
    pub fn from_records(records: Vec<PostRecord>) -> Self {
        Self { records }
    }

    /// Load a dataset from a CSV file on disk
    pub fn load_csv(path: &Path) -> Result<LoadReport, MetricsError> {
        let file = File::open(path)?;
        Self::read_csv(file)
    }

    /// Load a dataset from any CSV reader.
    ///
    /// The header row must contain every column in [`REQUIRED_COLUMNS`].
    /// Empty numeric cells parse to `None`; a cell that is present but
    /// unparseable, or an empty `post_id`, rejects that row only.
    pub fn read_csv<R: Read>(reader: R) -> Result<LoadReport, MetricsError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = build_column_map(&headers);

        for required in REQUIRED_COLUMNS {
            if !columns.contains_key(required) {
                return Err(MetricsError::MissingColumn(required.to_string()));
            }
        }

        let mut records = Vec::new();
        let mut row_errors = Vec::new();
        let mut rows_read = 0;

        for (index, row) in csv_reader.records().enumerate() {
            rows_read += 1;
            // Header occupies line 1, first data row is line 2.
            let line = index + 2;

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    row_errors.push(RowError {
                        line,
                        post_id: None,
                        message: format!("unreadable row: {e}"),
                    });
                    continue;
                }
            };

            match parse_row(&row, &columns) {
                Ok(record) => records.push(record),
                Err((post_id, message)) => {
                    row_errors.push(RowError {
                        line,
                        post_id,
                        message,
                    })
                }
            }
        }

        let rows_used = records.len();
        Ok(LoadReport {
            dataset: Dataset::from_records(records),
            rows_read,
            rows_used,
            row_errors,
        })
    }

    pub fn records(&self) -> &[PostRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Arithmetic mean of `metric` over the whole dataset.
    ///
    /// `None` when no record carries a value (the empty-aggregate case —
    /// callers render "no data" instead of dividing by zero).
    pub fn mean_of(&self, metric: Metric) -> Option<f64> {
        self.mean_where(metric, |_| true)
    }

    /// Arithmetic mean of `metric` over records matching `predicate`
    pub fn mean_where<F>(&self, metric: Metric, predicate: F) -> Option<f64>
    where
        F: Fn(&PostRecord) -> bool,
    {
        let mut sum = 0.0;
        let mut count = 0usize;

        for record in self.records.iter().filter(|r| predicate(r)) {
            if let Some(value) = metric.value_of(record) {
                sum += value;
                count += 1;
            }
        }

        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Record with the maximum value of `metric`.
    ///
    /// Ties resolve to the first record in dataset order; records with a
    /// missing value are skipped. `None` when no record carries a value.
    pub fn arg_max(&self, metric: Metric) -> Option<&PostRecord> {
        let mut best: Option<(&PostRecord, f64)> = None;

        for record in &self.records {
            if let Some(value) = metric.value_of(record) {
                match best {
                    Some((_, best_value)) if value <= best_value => {}
                    _ => best = Some((record, value)),
                }
            }
        }

        best.map(|(record, _)| record)
    }

    /// Sum of `metric` over all records; missing cells contribute nothing
    pub fn sum_of(&self, metric: Metric) -> f64 {
        self.records
            .iter()
            .filter_map(|r| metric.value_of(r))
            .sum()
    }

    /// Per-type sums of likes, shares, and comments.
    ///
    /// Group order is the order of each type's first occurrence, keeping
    /// downstream chart views deterministic.
    pub fn group_sums_by_type(&self) -> Vec<TypeTotals> {
        let mut groups: Vec<TypeTotals> = Vec::new();

        for record in &self.records {
            let index = match groups.iter().position(|g| g.post_type == record.post_type) {
                Some(index) => index,
                None => {
                    groups.push(TypeTotals {
                        post_type: record.post_type.clone(),
                        likes: 0,
                        shares: 0,
                        comments: 0,
                    });
                    groups.len() - 1
                }
            };

            let totals = &mut groups[index];
            totals.likes += record.likes.unwrap_or(0);
            totals.shares += record.shares.unwrap_or(0);
            totals.comments += record.comments.unwrap_or(0);
        }

        groups
    }
}

fn build_column_map(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_lowercase(), i))
        .collect()
}

type RowParseError = (Option<String>, String);

fn parse_row(
    row: &csv::StringRecord,
    columns: &HashMap<String, usize>,
) -> Result<PostRecord, RowParseError> {
    let cell = |name: &str| -> &str {
        columns
            .get(name)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
            .trim()
    };

    let post_id = cell("post_id").to_string();
    if post_id.is_empty() {
        return Err((None, "empty post_id".to_string()));
    }

    let likes = parse_optional::<u64>(cell("likes"), "likes", &post_id)?;
    let shares = parse_optional::<u64>(cell("shares"), "shares", &post_id)?;
    let comments = parse_optional::<u64>(cell("comments"), "comments", &post_id)?;
    let avg_sentiment_score =
        parse_optional::<f64>(cell("avg_sentiment_score"), "avg_sentiment_score", &post_id)?;

    Ok(PostRecord {
        post_id,
        post_type: cell("post_type").to_string(),
        likes,
        shares,
        comments,
        avg_sentiment_score,
    })
}

fn parse_optional<T: std::str::FromStr>(
    raw: &str,
    column: &str,
    post_id: &str,
) -> Result<Option<T>, RowParseError> {
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<T>().map(Some).map_err(|_| {
        (
            Some(post_id.to_string()),
            format!("invalid {column} value '{raw}'"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> Dataset {
        Dataset::from_records(vec![
            PostRecord {
                post_id: "P1".to_string(),
                post_type: "Reels".to_string(),
                likes: Some(100),
                shares: Some(20),
                comments: Some(5),
                avg_sentiment_score: Some(0.5),
            },
            PostRecord {
                post_id: "P2".to_string(),
                post_type: "Post".to_string(),
                likes: Some(50),
                shares: Some(60),
                comments: Some(10),
                avg_sentiment_score: Some(-0.1),
            },
            PostRecord {
                post_id: "P3".to_string(),
                post_type: "Reels".to_string(),
                likes: Some(100),
                shares: None,
                comments: Some(15),
                avg_sentiment_score: None,
            },
        ])
    }

    #[test]
    fn test_mean_of_whole_dataset() {
        let ds = fixture();
        // (100 + 50 + 100) / 3
        assert_eq!(ds.mean_of(Metric::Likes), Some(250.0 / 3.0));
        // Missing sentiment on P3 is excluded, not counted as zero.
        assert_eq!(ds.mean_of(Metric::Sentiment), Some(0.2));
    }

    #[test]
    fn test_mean_where_filters_by_type() {
        let ds = fixture();
        let mean = ds.mean_where(Metric::Likes, |r| r.type_matches("reels"));
        assert_eq!(mean, Some(100.0));
    }

    #[test]
    fn test_mean_of_empty_match_is_none() {
        let ds = fixture();
        assert_eq!(ds.mean_where(Metric::Likes, |r| r.type_matches("story")), None);
        assert_eq!(Dataset::default().mean_of(Metric::Likes), None);
    }

    #[test]
    fn test_arg_max_ties_resolve_to_first() {
        let ds = fixture();
        // P1 and P3 both have 100 likes; dataset order wins.
        assert_eq!(ds.arg_max(Metric::Likes).unwrap().post_id, "P1");
        assert_eq!(ds.arg_max(Metric::Shares).unwrap().post_id, "P2");
    }

    #[test]
    fn test_arg_max_skips_missing_values() {
        let ds = Dataset::from_records(vec![PostRecord {
            post_id: "P1".to_string(),
            post_type: "Post".to_string(),
            likes: None,
            shares: None,
            comments: None,
            avg_sentiment_score: None,
        }]);
        assert!(ds.arg_max(Metric::Likes).is_none());
    }

    #[test]
    fn test_sum_of_skips_missing_values() {
        let ds = fixture();
        assert_eq!(ds.sum_of(Metric::Likes), 250.0);
        // P3's shares cell is missing.
        assert_eq!(ds.sum_of(Metric::Shares), 80.0);
    }

    #[test]
    fn test_group_sums_insertion_order() {
        let groups = fixture().group_sums_by_type();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].post_type, "Reels");
        assert_eq!(groups[0].likes, 200);
        assert_eq!(groups[0].shares, 20);
        assert_eq!(groups[1].post_type, "Post");
        assert_eq!(groups[1].comments, 10);
    }

    #[test]
    fn test_read_csv_tolerates_missing_cells() {
        let csv = "\
post_id,post_type,likes,shares,comments,avg_sentiment_score
P1,Reels,100,20,5,0.5
P2,Post,50,,10,
";
        let report = Dataset::read_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.rows_used, 2);
        assert!(report.row_errors.is_empty());
        assert_eq!(report.dataset.records()[1].shares, None);
        assert_eq!(report.dataset.records()[1].avg_sentiment_score, None);
    }

    #[test]
    fn test_read_csv_skips_and_reports_bad_rows() {
        let csv = "\
post_id,post_type,likes,shares,comments,avg_sentiment_score
P1,Reels,100,20,5,0.5
P2,Post,not-a-number,60,10,0.1
,Story,10,1,1,0.0
";
        let report = Dataset::read_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.rows_used, 1);
        assert_eq!(report.row_errors.len(), 2);
        assert_eq!(report.row_errors[0].line, 3);
        assert_eq!(report.row_errors[0].post_id.as_deref(), Some("P2"));
        assert_eq!(report.row_errors[1].post_id, None);
    }

    #[test]
    fn test_read_csv_missing_column_is_fatal() {
        let csv = "post_id,post_type,likes\nP1,Reels,100\n";
        let err = Dataset::read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, MetricsError::MissingColumn(c) if c == "shares"));
    }
}
