//! Column role inference.
//!
//! Numeric storage always wins. Text columns are tested for datetime shape
//! with a two-stage heuristic over a seeded sample: a cheap separator/ISO
//! shape filter first, then a full parse of the sample only when enough
//! values look date-like.

use std::{fmt, sync::LazyLock};

use log::debug;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::data::{ColumnData, parse_temporal};

/// Upper bound on values inspected per column.
pub const DATETIME_SAMPLE_SIZE: usize = 50;
/// Seed for the sample draw so repeated runs classify identically.
pub const DATETIME_SAMPLE_SEED: u64 = 0;
/// Fraction of the sample that must look date-shaped before parsing.
pub const SHAPE_COVERAGE_THRESHOLD: f64 = 0.2;
/// Fraction of the sample that must parse as a date.
pub const PARSE_RATE_THRESHOLD: f64 = 0.6;

const DATE_SEPARATORS: [char; 3] = ['-', '/', '.'];

static ISO_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}").expect("valid ISO date regex"));

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Numeric,
    Categorical,
    Datetime,
    Unknown,
}

impl ColumnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::Numeric => "numeric",
            ColumnRole::Categorical => "categorical",
            ColumnRole::Datetime => "datetime",
            ColumnRole::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a non-numeric column holds dates.
pub fn is_datetime_like(column: &ColumnData) -> bool {
    if column.is_numeric() {
        return false;
    }
    let values = column.display_values();
    if values.is_empty() {
        return false;
    }
    let sample = sample_values(&values);
    let sample_size = sample.len();

    let sep_hits = sample
        .iter()
        .filter(|v| v.contains(DATE_SEPARATORS))
        .count();
    let iso_hits = sample
        .iter()
        .filter(|v| ISO_DATE_PREFIX.is_match(v))
        .count();
    let required = (sample_size as f64 * SHAPE_COVERAGE_THRESHOLD).max(1.0);
    if ((sep_hits + iso_hits) as f64) < required {
        debug!(
            "Shape filter rejected column: {} separator and {} ISO hit(s) in {} sampled value(s)",
            sep_hits, iso_hits, sample_size
        );
        return false;
    }

    let parsed = sample
        .iter()
        .filter(|v| parse_temporal(v).is_some())
        .count();
    let rate = parsed as f64 / sample_size as f64;
    debug!("Parsed {parsed} of {sample_size} sampled value(s) as dates ({rate:.2})");
    rate >= PARSE_RATE_THRESHOLD
}

/// Role for one column within a single inspection.
pub fn infer_role(column: &ColumnData) -> ColumnRole {
    if column.is_numeric() {
        ColumnRole::Numeric
    } else if matches!(column, ColumnData::DateTime(_)) || is_datetime_like(column) {
        ColumnRole::Datetime
    } else if column.null_count() == column.len() {
        ColumnRole::Unknown
    } else {
        ColumnRole::Categorical
    }
}

fn sample_values(values: &[String]) -> Vec<&str> {
    if values.len() <= DATETIME_SAMPLE_SIZE {
        return values.iter().map(String::as_str).collect();
    }
    let mut rng = StdRng::seed_from_u64(DATETIME_SAMPLE_SEED);
    values
        .choose_multiple(&mut rng, DATETIME_SAMPLE_SIZE)
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> ColumnData {
        ColumnData::String(values.iter().map(|v| Some(v.to_string())).collect())
    }

    const WORDS: &[&str] = &[
        "apple", "river", "mountain", "cloud", "garden", "window", "silver", "candle", "forest",
        "harbor",
    ];

    #[test]
    fn fifty_iso_dates_classify_as_datetime() {
        let values = (0..50)
            .map(|i| format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1))
            .collect::<Vec<_>>();
        let column = ColumnData::String(values.into_iter().map(Some).collect());
        assert!(is_datetime_like(&column));
        assert_eq!(infer_role(&column), ColumnRole::Datetime);
    }

    #[test]
    fn fifty_words_are_not_datetime() {
        let values = (0..50).map(|i| WORDS[i % WORDS.len()]).collect::<Vec<_>>();
        let column = text(&values);
        assert!(!is_datetime_like(&column));
        assert_eq!(infer_role(&column), ColumnRole::Categorical);
    }

    #[test]
    fn numeric_storage_is_never_datetime() {
        let column = ColumnData::Integer(vec![Some(20240101), Some(20240102)]);
        assert!(!is_datetime_like(&column));
        assert_eq!(infer_role(&column), ColumnRole::Numeric);
    }

    #[test]
    fn all_null_column_is_unknown() {
        let column = ColumnData::String(vec![None, None]);
        assert!(!is_datetime_like(&column));
        assert_eq!(infer_role(&column), ColumnRole::Unknown);
    }

    #[test]
    fn shaped_but_unparseable_values_fail_parse_rate() {
        let column = text(&["v1.2.3", "v2.0.1", "a-b-c", "x/y", "2024-01-01"]);
        assert!(!is_datetime_like(&column));
    }

    #[test]
    fn parse_rate_threshold_is_inclusive() {
        let column = text(&["2024-01-01", "2024-02-01", "2024-03-01", "n-a", "x-y"]);
        assert!(is_datetime_like(&column));
    }

    #[test]
    fn large_columns_are_sampled_deterministically() {
        let mut values = (0..400)
            .map(|i| format!("2023/{:02}/{:02}", i % 12 + 1, i % 27 + 1))
            .collect::<Vec<_>>();
        values.extend((0..100).map(|i| format!("label-{i}")));
        let column = ColumnData::String(values.into_iter().map(Some).collect());
        let first = is_datetime_like(&column);
        let second = is_datetime_like(&column);
        assert_eq!(first, second);
        assert!(first);
    }
}
