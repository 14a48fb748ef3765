//! Turns an [`AnalysisResult`] into discrete, explainable findings.
//!
//! Ordering is fixed: missing values, numeric summaries (mean/std before the
//! range for each column), categorical leaders, then strong correlations.
//! Correlations are read from the full square matrix, so each strong pair is
//! reported once per direction.

use std::fmt;

use serde::Serialize;

use crate::analyze::AnalysisResult;

/// Absolute coefficient above which a pair is reported.
pub const STRONG_CORRELATION_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Missing,
    Numeric,
    Categorical,
    Correlation,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Insight {
    pub category: InsightCategory,
    pub text: String,
}

impl Insight {
    fn new(category: InsightCategory, text: String) -> Self {
        Self { category, text }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn generate_insights(analysis: &AnalysisResult) -> Vec<Insight> {
    let mut insights = Vec::new();

    for missing in &analysis.missing_values {
        insights.push(Insight::new(
            InsightCategory::Missing,
            format!(
                "Column '{}' has {} missing values.",
                missing.column, missing.count
            ),
        ));
    }

    for summary in &analysis.numeric_summary {
        let col = &summary.column;
        if let (Some(mean), Some(std)) = (summary.mean, summary.std) {
            insights.push(Insight::new(
                InsightCategory::Numeric,
                format!("'{col}' has a mean of {mean:.2} and std of {std:.2}."),
            ));
        }
        if let (Some(min), Some(max)) = (summary.min, summary.max) {
            insights.push(Insight::new(
                InsightCategory::Numeric,
                format!("'{col}' ranges from {min:.2} to {max:.2}."),
            ));
        }
    }

    for summary in &analysis.categorical_summary {
        if let Some(top) = summary.most_common() {
            insights.push(Insight::new(
                InsightCategory::Categorical,
                format!(
                    "Most common value in '{}' is '{}' ({} occurrences).",
                    summary.column, top.value, top.count
                ),
            ));
        }
    }

    if let Some(matrix) = &analysis.correlations {
        for (col, other, value) in matrix.off_diagonal() {
            if value.abs() > STRONG_CORRELATION_THRESHOLD {
                insights.push(Insight::new(
                    InsightCategory::Correlation,
                    format!("'{col}' is strongly correlated with '{other}' (corr={value:.2})."),
                ));
            }
        }
    }

    insights
}
