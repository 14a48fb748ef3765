use std::{fmt, path::Path};

use itertools::Itertools;

/// Minimum trimmed report length, in characters.
pub const MIN_REPORT_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityIssue {
    ReportTooShort,
    NoCharts,
}

impl QualityIssue {
    pub fn message(self) -> &'static str {
        match self {
            QualityIssue::ReportTooShort => "Report too short or missing.",
            QualityIssue::NoCharts => "No charts generated.",
        }
    }
}

/// Renders as `PASS` or `FAIL: <issue>; <issue>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Vec<QualityIssue>),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("PASS"),
            Verdict::Fail(issues) => {
                write!(f, "FAIL: {}", issues.iter().map(|issue| issue.message()).join("; "))
            }
        }
    }
}

pub fn check<P: AsRef<Path>>(report_text: &str, chart_paths: &[P]) -> Verdict {
    let mut issues = Vec::new();
    if report_text.trim().chars().count() < MIN_REPORT_CHARS {
        issues.push(QualityIssue::ReportTooShort);
    }
    if chart_paths.is_empty() {
        issues.push(QualityIssue::NoCharts);
    }
    if issues.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail(issues)
    }
}
