//! Report composition.
//!
//! A composer turns column metadata, insights and chart artifacts into free
//! text. [`OfflineComposer`] stands in for a language model: it builds the
//! analyst prompt and echoes a bounded, flattened copy of it behind a
//! placeholder marker.

use std::{fmt::Write as _, path::PathBuf};

use anyhow::Result;

use crate::{insight::Insight, profile::Profile};

pub const PLACEHOLDER_MARKER: &str = "[LLM_PLACEHOLDER]";
/// Characters of the prompt echoed by the offline composer.
pub const PROMPT_ECHO_CHARS: usize = 800;

/// Everything a composer may draw on for one report.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    pub profile: &'a Profile,
    pub insights: &'a [Insight],
    pub charts: &'a [PathBuf],
    pub tone: &'a str,
}

pub trait ReportComposer {
    fn compose(&self, request: &ReportRequest<'_>) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineComposer;

impl ReportComposer for OfflineComposer {
    fn compose(&self, request: &ReportRequest<'_>) -> Result<String> {
        let prompt = build_prompt(request);
        let echoed = prompt
            .chars()
            .take(PROMPT_ECHO_CHARS)
            .collect::<String>()
            .replace('\n', " ");
        Ok(format!("{PLACEHOLDER_MARKER}\n{echoed}"))
    }
}

pub fn build_prompt(request: &ReportRequest<'_>) -> String {
    let profile = request.profile;
    let insights_text = if request.insights.is_empty() {
        "No insights.".to_string()
    } else {
        request
            .insights
            .iter()
            .map(|insight| format!("- {insight}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let charts = request
        .charts
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>();

    let mut prompt = String::from(
        "You are a senior data analyst. Produce a concise executive summary (600-900 words).\n\n",
    );
    let _ = writeln!(prompt, "Columns: {:?}", profile.column_names());
    let _ = writeln!(prompt, "Numeric columns: {:?}", profile.numeric_cols);
    let _ = writeln!(prompt, "Categorical columns: {:?}", profile.categorical_cols);
    let _ = writeln!(prompt, "Datetime columns: {:?}\n", profile.datetime_cols);
    let _ = writeln!(prompt, "Top insights:\n{insights_text}\n");
    let _ = writeln!(prompt, "Charts: {charts:?}");
    let _ = writeln!(prompt, "Tone: {}", request.tone);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::{Column, ColumnData, Table},
        insight::InsightCategory,
        profile::Profiler,
    };

    fn profile() -> Profile {
        let table = Table::new(vec![Column::new(
            "score",
            ColumnData::Integer(vec![Some(1), Some(2)]),
        )])
        .expect("table");
        Profiler::default().inspect(&table).expect("profile")
    }

    #[test]
    fn prompt_lists_insights_and_tone() {
        let profile = profile();
        let insights = vec![Insight {
            category: InsightCategory::Numeric,
            text: "'score' ranges from 1.00 to 2.00.".to_string(),
        }];
        let charts = vec![PathBuf::from("out/histogram_score.csv")];
        let prompt = build_prompt(&ReportRequest {
            profile: &profile,
            insights: &insights,
            charts: &charts,
            tone: "casual",
        });
        assert!(prompt.contains("Columns: [\"score\"]"));
        assert!(prompt.contains("- 'score' ranges from 1.00 to 2.00."));
        assert!(prompt.contains("histogram_score.csv"));
        assert!(prompt.ends_with("Tone: casual\n"));
    }

    #[test]
    fn offline_composer_flattens_and_bounds_the_prompt() {
        let profile = profile();
        let report = OfflineComposer
            .compose(&ReportRequest {
                profile: &profile,
                insights: &[],
                charts: &[],
                tone: "business",
            })
            .expect("compose");
        let (marker, body) = report.split_once('\n').expect("marker line");
        assert_eq!(marker, PLACEHOLDER_MARKER);
        assert!(!body.contains('\n'));
        assert!(body.chars().count() <= PROMPT_ECHO_CHARS);
        assert!(body.contains("No insights."));
    }
}
