//! Plain-text rendering of profiles, analysis results and insights.

use std::{borrow::Cow, fmt::Write as _};

use crate::{analyze::AnalysisResult, insight::Insight, profile::Profile};

/// Column-aligned text table. Cells that parse as numbers are right-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(sanitize_cell(cell).chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let headers = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    print!("{}", render_table(&headers, rows));
}

pub fn print_profile(profile: &Profile) {
    println!(
        "Profile of {} ({} sampled row(s))\n",
        profile.source, profile.rows_sampled
    );
    let rows = profile
        .columns
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.storage.to_string(),
                c.inferred_role.to_string(),
                c.cardinality.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    print_table(&["column", "storage", "role", "cardinality"], &rows);

    println!();
    let plan = profile
        .plan
        .tasks()
        .iter()
        .map(|t| vec![t.task.to_string(), t.priority.to_string()])
        .collect::<Vec<_>>();
    print_table(&["task", "priority"], &plan);

    println!();
    let charts = profile
        .charts
        .iter()
        .map(|c| vec![c.chart_type.to_string(), c.column.clone().unwrap_or_default()])
        .collect::<Vec<_>>();
    print_table(&["chart", "column"], &charts);

    if !profile.suggestions.is_empty() {
        println!();
        let suggestions = profile
            .suggestions
            .iter()
            .map(|s| vec![s.column.clone(), s.reason.clone()])
            .collect::<Vec<_>>();
        print_table(&["column", "suggestion"], &suggestions);
    }
}

pub fn print_analysis(analysis: &AnalysisResult, insights: &[Insight]) {
    if !analysis.missing_values.is_empty() {
        let rows = analysis
            .missing_values
            .iter()
            .map(|m| vec![m.column.clone(), m.count.to_string()])
            .collect::<Vec<_>>();
        print_table(&["column", "missing"], &rows);
        println!();
    }
    if !analysis.numeric_summary.is_empty() {
        let rows = analysis
            .numeric_summary
            .iter()
            .map(|s| {
                vec![
                    s.column.clone(),
                    s.count.to_string(),
                    format_metric(s.mean),
                    format_metric(s.std),
                    format_metric(s.min),
                    format_metric(s.p25),
                    format_metric(s.p50),
                    format_metric(s.p75),
                    format_metric(s.max),
                ]
            })
            .collect::<Vec<_>>();
        print_table(
            &["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"],
            &rows,
        );
        println!();
    }
    if !analysis.categorical_summary.is_empty() {
        let rows = analysis
            .categorical_summary
            .iter()
            .flat_map(|summary| {
                summary
                    .top
                    .iter()
                    .map(|vc| vec![summary.column.clone(), vc.value.clone(), vc.count.to_string()])
            })
            .collect::<Vec<_>>();
        print_table(&["column", "value", "count"], &rows);
        println!();
    }
    if !analysis.datetime_columns.is_empty() {
        println!("Datetime columns: {}\n", analysis.datetime_columns.join(", "));
    }
    if insights.is_empty() {
        println!("No insights.");
    } else {
        println!("Insights:");
        for insight in insights {
            println!("- {insight}");
        }
    }
}

fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{v:.0}"),
        Some(v) => format!("{v:.4}"),
        None => String::new(),
    }
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (value, width) in values.iter().zip(widths) {
        let sanitized = sanitize_cell(value);
        let padding = width.saturating_sub(sanitized.chars().count());
        let cell = if looks_numeric(&sanitized) {
            format!("{}{}", " ".repeat(padding), sanitized)
        } else {
            format!("{}{}", sanitized, " ".repeat(padding))
        };
        cells.push(cell);
    }
    cells.join("  ").trim_end().to_string()
}

fn looks_numeric(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_ok()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
