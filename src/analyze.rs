//! Full-data statistics pass.

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    classify,
    correlation::CorrelationMatrix,
    data::{ColumnData, Table},
    error::SourceError,
    frequency::{self, CategoricalSummary, TOP_K},
    profile::{Plan, TaskKind},
    source::DataSource,
    stats::NumericSummary,
};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

/// Statistics for one run. Empty categories are omitted when serialized.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_values: Vec<MissingCount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub numeric_summary: Vec<NumericSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categorical_summary: Vec<CategoricalSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationMatrix>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub datetime_columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer;

impl Analyzer {
    /// Reads the whole source and computes every statistic category.
    ///
    /// The plan is informational only; categories it does not request come
    /// back empty anyway when the data does not support them.
    pub fn run<S>(&self, source: &S, plan: &Plan) -> Result<AnalysisResult, SourceError>
    where
        S: DataSource + ?Sized,
    {
        let table = source.read_all()?;
        Ok(self.run_table(&table, &source.describe(), plan))
    }

    /// Same as [`Analyzer::run`] over a table the caller already loaded.
    pub fn run_table(&self, table: &Table, label: &str, plan: &Plan) -> AnalysisResult {
        info!(
            "Analyzing {} row(s) across {} column(s) of {} for {} planned task(s)",
            table.row_count(),
            table.columns().len(),
            label,
            plan.tasks().len()
        );
        let result = analyze_table(table);
        if plan.contains(TaskKind::Correlations) != result.correlations.is_some() {
            debug!("Full-data numeric columns differ from the sampled plan");
        }
        result
    }
}

pub fn analyze_table(table: &Table) -> AnalysisResult {
    let missing_values = table
        .columns()
        .iter()
        .filter_map(|column| {
            let count = column.data.null_count();
            (count > 0).then(|| MissingCount {
                column: column.name.clone(),
                count,
            })
        })
        .collect();

    let numeric = table
        .numeric_columns()
        .filter_map(|column| {
            column
                .data
                .numeric_values()
                .map(|values| (column.name.clone(), values))
        })
        .collect::<Vec<_>>();

    let numeric_summary = numeric
        .iter()
        .map(|(name, values)| NumericSummary::from_values(name, values))
        .collect();

    let categorical_summary = table
        .columns()
        .iter()
        .filter_map(|column| match &column.data {
            ColumnData::String(values) if values.iter().any(Option::is_some) => Some(
                frequency::top_values(&column.name, values.iter().flatten().map(String::as_str), TOP_K),
            ),
            _ => None,
        })
        .collect();

    let correlations = (numeric.len() >= 2).then(|| {
        let matrix = CorrelationMatrix::pearson(&numeric);
        for (i, row) in matrix.names().iter().enumerate() {
            for column in matrix.names().iter().skip(i + 1) {
                if matrix.get(row, column).is_none() {
                    warn!("Correlation between '{row}' and '{column}' is undefined");
                }
            }
        }
        matrix
    });

    let datetime_columns = table
        .columns()
        .iter()
        .filter(|column| {
            matches!(column.data, ColumnData::DateTime(_))
                || classify::is_datetime_like(&column.data)
        })
        .map(|column| column.name.clone())
        .collect();

    AnalysisResult {
        missing_values,
        numeric_summary,
        categorical_summary,
        correlations,
        datetime_columns,
    }
}
