//! Sample-based profiling: column roles, the analysis plan, chart selection
//! and binary-target suggestions.

use std::{collections::BTreeMap, fmt};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    classify::{self, ColumnRole},
    data::{StorageType, Table},
    error::SourceError,
    source::DataSource,
};

pub const DEFAULT_SAMPLE_ROWS: usize = 200;

const BINARY_TARGET_REASON: &str = "binary target candidate";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub storage: StorageType,
    pub inferred_role: ColumnRole,
    /// Distinct non-null values in the sample.
    pub cardinality: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    OverviewSummary,
    MissingValues,
    UnivariateNumeric,
    UnivariateCategorical,
    TimeSeries,
    Correlations,
    TargetSuggestion,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::OverviewSummary => "overview_summary",
            TaskKind::MissingValues => "missing_values",
            TaskKind::UnivariateNumeric => "univariate_numeric",
            TaskKind::UnivariateCategorical => "univariate_categorical",
            TaskKind::TimeSeries => "time_series",
            TaskKind::Correlations => "correlations",
            TaskKind::TargetSuggestion => "target_suggestion",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanTask {
    pub task: TaskKind,
    /// 1 is the highest priority.
    pub priority: u8,
}

/// Analysis tasks ordered by ascending priority; ties keep insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Plan(Vec<PlanTask>);

impl Plan {
    pub fn new(mut tasks: Vec<PlanTask>) -> Self {
        tasks.sort_by_key(|t| t.priority);
        Plan(tasks)
    }

    pub fn tasks(&self) -> &[PlanTask] {
        &self.0
    }

    pub fn contains(&self, kind: TaskKind) -> bool {
        self.0.iter().any(|t| t.task == kind)
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.0.iter().map(|t| t.task.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Histogram,
    Box,
    BarTopk,
    CorrelationHeatmap,
}

impl ChartType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Histogram => "histogram",
            ChartType::Box => "box",
            ChartType::BarTopk => "bar_topk",
            ChartType::CorrelationHeatmap => "correlation_heatmap",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartSpec {
    pub chart_type: ChartType,
    pub column: Option<String>,
}

impl ChartSpec {
    pub fn for_column(chart_type: ChartType, column: &str) -> Self {
        Self {
            chart_type,
            column: Some(column.to_string()),
        }
    }

    pub fn heatmap() -> Self {
        Self {
            chart_type: ChartType::CorrelationHeatmap,
            column: None,
        }
    }

    /// File stem used by chart renderers, e.g. `histogram_price`.
    pub fn artifact_stem(&self) -> String {
        match &self.column {
            Some(column) => format!("{}_{}", self.chart_type, sanitize_file_component(column)),
            None => self.chart_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetSuggestion {
    pub column: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub source: String,
    pub rows_sampled: usize,
    pub columns: Vec<ColumnDescriptor>,
    /// Column name to storage type.
    pub dtypes: BTreeMap<String, StorageType>,
    pub numeric_cols: Vec<String>,
    pub categorical_cols: Vec<String>,
    pub datetime_cols: Vec<String>,
    pub suggestions: Vec<TargetSuggestion>,
    pub plan: Plan,
    pub charts: Vec<ChartSpec>,
}

impl Profile {
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Profiler {
    sample_rows: usize,
}

impl Default for Profiler {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }
}

impl Profiler {
    /// `0` disables the row cap.
    pub fn new(sample_rows: usize) -> Self {
        Self { sample_rows }
    }

    pub fn sample_rows(&self) -> usize {
        self.sample_rows
    }

    pub fn inspect<S>(&self, source: &S) -> Result<Profile, SourceError>
    where
        S: DataSource + ?Sized,
    {
        let sample = source.read_head(self.sample_rows)?;
        info!(
            "Profiling {} column(s) from {} sampled row(s) of {}",
            sample.columns().len(),
            sample.row_count(),
            source.describe()
        );
        Ok(profile_table(&sample, source.describe()))
    }

    /// Profiles a table that is already in memory, looking at the same
    /// leading rows [`Profiler::inspect`] would read.
    pub fn inspect_table(&self, table: &Table, source: String) -> Profile {
        let sample = table.head(self.sample_rows);
        info!(
            "Profiling {} column(s) from {} sampled row(s) of {}",
            sample.columns().len(),
            sample.row_count(),
            source
        );
        profile_table(&sample, source)
    }
}

fn profile_table(sample: &Table, source: String) -> Profile {
    let columns = sample
        .columns()
        .iter()
        .map(|column| {
            let descriptor = ColumnDescriptor {
                name: column.name.clone(),
                storage: column.data.storage_type(),
                inferred_role: classify::infer_role(&column.data),
                cardinality: column.data.distinct_count(),
            };
            debug!(
                "Column '{}' ({}) classified as {} with cardinality {}",
                descriptor.name, descriptor.storage, descriptor.inferred_role, descriptor.cardinality
            );
            descriptor
        })
        .collect::<Vec<_>>();

    let names_with_role = |role: ColumnRole| {
        columns
            .iter()
            .filter(|c| c.inferred_role == role)
            .map(|c| c.name.clone())
            .collect::<Vec<_>>()
    };
    let numeric_cols = names_with_role(ColumnRole::Numeric);
    let categorical_cols = names_with_role(ColumnRole::Categorical);
    let datetime_cols = names_with_role(ColumnRole::Datetime);

    let suggestions = columns
        .iter()
        .filter(|c| c.cardinality == 2)
        .map(|c| TargetSuggestion {
            column: c.name.clone(),
            reason: BINARY_TARGET_REASON.to_string(),
        })
        .collect::<Vec<_>>();

    let plan = build_plan(
        numeric_cols.len(),
        !categorical_cols.is_empty(),
        !datetime_cols.is_empty(),
        !suggestions.is_empty(),
    );
    let charts = select_charts(&numeric_cols, &categorical_cols);
    let dtypes = columns
        .iter()
        .map(|c| (c.name.clone(), c.storage))
        .collect();

    Profile {
        source,
        rows_sampled: sample.row_count(),
        columns,
        dtypes,
        numeric_cols,
        categorical_cols,
        datetime_cols,
        suggestions,
        plan,
        charts,
    }
}

fn build_plan(
    numeric_count: usize,
    has_categorical: bool,
    has_datetime: bool,
    has_suggestions: bool,
) -> Plan {
    let mut tasks = vec![
        PlanTask {
            task: TaskKind::OverviewSummary,
            priority: 1,
        },
        PlanTask {
            task: TaskKind::MissingValues,
            priority: 1,
        },
    ];
    if numeric_count > 0 {
        tasks.push(PlanTask {
            task: TaskKind::UnivariateNumeric,
            priority: 2,
        });
    }
    if has_categorical {
        tasks.push(PlanTask {
            task: TaskKind::UnivariateCategorical,
            priority: 2,
        });
    }
    if has_datetime {
        tasks.push(PlanTask {
            task: TaskKind::TimeSeries,
            priority: 2,
        });
    }
    if numeric_count >= 2 {
        tasks.push(PlanTask {
            task: TaskKind::Correlations,
            priority: 3,
        });
    }
    if has_suggestions {
        tasks.push(PlanTask {
            task: TaskKind::TargetSuggestion,
            priority: 1,
        });
    }
    Plan::new(tasks)
}

fn select_charts(numeric_cols: &[String], categorical_cols: &[String]) -> Vec<ChartSpec> {
    let mut charts = Vec::with_capacity(numeric_cols.len() * 2 + categorical_cols.len());
    for column in numeric_cols {
        charts.push(ChartSpec::for_column(ChartType::Histogram, column));
        charts.push(ChartSpec::for_column(ChartType::Box, column));
    }
    for column in categorical_cols {
        charts.push(ChartSpec::for_column(ChartType::BarTopk, column));
    }
    charts
}

fn sanitize_file_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
