//! Chart artifact production.
//!
//! Renderers work one spec at a time; [`render_charts`] keeps going after a
//! failed spec and reports every outcome so the caller decides what to do.
//! [`ChartDataWriter`] writes the data each chart would plot as CSV files.

use std::{
    cell::RefCell,
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    correlation::CorrelationMatrix,
    data::{ColumnData, Table},
    error::RenderError,
    frequency::{self, TOP_K},
    io_utils,
    profile::{ChartSpec, ChartType},
    stats::quantile,
};

/// Planned charts rendered per run; the heatmap is appended on top.
pub const DEFAULT_MAX_CHARTS: usize = 8;

const WHISKER_IQR_FACTOR: f64 = 1.5;

pub trait ChartRenderer {
    fn render(&self, spec: &ChartSpec, table: &Table) -> Result<PathBuf, RenderError>;
}

#[derive(Debug)]
pub enum ChartOutcome {
    Rendered { spec: ChartSpec, path: PathBuf },
    Failed { spec: ChartSpec, error: RenderError },
}

impl ChartOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ChartOutcome::Rendered { path, .. } => Some(path),
            ChartOutcome::Failed { .. } => None,
        }
    }

    pub fn spec(&self) -> &ChartSpec {
        match self {
            ChartOutcome::Rendered { spec, .. } | ChartOutcome::Failed { spec, .. } => spec,
        }
    }
}

/// Renders up to `max_charts` specs, then a correlation heatmap when the
/// table has at least two numeric columns.
pub fn render_charts<R>(
    renderer: &R,
    specs: &[ChartSpec],
    table: &Table,
    max_charts: usize,
) -> Vec<ChartOutcome>
where
    R: ChartRenderer + ?Sized,
{
    let mut queue = specs.iter().take(max_charts).cloned().collect::<Vec<_>>();
    if table.numeric_columns().count() >= 2 {
        queue.push(ChartSpec::heatmap());
    }
    let outcomes = queue
        .into_iter()
        .map(|spec| match renderer.render(&spec, table) {
            Ok(path) => {
                debug!("Rendered {} to {:?}", spec.artifact_stem(), path);
                ChartOutcome::Rendered { spec, path }
            }
            Err(error) => {
                warn!("Skipping chart {}: {error}", spec.artifact_stem());
                ChartOutcome::Failed { spec, error }
            }
        })
        .collect::<Vec<_>>();
    info!(
        "Rendered {} of {} chart(s)",
        outcomes.iter().filter(|o| o.path().is_some()).count(),
        outcomes.len()
    );
    outcomes
}

pub fn rendered_paths(outcomes: &[ChartOutcome]) -> Vec<PathBuf> {
    outcomes
        .iter()
        .filter_map(|o| o.path().map(Path::to_path_buf))
        .collect()
}

/// Writes `<chart_type>_<column>.csv` files under `out_dir`.
///
/// A writer never overwrites an artifact it produced itself: when two specs
/// map to the same stem, later ones get a `_2`, `_3`, ... suffix.
#[derive(Debug, Clone)]
pub struct ChartDataWriter {
    out_dir: PathBuf,
    written: RefCell<HashSet<PathBuf>>,
}

impl ChartDataWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: RefCell::new(HashSet::new()),
        }
    }

    fn artifact_path(&self, spec: &ChartSpec) -> PathBuf {
        let stem = spec.artifact_stem();
        let written = self.written.borrow();
        let mut path = self.out_dir.join(format!("{stem}.csv"));
        let mut index = 2;
        while written.contains(&path) {
            path = self.out_dir.join(format!("{stem}_{index}.csv"));
            index += 1;
        }
        path
    }

    fn write_rows(&self, path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), RenderError> {
        fs::create_dir_all(&self.out_dir).map_err(|source| RenderError::Io {
            path: self.out_dir.clone(),
            source,
        })?;
        let mut writer = io_utils::open_csv_writer(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let csv_error = |source: csv::Error| RenderError::Csv {
            path: path.to_path_buf(),
            source,
        };
        writer.write_record(header).map_err(csv_error)?;
        for row in rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        writer.flush().map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ChartRenderer for ChartDataWriter {
    fn render(&self, spec: &ChartSpec, table: &Table) -> Result<PathBuf, RenderError> {
        let path = self.artifact_path(spec);
        match spec.chart_type {
            ChartType::Histogram => {
                let values = numeric_column(spec, table)?;
                self.write_rows(&path, &["bin_start", "bin_end", "count"], &histogram_rows(&values))?;
            }
            ChartType::Box => {
                let values = numeric_column(spec, table)?;
                self.write_rows(&path, &["statistic", "value"], &box_rows(values))?;
            }
            ChartType::BarTopk => {
                let name = spec.column.as_deref().ok_or(RenderError::MissingColumn("bar_topk"))?;
                let column = table
                    .column(name)
                    .ok_or_else(|| RenderError::UnknownColumn(name.to_string()))?;
                let values = column.data.display_values();
                if values.is_empty() {
                    return Err(RenderError::EmptyColumn(name.to_string()));
                }
                let summary = frequency::top_values(name, values.iter().map(String::as_str), TOP_K);
                let rows = summary
                    .top
                    .into_iter()
                    .map(|vc| vec![vc.value, vc.count.to_string()])
                    .collect::<Vec<_>>();
                self.write_rows(&path, &["value", "count"], &rows)?;
            }
            ChartType::CorrelationHeatmap => {
                let numeric = table
                    .numeric_columns()
                    .filter_map(|c| c.data.numeric_values().map(|v| (c.name.clone(), v)))
                    .collect::<Vec<_>>();
                if numeric.len() < 2 {
                    return Err(RenderError::NotEnoughNumericColumns);
                }
                let matrix = CorrelationMatrix::pearson(&numeric);
                let mut header = vec![""];
                header.extend(matrix.names().iter().map(String::as_str));
                self.write_rows(&path, &header, &heatmap_rows(&matrix))?;
            }
        }
        self.written.borrow_mut().insert(path.clone());
        Ok(path)
    }
}

fn numeric_column(spec: &ChartSpec, table: &Table) -> Result<Vec<f64>, RenderError> {
    let name = spec
        .column
        .as_deref()
        .ok_or(RenderError::MissingColumn(spec.chart_type.as_str()))?;
    let column = table
        .column(name)
        .ok_or_else(|| RenderError::UnknownColumn(name.to_string()))?;
    let values = match &column.data {
        ColumnData::Integer(_) | ColumnData::Float(_) => column
            .data
            .numeric_values()
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>(),
        _ => return Err(RenderError::NotNumeric(name.to_string())),
    };
    if values.is_empty() {
        return Err(RenderError::EmptyColumn(name.to_string()));
    }
    Ok(values)
}

/// Equal-width bins, Sturges' rule for the bin count.
fn histogram_rows(values: &[f64]) -> Vec<Vec<String>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![vec![min.to_string(), max.to_string(), values.len().to_string()]];
    }
    let bins = ((values.len() as f64).log2().ceil() as usize + 1).max(1);
    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in values {
        let slot = (((value - min) / width) as usize).min(bins - 1);
        counts[slot] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| {
            let start = min + width * idx as f64;
            let end = if idx + 1 == bins { max } else { start + width };
            vec![start.to_string(), end.to_string(), count.to_string()]
        })
        .collect()
}

fn box_rows(mut values: Vec<f64>) -> Vec<Vec<String>> {
    values.sort_by(f64::total_cmp);
    let q1 = quantile(&values, 0.25).unwrap_or_default();
    let median = quantile(&values, 0.5).unwrap_or_default();
    let q3 = quantile(&values, 0.75).unwrap_or_default();
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
    let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;
    let inside = values
        .iter()
        .copied()
        .filter(|v| *v >= low_fence && *v <= high_fence)
        .collect::<Vec<_>>();
    let lower_whisker = inside.first().copied().unwrap_or(q1);
    let upper_whisker = inside.last().copied().unwrap_or(q3);
    let outliers = values.len() - inside.len();
    [
        ("min", values[0]),
        ("lower_whisker", lower_whisker),
        ("q1", q1),
        ("median", median),
        ("q3", q3),
        ("upper_whisker", upper_whisker),
        ("max", values[values.len() - 1]),
    ]
    .into_iter()
    .map(|(name, value)| vec![name.to_string(), value.to_string()])
    .chain(std::iter::once(vec![
        "outliers".to_string(),
        outliers.to_string(),
    ]))
    .collect()
}

fn heatmap_rows(matrix: &CorrelationMatrix) -> Vec<Vec<String>> {
    matrix
        .names()
        .iter()
        .map(|row| {
            let mut cells = vec![row.clone()];
            cells.extend(matrix.names().iter().map(|column| {
                matrix
                    .get(row, column)
                    .map(|value| format!("{value:.4}"))
                    .unwrap_or_default()
            }));
            cells
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use tempfile::tempdir;

    fn table() -> Table {
        Table::new(vec![
            Column::new(
                "a",
                ColumnData::Float(vec![Some(1.0), Some(2.0), Some(3.0), Some(40.0)]),
            ),
            Column::new("b", ColumnData::Integer(vec![Some(2), Some(4), Some(6), Some(8)])),
            Column::new(
                "label",
                ColumnData::String(vec![
                    Some("x".to_string()),
                    Some("y".to_string()),
                    Some("x".to_string()),
                    None,
                ]),
            ),
        ])
        .expect("table")
    }

    #[test]
    fn failed_specs_do_not_stop_the_rest() {
        let dir = tempdir().expect("temp dir");
        let writer = ChartDataWriter::new(dir.path());
        let specs = vec![
            ChartSpec::for_column(ChartType::Histogram, "missing"),
            ChartSpec::for_column(ChartType::Histogram, "label"),
            ChartSpec::for_column(ChartType::Box, "a"),
            ChartSpec::for_column(ChartType::BarTopk, "label"),
        ];
        let outcomes = render_charts(&writer, &specs, &table(), DEFAULT_MAX_CHARTS);
        assert_eq!(outcomes.len(), 5);
        assert!(matches!(
            &outcomes[0],
            ChartOutcome::Failed {
                error: RenderError::UnknownColumn(_),
                ..
            }
        ));
        assert!(matches!(
            &outcomes[1],
            ChartOutcome::Failed {
                error: RenderError::NotNumeric(_),
                ..
            }
        ));
        let paths = rendered_paths(&outcomes);
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.exists()));
        assert_eq!(
            outcomes[4].spec().chart_type,
            ChartType::CorrelationHeatmap
        );
    }

    #[test]
    fn max_charts_caps_specs_but_not_heatmap() {
        let dir = tempdir().expect("temp dir");
        let writer = ChartDataWriter::new(dir.path());
        let specs = vec![
            ChartSpec::for_column(ChartType::Histogram, "a"),
            ChartSpec::for_column(ChartType::Box, "a"),
            ChartSpec::for_column(ChartType::Histogram, "b"),
        ];
        let outcomes = render_charts(&writer, &specs, &table(), 1);
        let kinds = outcomes
            .iter()
            .map(|o| o.spec().chart_type)
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec![ChartType::Histogram, ChartType::CorrelationHeatmap]);
    }

    #[test]
    fn colliding_stems_get_distinct_artifacts() {
        let dir = tempdir().expect("temp dir");
        let writer = ChartDataWriter::new(dir.path());
        let table = Table::new(vec![
            Column::new("a b", ColumnData::Integer(vec![Some(1), Some(2), Some(3)])),
            Column::new("a_b", ColumnData::Integer(vec![Some(7), Some(8), Some(9)])),
        ])
        .expect("table");
        let specs = vec![
            ChartSpec::for_column(ChartType::Histogram, "a b"),
            ChartSpec::for_column(ChartType::Histogram, "a_b"),
        ];
        let outcomes = render_charts(&writer, &specs, &table, DEFAULT_MAX_CHARTS);
        let paths = rendered_paths(&outcomes);
        assert_eq!(paths.len(), 3);
        assert_eq!(paths.iter().collect::<HashSet<_>>().len(), 3);
        assert!(paths[0].ends_with("histogram_a_b.csv"));
        assert!(paths[1].ends_with("histogram_a_b_2.csv"));
        let first = fs::read_to_string(&paths[0]).expect("first artifact");
        let second = fs::read_to_string(&paths[1]).expect("second artifact");
        assert!(first.starts_with("bin_start,bin_end,count\n1,"));
        assert!(second.starts_with("bin_start,bin_end,count\n7,"));
        assert_eq!(fs::read_dir(dir.path()).expect("dir").count(), 3);
    }

    #[test]
    fn box_rows_flag_outliers() {
        let rows = box_rows(vec![1.0, 2.0, 3.0, 40.0]);
        assert_eq!(rows.last().unwrap(), &vec!["outliers".to_string(), "1".to_string()]);
        assert_eq!(rows[0], vec!["min".to_string(), "1".to_string()]);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = (0..100).map(f64::from).collect::<Vec<_>>();
        let rows = histogram_rows(&values);
        assert_eq!(rows.len(), 8);
        let total: usize = rows.iter().map(|r| r[2].parse::<usize>().unwrap()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn bar_chart_writes_top_values() {
        let dir = tempdir().expect("temp dir");
        let writer = ChartDataWriter::new(dir.path());
        let path = writer
            .render(&ChartSpec::for_column(ChartType::BarTopk, "label"), &table())
            .expect("render");
        let contents = fs::read_to_string(path).expect("read artifact");
        assert_eq!(contents, "value,count\nx,2\ny,1\n");
    }
}
