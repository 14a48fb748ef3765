use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a tabular source. These are fatal for the caller:
/// no partial profile or analysis is ever returned alongside one.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Opening input file {path:?}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Reading CSV data from {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to decode text in {path:?} with encoding {encoding}")]
    Decode { path: PathBuf, encoding: &'static str },
    #[error("Input {path:?} has no header row")]
    MissingHeader { path: PathBuf },
    #[error("Row {row} has {found} field(s) but the header declares {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Column '{column}' appears more than once")]
    DuplicateColumn { column: String },
    #[error("Column '{column}' has {found} value(s), expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Failures for a single chart artifact. Absorbed per chart by
/// [`crate::render::render_charts`].
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Column '{0}' not found")]
    UnknownColumn(String),
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
    #[error("Column '{0}' has no values to plot")]
    EmptyColumn(String),
    #[error("Chart '{0}' requires a column")]
    MissingColumn(&'static str),
    #[error("Correlation heatmap requires at least two numeric columns")]
    NotEnoughNumericColumns,
    #[error("Writing chart artifact {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Writing chart artifact {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
