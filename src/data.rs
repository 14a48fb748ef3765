//! In-memory table model shared by every pipeline stage.
//!
//! A [`Table`] is an ordered list of equally long [`Column`]s. Each column
//! carries a single storage type ([`ColumnData`]) with `None` as the null
//! marker. CSV loading infers storage per column (integer, then float, then
//! string); datetime storage only appears in tables built by the caller.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Exact-match cell values read as missing, alongside the empty cell.
const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y.%m.%d",
    "%d %b %Y",
    "%b %d %Y",
    "%B %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Integer,
    Float,
    String,
    DateTime,
}

impl StorageType {
    pub fn is_numeric(self) -> bool {
        matches!(self, StorageType::Integer | StorageType::Float)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageType::Integer => "integer",
            StorageType::Float => "float",
            StorageType::String => "string",
            StorageType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    String(Vec<Option<String>>),
    DateTime(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    /// Picks the narrowest storage every non-null cell fits: integer, then
    /// float, then string. A column with no values at all stays string.
    pub fn from_cells(cells: Vec<Option<String>>) -> Self {
        let mut any_value = false;
        let mut all_integer = true;
        let mut all_float = true;
        for cell in cells.iter().flatten() {
            any_value = true;
            if all_integer && cell.parse::<i64>().is_err() {
                all_integer = false;
            }
            if all_float && cell.parse::<f64>().is_err() {
                all_float = false;
            }
            if !all_integer && !all_float {
                break;
            }
        }
        if !any_value {
            return ColumnData::String(cells);
        }
        if all_integer {
            ColumnData::Integer(
                cells
                    .iter()
                    .map(|cell| cell.as_deref().and_then(|v| v.parse().ok()))
                    .collect(),
            )
        } else if all_float {
            ColumnData::Float(
                cells
                    .iter()
                    .map(|cell| cell.as_deref().and_then(|v| v.parse().ok()))
                    .collect(),
            )
        } else {
            ColumnData::String(cells)
        }
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            ColumnData::Integer(_) => StorageType::Integer,
            ColumnData::Float(_) => StorageType::Float,
            ColumnData::String(_) => StorageType::String,
            ColumnData::DateTime(_) => StorageType::DateTime,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.storage_type().is_numeric()
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(values) => values.len(),
            ColumnData::Float(values) => values.len(),
            ColumnData::String(values) => values.len(),
            ColumnData::DateTime(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Integer(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::Float(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::String(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::DateTime(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }

    /// Numeric view of the column, `None` for non-numeric storage.
    pub fn numeric_values(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnData::Integer(values) => {
                Some(values.iter().map(|v| v.map(|i| i as f64)).collect())
            }
            ColumnData::Float(values) => Some(values.clone()),
            _ => None,
        }
    }

    /// Non-null values rendered as text, in row order.
    pub fn display_values(&self) -> Vec<String> {
        match self {
            ColumnData::Integer(values) => values.iter().flatten().map(i64::to_string).collect(),
            ColumnData::Float(values) => values.iter().flatten().map(|f| format_float(*f)).collect(),
            ColumnData::String(values) => values.iter().flatten().cloned().collect(),
            ColumnData::DateTime(values) => values
                .iter()
                .flatten()
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .collect(),
        }
    }

    /// Number of distinct non-null values.
    pub fn distinct_count(&self) -> usize {
        match self {
            ColumnData::Integer(values) => values.iter().flatten().collect::<HashSet<_>>().len(),
            ColumnData::Float(values) => values
                .iter()
                .flatten()
                .map(|f| if *f == 0.0 { 0u64 } else { f.to_bits() })
                .collect::<HashSet<_>>()
                .len(),
            ColumnData::String(values) => values.iter().flatten().collect::<HashSet<_>>().len(),
            ColumnData::DateTime(values) => values.iter().flatten().collect::<HashSet<_>>().len(),
        }
    }

    fn head(&self, rows: usize) -> Self {
        match self {
            ColumnData::Integer(values) => ColumnData::Integer(values.iter().take(rows).cloned().collect()),
            ColumnData::Float(values) => ColumnData::Float(values.iter().take(rows).cloned().collect()),
            ColumnData::String(values) => ColumnData::String(values.iter().take(rows).cloned().collect()),
            ColumnData::DateTime(values) => {
                ColumnData::DateTime(values.iter().take(rows).cloned().collect())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self, SourceError> {
        let mut names = HashSet::with_capacity(columns.len());
        if let Some(column) = columns.iter().find(|c| !names.insert(c.name.as_str())) {
            return Err(SourceError::DuplicateColumn {
                column: column.name.clone(),
            });
        }
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        if let Some(column) = columns.iter().find(|c| c.data.len() != rows) {
            return Err(SourceError::ColumnLength {
                column: column.name.clone(),
                expected: rows,
                found: column.data.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Builds a table from raw text cells, applying null markers and storage
    /// inference per column. Repeated headers are renamed `v`, `v.1`, ...
    /// and rows shorter than the header are padded with nulls.
    pub fn from_text_rows(headers: &[String], rows: &[Vec<String>]) -> Result<Self, SourceError> {
        let columns = dedupe_headers(headers)
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells = rows
                    .iter()
                    .map(|row| row.get(idx).and_then(|raw| normalize_cell(raw)))
                    .collect();
                Column::new(name, ColumnData::from_cells(cells))
            })
            .collect();
        Table::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.data.is_numeric())
    }

    /// First `rows` rows; `0` keeps everything.
    pub fn head(&self, rows: usize) -> Table {
        if rows == 0 || rows >= self.rows {
            return self.clone();
        }
        Table {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.head(rows)))
                .collect(),
            rows,
        }
    }
}

/// Renames repeated names to `name.1`, `name.2`, ... skipping any suffix
/// that is already taken.
pub fn dedupe_headers(headers: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::with_capacity(headers.len());
    headers
        .iter()
        .map(|header| {
            let mut name = header.clone();
            let mut seen = counts.get(&name).copied().unwrap_or(0);
            while seen > 0 {
                counts.insert(name.clone(), seen + 1);
                name = format!("{name}.{seen}");
                seen = counts.get(&name).copied().unwrap_or(0);
            }
            if name != *header {
                debug!("Renamed duplicate header '{header}' to '{name}'");
            }
            counts.insert(name.clone(), seen + 1);
            name
        })
        .collect()
}

/// Case-sensitive: `NA` and `null` are missing, `Na` and `NONE` are values.
pub fn is_null_marker(value: &str) -> bool {
    value.is_empty() || NULL_TOKENS.contains(&value)
}

/// Whitespace-only cells are kept verbatim; anything else is trimmed.
pub fn normalize_cell(raw: &str) -> Option<String> {
    if is_null_marker(raw) {
        return None;
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Some(raw.to_string())
    } else {
        Some(trimmed.to_string())
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Parses a date or a date-time; plain dates land at midnight.
pub fn parse_temporal(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    parse_naive_datetime(trimmed)
        .ok()
        .or_else(|| {
            parse_naive_date(trimmed)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

pub fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
