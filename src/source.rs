use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{data::Table, error::SourceError, io_utils};

/// Supplies tabular data to the profiler and analyzer.
///
/// The profiler only needs the first rows; the analyzer reads everything.
/// Implementations must return the same table for the same unmodified input.
pub trait DataSource {
    /// Human readable label used in logs and reports.
    fn describe(&self) -> String;

    /// At most `rows` rows; `0` means no cap.
    fn read_head(&self, rows: usize) -> Result<Table, SourceError>;

    fn read_all(&self) -> Result<Table, SourceError> {
        self.read_head(0)
    }
}

impl DataSource for Table {
    fn describe(&self) -> String {
        format!(
            "in-memory table ({} column(s), {} row(s))",
            self.columns().len(),
            self.row_count()
        )
    }

    fn read_head(&self, rows: usize) -> Result<Table, SourceError> {
        Ok(self.head(rows))
    }
}

/// A delimited file on disk with a header row.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    encoding: &'static Encoding,
}

impl CsvSource {
    /// Delimiter from the file extension, UTF-8 input.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let delimiter = io_utils::resolve_input_delimiter(&path, None);
        Self {
            path,
            delimiter,
            encoding: UTF_8,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = io_utils::resolve_input_delimiter(&self.path, delimiter);
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_head(&self, rows: usize) -> Result<Table, SourceError> {
        let mut reader = io_utils::open_csv_reader_from_path(&self.path, self.delimiter)?;
        let headers = io_utils::reader_headers(&mut reader, self.encoding, &self.path)?;
        let mut decoded_rows = Vec::new();
        let mut record = csv::ByteRecord::new();
        loop {
            if rows > 0 && decoded_rows.len() >= rows {
                break;
            }
            let more = reader
                .read_byte_record(&mut record)
                .map_err(|source| SourceError::Csv {
                    path: self.path.clone(),
                    source,
                })?;
            if !more {
                break;
            }
            // Short rows are padded with nulls when the table is built.
            if record.len() > headers.len() {
                return Err(SourceError::RaggedRow {
                    row: decoded_rows.len() + 2,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            decoded_rows.push(io_utils::decode_record(&record, self.encoding, &self.path)?);
        }
        debug!(
            "Read {} row(s) across {} column(s) from {:?}",
            decoded_rows.len(),
            headers.len(),
            self.path
        );
        Table::from_text_rows(&headers, &decoded_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StorageType;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn csv_source_caps_head_and_reads_all() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("sample.csv");
        fs::write(&path, "id,name\n1,a\n2,b\n3,\n").expect("write csv");
        let source = CsvSource::new(&path);

        let head = source.read_head(2).expect("head");
        assert_eq!(head.row_count(), 2);

        let all = source.read_all().expect("all");
        assert_eq!(all.row_count(), 3);
        let name = all.column("name").expect("name column");
        assert_eq!(name.data.storage_type(), StorageType::String);
        assert_eq!(name.data.null_count(), 1);
    }

    #[test]
    fn tsv_extension_selects_tab_delimiter() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("sample.tsv");
        fs::write(&path, "a\tb\n1\t2.5\n").expect("write tsv");
        let table = CsvSource::new(&path).read_all().expect("read");
        assert_eq!(table.headers(), vec!["a", "b"]);
        assert_eq!(
            table.column("b").unwrap().data.storage_type(),
            StorageType::Float
        );
    }

    #[test]
    fn overlong_rows_are_source_errors() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "a,b\n1,2\n3,4,5\n").expect("write csv");
        let err = CsvSource::new(&path).read_all().unwrap_err();
        assert!(matches!(
            err,
            SourceError::RaggedRow {
                row: 3,
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("short.csv");
        fs::write(&path, "a,b,c\n1,2,x\n3,4\n5,6,y\n").expect("write csv");
        let table = CsvSource::new(&path).read_all().expect("read");
        assert_eq!(table.row_count(), 3);
        let c = table.column("c").expect("c column");
        assert_eq!(c.data.null_count(), 1);
        assert_eq!(c.data.display_values(), vec!["x", "y"]);
        assert_eq!(table.column("b").unwrap().data.storage_type(), StorageType::Integer);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempdir().expect("temp dir");
        let err = CsvSource::new(dir.path().join("absent.csv"))
            .read_all()
            .unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
    }
}
