#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a small mixed-type orders dataset used across tests.
    pub fn write_orders(&self) -> PathBuf {
        self.write("orders.csv", ORDERS_CSV)
    }
}

/// Two correlated numeric columns, one categorical column with a missing
/// value, a binary flag and an ISO date column.
pub const ORDERS_CSV: &str = "\
order_id,amount,quantity,region,returned,ordered_at
1,10.5,1,north,no,2024-01-03
2,21.0,2,south,no,2024-01-04
3,31.5,3,north,yes,2024-01-05
4,40.0,4,,no,2024-01-06
5,52.5,5,east,no,2024-01-07
6,61.0,6,north,yes,2024-01-08
7,70.5,7,south,no,2024-01-09
8,,8,north,no,2024-01-10
";

/// Generates `rows` lines of a single text column named `word`.
pub fn word_column_csv(rows: usize) -> String {
    const WORDS: &[&str] = &[
        "apple", "river", "mountain", "cloud", "garden", "window", "silver", "candle", "forest",
        "harbor", "lantern", "meadow",
    ];
    let mut csv = String::from("word\n");
    for idx in 0..rows {
        csv.push_str(WORDS[idx % WORDS.len()]);
        csv.push('\n');
    }
    csv
}
