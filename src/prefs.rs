use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFERENCES_PATH: &str = "data/preferences.json";

/// User preferences remembered across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    pub preferred_tone: String,
    pub summary_length: usize,
    pub last_dataset: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preferred_tone: "business".to_string(),
            summary_length: 800,
            last_dataset: None,
        }
    }
}

/// JSON file holding [`Preferences`]. Load once at start-up and pass the
/// value along explicitly.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads stored preferences, writing the defaults first when none exist.
    pub fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            let defaults = Preferences::default();
            self.save(&defaults)?;
            info!("Initialised default preferences at {:?}", self.path);
            return Ok(defaults);
        }
        let file = File::open(&self.path)
            .with_context(|| format!("Opening preferences file {:?}", self.path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing preferences JSON {:?}", self.path))
    }

    pub fn save(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating preferences directory {parent:?}"))?;
        }
        let file = File::create(&self.path)
            .with_context(|| format!("Creating preferences file {:?}", self.path))?;
        serde_json::to_writer_pretty(file, preferences).context("Writing preferences JSON")
    }
}
