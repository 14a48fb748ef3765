use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{prefs::DEFAULT_PREFERENCES_PATH, profile::DEFAULT_SAMPLE_ROWS, render::DEFAULT_MAX_CHARTS};

#[derive(Debug, Parser)]
#[command(author, version, about = "Automated exploratory analysis for CSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column roles, the analysis plan and chart selection from a sample
    Profile(ProfileArgs),
    /// Compute full-data statistics and the insights derived from them
    Analyze(AnalyzeArgs),
    /// Run the whole pipeline: charts, report and quality gate
    Report(ReportArgs),
    /// Run the quality gate against an existing report and chart list
    Check(CheckArgs),
    /// Show or update stored preferences
    Prefs(PrefsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Input CSV file to analyze
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of rows sampled for role inference (0 means full scan)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,
    /// Directory receiving chart artifacts
    #[arg(long = "out-dir", default_value = "outputs")]
    pub out_dir: PathBuf,
    /// Maximum number of planned charts to render
    #[arg(long = "max-charts", default_value_t = DEFAULT_MAX_CHARTS)]
    pub max_charts: usize,
    /// Preferences file
    #[arg(long, default_value = DEFAULT_PREFERENCES_PATH)]
    pub prefs: PathBuf,
    /// Write the report here instead of stdout
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Report text file; a missing file counts as an empty report
    #[arg(long)]
    pub report: PathBuf,
    /// Chart artifact path (repeatable)
    #[arg(long = "chart", action = clap::ArgAction::Append)]
    pub charts: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PrefsArgs {
    /// Preferences file
    #[arg(long, default_value = DEFAULT_PREFERENCES_PATH)]
    pub prefs: PathBuf,
    /// Set the preferred report tone
    #[arg(long)]
    pub tone: Option<String>,
    /// Set the preferred summary length
    #[arg(long = "summary-length")]
    pub summary_length: Option<usize>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
