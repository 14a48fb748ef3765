//! Automated exploratory analysis for delimited tabular data.
//!
//! The pipeline runs [`profile::Profiler`] over a row sample to infer column
//! roles and an analysis plan, [`analyze::Analyzer`] over the full data for
//! statistics, [`insight::generate_insights`] to turn statistics into
//! findings, and [`quality::check`] as a final gate on the composed report.

pub mod analyze;
pub mod classify;
pub mod cli;
pub mod compose;
pub mod correlation;
pub mod data;
pub mod display;
pub mod error;
pub mod frequency;
pub mod insight;
pub mod io_utils;
pub mod pipeline;
pub mod prefs;
pub mod profile;
pub mod quality;
pub mod render;
pub mod source;
pub mod stats;

use std::{env, fs, io::ErrorKind, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};
use serde::Serialize;

use crate::{
    analyze::Analyzer,
    cli::{Cli, Commands, OutputFormat, SourceArgs},
    compose::OfflineComposer,
    pipeline::Pipeline,
    prefs::PreferenceStore,
    profile::Profiler,
    render::{ChartDataWriter, ChartOutcome},
    source::{CsvSource, DataSource},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Report(args) => handle_report(&args),
        Commands::Check(args) => handle_check(&args),
        Commands::Prefs(args) => handle_prefs(&args),
    }
}

fn open_source(args: &SourceArgs) -> Result<CsvSource> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let source = CsvSource::new(&args.input)
        .with_delimiter(args.delimiter)
        .with_encoding(encoding);
    debug!(
        "Reading {:?} with delimiter '{}' and encoding {}",
        source.path(),
        printable_delimiter(io_utils::resolve_input_delimiter(&args.input, args.delimiter)),
        encoding.name()
    );
    Ok(source)
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let source = open_source(&args.source)?;
    let profile = Profiler::new(args.source.sample_rows)
        .inspect(&source)
        .with_context(|| format!("Profiling {:?}", args.source.input))?;
    match args.format {
        OutputFormat::Table => display::print_profile(&profile),
        format => emit(&profile, format)?,
    }
    Ok(())
}

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    plan: &'a profile::Plan,
    analysis: &'a analyze::AnalysisResult,
    insights: &'a [insight::Insight],
}

fn handle_analyze(args: &cli::AnalyzeArgs) -> Result<()> {
    let source = open_source(&args.source)?;
    let profile = Profiler::new(args.source.sample_rows)
        .inspect(&source)
        .with_context(|| format!("Profiling {:?}", args.source.input))?;
    let analysis = Analyzer
        .run(&source, &profile.plan)
        .with_context(|| format!("Analyzing {:?}", args.source.input))?;
    let insights = insight::generate_insights(&analysis);
    match args.format {
        OutputFormat::Table => display::print_analysis(&analysis, &insights),
        format => emit(
            &AnalysisOutput {
                plan: &profile.plan,
                analysis: &analysis,
                insights: &insights,
            },
            format,
        )?,
    }
    info!(
        "Generated {} insight(s) for {:?}",
        insights.len(),
        args.source.input
    );
    Ok(())
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let store = PreferenceStore::new(&args.prefs);
    let mut preferences = store
        .load()
        .with_context(|| format!("Loading preferences from {:?}", args.prefs))?;
    let source = open_source(&args.source)?;
    let writer = ChartDataWriter::new(&args.out_dir);
    let pipeline = Pipeline {
        profiler: Profiler::new(args.source.sample_rows),
        analyzer: Analyzer,
        renderer: &writer,
        composer: &OfflineComposer,
        max_charts: args.max_charts,
    };
    let outcome = pipeline.run(&source, &preferences)?;

    match &args.report {
        Some(path) => {
            fs::write(path, &outcome.report)
                .with_context(|| format!("Writing report to {path:?}"))?;
            info!("Report written to {path:?}");
        }
        None => println!("{}\n", outcome.report),
    }

    let rows = outcome
        .charts
        .iter()
        .map(|chart| match chart {
            ChartOutcome::Rendered { spec, path } => vec![
                spec.chart_type.to_string(),
                spec.column.clone().unwrap_or_default(),
                path.display().to_string(),
            ],
            ChartOutcome::Failed { spec, error } => vec![
                spec.chart_type.to_string(),
                spec.column.clone().unwrap_or_default(),
                format!("skipped: {error}"),
            ],
        })
        .collect::<Vec<_>>();
    display::print_table(&["chart", "column", "artifact"], &rows);
    println!("\n{}", outcome.verdict);

    preferences.last_dataset = Some(source.describe());
    store
        .save(&preferences)
        .with_context(|| format!("Saving preferences to {:?}", args.prefs))?;

    if !outcome.verdict.is_pass() {
        bail!("Quality gate failed: {}", outcome.verdict);
    }
    Ok(())
}

fn handle_check(args: &cli::CheckArgs) -> Result<()> {
    let report = match fs::read_to_string(&args.report) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => {
            return Err(err).with_context(|| format!("Reading report {:?}", args.report));
        }
    };
    let verdict = quality::check(&report, &args.charts);
    println!("{verdict}");
    if !verdict.is_pass() {
        bail!("Quality gate failed: {verdict}");
    }
    Ok(())
}

fn handle_prefs(args: &cli::PrefsArgs) -> Result<()> {
    let store = PreferenceStore::new(&args.prefs);
    let mut preferences = store
        .load()
        .with_context(|| format!("Loading preferences from {:?}", args.prefs))?;
    let mut changed = false;
    if let Some(tone) = &args.tone {
        preferences.preferred_tone = tone.trim().to_string();
        changed = true;
    }
    if let Some(length) = args.summary_length {
        preferences.summary_length = length;
        changed = true;
    }
    if changed {
        store
            .save(&preferences)
            .with_context(|| format!("Saving preferences to {:?}", args.prefs))?;
        info!("Preferences updated in {:?}", store.path());
    }
    println!("{}", serde_json::to_string_pretty(&preferences)?);
    Ok(())
}

fn emit<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value).context("Serializing JSON")?,
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Serializing YAML")?,
        OutputFormat::Table => bail!("Table output has no serialized form"),
    };
    println!("{rendered}");
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
