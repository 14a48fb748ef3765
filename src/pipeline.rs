use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use crate::{
    analyze::{AnalysisResult, Analyzer},
    compose::{ReportComposer, ReportRequest},
    insight::{self, Insight},
    prefs::Preferences,
    profile::{Profile, Profiler},
    quality::{self, Verdict},
    render::{self, ChartOutcome, ChartRenderer},
    source::DataSource,
};

/// Everything produced by one end-to-end run.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub profile: Profile,
    pub analysis: AnalysisResult,
    pub insights: Vec<Insight>,
    pub charts: Vec<ChartOutcome>,
    pub report: String,
    pub verdict: Verdict,
}

impl PipelineOutcome {
    pub fn chart_paths(&self) -> Vec<PathBuf> {
        render::rendered_paths(&self.charts)
    }
}

/// Profile → analyze → insights → charts → report → quality gate.
///
/// The source is read once; every stage works on that table.
pub struct Pipeline<'a> {
    pub profiler: Profiler,
    pub analyzer: Analyzer,
    pub renderer: &'a dyn ChartRenderer,
    pub composer: &'a dyn ReportComposer,
    pub max_charts: usize,
}

impl Pipeline<'_> {
    pub fn run<S>(&self, source: &S, preferences: &Preferences) -> Result<PipelineOutcome>
    where
        S: DataSource + ?Sized,
    {
        let table = source
            .read_all()
            .with_context(|| format!("Loading {}", source.describe()))?;
        let label = source.describe();
        let profile = self.profiler.inspect_table(&table, label.clone());
        let analysis = self.analyzer.run_table(&table, &label, &profile.plan);
        let insights = insight::generate_insights(&analysis);
        info!("Synthesized {} insight(s)", insights.len());

        let charts = render::render_charts(self.renderer, &profile.charts, &table, self.max_charts);
        let chart_paths = render::rendered_paths(&charts);

        let report = self.composer.compose(&ReportRequest {
            profile: &profile,
            insights: &insights,
            charts: &chart_paths,
            tone: &preferences.preferred_tone,
        })?;
        let verdict = quality::check(&report, &chart_paths);
        info!("Quality gate: {verdict}");

        Ok(PipelineOutcome {
            profile,
            analysis,
            insights,
            charts,
            report,
            verdict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compose::OfflineComposer,
        data::{Column, ColumnData, Table},
        error::SourceError,
        render::ChartDataWriter,
    };
    use std::cell::Cell;
    use tempfile::tempdir;

    struct CountingSource {
        table: Table,
        reads: Cell<usize>,
    }

    impl DataSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        fn read_head(&self, rows: usize) -> Result<Table, SourceError> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.table.head(rows))
        }
    }

    #[test]
    fn end_to_end_run_passes_the_quality_gate() {
        let dir = tempdir().expect("temp dir");
        let table = Table::new(vec![
            Column::new("x", ColumnData::Integer(vec![Some(1), Some(2), Some(3), None])),
            Column::new(
                "y",
                ColumnData::Float(vec![Some(2.0), Some(4.1), Some(5.9), Some(8.0)]),
            ),
            Column::new(
                "group",
                ColumnData::String(
                    ["a", "b", "a", "a"]
                        .iter()
                        .map(|v| Some(v.to_string()))
                        .collect(),
                ),
            ),
        ])
        .expect("table");
        let writer = ChartDataWriter::new(dir.path());
        let pipeline = Pipeline {
            profiler: Profiler::default(),
            analyzer: Analyzer,
            renderer: &writer,
            composer: &OfflineComposer,
            max_charts: 8,
        };
        let outcome = pipeline
            .run(&table, &Preferences::default())
            .expect("pipeline");
        assert!(outcome.verdict.is_pass(), "{}", outcome.verdict);
        assert_eq!(outcome.chart_paths().len(), 6);
        assert_eq!(
            outcome.insights[0].text,
            "Column 'x' has 1 missing values."
        );
        assert!(outcome.report.starts_with(crate::compose::PLACEHOLDER_MARKER));
    }

    #[test]
    fn source_is_read_once_per_run() {
        let dir = tempdir().expect("temp dir");
        let table = Table::from_text_rows(
            &["a".to_string(), "b".to_string(), "c".to_string()],
            &[
                vec!["1".into(), "2".into(), "x".into()],
                vec!["2".into(), "5".into(), "y".into()],
                vec!["3".into(), "5".into(), "x".into()],
            ],
        )
        .expect("table");
        let source = CountingSource {
            table,
            reads: Cell::new(0),
        };
        let writer = ChartDataWriter::new(dir.path());
        let pipeline = Pipeline {
            profiler: Profiler::default(),
            analyzer: Analyzer,
            renderer: &writer,
            composer: &OfflineComposer,
            max_charts: 8,
        };
        let outcome = pipeline
            .run(&source, &Preferences::default())
            .expect("pipeline");
        assert_eq!(source.reads.get(), 1);
        assert_eq!(outcome.profile.source, "counting");
        assert!(outcome.analysis.correlations.is_some());
    }
}
