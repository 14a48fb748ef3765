mod common;

use csv_insight::{
    classify::ColumnRole,
    error::SourceError,
    profile::{ChartType, Profiler, TaskKind},
    source::CsvSource,
};

use common::{TestWorkspace, word_column_csv};

#[test]
fn orders_profile_classifies_every_role() {
    let workspace = TestWorkspace::new();
    let source = CsvSource::new(workspace.write_orders());
    let profile = Profiler::default().inspect(&source).expect("profile");

    assert_eq!(profile.numeric_cols, vec!["order_id", "amount", "quantity"]);
    assert_eq!(profile.categorical_cols, vec!["region", "returned"]);
    assert_eq!(profile.datetime_cols, vec!["ordered_at"]);
    let region = profile
        .columns
        .iter()
        .find(|c| c.name == "region")
        .expect("region descriptor");
    assert_eq!(region.inferred_role, ColumnRole::Categorical);
    assert_eq!(region.cardinality, 3);

    let suggested = profile
        .suggestions
        .iter()
        .map(|s| s.column.as_str())
        .collect::<Vec<_>>();
    assert_eq!(suggested, vec!["returned"]);

    assert_eq!(
        profile.plan.task_names(),
        vec![
            "overview_summary",
            "missing_values",
            "target_suggestion",
            "univariate_numeric",
            "univariate_categorical",
            "time_series",
            "correlations",
        ]
    );
}

#[test]
fn charts_pair_histogram_and_box_per_numeric_column() {
    let workspace = TestWorkspace::new();
    let source = CsvSource::new(workspace.write_orders());
    let profile = Profiler::default().inspect(&source).expect("profile");
    let charts = profile
        .charts
        .iter()
        .map(|c| format!("{}:{}", c.chart_type, c.column.as_deref().unwrap_or("")))
        .collect::<Vec<_>>();
    assert_eq!(
        charts,
        vec![
            "histogram:order_id",
            "box:order_id",
            "histogram:amount",
            "box:amount",
            "histogram:quantity",
            "box:quantity",
            "bar_topk:region",
            "bar_topk:returned",
        ]
    );
    assert!(
        !profile
            .charts
            .iter()
            .any(|c| c.chart_type == ChartType::CorrelationHeatmap)
    );
}

#[test]
fn repeated_inspection_is_identical() {
    let workspace = TestWorkspace::new();
    let mut csv = String::from("stamp,label\n");
    for idx in 0..300 {
        if idx % 10 == 0 {
            csv.push_str(&format!("not-a-date-{idx},x{idx}\n"));
        } else {
            csv.push_str(&format!("2023-{:02}-{:02},x{idx}\n", idx % 12 + 1, idx % 28 + 1));
        }
    }
    let source = CsvSource::new(workspace.write("mixed.csv", &csv));
    let profiler = Profiler::new(0);
    let first = profiler.inspect(&source).expect("first");
    let second = profiler.inspect(&source).expect("second");
    assert_eq!(first, second);
    assert_eq!(first.datetime_cols, vec!["stamp"]);
}

#[test]
fn sample_cap_bounds_rows_read() {
    let workspace = TestWorkspace::new();
    let mut csv = String::from("code\n");
    for idx in 0..500 {
        csv.push_str(&format!("{}\n", idx % 2));
    }
    csv.push_str("overflow\n");
    let source = CsvSource::new(workspace.write("codes.csv", &csv));

    let sampled = Profiler::default().inspect(&source).expect("sampled");
    assert_eq!(sampled.rows_sampled, 200);
    assert_eq!(sampled.numeric_cols, vec!["code"]);
    assert!(sampled.plan.contains(TaskKind::TargetSuggestion));

    let full = Profiler::new(0).inspect(&source).expect("full");
    assert_eq!(full.categorical_cols, vec!["code"]);
}

#[test]
fn word_column_is_not_datetime() {
    let workspace = TestWorkspace::new();
    let source = CsvSource::new(workspace.write("words.csv", &word_column_csv(50)));
    let profile = Profiler::default().inspect(&source).expect("profile");
    assert!(profile.datetime_cols.is_empty());
    assert_eq!(profile.categorical_cols, vec!["word"]);
    assert!(!profile.plan.contains(TaskKind::TimeSeries));
}

#[test]
fn malformed_source_returns_no_profile() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("broken.csv", "a,b\n1,2\n3,4,5\n");
    let err = Profiler::default()
        .inspect(&CsvSource::new(path))
        .unwrap_err();
    assert!(matches!(err, SourceError::RaggedRow { .. }));
}
