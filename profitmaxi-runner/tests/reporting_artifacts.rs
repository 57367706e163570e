//! Artifact tests: comparison summary JSON round-trip, CSV files, Markdown.

use profitmaxi_core::SimulationConfig;
use profitmaxi_runner::export::{export_summary_json, import_summary_json};
use profitmaxi_runner::{
    analyze_batch, compare_delta_ratios, generate_comparison_report, load_summary,
    run_monte_carlo_with, save_batch_artifacts, save_comparison_artifacts, McOptions,
    ResultsSummary,
};

fn small_comparison() -> profitmaxi_runner::DeltaComparison {
    let base = SimulationConfig {
        order_size: 20.0,
        seed: Some(8),
        ..Default::default()
    };
    compare_delta_ratios(&base, &[0.5, 1.0], 12, &McOptions::default(), |_, _, _| {}).unwrap()
}

#[test]
fn summary_json_round_trip() {
    let cmp = small_comparison();
    let summary = ResultsSummary::from_comparison(&cmp);
    assert_eq!(summary.results_by_delta_ratio.len(), 2);
    assert!(summary.results_by_delta_ratio.contains_key("0.5"));
    assert!(summary.results_by_delta_ratio.contains_key("1"));
    assert!((summary.order_to_liquidity_pct - 1.0).abs() < 1e-9);

    let json = export_summary_json(&summary).unwrap();
    let back = import_summary_json(&json).unwrap();
    assert_eq!(summary, back);
}

#[test]
fn comparison_artifacts_written_and_reloaded() {
    let cmp = small_comparison();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_comparison_artifacts(&cmp, dir.path()).unwrap();

    for name in [
        "results_summary.json",
        "report.md",
        "runs_r0.5.csv",
        "runs_r1.csv",
        "median_trajectory_r0.5.csv",
        "median_trajectory_r1.csv",
    ] {
        assert!(run_dir.join(name).exists(), "missing {name}");
    }

    let runs_csv = std::fs::read_to_string(run_dir.join("runs_r1.csv")).unwrap();
    assert_eq!(runs_csv.lines().count(), 13);

    let loaded = load_summary(&run_dir).unwrap();
    assert_eq!(loaded.master_seed, 8);
    assert_eq!(loaded, ResultsSummary::from_comparison(&cmp));
}

#[test]
fn markdown_report_lists_every_ratio() {
    let cmp = small_comparison();
    let md = generate_comparison_report(&cmp);
    assert!(md.starts_with("# Delta Ratio Comparison"));
    assert!(md.contains("| 0.5 |"));
    assert!(md.contains("| 1 |"));
    assert!(md.contains("| Master Seed | 8 |"));
}

#[test]
fn batch_artifacts_written() {
    let config = SimulationConfig {
        num_simulations: 6,
        seed: Some(2),
        ..Default::default()
    };
    let batch = run_monte_carlo_with(&config, &McOptions::default(), |_, _| {}).unwrap();
    let analysis = analyze_batch(&config, &batch.results, Some(batch.master_seed)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_batch_artifacts(&analysis, &batch.results, dir.path()).unwrap();
    assert!(run_dir.join("analysis.json").exists());
    assert!(run_dir.join("runs.csv").exists());

    let trajectory = std::fs::read_to_string(run_dir.join("median_trajectory.csv")).unwrap();
    let median = profitmaxi_runner::median_outcome(&batch.results).unwrap();
    assert_eq!(trajectory.lines().count() as u64, median.fill_time + 2);
}
