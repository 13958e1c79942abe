//! Runs every scenario file under `scenarios/` plus the standard set.

use std::path::Path;

use sexp_testkit::scenario_standard;
use sexp_testkit::{init_logging, load_dir, Outcome, Scenario};

fn scenario_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios")
}

fn assert_passes(scenario: &Scenario) {
    let result = scenario.run().unwrap();
    assert!(
        result.passed(),
        "scenario {} failed ({:?}):\n{}",
        scenario.name,
        result.outcome,
        result.diff.report()
    );
}

#[test]
fn scenario_files_pass() {
    init_logging();
    let scenarios = load_dir(scenario_dir()).unwrap();
    assert!(scenarios.len() >= 12);
    for scenario in &scenarios {
        assert_passes(scenario);
    }
}

#[test]
fn standard_scenarios_pass() {
    init_logging();
    for scenario in scenario_standard::all() {
        assert_passes(&scenario);
    }
}

#[test]
fn broken_expectation_is_reported() {
    let mut scenario = Scenario::load(scenario_dir().join("04_truncated_fill.toml")).unwrap();
    scenario.expect.truncated = Some(false);
    scenario.expect.written = Some(12);

    let result = scenario.run().unwrap();
    assert!(!result.passed());
    assert_eq!(result.diff.len(), 2);
    assert!(matches!(result.outcome, Outcome::Matrix(_)));
}

#[test]
fn undersized_cell_expectation_is_reported() {
    let mut scenario = Scenario::load(scenario_dir().join("05_row_count_stride.toml")).unwrap();
    scenario.expect.cells = Some(vec![vec!["0".to_string()]]);

    let result = scenario.run().unwrap();
    assert!(!result.passed());
    assert!(result.diff.report().contains("Rows: expected 1, got 3"));
}

#[test]
fn missing_scenario_file_is_an_error() {
    let err = Scenario::load(scenario_dir().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("missing.toml"));
}
