//! Integration tests for the scenario simulator
//!
//! Runs the bundled scenarios and scenarios written to temporary files.

use std::io::Write;
use std::path::PathBuf;
use vixen_core::headless::FullscreenFlavor;
use vixen_sim::{Scenario, SimConfig, SimError, Simulator};

// ===== Test Helpers =====

fn bundled(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

fn write_scenario(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

// ===== Bundled Scenarios =====

#[test]
fn test_demo_scenario_runs_cleanly() {
    let scenario = Scenario::load(&bundled("demo.toml")).unwrap();
    let mut simulator = Simulator::new(&scenario, &SimConfig::default()).unwrap();
    let report = simulator.run(&scenario);

    let failures: Vec<_> = report.failures().collect();
    assert!(failures.is_empty(), "failed steps: {:?}", failures);

    assert_eq!(report.resolutions, [360, 720, 1080]);
    assert_eq!(report.chapters.len(), 3);
    assert_eq!(report.fallback_links, 0);

    let last = report.steps.last().unwrap();
    assert_eq!(last.lifecycle, "paused");
    assert_eq!(last.elapsed, "3:20");
    assert!((last.volume - 0.4).abs() < 1e-9);
    assert!(last.dump.as_deref().unwrap().contains("vixen-container"));

    assert!(!report.ui.fullscreen);
    assert!(simulator.dump().contains("0:00 Opening"));
    assert_eq!(simulator.controller().session().current_time, 200.0);
}

#[test]
fn test_failing_sources_scenario_falls_back() {
    let scenario = Scenario::load(&bundled("sources-fail.toml")).unwrap();
    let mut simulator = Simulator::new(&scenario, &SimConfig::default()).unwrap();
    let report = simulator.run(&scenario);

    assert_eq!(report.failures().count(), 0);
    assert_eq!(report.steps[1].lifecycle, "errored");
    assert!(!report.steps[2].playing);
    assert_eq!(report.fallback_links, 2);
    assert_eq!(report.steps.last().unwrap().lifecycle, "ready");
    assert!(simulator.dump().contains("Download video/webm (720p)"));
}

// ===== Files and Configuration =====

#[test]
fn test_scenario_name_defaults_to_file_stem() {
    let file = write_scenario("[[steps]]\naction = \"play\"\n");
    let scenario = Scenario::load(file.path()).unwrap();
    let stem = file.path().file_stem().unwrap().to_string_lossy();
    assert_eq!(scenario.name, stem);
}

#[test]
fn test_unparseable_scenario() {
    let file = write_scenario("[[steps]]\nverb = \"play\"\n");
    let err = Scenario::load(file.path()).unwrap_err();
    assert!(matches!(err, SimError::Parse(_)));
}

#[test]
fn test_remembered_volume_from_config() {
    let mut config = SimConfig::default();
    config.platform.remembered_volume = Some(0.25);
    let scenario = Scenario::parse("").unwrap();
    let simulator = Simulator::new(&scenario, &config).unwrap();
    assert_eq!(simulator.controller().volume(), 0.25);

    config.platform.persistence = false;
    let simulator = Simulator::new(&scenario, &config).unwrap();
    assert_eq!(simulator.controller().volume(), 1.0);
}

#[test]
fn test_unsupported_fullscreen_is_reported() {
    let mut config = SimConfig::default();
    config.platform.fullscreen = FullscreenFlavor::None;
    let scenario = Scenario::parse("[[steps]]\naction = \"fullscreen\"\n").unwrap();
    let mut simulator = Simulator::new(&scenario, &config).unwrap();
    let report = simulator.run(&scenario);

    let error = report.steps[0].error.as_deref().unwrap();
    assert!(error.contains("fullscreen"));
}

#[test]
fn test_custom_namespace() {
    let mut config = SimConfig::default();
    config.controller.namespace = "player".to_string();
    let scenario = Scenario::parse("").unwrap();
    let simulator = Simulator::new(&scenario, &config).unwrap();
    assert!(simulator.dump().contains("player-toolbar"));
    assert!(!simulator.dump().contains("vixen-"));
}
