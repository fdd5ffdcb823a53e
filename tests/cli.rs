use std::fs;

use assert_cmd::Command;

fn steadyhand() -> Command {
    let mut cmd = Command::cargo_bin("steadyhand").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn config_validate_accepts_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.yaml");

    let output = steadyhand()
        .args(["--config", path.to_str().unwrap(), "config", "validate"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("defaults are valid"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config file not found, using defaults"));
    assert!(stderr.contains("missing.yaml"));
}

#[test]
fn config_validate_rejects_zero_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steadyhand.yaml");
    fs::write(&path, "verification:\n  max_attempts: 0\n").unwrap();

    let output = steadyhand()
        .args(["--config", path.to_str().unwrap(), "config", "validate"])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn config_validate_rejects_history_shorter_than_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steadyhand.yaml");
    fs::write(&path, "stuck:\n  history_limit: 2\n").unwrap();

    let output = steadyhand()
        .args(["--config", path.to_str().unwrap(), "config", "validate"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("history_limit"));
}

#[test]
fn config_show_json_reflects_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steadyhand.yaml");
    fs::write(&path, "execution:\n  max_retries: 5\n").unwrap();

    let output = steadyhand()
        .args([
            "--config",
            path.to_str().unwrap(),
            "--output",
            "json",
            "config",
            "show",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["execution"]["max_retries"], 5);
    assert_eq!(config["verification"]["max_attempts"], 3);
}

#[test]
fn autocomplete_scenario_completes() {
    let output = steadyhand()
        .args([
            "--output",
            "json",
            "run",
            "--strict",
            "--scenario",
            "scenarios/autocomplete.yaml",
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let cycles = report["cycles"].as_array().unwrap();
    assert_eq!(cycles.len(), 4);
    assert_eq!(cycles[0]["records"].as_array().unwrap().len(), 1);
    assert_eq!(cycles[0]["dropped"].as_array().unwrap().len(), 2);
    assert!(cycles[0]["advisories"][0]
        .as_str()
        .unwrap()
        .contains("DETECTED"));
    assert_eq!(cycles[1]["records"][0]["element_index"], 2);
}

#[test]
fn stuck_scenario_escalates_once() {
    let output = steadyhand()
        .args([
            "--output",
            "json",
            "run",
            "--scenario",
            "scenarios/stuck_subject.yaml",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stuck: Vec<_> = report["cycles"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c.get("stuck").is_some())
        .collect();
    assert_eq!(stuck.len(), 1);
    assert_eq!(stuck[0]["cycle"], 3);
    assert!(stuck[0]["stuck"]["advice"]
        .as_str()
        .unwrap()
        .contains("recipient"));
    assert_eq!(report["screenshots"], 1);
}
