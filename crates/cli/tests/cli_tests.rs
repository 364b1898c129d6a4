//! CLI integration tests

use std::io::Write;
use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "insight-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("warehouse usage telemetry"),
        "Should show app description"
    );
    assert!(
        stdout.contains("recommendations"),
        "Should show recommendations command"
    );
    assert!(stdout.contains("anomalies"), "Should show anomalies command");
    assert!(stdout.contains("forecast"), "Should show forecast command");
    assert!(stdout.contains("issues"), "Should show issues command");
    assert!(stdout.contains("costs"), "Should show costs command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "insight-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("insight"), "Should show binary name");
}

fn spike_replay_json() -> String {
    // Nine quiet days then a 10x spike, one x-large warehouse, no queries.
    let mut metering = String::new();
    for day in 1..=9 {
        metering.push_str(&format!(
            r#"{{"timestamp": "2025-06-{:02}", "resource_id": "ANALYTICS_WH", "value": 100.0}},"#,
            day
        ));
    }
    metering.push_str(
        r#"{"timestamp": "2025-06-10", "resource_id": "ANALYTICS_WH", "value": 1000.0}"#,
    );

    format!(
        r#"{{
            "metering": [{metering}],
            "queries": [],
            "sizes": {{"ANALYTICS_WH": "x-large"}}
        }}"#
    )
}

/// Test anomaly detection end to end against a replay file
#[test]
fn test_anomalies_against_replay_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(spike_replay_json().as_bytes())
        .expect("Failed to write replay");

    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "insight-cli",
            "--",
            "--input",
            file.path().to_str().unwrap(),
            "--format",
            "json",
            "anomalies",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "anomalies should succeed: {stdout}");
    assert!(
        stdout.contains("\"CRITICAL\""),
        "spike day should be critical: {stdout}"
    );
    assert!(stdout.contains("2025-06-10"), "should report the spike date");
}

/// Test that an empty query history yields a suspend recommendation
#[test]
fn test_recommendations_against_replay_file() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(spike_replay_json().as_bytes())
        .expect("Failed to write replay");

    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "insight-cli",
            "--",
            "--input",
            file.path().to_str().unwrap(),
            "--format",
            "json",
            "recommendations",
        ])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "recommendations should succeed");
    assert!(
        stdout.contains("SUSPEND_OR_DROP"),
        "idle warehouse should be flagged: {stdout}"
    );
}

/// Test that a missing replay file fails with a useful message
#[test]
fn test_missing_replay_file_errors() {
    let output = Command::new("cargo")
        .args([
            "run",
            "-p",
            "insight-cli",
            "--",
            "--input",
            "/nonexistent/replay.json",
            "anomalies",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("replay"), "error should mention the replay file");
}
