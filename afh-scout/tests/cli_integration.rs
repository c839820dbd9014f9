//! CLI integration tests for afh-scout

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// A command that never reads the user's real config file
fn scout(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("afh-scout").unwrap();
    cmd.env("AFH_SCOUT_CONFIG", config_dir.join("absent.toml"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    scout(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("notify"));
}

#[test]
fn test_analyze_json_output() {
    let dir = TempDir::new().unwrap();
    let output = scout(dir.path())
        .args([
            "analyze",
            "--address",
            "123 Main St, Kent, WA",
            "--price",
            "650000",
            "--delay",
            "10ms",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["address"], "123 Main St, Kent, WA");
    assert!(report["monthly_cash_flow"].as_u64().unwrap() >= 4550);
    assert_eq!(report["recommendations"].as_array().unwrap().len(), 4);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Analyzing property..."));
    assert!(stderr.contains("[ok] Property analysis completed successfully!"));
}

#[test]
fn test_analyze_text_output() {
    let dir = TempDir::new().unwrap();
    scout(dir.path())
        .args(["analyze", "--delay", "0ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly Cash Flow"))
        .stdout(predicate::str::contains("WABO Status"));
}

#[test]
fn test_failed_analysis_shows_error_notification() {
    let dir = TempDir::new().unwrap();
    scout(dir.path())
        .args(["analyze", "--delay", "10ms", "--fail"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(
            "[error] Analysis failed. Please try again.",
        ));
}

#[test]
fn test_failed_analysis_reports_once() {
    let dir = TempDir::new().unwrap();
    let output = scout(dir.path())
        .args(["analyze", "--delay", "10ms", "--fail"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Error:"), "stderr: {}", stderr);
    assert!(!stderr.contains("WARN"), "stderr: {}", stderr);
    assert_eq!(stderr.matches("[error]").count(), 1);
}

#[test]
fn test_json_log_format_from_env() {
    let dir = TempDir::new().unwrap();
    let output = scout(dir.path())
        .env("AFH_SCOUT_LOG_FORMAT", "json")
        .env("AFH_SCOUT_LOG_LEVEL", "debug")
        .args(["analyze", "--delay", "0ms"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .find(|line| line.contains("Scout app initialized"))
        .expect("initialization should be logged at debug");
    let entry: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(entry["level"], "DEBUG");
    assert_eq!(entry["message"], "Scout app initialized");
}

#[test]
fn test_log_level_defaults_to_warn() {
    let dir = TempDir::new().unwrap();
    scout(dir.path())
        .env_remove("AFH_SCOUT_LOG_LEVEL")
        .env_remove("AFH_SCOUT_LOG_FORMAT")
        .args(["analyze", "--delay", "0ms"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Scout app initialized").not());
}

#[test]
fn test_afh_analyzer_json_output() {
    let dir = TempDir::new().unwrap();
    let output = scout(dir.path())
        .args([
            "analyze",
            "--analyzer",
            "afh",
            "--address",
            "123 Main St, Tacoma, WA",
            "--price",
            "650000",
            "--sqft",
            "2800",
            "--bedrooms",
            "5",
            "--bathrooms",
            "3",
            "--property-type",
            "Rambler",
            "--county",
            "Pierce",
            "--wabo",
            "approved",
            "--description",
            "Turnkey DSHS licensed home",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["viable"], true);
    assert_eq!(report["viability_score"], 97);
    assert_eq!(report["monthly_cash_flow"], 13762);
    assert_eq!(report["wabo_status"], "approved");
    assert_eq!(report["details"]["risk"]["level"], "low");
    assert_eq!(report["details"]["wabo"]["licensing_timeline"], "1-3 months");
}

#[test]
fn test_afh_analyzer_from_config_text_output() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[analysis]\nanalyzer = \"afh\"\n").unwrap();

    scout(dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["analyze", "--price", "2500000", "--sqft", "3000", "--bedrooms", "4"])
        .args(["--bathrooms", "2", "--county", "King"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Viable:            no"))
        .stdout(predicate::str::contains("Target negotiation price: $1,969,350"));
}

#[test]
fn test_invalid_analysis_config_rejected() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "[analysis]\nanalyzer = \"afh\"\noccupancy_rate = 1.5\n",
    )
    .unwrap();

    scout(dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("analyze")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("occupancy_rate"));
}

#[test]
fn test_invalid_price_exit_code() {
    let dir = TempDir::new().unwrap();
    scout(dir.path())
        .args(["analyze", "--price=-5", "--delay", "0ms"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid input"));
}

#[test]
fn test_notify_waits_for_expiry() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[notifications]\nauto_dismiss_ms = 20\n").unwrap();

    scout(dir.path())
        .args(["--config"])
        .arg(&config_path)
        .args(["notify", "Daily search completed", "--kind", "success"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[ok] Daily search completed"));
}

#[test]
fn test_notify_rejects_unknown_kind() {
    let dir = TempDir::new().unwrap();
    scout(dir.path())
        .args(["notify", "hello", "--kind", "fatal"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid notification kind"));
}

#[test]
fn test_malformed_config_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[guard]\npolicy = 12\n").unwrap();

    scout(dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["analyze", "--delay", "0ms"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}
