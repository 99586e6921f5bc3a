//! CLI Integration Tests
//!
//! Runs the fse-enhance binary with assert_cmd against the pages in test-data/.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PAGE: &str = "test-data/assignments.html";

fn fse() -> Command {
    let mut cmd = Command::cargo_bin("fse-enhance").unwrap();
    cmd.env_remove("FSE_ENHANCE_CONFIG").env_remove("RUST_LOG");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    fse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fse-enhance"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    fse()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fse-enhance"));
}

#[test]
fn test_augment_help() {
    fse()
        .args(["augment", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MISSING COLUMNS"));
}

#[test]
fn test_watch_help() {
    fse()
        .args(["watch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ctrl+C"));
}

// ═══════════════════════════════════════════════════════════════════════════
// AUGMENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_augment_to_stdout() {
    fse()
        .args(["augment", PAGE])
        .assert()
        .success()
        .stdout(predicate::str::contains("<th>Price per nm/qty</th>"))
        .stdout(predicate::str::contains("$3.90"))
        .stdout(predicate::str::contains("300kg Passengers (4 passengers)"))
        .stdout(predicate::str::contains("Total per destination").not())
        .stdout(predicate::str::contains("<title>FSEconomy - Airport EHAM</title>"))
        .stdout(predicate::str::contains("<h2>My flights</h2>"))
        .stderr(predicate::str::contains("2 augmented, 1 skipped"));
}

#[test]
fn test_augment_aggregate_to_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("enhanced.html");

    fse()
        .args(["augment", PAGE, "--aggregate", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("Total per destination"));
    assert!(html.contains("$4600 from 2 assignments (per NM = $23.00)"));
    assert!(html.contains(r#"rowspan="2""#));
    assert!(html.contains("lightgreen"));
}

#[test]
fn test_augment_json_report() {
    let output = fse()
        .args(["augment", PAGE, "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let tables = report["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 3);
    assert_eq!(tables[0]["status"], "augmented");
    assert_eq!(tables[0]["id"], "assignments");
    assert_eq!(tables[2]["status"], "skipped");
    assert_eq!(tables[2]["missing_column"], "NM");
}

#[test]
fn test_augment_reads_stdin() {
    let page = fs::read_to_string(PAGE).unwrap();
    fse()
        .args(["augment", "-"])
        .write_stdin(page)
        .assert()
        .success()
        .stdout(predicate::str::contains("$0.02"));
}

#[test]
fn test_augment_dry_run() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("enhanced.html");

    fse()
        .args(["augment", PAGE, "--dry-run", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("DRY RUN"));
    assert!(!output.exists());
}

#[test]
fn test_augment_config_file() {
    fse()
        .args(["augment", PAGE, "-c", "test-data/fse.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total per destination"));
}

// ═══════════════════════════════════════════════════════════════════════════
// FAILURE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_augment_missing_file() {
    fse()
        .args(["augment", "nonexistent.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_augment_abort_policy() {
    fse()
        .args(["augment", PAGE, "--policy", "abort"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NM"));
}

#[test]
fn test_augment_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("bad.yaml");
    fs::write(&config, "man_weight_kg: -1\n").unwrap();

    fse()
        .args(["augment", PAGE, "-c"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("man_weight_kg"));
}

#[test]
fn test_unknown_policy_rejected() {
    fse()
        .args(["augment", PAGE, "--policy", "explode"])
        .assert()
        .failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_inspect_lists_columns() {
    fse()
        .args(["inspect", PAGE])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tables on page: 4"))
        .stdout(predicate::str::contains("Table #0"))
        .stdout(predicate::str::contains("Table #2").not())
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn test_inspect_page_without_rows() {
    fse()
        .args(["inspect", "test-data/no_tables.html"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No assignment or hold tables found"));
}

#[test]
fn test_watch_missing_file() {
    fse()
        .args(["watch", "nonexistent.html", "-o", "out.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}
