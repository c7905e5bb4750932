//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `ipfee` binary and verify exit codes,
//! stdout content, and stderr content. Commands run from the workspace
//! root so fixture paths resolve.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `ipfee` binary, rooted at workspace.
fn ipfee() -> Command {
    let mut cmd = cargo_bin_cmd!("ipfee");
    cmd.current_dir(workspace_root());
    cmd
}

const CLAIM_FEES: &str = "fixtures/claim_fees.json";

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    ipfee()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fee schedule verification toolkit"));
}

#[test]
fn version_exits_0() {
    ipfee()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ipfee"));
}

// ──────────────────────────────────────────────
// 2. Completeness
// ──────────────────────────────────────────────

#[test]
fn completeness_reports_gap_and_exits_2() {
    ipfee()
        .args(["completeness", CLAIM_FEES])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("SearchFee: INCOMPLETE"))
        .stdout(predicate::str::contains("gap: {EntityType=Micro}"))
        .stdout(predicate::str::contains("FilingFee: complete"));
}

#[test]
fn completeness_single_complete_fee_exits_0() {
    ipfee()
        .args(["completeness", CLAIM_FEES, "--fee", "FilingFee"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exhaustive enumeration, 3 combinations"));
}

#[test]
fn completeness_json_output() {
    let output = ipfee()
        .args(["--output", "json", "completeness", CLAIM_FEES, "--fee", "SearchFee"])
        .output()
        .expect("run ipfee");
    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON report");
    let fee = &report["fees"][0];
    assert_eq!(fee["fee_name"], "SearchFee");
    assert_eq!(fee["is_complete"], false);
    assert_eq!(fee["method"], "Exhaustive");
    assert_eq!(fee["gaps"][0]["EntityType"], "Micro");
}

#[test]
fn completeness_unknown_fee_exits_1() {
    ipfee()
        .args(["completeness", CLAIM_FEES, "--fee", "NoSuchFee"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown fee 'NoSuchFee'"));
}

#[test]
fn quiet_suppresses_output_but_keeps_exit_code() {
    ipfee()
        .args(["--quiet", "completeness", CLAIM_FEES])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 3. Monotonicity
// ──────────────────────────────────────────────

#[test]
fn monotonic_fee_exits_0() {
    ipfee()
        .args([
            "monotonicity",
            CLAIM_FEES,
            "--fee",
            "ExcessClaimsFee",
            "--input",
            "ClaimCount",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ExcessClaimsFee is non-decreasing in ClaimCount",
        ));
}

#[test]
fn step_down_fee_exits_2() {
    ipfee()
        .args([
            "monotonicity",
            CLAIM_FEES,
            "--fee",
            "BulkDiscountFee",
            "--input",
            "ClaimCount",
            "--direction",
            "non-decreasing",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("is NOT non-decreasing"))
        .stdout(predicate::str::contains("total 100 -> 50"));
}

#[test]
fn step_down_is_non_increasing() {
    ipfee()
        .args([
            "monotonicity",
            CLAIM_FEES,
            "--fee",
            "BulkDiscountFee",
            "--input",
            "ClaimCount",
            "--direction",
            "non-increasing",
        ])
        .assert()
        .success();
}

#[test]
fn non_numeric_input_exits_2_with_note() {
    ipfee()
        .args([
            "monotonicity",
            CLAIM_FEES,
            "--fee",
            "FilingFee",
            "--input",
            "EntityType",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("not numeric"));
}

#[test]
fn invalid_direction_rejected_by_parser() {
    ipfee()
        .args([
            "monotonicity",
            CLAIM_FEES,
            "--fee",
            "FilingFee",
            "--input",
            "ClaimCount",
            "--direction",
            "sideways",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown direction"));
}

// ──────────────────────────────────────────────
// 4. Domains
// ──────────────────────────────────────────────

#[test]
fn domains_lists_inputs() {
    ipfee()
        .args(["domains", CLAIM_FEES])
        .assert()
        .success()
        .stdout(predicate::str::contains("EntityType (list): 3 value(s)"))
        .stdout(predicate::str::contains("ClaimCount (number): 50 value(s)"))
        .stdout(predicate::str::contains("Combined size: 300"));
}

#[test]
fn domains_json_reports_unbounded_amount() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("amount.json");
    fs::write(
        &path,
        r#"{ "inputs": [{ "name": "Price", "kind": "amount", "currency": "EUR" }], "fees": [] }"#,
    )
    .expect("write schedule");

    let output = ipfee()
        .args(["--output", "json", "domains"])
        .arg(&path)
        .output()
        .expect("run ipfee");
    assert!(output.status.success());
    let out: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(out["domains"][0]["finite"], false);
    assert_eq!(out["domains"][0]["cardinality"], serde_json::Value::Null);
    assert_eq!(
        out["domains"][0]["representatives"],
        serde_json::json!(["0<EUR>", "100<EUR>", "1000<EUR>"])
    );
    assert_eq!(out["total_size"], serde_json::Value::Null);
}

// ──────────────────────────────────────────────
// 5. Errors and configuration
// ──────────────────────────────────────────────

#[test]
fn unsupported_input_kind_exits_1() {
    ipfee()
        .args(["completeness", "fixtures/invalid_kind.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported input type 'percentage'"));
}

#[test]
fn missing_file_exits_1() {
    ipfee()
        .args(["domains", "fixtures/does_not_exist.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error reading file"));
}

#[test]
fn json_errors_are_json() {
    let output = ipfee()
        .args(["--output", "json", "domains", "fixtures/does_not_exist.json"])
        .output()
        .expect("run ipfee");
    assert_eq!(output.status.code(), Some(1));
    let err: serde_json::Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert!(err["error"]
        .as_str()
        .unwrap_or_default()
        .contains("does_not_exist.json"));
}

#[test]
fn config_caps_reported_gaps() {
    let dir = TempDir::new().expect("temp dir");
    let schedule = dir.path().join("pages.json");
    fs::write(
        &schedule,
        r#"{
            "inputs": [{ "name": "Pages", "kind": "number", "min": 1, "max": 100 }],
            "fees": [{ "name": "PageFee", "body": [{ "condition": "Pages GT 90", "value": "5" }] }]
        }"#,
    )
    .expect("write schedule");
    let config = dir.path().join("ipfee.toml");
    fs::write(&config, "[limits]\nmax_reported_gaps = 3\n").expect("write config");

    let output = ipfee()
        .args(["--output", "json", "--config"])
        .arg(&config)
        .arg("completeness")
        .arg(&schedule)
        .output()
        .expect("run ipfee");
    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(report["fees"][0]["gaps"].as_array().map(|g| g.len()), Some(3));
}

#[test]
fn bad_config_exits_1() {
    let dir = TempDir::new().expect("temp dir");
    let config = dir.path().join("bad.toml");
    fs::write(&config, "[limits\n").expect("write config");

    ipfee()
        .arg("--config")
        .arg(&config)
        .args(["domains", CLAIM_FEES])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not parse"));
}
