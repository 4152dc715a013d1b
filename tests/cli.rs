//! End-to-end tests for the `first-aid-rs` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn first_aid() -> Command {
    let mut cmd = Command::cargo_bin("first-aid-rs").unwrap();
    cmd.env("FIRST_AID_SYNTHETIC_LATENCY_MS", "0")
        .env_remove("FIRST_AID_ANALYTICS_HOST")
        .env_remove("FIRST_AID_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn tool_schema_prints_registry() {
    first_aid()
        .arg("tool-schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("checkMerchantLogs"))
        .stdout(predicate::str::contains("FRA_BLOCKS"));
}

#[test]
fn diagnose_fraud_blocks_json() {
    first_aid()
        .args(["--mock", "--format", "json", "diagnose", "--intent", "FRA_BLOCKS"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RISK_BLOCK_VELOCITY"))
        .stdout(predicate::str::contains("\"sr\": 0"));
}

#[test]
fn diagnose_accepts_kebab_case_intent() {
    first_aid()
        .args(["--mock", "diagnose", "--intent", "integration-health", "-m", "M-7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INVALID_SIGNATURE"))
        .stdout(predicate::str::contains("M-7"));
}

#[test]
fn diagnose_rejects_unknown_intent() {
    first_aid()
        .args(["--mock", "diagnose", "--intent", "REFUNDS"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid argument"));
}

#[test]
fn ask_without_api_key_fails() {
    first_aid()
        .args(["ask", "why are payments failing?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key missing"));
}

#[test]
fn summarize_missing_file_fails() {
    first_aid()
        .args(["summarize", "/nonexistent/transcript.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}
