// veilmask/tests/cli_integration_tests.rs
//! CLI integration tests for the `veilmask` executable.
//!
//! These tests exercise the binary the way a user would: stdin/stdout
//! plumbing, the shared `--store` flag, blacklist handling, pipeline gating
//! via `--fail-if-masked`, and the full mask-then-unmask round trip across
//! two separate invocations. `tempfile` keeps every store isolated.

#[allow(unused_imports)]
use predicates::prelude::*;

use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

/// Runs `veilmask` with `args` against the store at `store`, feeding `input`
/// on stdin.
fn run_veilmask(store: &std::path::Path, input: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("veilmask").unwrap();
    cmd.arg("--quiet");
    cmd.arg("--store").arg(store);
    cmd.args(args);
    cmd.write_stdin(input);
    cmd.assert()
}

#[test]
fn masks_an_email_from_stdin() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");

    run_veilmask(&store, "mail jane@acme.com\n", &["mask", "--no-summary"])
        .success()
        .stdout(predicate::str::contains("[Email_1]"))
        .stdout(predicate::str::contains("jane@acme.com").not());
}

#[test_log::test]
fn round_trips_across_two_invocations() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");
    let input = "Contact John Smith at john@acme.com\n";

    let masked = run_veilmask(&store, input, &["mask", "--no-summary"]).success();
    let masked_text = String::from_utf8(masked.get_output().stdout.clone()).unwrap();
    assert!(masked_text.contains("[Client_1]"));
    assert!(masked_text.contains("[Email_1]"));

    run_veilmask(&store, &masked_text, &["unmask"])
        .success()
        .stdout(predicate::str::contains("Contact John Smith at john@acme.com"));
}

#[test]
fn blacklist_terms_become_entity_placeholders() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");

    run_veilmask(
        &store,
        "Project Apollo launch\n",
        &["mask", "--no-summary", "--blacklist", "Apollo"],
    )
    .success()
    .stdout(predicate::str::contains("Project [Entity_1] launch"));
}

#[test]
fn unknown_placeholders_pass_through_unmask() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");

    run_veilmask(&store, "[Client_999] said hi\n", &["unmask"])
        .success()
        .stdout(predicate::str::contains("[Client_999] said hi"));
}

#[test]
fn fail_if_masked_gates_pipelines() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");

    run_veilmask(
        &store,
        "mail jane@acme.com\n",
        &["mask", "--no-summary", "--fail-if-masked"],
    )
    .code(2);

    run_veilmask(
        &store,
        "nothing sensitive here\n",
        &["mask", "--no-summary", "--fail-if-masked"],
    )
    .success();
}

#[test]
fn mask_writes_to_an_output_file() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");
    let out = dir.path().join("masked.txt");

    run_veilmask(
        &store,
        "card 4111 1111 1111 1111\n",
        &["mask", "--no-summary", "-o", out.to_str().unwrap()],
    )
    .success();

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("[Card_1]"));
    assert!(!written.contains("4111"));
}

#[test]
fn aliases_reports_per_category_counts() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");

    run_veilmask(&store, "mail jane@acme.com\n", &["mask", "--no-summary"]).success();

    run_veilmask(&store, "", &["aliases"])
        .success()
        .stdout(predicate::str::contains("Email"))
        .stdout(predicate::str::contains("Total"));
}

#[test]
fn aliases_json_report_is_machine_readable() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");

    run_veilmask(&store, "mail jane@acme.com\n", &["mask", "--no-summary"]).success();

    let out = run_veilmask(&store, "", &["aliases", "--json"]).success();
    let report: serde_json::Value =
        serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(report["categories"]["Email"], 1);
    assert_eq!(report["total"], 1);
}

#[test]
fn aliases_full_listing_redacts_originals_by_default() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("aliases.json");

    run_veilmask(&store, "mail jane@acme.com\n", &["mask", "--no-summary"]).success();

    run_veilmask(&store, "", &["aliases", "--full"])
        .success()
        .stdout(predicate::str::contains("[Email_1]"))
        .stdout(predicate::str::contains("sha256:"))
        .stdout(predicate::str::contains("jane@acme.com").not());

    run_veilmask(&store, "", &["aliases", "--full", "--reveal"])
        .success()
        .stdout(predicate::str::contains("jane@acme.com"));
}
