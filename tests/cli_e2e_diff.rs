//! E2E tests for the `diff` command.
//!
//! These tests validate the sparse-patch output and the exit-code contract:
//! 0 when the records agree, 1 when they differ.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn multiedit() -> Command {
    Command::cargo_bin("multiedit").unwrap()
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cli_diff_identical_records_exit_zero() {
    let temp = assert_fs::TempDir::new().unwrap();
    let base = temp.child("base.json");
    let changed = temp.child("changed.json");
    base.write_str(r#"{"name": "standup", "room": "r1"}"#).unwrap();
    changed
        .write_str(r#"{"name": "standup", "room": "r1"}"#)
        .unwrap();

    multiedit()
        .arg("diff")
        .arg(base.path())
        .arg(changed.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cli_diff_prints_only_changed_fields() {
    let temp = assert_fs::TempDir::new().unwrap();
    let base = temp.child("base.json");
    let changed = temp.child("changed.json");
    base.write_str(r#"{"name": "standup", "webex": {"url": "u1", "pin": 7}}"#)
        .unwrap();
    changed
        .write_str(r#"{"name": "standup", "webex": {"url": "u2", "pin": 7}}"#)
        .unwrap();

    let output = multiedit()
        .arg("diff")
        .arg(base.path())
        .arg(changed.path())
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let patch: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(patch, serde_json::json!({"webex": {"url": "u2"}}));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_cli_diff_invalid_json_fails() {
    let temp = assert_fs::TempDir::new().unwrap();
    let base = temp.child("base.json");
    let changed = temp.child("changed.json");
    base.write_str("not json").unwrap();
    changed.write_str(r#"{"name": "x"}"#).unwrap();

    multiedit()
        .arg("diff")
        .arg(base.path())
        .arg(changed.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}
