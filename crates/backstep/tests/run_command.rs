use std::fs;
use std::path::PathBuf;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

fn write_flow(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("flow.yml");
    fs::write(&path, content).expect("write flow file");
    path
}

#[test]
fn completed_flow_exits_successfully() {
    let dir = TempDir::new().expect("create temp dir");
    let flow = write_flow(&dir, "actions:\n  - echo\n  - noop\n");

    assert_cmd::cargo::cargo_bin_cmd!("backstep")
        .arg("run")
        .arg(&flow)
        .assert()
        .success()
        .stdout(contains("do echo"))
        .stdout(contains("✓ echo\n✓ noop"))
        .stdout(contains("undo echo").not());
}

#[test]
fn failing_step_rolls_back_and_exits_with_failure() {
    let dir = TempDir::new().expect("create temp dir");
    let flow = write_flow(&dir, "actions:\n  - echo\n  - fail\n  - echo\n");

    assert_cmd::cargo::cargo_bin_cmd!("backstep")
        .arg("run")
        .arg(&flow)
        .assert()
        .failure()
        .stdout(contains("do echo\nundo fail\nundo echo"))
        .stdout(contains("↩ echo\n↩ fail"))
        .stderr(contains("error: flow rolled back after step 'fail' failed"))
        .stderr(contains("caused by: fail: forward action failed"));
}

#[test]
fn steps_after_the_failure_never_run() {
    let dir = TempDir::new().expect("create temp dir");
    let flow = write_flow(&dir, "actions:\n  - fail\n  - echo\n");

    assert_cmd::cargo::cargo_bin_cmd!("backstep")
        .arg("run")
        .arg(&flow)
        .assert()
        .failure()
        .stdout(contains("undo fail"))
        .stdout(contains("echo").not());
}

#[test]
fn failed_compensation_reports_error_chain() {
    let dir = TempDir::new().expect("create temp dir");
    let flow = write_flow(&dir, "actions:\n  - echo\n  - fail-undo\n  - fail\n");

    assert_cmd::cargo::cargo_bin_cmd!("backstep")
        .arg("run")
        .arg(&flow)
        .assert()
        .failure()
        .stdout(contains("undo fail"))
        .stdout(contains("⚠ fail-undo"))
        .stdout(contains("undo echo").not())
        .stderr(contains("error: flow run failed"))
        .stderr(contains("caused by: rollback aborted"))
        .stderr(contains(
            "caused by: compensation failed for step 'fail-undo' while rolling back 'fail'",
        ))
        .stderr(contains("caused by: fail-undo: compensation failed"));
}

#[test]
fn unknown_action_fails_before_running() {
    let dir = TempDir::new().expect("create temp dir");
    let flow = write_flow(&dir, "actions:\n  - echo\n  - steps.missing\n");

    assert_cmd::cargo::cargo_bin_cmd!("backstep")
        .arg("run")
        .arg(&flow)
        .assert()
        .failure()
        .stdout(contains("do echo").not())
        .stderr(contains("error: failed to link flow"))
        .stderr(contains("unknown action 'steps.missing' at index 1"));
}

#[test]
fn missing_flow_file_reports_read_error() {
    let dir = TempDir::new().expect("create temp dir");

    assert_cmd::cargo::cargo_bin_cmd!("backstep")
        .arg("run")
        .arg(dir.path().join("absent.yml"))
        .assert()
        .failure()
        .stderr(contains("error: invalid flow file"))
        .stderr(contains("caused by: failed to read flow file"));
}

#[test]
fn verbose_flag_enables_debug_logging() {
    let dir = TempDir::new().expect("create temp dir");
    let flow = write_flow(&dir, "actions:\n  - noop\n");

    assert_cmd::cargo::cargo_bin_cmd!("backstep")
        .arg("-v")
        .arg("run")
        .arg(&flow)
        .env_remove("BACKSTEP_LOG")
        .assert()
        .success()
        .stderr(contains("linked flow"));
}
