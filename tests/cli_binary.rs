mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use common::write_report;

const REPORT: &str = r#"{
  "errors": [{"message": "Boom", "sticky": true, "file": "src/a.rs", "line": 2}],
  "warnings": [{"message": "Big PR"}],
  "messages": [],
  "markdowns": [{"message": "Coverage: 91%"}]
}"#;

#[allow(deprecated)]
fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("prnotes").unwrap();
    cmd.current_dir(dir.path()).env_remove("RUST_LOG");
    cmd
}

// --- Help & version ---

#[test]
fn help_flag() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("post"));
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("prnotes"));
}

// --- render ---

#[test]
fn render_prints_body_with_marker() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["render", "--findings"])
        .arg(&findings)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 Error"))
        .stdout(predicate::str::contains("src/a.rs#L2 - Boom"))
        .stdout(predicate::str::contains("Coverage: 91%"))
        .stdout(predicate::str::contains("<!-- generated_by_danger -->"));
}

#[test]
fn render_against_previous_shows_resolved() {
    let dir = TempDir::new().unwrap();
    let first = write_report(dir.path(), REPORT);
    let output = cmd(&dir)
        .args(["render", "--findings"])
        .arg(&first)
        .output()
        .unwrap();
    assert!(output.status.success());
    let previous = dir.path().join("previous.md");
    fs::write(&previous, &output.stdout).unwrap();

    let second = write_report(dir.path(), r#"{"errors": [{"message": "Boom", "sticky": true, "file": "src/a.rs", "line": 2}]}"#);
    cmd(&dir)
        .args(["render", "--findings"])
        .arg(&second)
        .arg("--previous")
        .arg(&previous)
        .assert()
        .success()
        .stdout(predicate::str::contains("<del>Big PR</del>"))
        .stdout(predicate::str::contains("<del>Boom</del>").not());
}

#[test]
fn render_uses_run_id_from_config_file() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    fs::write(dir.path().join(".prnotes.toml"), "run_id = \"lint\"\nhost = \"gitlab\"\n").unwrap();
    cmd(&dir)
        .args(["render", "--findings"])
        .arg(&findings)
        .assert()
        .success()
        .stdout(predicate::str::contains("<!-- generated_by_lint -->"))
        .stdout(predicate::str::contains(r#"width="95%""#));
}

#[test]
fn render_with_github_links() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["render", "--findings"])
        .arg(&findings)
        .args([
            "--repo-url",
            "https://github.com/acme/widget",
            "--head-sha",
            "abc123",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<a href="https://github.com/acme/widget/blob/abc123/src/a.rs#L2">src/a.rs#L2</a> - Boom"#,
        ));
}

// --- status ---

#[test]
fn status_describes_counts() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["status", "--findings"])
        .arg(&findings)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 Error. 1 Warning. Don't worry, everything is fixable.",
        ));
}

#[test]
fn status_all_green() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), "{}");
    cmd(&dir)
        .args(["status", "--findings"])
        .arg(&findings)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("All green. "));
}

// --- errors ---

#[test]
fn invalid_run_id_is_rejected() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["render", "--run-id", "has space", "--findings"])
        .arg(&findings)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid run_id"))
        .stderr(predicate::str::contains("(ConfigValidation)"));
}

#[test]
fn missing_explicit_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["render", "--config", "missing.toml", "--findings"])
        .arg(&findings)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn unknown_host_has_no_template() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["render", "--host", "bitbucket", "--findings"])
        .arg(&findings)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("template not found: bitbucket"));
}

#[test]
fn malformed_report_is_rejected() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), r#"{"errors": "nope"}"#);
    cmd(&dir)
        .args(["render", "--findings"])
        .arg(&findings)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid findings report"));
}

#[test]
fn post_requires_pr() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["post", "--findings"])
        .arg(&findings)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--pr"));
}

#[test]
fn post_to_unsupported_host_fails_before_network() {
    let dir = TempDir::new().unwrap();
    let findings = write_report(dir.path(), REPORT);
    cmd(&dir)
        .args(["post", "--pr", "7", "--host", "gitea", "--findings"])
        .arg(&findings)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("posting is not supported for host gitea"));
}
