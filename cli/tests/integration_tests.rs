use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::{Value, json};
use tempfile::TempDir;

/// Registry definition modelled on a small user-info tool.
fn write_definition(dir: &Path) -> PathBuf {
    let yaml = r#"
commands:
  - name: ""
    args:
      - { name: output, default: "" }
    flags:
      - { name: force, short: f, default: false }
      - { name: verbose, short: v, default: false }
      - { name: dir, default: /var/users }
  - name: info
    args:
      - { name: category, default: [manager, student] }
      - { name: username, default: "" }
      - { name: "subjects...", default: "" }
    flags:
      - { name: timeout, type: duration, default: 30s }
      - { name: no-clean, default: true }
"#;
    let path = dir.join("commands.yaml");
    fs::write(&path, yaml).expect("failed to write definition");
    path
}

fn optparse(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_optparse"))
        .args(args)
        .output()
        .expect("failed to run optparse")
}

fn parse_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_root_values_as_json() {
    let dir = TempDir::new().unwrap();
    let schema = write_definition(dir.path());

    let output = optparse(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "-fv",
        "--dir=./sub/dir",
        "userinfo",
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report = parse_json(&output);
    assert_eq!(report["command"], "");
    assert_eq!(report["flags"]["force"], json!({ "value": true, "bound": true }));
    assert_eq!(report["flags"]["dir"]["value"], "./sub/dir");
    assert_eq!(report["args"]["output"]["value"], "userinfo");
}

#[test]
fn parse_reports_defaults_as_unbound() {
    let dir = TempDir::new().unwrap();
    let schema = write_definition(dir.path());

    let output = optparse(&["parse", "--schema", schema.to_str().unwrap(), "--", "info"]);

    assert!(output.status.success());
    let report = parse_json(&output);
    assert_eq!(report["command"], "info");
    assert_eq!(
        report["args"]["category"],
        json!({ "value": "manager", "bound": false })
    );
    assert_eq!(report["args"]["subjects"], json!({ "value": [], "bound": false }));
    assert_eq!(report["flags"]["timeout"]["value"], "30s");
    assert_eq!(report["flags"]["clean"]["value"], true);
}

#[test]
fn parse_sub_command_with_variadic_and_inversion() {
    let dir = TempDir::new().unwrap();
    let schema = write_definition(dir.path());

    let output = optparse(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "info",
        "student",
        "--no-clean",
        "--timeout",
        "1h30m",
        "thatisuday",
        "math",
        "science",
    ]);

    assert!(output.status.success());
    let report = parse_json(&output);
    assert_eq!(report["args"]["username"]["value"], "thatisuday");
    assert_eq!(
        report["args"]["subjects"],
        json!({ "value": ["math", "science"], "bound": true })
    );
    assert_eq!(report["flags"]["clean"]["value"], false);
    assert_eq!(report["flags"]["timeout"]["value"], "1h30m0s");
}

#[test]
fn parse_failure_exits_with_code_2() {
    let dir = TempDir::new().unwrap();
    let schema = write_definition(dir.path());

    let output = optparse(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "--bogus",
    ]);

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("unknown flag '--bogus' found in the arguments"),
        "stderr: {stderr}"
    );
}

#[test]
fn parse_choice_violation_exits_with_code_2() {
    let dir = TempDir::new().unwrap();
    let schema = write_definition(dir.path());

    let output = optparse(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "info",
        "teacher",
    ]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad argument 'category'"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_lists_declared_commands() {
    let dir = TempDir::new().unwrap();
    let schema = write_definition(dir.path());

    let output = optparse(&["check", "--schema", schema.to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("(root)"), "stdout: {stdout}");
    assert!(stdout.contains("-f/--force"), "stdout: {stdout}");
    assert!(stdout.contains("category username subjects..."), "stdout: {stdout}");
    assert!(stdout.contains("OK: 2 command(s)"), "stdout: {stdout}");
}

#[test]
fn check_rejects_invalid_definition() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(
        &path,
        r#"
commands:
  - name: ""
    args:
      - { name: "files...", default: "" }
      - { name: output, default: "" }
"#,
    )
    .unwrap();

    let output = optparse(&["check", "--schema", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.yaml"), "stderr: {stderr}");
}

#[test]
fn check_missing_file_exits_with_code_1() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");

    let output = optparse(&["check", "--schema", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
}
