//! CLI integration tests
//!
//! Each test runs the binary inside its own temporary directory so a stray
//! gcsafe.toml never leaks between tests.

mod common;

use assert_cmd::Command;
use common::*;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const FIRST_PARTY: &str = "/src/content/browser/frame_host.cc";

#[allow(deprecated)]
fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gcsafe").unwrap();
    cmd.current_dir(dir.path()).arg("--color").arg("never");
    cmd
}

fn project_with_violation() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("out");
    fs::create_dir_all(&out).unwrap();
    write_dump(&out, "frame_host", &make_unique_unit(FIRST_PARTY));
    temp_dir
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("apply-edits"));
}

#[test]
fn test_check_warnings_only_succeeds() {
    let temp_dir = project_with_violation();
    cli(&temp_dir)
        .args(["check", "out"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains(
            "/src/content/browser/frame_host.cc:12:5: warning: Disallowed use of 'std::make_unique' found",
        ))
        .stdout(predicate::str::contains("[unique-ptr-gc]"))
        .stdout(predicate::str::contains("note: 'blink::Node' declared here"))
        .stdout(predicate::str::contains("1 warning generated."));
}

#[test]
fn test_check_warnings_as_errors_fails() {
    let temp_dir = project_with_violation();
    cli(&temp_dir)
        .args(["check", "out", "--warnings-as-errors"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("error: Disallowed use"))
        .stdout(predicate::str::contains("1 error generated."));
}

#[test]
fn test_check_reads_config_file() {
    let temp_dir = project_with_violation();
    fs::write(
        temp_dir.path().join("gcsafe.toml"),
        "[checks]\nwarnings_as_errors = true\n",
    )
    .unwrap();
    cli(&temp_dir).args(["check", "out"]).assert().code(1);
}

#[test]
fn test_check_jsonl() {
    let temp_dir = project_with_violation();
    let output = cli(&temp_dir)
        .args(["check", "out", "--format", "jsonl"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["type"], "diagnostic");
    assert_eq!(records[0]["rule"], "unique-ptr-gc");
    assert_eq!(records[0]["line"], 12);
    assert_eq!(records[1]["type"], "status");
    assert_eq!(records[1]["passed"], true);
    assert_eq!(records[1]["warnings"], 1);
}

#[test]
fn test_check_clean_tree() {
    let temp_dir = TempDir::new().unwrap();
    write_dump(
        temp_dir.path(),
        "zlib",
        &make_unique_unit("/src/third_party/zlib/zlib.c"),
    );
    cli(&temp_dir)
        .arg("check")
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_check_malformed_dump_is_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("bad.ast.json"), "{\"records\": 3}").unwrap();
    cli(&temp_dir)
        .args(["check", "."])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("Malformed translation unit dump"));
}

#[test]
fn test_check_malformed_config_is_parse_error() {
    let temp_dir = project_with_violation();
    fs::write(temp_dir.path().join("gcsafe.toml"), "[checks\n").unwrap();
    cli(&temp_dir)
        .args(["check", "out"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Invalid configuration syntax"));
}

#[test]
fn test_check_invalid_config_is_tool_error() {
    let temp_dir = project_with_violation();
    fs::write(temp_dir.path().join("gcsafe.toml"), "version = \"9\"\n").unwrap();
    cli(&temp_dir).args(["check", "out"]).assert().code(2);
}

#[test]
fn test_check_missing_path_is_tool_error() {
    let temp_dir = TempDir::new().unwrap();
    cli(&temp_dir)
        .args(["check", "does-not-exist"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_classify() {
    let temp_dir = TempDir::new().unwrap();
    cli(&temp_dir)
        .args([
            "classify",
            "/src/third_party/blink/renderer/core/node.cc",
            "src\\v8\\src\\api.cc",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/src/third_party/blink/renderer/core/node.cc: first-party-relaxed",
        ))
        .stdout(predicate::str::contains("src\\v8\\src\\api.cc: third-party"));
}

#[test]
fn test_apply_edits_from_stdin() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    let build = temp_dir.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&build).unwrap();
    fs::write(src.join("a.cc"), "int f(int a, int b);\n").unwrap();

    let input = "\
tool output
==== BEGIN EDITS ====
r:::../src/a.cc:::4:::1:::g
include-user-header:::../src/a.cc:::0:::0:::base/g.h
==== END EDITS ====
";
    cli(&temp_dir)
        .args(["apply-edits", "-p", "out"])
        .write_stdin(input)
        .assert()
        .success()
        .stderr(predicate::str::contains("Applied 2 edits"));

    assert_eq!(
        fs::read_to_string(src.join("a.cc")).unwrap(),
        "#include \"base/g.h\"\n\nint g(int a, int b);\n"
    );
}

#[test]
fn test_apply_edits_conflict_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a.cc"), "abcdef\n").unwrap();

    cli(&temp_dir)
        .args(["apply-edits", "-p", "."])
        .write_stdin("r:::a.cc:::1:::2:::X\nr:::a.cc:::1:::2:::Y\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Conflicting replacement text"));
}

#[test]
fn test_init_then_skip() {
    let temp_dir = TempDir::new().unwrap();
    cli(&temp_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created gcsafe.toml."));
    assert!(temp_dir.path().join("gcsafe.toml").is_file());

    cli(&temp_dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
