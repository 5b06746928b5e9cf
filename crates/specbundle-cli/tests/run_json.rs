//! Integration tests for a `specbundle` run.

use std::process::Command;
use tempfile::tempdir;

fn specbundle() -> Command {
    Command::new(env!("CARGO_BIN_EXE_specbundle"))
}

#[test]
fn test_help_mentions_root_flag() {
    let output = specbundle().arg("--help").output().expect("run specbundle");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--root"));
}

#[test]
fn test_compiler_failure_exits_one_without_bundle() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("package.json"), "{}").unwrap();

    let output = specbundle()
        .arg("--root")
        .arg(dir.path())
        .output()
        .expect("run specbundle");

    assert_eq!(output.status.code(), Some(1));
    assert!(!output.stderr.is_empty(), "error should be printed to stderr");
    assert!(!dir.path().join("dist/legacy-test-bundle.spec.js").exists());
}

#[test]
fn test_json_report_on_failure() {
    let dir = tempdir().unwrap();

    let output = specbundle()
        .args(["--json", "--root"])
        .arg(dir.path())
        .output()
        .expect("run specbundle");

    assert_eq!(output.status.code(), Some(1));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout should be one JSON object");
    assert_eq!(json["ok"], false);

    let code = json["error"]["code"].as_str().unwrap();
    assert!(code.starts_with("COMPILER_"), "unexpected code {code}");
    assert!(json["error"]["message"].is_string());
    assert!(json.get("out_file").is_none());
}

#[test]
fn test_unknown_flag_is_rejected() {
    let output = specbundle().arg("--watch").output().expect("run specbundle");
    assert!(!output.status.success());
}
