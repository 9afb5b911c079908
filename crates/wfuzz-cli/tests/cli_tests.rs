use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn corpus_dir() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.join("../../testing/corpus")
}

fn compile_into(dir: &Path, name: &str) {
    let binary = wat::parse_file(corpus_dir().join(format!("{}.wat", name))).unwrap();
    std::fs::write(dir.join(format!("{}.wasm", name)), binary).unwrap();
}

fn fuzzer() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("wasm-fuzzer").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stderr_json(output: &std::process::Output) -> serde_json::Value {
    let stderr = String::from_utf8(output.stderr.clone()).unwrap();
    let line = stderr
        .lines()
        .find(|line| line.starts_with('{'))
        .expect("no JSON error object on stderr");
    serde_json::from_str(line).unwrap()
}

// =============================================================================
// Argument and path errors
// =============================================================================

#[test]
fn test_missing_argument_is_usage_error() {
    let output = fuzzer().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let json = stderr_json(&output);
    assert_eq!(json["error"], "usage: wasm-fuzzer <directory>");
}

#[test]
fn test_nonexistent_directory() {
    let temp_dir = TempDir::new().unwrap();

    fuzzer()
        .arg(temp_dir.path().join("does-not-exist"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("directory access failed"));
}

#[test]
fn test_file_instead_of_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("module.wasm");
    std::fs::write(&file, b"\0asm").unwrap();

    let output = fuzzer().arg(&file).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let json = stderr_json(&output);
    assert_eq!(json["error"], "path is not a directory");
    assert_eq!(json["path"], file.display().to_string());
}

#[test]
fn test_help_exits_zero() {
    fuzzer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<DIRECTORY>"));
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_report_on_stdout() {
    let temp_dir = TempDir::new().unwrap();
    compile_into(temp_dir.path(), "add_one");
    compile_into(temp_dir.path(), "trap");
    std::fs::write(temp_dir.path().join("empty.wasm"), b"").unwrap();
    std::fs::write(temp_dir.path().join("notes.txt"), b"skip me").unwrap();

    let output = fuzzer().arg(temp_dir.path()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with('\n'));

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["total_files"], 3);
    assert_eq!(json["passed"], 1);
    assert_eq!(json["failed"], 2);
    assert_eq!(json["failure_counts"]["load"], 1);
    assert_eq!(json["failure_counts"]["validate"], 0);
    assert_eq!(json["failure_counts"]["instantiate"], 0);
    assert_eq!(json["failure_counts"]["execute"], 1);

    let results = json["results"].as_array().unwrap();
    let add_one = results
        .iter()
        .find(|r| r["file_name"] == "add_one.wasm")
        .unwrap();
    assert_eq!(add_one["success"], true);
    assert_eq!(add_one["failure_stage"], "none");
    assert_eq!(add_one["return_values"], serde_json::json!([2]));
}

#[test]
fn test_empty_directory_reports_zero() {
    let temp_dir = TempDir::new().unwrap();

    let output = fuzzer().arg(temp_dir.path()).output().unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_files"], 0);
    assert_eq!(json["results"], serde_json::json!([]));
}

#[test]
fn test_config_changes_entry_point() {
    let temp_dir = TempDir::new().unwrap();
    let modules = temp_dir.path().join("modules");
    std::fs::create_dir(&modules).unwrap();
    compile_into(&modules, "add_one");

    let config = temp_dir.path().join("wfuzz.yaml");
    std::fs::write(&config, "entry_point: run\n").unwrap();

    let output = fuzzer()
        .arg("--config")
        .arg(&config)
        .arg("--compact")
        .arg(&modules)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);

    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["failure_counts"]["execute"], 1);
    assert_eq!(
        json["results"][0]["error_message"],
        "function 'run' not found in module exports"
    );
}
