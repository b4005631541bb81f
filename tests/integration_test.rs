//! Integration tests for the sts-audit CLI
//!
//! These tests run the actual binary against fixture trees to verify:
//! - Single-file and directory audits produce the expected verdicts
//! - The structured report schema and its ordering are stable
//! - Exit codes gate on the verdict and on fatal errors
//! - Configuration discovery changes the policy
//!
//! Each test uses its own temp directory; churn lookups are disabled so
//! results do not depend on the surrounding git history.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copy fixtures to a temp directory and return the temp dir
fn create_test_workspace() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    for entry in fs::read_dir(fixtures_path()).expect("Failed to read fixtures") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_file() {
            let filename = path.file_name().expect("fixture file name");
            fs::copy(&path, temp_dir.path().join(filename)).expect("Failed to copy fixture file");
        }
    }
    temp_dir
}

/// Copy a single fixture into an empty temp directory
fn workspace_with(fixture: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let dest = temp_dir.path().join(fixture);
    fs::copy(fixtures_path().join(fixture), &dest).expect("Failed to copy fixture file");
    (temp_dir, dest)
}

/// Function with `decisions` branches, complexity `decisions + 1`
fn branchy(name: &str, decisions: u32) -> String {
    let mut src = format!("def {name}(x):\n    if x == 0:\n        return 0\n");
    for i in 1..decisions {
        src.push_str(&format!("    elif x == {i}:\n        return {i}\n"));
    }
    src.push_str("    return -1\n");
    src
}

/// Run sts-audit analyze on a path and return (stdout, stderr, exit_code)
fn run_analyze(path: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sts-audit"))
        .arg("analyze")
        .arg(path)
        .arg("--no-git")
        .args(args)
        .output()
        .expect("Failed to run sts-audit");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

fn run_json(path: &Path) -> (serde_json::Value, i32) {
    let (stdout, stderr, code) = run_analyze(path, &["-f", "json"]);
    let json = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("Invalid JSON ({e}): {stdout}\nstderr: {stderr}"));
    (json, code)
}

fn file_names(json: &serde_json::Value) -> Vec<String> {
    json["files"]
        .as_array()
        .expect("files array")
        .iter()
        .map(|f| {
            Path::new(f["path"].as_str().expect("path string"))
                .file_name()
                .expect("file name")
                .to_string_lossy()
                .to_string()
        })
        .collect()
}

// ============================================================================
// Single-file mode
// ============================================================================

#[test]
fn test_clean_file_passes() {
    let (_dir, file) = workspace_with("clean.py");
    let (stdout, _, code) = run_analyze(&file, &[]);

    assert_eq!(code, 0, "clean file should pass: {stdout}");
    assert!(stdout.contains("[PASS]"));
    assert!(stdout.contains("Max Cyclomatic Complexity : 2"));
}

#[test]
fn test_complexity_breach_fails_file() {
    let (_dir, file) = workspace_with("tangled.py");
    let (json, code) = run_json(&file);

    assert_eq!(code, 1);
    assert!(json.get("project").is_none());
    let entry = &json["files"][0];
    assert_eq!(entry["path"], file.display().to_string());
    assert_eq!(entry["max_cc"], 21);
    assert_eq!(entry["adf"], 0.0);
    assert_eq!(entry["ccr"], 0.0);
    assert_eq!(entry["verdict"], "FAIL");
}

#[test]
fn test_drift_and_lag_evidence() {
    let (_dir, file) = workspace_with("legacy.py");
    let (json, code) = run_json(&file);

    assert_eq!(code, 1);
    let entry = &json["files"][0];
    assert_eq!(entry["adf"], 0.1429);
    assert_eq!(entry["tl"], true);
    assert_eq!(entry["tl_instances"][0], format!("{}:5", file.display()));
}

#[test]
fn test_file_entry_schema() {
    let (_dir, file) = workspace_with("clean.py");
    let (json, _) = run_json(&file);

    assert_eq!(json["version"], "2.2");
    assert_eq!(json["target"], file.display().to_string());
    let entry = json["files"][0].as_object().expect("file entry object");
    let keys: Vec<&str> = entry.keys().map(|k| k.as_str()).collect();
    for key in [
        "path",
        "max_cc",
        "mi_score",
        "h_difficulty",
        "h_effort",
        "ccr",
        "adf",
        "tl",
        "tl_instances",
        "verdict",
    ] {
        assert!(keys.contains(&key), "missing key {key}");
    }
}

// ============================================================================
// Directory mode
// ============================================================================

#[test]
fn test_directory_report_is_sorted_and_aggregated() {
    let dir = create_test_workspace();
    let (json, code) = run_json(dir.path());

    assert_eq!(code, 1);
    assert_eq!(
        file_names(&json),
        vec!["clean.py", "legacy.py", "tangled.py"]
    );

    let project = &json["project"];
    assert_eq!(project["total_files"], 3);
    assert_eq!(project["max_cc"], 21);
    assert_eq!(project["global_tl"], true);
    assert_eq!(project["verdict"], "FAIL");
    let polluted = project["polluted_files"].as_array().expect("polluted list");
    assert_eq!(polluted.len(), 1);
    assert!(polluted[0].as_str().expect("path").ends_with("legacy.py"));
}

#[test]
fn test_project_policy_is_stricter_than_file_policy() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.py"), branchy("a", 4)).expect("write a.py");
    fs::write(dir.path().join("b.py"), branchy("b", 8)).expect("write b.py");
    fs::write(dir.path().join("c.py"), branchy("c", 10)).expect("write c.py");

    let (json, code) = run_json(dir.path());

    let ccs: Vec<u64> = json["files"]
        .as_array()
        .expect("files array")
        .iter()
        .map(|f| f["max_cc"].as_u64().expect("max_cc"))
        .collect();
    assert_eq!(ccs, vec![5, 9, 11]);
    assert!(json["files"]
        .as_array()
        .expect("files array")
        .iter()
        .all(|f| f["verdict"] == "PASS"));
    assert_eq!(json["project"]["verdict"], "FAIL");
    assert_eq!(code, 1);
}

#[test]
fn test_skip_dirs_and_package_markers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    fs::create_dir_all(root.join("pkg")).expect("create pkg");
    fs::create_dir_all(root.join("venv/lib")).expect("create venv");
    fs::write(root.join("pkg/__init__.py"), "print('init')\n").expect("write init");
    fs::write(root.join("pkg/core.py"), "x = 1\n").expect("write core");
    fs::write(root.join("venv/lib/vendored.py"), &branchy("v", 30)).expect("write vendored");

    let (json, code) = run_json(root);

    assert_eq!(file_names(&json), vec!["core.py"]);
    assert_eq!(json["project"]["verdict"], "PASS");
    assert_eq!(code, 0);
}

#[test]
fn test_text_project_report() {
    let dir = create_test_workspace();
    let (stdout, _, code) = run_analyze(dir.path(), &[]);

    assert_eq!(code, 1);
    assert!(stdout.contains("Files scanned: 3"));
    assert!(stdout.contains("[Project Summary]"));
    assert!(stdout.contains("Project Verdict: [FAIL]"));
    let clean = stdout.find("clean.py").expect("clean row");
    let tangled = stdout.find("tangled.py").expect("tangled row");
    assert!(clean < tangled);
}

// ============================================================================
// Structured report output
// ============================================================================

#[test]
fn test_reports_are_byte_identical_across_runs() {
    let dir = create_test_workspace();
    let out = tempfile::tempdir().expect("output dir");
    let first = out.path().join("first.json");
    let second = out.path().join("second.json");

    run_analyze(dir.path(), &["-o", first.to_str().expect("utf-8 path")]);
    run_analyze(dir.path(), &["-o", second.to_str().expect("utf-8 path")]);

    let a = fs::read(&first).expect("read first report");
    let b = fs::read(&second).expect("read second report");
    assert!(!a.is_empty());
    assert_eq!(a, b);
}

#[test]
fn test_output_flag_writes_report_alongside_text() {
    let (dir, file) = workspace_with("clean.py");
    let out = dir.path().join("audit.json");

    let (stdout, _, code) = run_analyze(&file, &["-o", out.to_str().expect("utf-8 path")]);

    assert_eq!(code, 0);
    assert!(stdout.contains("JSON written to"));
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).expect("read report"))
            .expect("valid JSON report");
    assert_eq!(written["files"][0]["verdict"], "PASS");
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_defaults_apply_without_config() {
    let (_dir, file) = workspace_with("clean.py");
    let (stdout, stderr, code) = run_analyze(&file, &[]);

    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("(Limit: 20)"));
    assert!(stdout.contains("(Limit: 30%)"));
    assert!(stdout.contains("(Limit: 0.05)"));
}

#[test]
fn test_discovered_config_relaxes_policy() {
    let dir = create_test_workspace();
    fs::write(
        dir.path().join(".sts.toml"),
        r#"
[thresholds]
max_cc = 30
adf = 0.5
project_max_cc = 25

[patterns]
deprecated = []
"#,
    )
    .expect("write config");

    let (json, code) = run_json(dir.path());

    assert_eq!(json["project"]["verdict"], "PASS");
    assert_eq!(json["project"]["global_tl"], false);
    assert_eq!(code, 0);
}

#[test]
fn test_config_in_ancestor_directory_is_used() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("service").join("app");
    fs::create_dir_all(&nested).expect("create nested");
    fs::write(dir.path().join(".sts.toml"), "[thresholds]\nmax_cc = 25\n").expect("write config");
    let file = nested.join("tangled.py");
    fs::copy(fixtures_path().join("tangled.py"), &file).expect("copy fixture");

    let (json, code) = run_json(&file);

    assert_eq!(json["files"][0]["verdict"], "PASS");
    assert_eq!(code, 0);
}

#[test]
fn test_malformed_config_is_fatal() {
    let dir = create_test_workspace();
    fs::write(dir.path().join(".sts.toml"), "[thresholds\nmax_cc = 1\n").expect("write config");

    let (stdout, stderr, code) = run_analyze(dir.path(), &[]);

    assert_ne!(code, 0);
    assert!(stdout.is_empty(), "no report expected, got: {stdout}");
    assert!(stderr.contains("malformed configuration"));
}

// ============================================================================
// Fatal target errors
// ============================================================================

#[test]
fn test_missing_target_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (stdout, stderr, code) = run_analyze(&dir.path().join("absent.py"), &[]);

    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_empty_tree_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("pkg")).expect("create pkg");
    fs::write(dir.path().join("pkg/__init__.py"), "").expect("write init");
    fs::write(dir.path().join("README.md"), "# docs\n").expect("write readme");

    let (stdout, stderr, code) = run_analyze(dir.path(), &[]);

    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("no Python files"));
}

#[test]
fn test_unwritable_output_is_fatal() {
    let (dir, file) = workspace_with("clean.py");
    let out = dir.path().join("missing").join("audit.json");

    let (stdout, stderr, code) = run_analyze(&file, &["-o", out.to_str().expect("utf-8 path")]);

    assert_ne!(code, 0);
    assert!(stdout.is_empty());
    assert!(stderr.contains("failed to write report"));
    assert!(!out.exists());
}
