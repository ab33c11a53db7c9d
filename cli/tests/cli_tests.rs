//! CLI binary integration tests using assert_cmd + predicates.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("jsonschema-payloads").expect("binary should exist")
}

fn simple_schema() -> String {
    serde_json::json!({
        "title": "Simple",
        "type": "object",
        "properties": {
            "user_name": { "type": "string", "enum": ["ada"] },
            "age": { "type": "integer" }
        },
        "required": ["user_name"]
    })
    .to_string()
}

fn write_schema(dir: &TempDir) -> String {
    let input = dir.path().join("schema.json");
    fs::write(&input, simple_schema()).unwrap();
    input.to_str().unwrap().to_string()
}

// ── Generate to File ────────────────────────────────────────────────────────

#[test]
fn test_generate_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);
    let output = dir.path().join("out.json");

    cmd()
        .args(["generate", &input])
        .args(["-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&output).expect("output file should exist");
    assert!(content.ends_with('\n'));
    let records: Vec<serde_json::Value> =
        serde_json::from_str(&content).expect("output should be valid JSON");

    // {userName} then three layered ages
    assert_eq!(records.len(), 4);
    assert_eq!(records[0]["id"], "#:0");
    assert_eq!(records[0]["value"], serde_json::json!({ "userName": "ada" }));
    assert_eq!(records[0]["parentId"], "#/user_name:0");
    assert_eq!(records[1]["parentId"], "#:0");
}

// ── Generate to Stdout ──────────────────────────────────────────────────────

#[test]
fn test_generate_values_only_to_stdout() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);

    let output = cmd()
        .args(["generate", &input, "--values-only", "--format", "compact"])
        .args(["--seed", "3"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.lines().count(), 1);
    let values: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(values[0], serde_json::json!({ "userName": "ada" }));
    assert_eq!(values[1], serde_json::json!({ "userName": "ada", "age": 1 }));
    assert_eq!(values[2], serde_json::json!({ "userName": "ada", "age": 100 }));
}

#[test]
fn test_generate_identity_keys() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);

    cmd()
        .args(["generate", &input, "--values-only", "--key-transform", "identity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"user_name\""))
        .stdout(predicate::str::contains("userName").not());
}

#[test]
fn test_seed_is_reproducible() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(
        &input,
        r#"{ "type": "object", "required": ["n", "s"], "properties": { "n": { "type": "number", "minimum": 0.5 }, "s": { "type": "string" } } }"#,
    )
    .unwrap();

    let run = || {
        cmd()
            .args(["generate", input.to_str().unwrap(), "--seed", "99"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };
    assert_eq!(run(), run());
}

// ── Count ───────────────────────────────────────────────────────────────────

#[test]
fn test_count() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);

    cmd()
        .args(["count", &input])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_count_with_object_cap() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);

    cmd()
        .args(["count", &input, "--max-object-combinations", "2"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_zero_cap_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);

    cmd()
        .args(["count", &input, "--max-array-combinations", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max-array-combinations"));
}

// ── Progress ────────────────────────────────────────────────────────────────

#[test]
fn test_progress_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);

    cmd()
        .args(["count", &input, "--progress"])
        .assert()
        .success()
        .stdout("4\n")
        .stderr(predicate::str::contains("Loaded schema with 0 definitions, and a direct object"))
        .stderr(predicate::str::contains("Counting payloads for Simple..."))
        .stderr(predicate::str::contains("Counted 4 values for object path #"));
}

#[test]
fn test_silent_without_progress() {
    let dir = TempDir::new().unwrap();
    let input = write_schema(&dir);

    cmd()
        .args(["count", &input])
        .assert()
        .success()
        .stderr(predicate::str::contains("Loaded schema").not());
}

// ── Invalid Input ───────────────────────────────────────────────────────────

#[test]
fn test_invalid_input() {
    cmd()
        .args(["generate", "/nonexistent/path/schema.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load schema from"))
        .stderr(predicate::str::contains("Failed to read schema from location"));
}

#[test]
fn test_unresolvable_ref() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("schema.json");
    fs::write(
        &input,
        r##"{ "type": "object", "properties": { "a": { "$ref": "#/definitions/gone" } } }"##,
    )
    .unwrap();

    cmd()
        .args(["count", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unresolvable $ref"));
}

// ── Help Output ─────────────────────────────────────────────────────────────

#[test]
fn test_help_output() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("count"));
}

#[test]
fn test_generate_help() {
    cmd()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--definition"))
        .stdout(predicate::str::contains("--values-only"))
        .stdout(predicate::str::contains("--key-transform"));
}
