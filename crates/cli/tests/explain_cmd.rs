//! CLI tests for the `argtree explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn argtree_cmd() -> Command {
    Command::new(cargo::cargo_bin!("argtree"))
}

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = argtree_cmd()
        .args(["explain", "ARG2001", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "ARG2001");
    assert!(json["explanation"].is_string());
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = argtree_cmd()
        .args(["explain", "ARG9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "ARG9999");
    assert!(json["explanation"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = argtree_cmd()
        .args(["explain", "ARG1003", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("ARG1003") && stdout.contains(':'),
        "unexpected output: {stdout}"
    );
}
