//! Shared helpers for `argtree` CLI tests.

#![allow(unreachable_pub)]

use std::fs;
use std::process::{Command, Output};

use assert_cmd::cargo;

/// A tree with a subcommand chain, written to a temporary file by [`write_tree`].
pub const TREE_JSON: &str = r#"{
  "root": {
    "name": "root",
    "arguments": [
      { "name": "what", "type": { "kind": "strings", "min": 1, "max": 3 },
        "positional": true, "obligatory": true },
      { "name": "a", "type": { "kind": "flag" } }
    ],
    "subcommands": [
      {
        "name": "subcommand",
        "arguments": [
          { "name": "c", "type": { "kind": "counter" } },
          { "name": "more-strings", "short": "s",
            "type": { "kind": "strings", "min": 1, "max": 3 } }
        ],
        "subcommands": [
          {
            "name": "another",
            "arguments": [
              { "name": "ball", "type": { "kind": "strings", "min": 1, "max": 3 } },
              { "name": "number", "type": { "kind": "integer" },
                "positional": true, "obligatory": true }
            ]
          }
        ]
      }
    ]
  }
}"#;

pub fn argtree_cmd() -> Command {
    Command::new(cargo::cargo_bin!("argtree"))
}

/// Write `content` to a tree file inside a fresh temporary directory.
pub fn write_tree(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tree.json");
    fs::write(&path, content).expect("write temp tree");
    (dir, path.to_string_lossy().to_string())
}

/// Run the CLI with `args` and parse stdout as JSON.
#[allow(dead_code)]
pub fn run_json(args: &[&str]) -> (Output, serde_json::Value) {
    let output = argtree_cmd()
        .args(["--output", "json"])
        .args(args)
        .output()
        .expect("run argtree");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("valid json");
    (output, json)
}
