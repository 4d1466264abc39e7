//! Tree definitions loaded from JSON.

use argtree_core::config::TupleChars;
use argtree_core::{DeclarationError, Parser, TreeError, Value, load_tree_from_str};

const TREE: &str = r#"{
  "config": { "tuple": { "open": "(", "close": ")" } },
  "root": {
    "name": "tool",
    "arguments": [
      { "name": "verbose", "short": "v", "type": { "kind": "counter" } },
      { "name": "files", "type": { "kind": "strings", "min": 1, "max": 2 },
        "positional": true, "obligatory": true }
    ],
    "subcommands": [
      {
        "name": "env",
        "aliases": ["e"],
        "arguments": [
          { "name": "set", "type": { "kind": "key-values", "values": { "kind": "integer" } } },
          { "name": "dry-run", "type": { "kind": "flag" } }
        ]
      }
    ]
  }
}"#;

#[test]
fn loads_and_parses() {
    let (root, config) = load_tree_from_str(TREE).unwrap();
    assert_eq!(config.tuple, TupleChars::PARENTHESIS);
    assert_eq!(root.subcommands()[0].names(), ["env", "e"]);

    let parser = Parser::with_config(&root, config).unwrap();
    let values = parser
        .parse("-vv (a b) e --set (x=1 y=2) --dry-run")
        .into_result()
        .unwrap();
    assert_eq!(values.get("verbose"), Some(&Value::Count(2)));
    assert_eq!(values.get("env.dry-run"), Some(&Value::Bool(true)));
    let set = values.get("env.set").and_then(Value::as_map).unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn invalid_declarations_are_rejected() {
    let duplicate = r#"{ "root": { "name": "t", "arguments": [
        { "name": "x", "type": { "kind": "flag" } },
        { "name": "y", "short": "x", "type": { "kind": "flag" } }
    ] } }"#;
    assert!(matches!(
        load_tree_from_str(duplicate),
        Err(TreeError::Declaration(DeclarationError::DuplicateArgument { .. }))
    ));

    let bad_inner = r#"{ "root": { "name": "t", "arguments": [
        { "name": "kv", "type": { "kind": "key-values", "values": { "kind": "strings" } } }
    ] } }"#;
    assert!(matches!(
        load_tree_from_str(bad_inner),
        Err(TreeError::Declaration(DeclarationError::InvalidValueType(_)))
    ));

    let bad_config = r#"{ "config": { "prefix": " " }, "root": { "name": "t" } }"#;
    assert!(matches!(
        load_tree_from_str(bad_config),
        Err(TreeError::Declaration(DeclarationError::Config(_)))
    ));
}

#[test]
fn unknown_kind_is_a_json_error() {
    let json = r#"{ "root": { "name": "t", "arguments": [
        { "name": "x", "type": { "kind": "float" } }
    ] } }"#;
    assert!(matches!(
        load_tree_from_str(json),
        Err(TreeError::InvalidJson(_))
    ));
}

#[test]
fn dotted_names_are_rejected() {
    // `get("env.set")` walks on '.', so a dotted name could never be read back.
    let json = r#"{ "root": { "name": "t", "subcommands": [
        { "name": "env", "arguments": [ { "name": "a.b", "type": { "kind": "text" } } ] }
    ] } }"#;
    assert!(matches!(
        load_tree_from_str(json),
        Err(TreeError::Declaration(DeclarationError::InvalidName { name, .. })) if name == "a.b"
    ));
}
