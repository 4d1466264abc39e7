//! End-to-end parses covering diagnostic aggregation across the whole chain.

mod common;

use argtree_core::{Severity, Value, codes};
use common::{codes_of, count_severity, parse};

#[test]
fn successful_parse_without_diagnostics() {
    let outcome = parse("--what hello world");
    assert!(outcome.is_ok());
    assert!(outcome.diagnostics().is_empty());
}

#[test]
fn obligatory_root_argument_before_subcommand() {
    let outcome = parse("subcommand");
    assert_eq!(codes_of(&outcome), [codes::OBLIGATORY_ARGUMENT_MISSING]);
    assert_eq!(count_severity(&outcome, Severity::Error), 1);
    assert!(outcome.values().is_none());
}

#[test]
fn failure_in_the_last_node_only() {
    let outcome = parse("foo subcommand another");
    assert_eq!(codes_of(&outcome), [codes::OBLIGATORY_ARGUMENT_MISSING]);
    assert_eq!(outcome.diagnostics()[0].anchor.node, 2);
    assert_eq!(outcome.nodes().len(), 3);
    assert!(outcome.values().is_none());
}

#[test]
fn warnings_keep_the_values() {
    let outcome = parse("[foo] --unknown");
    assert_eq!(codes_of(&outcome), [codes::UNMATCHED_TOKEN]);
    assert_eq!(
        outcome.diagnostics()[0].message,
        "Token '--unknown' does not correspond with a valid argument, value, or command."
    );
    let values = outcome.into_result().unwrap();
    assert_eq!(
        values.get("what"),
        Some(&Value::List(vec![Value::Text("foo".into())]))
    );
}

#[test]
fn diagnostics_from_every_node_are_collected_in_chain_order() {
    let outcome = parse("subcommand -s another bar");
    assert_eq!(
        codes_of(&outcome),
        [
            codes::OBLIGATORY_ARGUMENT_MISSING,
            codes::INCORRECT_VALUE_COUNT,
            codes::INVALID_VALUE,
        ]
    );
    let nodes: Vec<usize> = outcome
        .diagnostics()
        .iter()
        .map(|d| d.anchor.node)
        .collect();
    assert_eq!(nodes, [0, 1, 2]);
}

#[test]
fn tokenizer_diagnostics_come_first_within_a_node() {
    let outcome = parse("--what a b c d [x");
    assert_eq!(
        codes_of(&outcome),
        [
            codes::TUPLE_NOT_CLOSED,
            codes::UNMATCHED_TOKEN,
            codes::UNMATCHED_TOKEN,
        ]
    );
    assert_eq!(count_severity(&outcome, Severity::Warn), 2);
}

#[test]
fn failure_carries_every_diagnostic() {
    let failure = parse("subcommand --bogus another").into_result().unwrap_err();
    assert_eq!(failure.input, "subcommand --bogus another");
    assert_eq!(failure.diagnostics.len(), 3);
    assert_eq!(
        failure.to_string(),
        "parsing 'subcommand --bogus another' failed with 2 error(s)"
    );
}

#[test]
fn full_chain_values() {
    let values = parse("one two subcommand -c --more-strings x another --ball [p q] 42")
        .into_result()
        .unwrap();
    assert_eq!(values.active_commands(), ["root", "subcommand", "another"]);
    assert_eq!(
        values.get("what"),
        Some(&Value::List(vec![
            Value::Text("one".into()),
            Value::Text("two".into())
        ]))
    );
    assert_eq!(values.get("subcommand.c"), Some(&Value::Count(1)));
    assert_eq!(values.get("subcommand.another.number"), Some(&Value::Int(42)));
    assert_eq!(
        values
            .get("subcommand.another.ball")
            .and_then(Value::as_list)
            .map(<[Value]>::len),
        Some(2)
    );
    assert!(values.forward_value().is_none());
}
