//! Shared test helpers for `argtree_core` integration tests.

#![allow(unreachable_pub)]

use argtree_core::types::{Counter, Flag, Integer, Strings};
use argtree_core::{Argument, Command, ParseOutcome, Parser, Severity, ValueCount};
use std::sync::LazyLock;

/// The tree most tests parse against:
///
/// ```text
/// root: what (positional, obligatory, 1..3 strings), a (flag)
/// └── subcommand: c (counter), more-strings/-s (1..3 strings)
///     └── another: ball (1..3 strings), number (positional, obligatory, integer)
/// ```
pub static TREE: LazyLock<Command> = LazyLock::new(|| {
    Command::new("root")
        .argument(Argument::new("what", joiner()).positional().obligatory())
        .argument(Argument::new("a", Flag))
        .subcommand(
            Command::new("subcommand")
                .argument(Argument::new("c", Counter))
                .argument(Argument::new("more-strings", joiner()).short('s'))
                .subcommand(
                    Command::new("another")
                        .argument(Argument::new("ball", joiner()))
                        .argument(Argument::new("number", Integer).positional().obligatory()),
                ),
        )
});

/// Strings taking one to three values.
pub fn joiner() -> Strings {
    Strings::new(ValueCount::new(1, 3))
}

/// Parse `input` against [`TREE`].
pub fn parse(input: &str) -> ParseOutcome {
    Parser::new(&TREE)
        .expect("fixture tree is valid")
        .parse(input)
}

/// Diagnostic codes, in reported order.
#[allow(dead_code)]
pub fn codes_of(outcome: &ParseOutcome) -> Vec<&str> {
    outcome.diagnostics().iter().map(|d| d.id.as_ref()).collect()
}

/// Number of diagnostics with the given severity.
#[allow(dead_code)]
pub fn count_severity(outcome: &ParseOutcome, severity: Severity) -> usize {
    outcome
        .diagnostics()
        .iter()
        .filter(|d| d.severity == severity)
        .count()
}

/// The token-view line of every diagnostic.
#[allow(dead_code)]
pub fn view_lines(outcome: &ParseOutcome) -> Vec<String> {
    outcome.resolved().iter().map(|r| r.view.line()).collect()
}
