//! Fuzz smoke tests for the tokenizer, matcher, and error context.
//!
//! Random and adversarial command lines are parsed against the shared fixture
//! tree. Every outcome must resolve without panicking, token spans must point
//! at the text they came from, balanced input must tokenize cleanly, and
//! parsing the same input twice must give the same result.
//!
//! A small deterministic PRNG keeps every run reproducible.

mod common;

use argtree_core::{
    Anchor, Command, ErrorContext, ParseOutcome, Parser, ParserConfig, TokKind, TokenRange,
    tokenize,
};
use common::TREE;

// ─── Simple deterministic PRNG (LCG) ────────────────────────────────────────

struct SimpleRng(u64);

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn gen_range(&mut self, max: usize) -> usize {
        (self.next() as usize) % max
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.gen_range(items.len())]
    }
}

// ─── Input generators ───────────────────────────────────────────────────────

/// Fragments that hit every tokenizer rule, including the broken ones.
const ANY_FRAGMENTS: &[&str] = &[
    "a", "foo", "12", "x", " ", " ", "  ", "[", "]", "'", "\"", "\\", "-", "--", "-- ", "=",
    "-a", "--what", "-cs", "-s", "--ball", "--number", "subcommand", "another", "é", "日本",
    "k=v", "\t",
];

/// Plain words: no delimiters, quotes, escapes, or spaces.
const WORDS: &[&str] = &[
    "a", "foo", "12", "-a", "--what", "-cs", "-s", "-c", "--ball", "--more-strings=x",
    "subcommand", "another", "é", "k=v", "--", "a--", "-",
];

fn random_input(rng: &mut SimpleRng) -> String {
    let len = rng.gen_range(24);
    (0..len).map(|_| rng.pick(ANY_FRAGMENTS)).collect()
}

/// Space-separated words, tuples, and quoted strings that are all closed.
fn balanced_input(rng: &mut SimpleRng) -> String {
    let items = rng.gen_range(10);
    let mut parts = Vec::with_capacity(items);
    for _ in 0..items {
        let part = match rng.gen_range(4) {
            0 => {
                let inner: Vec<&str> = (0..rng.gen_range(4)).map(|_| rng.pick(WORDS)).collect();
                format!("[{}]", inner.join(" "))
            }
            1 => {
                let q = rng.pick(&["'", "\""]);
                let inner: Vec<&str> = (0..rng.gen_range(3))
                    .map(|_| rng.pick(&["a b", "[", "]", "-- x", "sub command", ""]))
                    .collect();
                format!("{q}{}{q}", inner.join(" "))
            }
            _ => rng.pick(WORDS).to_string(),
        };
        parts.push(part);
    }
    parts.join(" ")
}

// ─── Invariant checking ─────────────────────────────────────────────────────

fn parser() -> Parser<'static> {
    Parser::new(&TREE).expect("fixture tree is valid")
}

/// Resolve every diagnostic and check it lands inside the input.
fn assert_resolves(outcome: &ParseOutcome, input: &str) {
    for r in outcome.resolved() {
        assert!(
            r.span.end <= input.len(),
            "{:?} resolved past the input in {input:?}",
            r.diagnostic
        );
        assert!(input.is_char_boundary(r.span.start) && input.is_char_boundary(r.span.end));
        let _ = r.view.to_string();
    }
    assert_eq!(outcome.is_ok(), !outcome.diagnostics().iter().any(|d| d.is_error()));
}

/// Tokens written without quotes or escapes must span exactly their text.
fn assert_spans_match_text(input: &str) {
    let chain = tokenize(&TREE, ParserConfig::default(), input);
    let ctx = ErrorContext::new(&chain.nodes);
    for (node, tokens) in chain.nodes.iter().enumerate() {
        for (i, token) in tokens.tokens.iter().enumerate() {
            let span = ctx.absolute_span(Anchor::new(node, TokenRange::single(i)));
            let raw = &input[span.start..span.end];
            if token.kind != TokKind::ForwardValue && raw.contains(['\\', '\'', '"']) {
                continue;
            }
            assert_eq!(
                raw, token.text,
                "token {:?} has span {}..{} in {input:?}",
                token.text, span.start, span.end
            );
        }
    }
}

/// A value's display text must tokenize back to that same single value.
fn assert_display_round_trips(outcome: &ParseOutcome) {
    let plain = Command::new("plain");
    for node in outcome.nodes() {
        for token in node.tokens.iter().filter(|t| t.kind == TokKind::ArgumentValue) {
            let shown = token.display_text(node.config.tuple);
            let again = tokenize(&plain, node.config, &shown);
            assert!(again.diagnostics.is_empty(), "{shown:?}");
            let texts: Vec<&str> = again.nodes[0].tokens.iter().map(|t| t.text.as_str()).collect();
            assert_eq!(texts, [token.text.as_str()], "shown as {shown:?}");
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[test]
fn fuzz_random_inputs_never_panic() {
    let parser = parser();
    let mut rng = SimpleRng::new(0x5eed_0001);
    for _ in 0..3000 {
        let input = random_input(&mut rng);
        let outcome = parser.parse(&input);
        assert_resolves(&outcome, &input);
        assert_spans_match_text(&input);
        assert_display_round_trips(&outcome);
    }
}

#[test]
fn fuzz_balanced_inputs_have_no_tokenizer_errors() {
    let parser = parser();
    let mut rng = SimpleRng::new(0xba1a_0ced);
    for _ in 0..3000 {
        let input = balanced_input(&mut rng);
        let outcome = parser.parse(&input);
        let tokenizer_errors: Vec<_> = outcome
            .diagnostics()
            .iter()
            .filter(|d| d.id.starts_with("ARG1"))
            .collect();
        assert!(tokenizer_errors.is_empty(), "{input:?}: {tokenizer_errors:?}");
        assert_spans_match_text(&input);
    }
}

#[test]
fn fuzz_parsing_is_repeatable() {
    let parser = parser();
    let mut rng = SimpleRng::new(42);
    for _ in 0..1000 {
        let input = if rng.gen_range(2) == 0 {
            random_input(&mut rng)
        } else {
            balanced_input(&mut rng)
        };
        let first = serde_json::to_value(parser.parse(&input)).expect("serializable");
        let second = serde_json::to_value(parser.parse(&input)).expect("serializable");
        assert_eq!(first, second, "{input:?}");

        let split = serde_json::to_value(parser.parse_args(input.split(' '))).expect("serializable");
        assert_eq!(first, split, "{input:?}");
    }
}

#[test]
fn adversarial_inputs() {
    let parser = parser();
    let long_tuple = format!("[{}]", "x ".repeat(5000));
    let deep_quotes = "'\"".repeat(500);
    let escapes = "\\".repeat(1001);
    let nested = "[".repeat(200);
    let closes = "]".repeat(200);
    let chain = "subcommand another ".repeat(50);
    for input in [
        long_tuple.as_str(),
        deep_quotes.as_str(),
        escapes.as_str(),
        nested.as_str(),
        closes.as_str(),
        chain.as_str(),
        "-- ",
        "--",
        "=",
        "-=",
        "subcommand -- another",
        "\u{0}\u{7f}",
    ] {
        let outcome = parser.parse(input);
        assert_resolves(&outcome, input);
        assert_spans_match_text(input);
    }
}
