//! Diagnostics for argtree.
//!
//! Provides [`Diagnostic`], [`Severity`], [`Anchor`], [`TokenRange`], and
//! [`Span`] types used to report errors and warnings from the tokenizer and
//! matcher. Diagnostic codes are defined in the [`codes`] module.
//!
//! A diagnostic is anchored to a token range *local* to one command node of
//! the activation chain. Translating that anchor into a position in the
//! original input is the job of the parser's error context, so absolute
//! positions are never stored here.

#![warn(missing_docs)]

/// Diagnostic ID constants auto-generated from the catalog.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error — the parse fails.
    Error,
    /// Warning — reported alongside a successful parse.
    Warn,
}

/// Byte span in the original input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Returns `true` for zero-width spans.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shift both ends by `offset`.
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// Half-open range of token indices, `[start, end)`.
///
/// An empty range (`start == end`) is a pointer *between* tokens: it sits
/// immediately after token `start - 1` and before token `start`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenRange {
    /// Index of the first token covered.
    pub start: usize,
    /// Index one past the last token covered.
    pub end: usize,
}

impl TokenRange {
    /// Create a range covering tokens `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "TokenRange end ({end}) < start ({start})");
        Self { start, end }
    }

    /// A zero-width pointer placed before token `index`.
    pub fn at(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    /// A range covering exactly one token.
    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index + 1,
        }
    }

    /// Returns `true` when the range covers no tokens.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of tokens covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Shift both ends by `offset`.
    pub fn shifted(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// Where a diagnostic points: a command node of the activation chain and a
/// token range within that node's own token list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Anchor {
    /// Index of the command node in the activation chain (root is 0).
    pub node: usize,
    /// Token range local to that node.
    pub tokens: TokenRange,
}

impl Anchor {
    /// Create an anchor in `node` covering `tokens`.
    pub fn new(node: usize, tokens: TokenRange) -> Self {
        Self { node, tokens }
    }
}

/// A diagnostic message produced by the tokenizer or matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"ARG2001"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Node-local position this diagnostic relates to.
    pub anchor: Anchor,
    /// Machine-readable context for tooling. Keys and values are free-form strings.
    /// Absent when no context is applicable. Serialized only when present.
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        anchor: Anchor,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            anchor,
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        anchor: Anchor,
    ) -> Self {
        Self::new(id, Severity::Error, message, anchor)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        anchor: Anchor,
    ) -> Self {
        Self::new(id, Severity::Warn, message, anchor)
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Returns `true` for `Error` severity.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Default severity declared in the catalog for a diagnostic code.
pub fn severity_for_code(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

/// Message template for a diagnostic code and variant (e.g. `"default"`).
pub fn message_template_for(id: &str, variant: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_templates.rs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor() -> Anchor {
        Anchor::new(0, TokenRange::single(0))
    }

    // ── Span / TokenRange ───────────────────────────────────────────────

    #[test]
    fn span_empty_and_shift() {
        let s = Span::empty(7);
        assert!(s.is_empty());
        assert_eq!(Span::new(2, 5).shifted(10), Span::new(12, 15));
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    #[test]
    fn token_range_constructors() {
        assert!(TokenRange::at(3).is_empty());
        assert_eq!(TokenRange::single(3), TokenRange::new(3, 4));
        assert_eq!(TokenRange::new(1, 4).len(), 3);
        assert_eq!(TokenRange::new(1, 2).shifted(5), TokenRange::new(6, 7));
    }

    #[test]
    #[should_panic(expected = "TokenRange end (0) < start (2)")]
    fn token_range_inverted_panics() {
        TokenRange::new(2, 0);
    }

    // ── Diagnostic ──────────────────────────────────────────────────────

    #[test]
    fn diagnostic_constructors() {
        let e = Diagnostic::error(codes::INCORRECT_VALUE_COUNT, "too many", anchor());
        assert_eq!(e.id, "ARG2001");
        assert!(e.is_error());
        let w = Diagnostic::warn(codes::UNMATCHED_TOKEN, "stray", anchor());
        assert_eq!(w.severity, Severity::Warn);
        assert!(!w.is_error());
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::error(codes::TUPLE_NOT_CLOSED, "Tuple not closed.", anchor());
        assert_eq!(format!("{d}"), "error[ARG1003]: Tuple not closed.");
    }

    #[test]
    fn catalog_severities_match_codes() {
        assert_eq!(
            severity_for_code(codes::UNMATCHED_TOKEN),
            Some(Severity::Warn)
        );
        for code in [
            codes::TUPLE_ALREADY_OPEN,
            codes::UNEXPECTED_TUPLE_CLOSE,
            codes::TUPLE_NOT_CLOSED,
            codes::STRING_NOT_CLOSED,
            codes::INCORRECT_VALUE_COUNT,
            codes::OBLIGATORY_ARGUMENT_MISSING,
            codes::INVALID_VALUE,
            codes::ARGUMENT_REPEATED,
        ] {
            assert_eq!(severity_for_code(code), Some(Severity::Error), "{code}");
            assert!(explain(code).is_some(), "{code} has no explanation");
        }
        assert!(severity_for_code("NOPE").is_none());
    }

    #[test]
    fn templates_by_variant() {
        assert_eq!(
            message_template_for(codes::OBLIGATORY_ARGUMENT_MISSING, "root"),
            Some("Obligatory argument '{argument}' not used.")
        );
        assert!(
            message_template_for(codes::OBLIGATORY_ARGUMENT_MISSING, "subcommand")
                .unwrap()
                .contains("for command '{command}'")
        );
        assert!(message_template_for(codes::TUPLE_NOT_CLOSED, "missing").is_none());
    }

    #[test]
    fn diagnostic_serde_roundtrip_with_context() {
        let d = Diagnostic::error(codes::INVALID_VALUE, "bad", anchor()).with_context(
            BTreeMap::from([
                ("z_reason".into(), "bad".into()),
                ("argument".into(), "number".into()),
            ]),
        );
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.find("argument").unwrap() < json.find("z_reason").unwrap());
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn diagnostic_serde_omits_none_context() {
        let d = Diagnostic::warn(codes::UNMATCHED_TOKEN, "x", anchor());
        let json = serde_json::to_string(&d).unwrap();
        assert!(!json.contains("context"), "{json}");
        assert!(json.contains("\"severity\":\"warn\""), "{json}");
    }
}
