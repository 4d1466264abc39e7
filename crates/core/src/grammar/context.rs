//! Resolution of node-local diagnostic anchors against the whole input.
//!
//! Every diagnostic is recorded relative to the command node that produced
//! it: a node index plus a token range within that node. [`ErrorContext`]
//! turns such an anchor into something a user can look at, either as a
//! character span of the original input or as a highlighted view of the full
//! token list.

use super::diag::{Anchor, Span, TokenRange};
use super::lexer::NodeTokens;
use serde::Serialize;
use std::fmt;

/// Marker inserted in a [`TokenView`] line for anchors that point between
/// tokens.
pub const INSERTION_MARKER: &str = "<-";

/// Read-only view of one parse's token chain, used to position diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ErrorContext<'a> {
    nodes: &'a [NodeTokens],
}

impl<'a> ErrorContext<'a> {
    /// Wrap the token chain of a parse.
    pub fn new(nodes: &'a [NodeTokens]) -> Self {
        Self { nodes }
    }

    /// Byte offset where `node`'s input starts in the original input.
    pub fn node_offset(&self, node: usize) -> usize {
        self.nodes.iter().take(node + 1).map(|n| n.offset).sum()
    }

    /// Number of tokens in the nodes before `node`.
    pub fn token_offset(&self, node: usize) -> usize {
        self.nodes.iter().take(node).map(|n| n.tokens.len()).sum()
    }

    /// Character span of `anchor` in the original input.
    ///
    /// Zero-width anchors resolve to the end of the token before them (or the
    /// start of the node's first token when they sit at index 0). Anchors past
    /// the node's tokens resolve to the end of the node's input.
    pub fn absolute_span(&self, anchor: Anchor) -> Span {
        let Some(node) = self.nodes.get(anchor.node) else {
            let end = self
                .nodes
                .len()
                .checked_sub(1)
                .map_or(0, |last| self.node_offset(last) + self.nodes[last].len);
            return Span::empty(end);
        };
        let tokens = &node.tokens;
        let range = anchor.tokens;

        let local = if range.is_empty() {
            let pos = match range.start {
                0 => tokens.first().map_or(0, |t| t.span.start),
                k => tokens.get(k - 1).map_or(node.len, |t| t.span.end),
            };
            Span::empty(pos)
        } else {
            let start = tokens.get(range.start).map_or(node.len, |t| t.span.start);
            let end = tokens
                .get(range.end - 1)
                .map_or(node.len, |t| t.span.end)
                .max(start);
            Span::new(start, end)
        };
        local.shifted(self.node_offset(anchor.node))
    }

    /// Token range of `anchor` in the concatenated token list of every node.
    pub fn absolute_tokens(&self, anchor: Anchor) -> TokenRange {
        anchor.tokens.shifted(self.token_offset(anchor.node))
    }

    /// All tokens of the chain with `anchor` highlighted.
    pub fn token_view(&self, anchor: Anchor) -> TokenView {
        let tokens = self
            .nodes
            .iter()
            .flat_map(|n| {
                n.tokens
                    .iter()
                    .map(|t| t.display_text(n.config.tuple).into_owned())
            })
            .collect();
        TokenView {
            tokens,
            highlight: self.absolute_tokens(anchor),
        }
    }
}

/// The full token list of a parse with one range highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenView {
    tokens: Vec<String>,
    highlight: TokenRange,
}

impl TokenView {
    /// Display text of every token, in order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// The highlighted range.
    pub fn highlight(&self) -> TokenRange {
        self.highlight
    }

    /// Tokens joined by spaces. A zero-width highlight shows up as
    /// [`INSERTION_MARKER`] at its position.
    pub fn line(&self) -> String {
        if !self.highlight.is_empty() {
            return self.tokens.join(" ");
        }
        let at = self.highlight.start.min(self.tokens.len());
        let mut parts: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        parts.insert(at, INSERTION_MARKER);
        parts.join(" ")
    }

    /// Caret underline aligned with [`TokenView::line`], for non-empty
    /// highlights.
    pub fn marker(&self) -> Option<String> {
        if self.highlight.is_empty() {
            return None;
        }
        let mut marker = String::new();
        let mut column = 0usize;
        let mut first = None;
        let mut last = 0usize;
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                column += 1;
            }
            let width = token.chars().count();
            if i >= self.highlight.start && i < self.highlight.end {
                first.get_or_insert(column);
                last = column + width;
            }
            column += width;
        }
        let first = first?;
        marker.push_str(&" ".repeat(first));
        marker.push_str(&"^".repeat(last.saturating_sub(first).max(1)));
        Some(marker)
    }
}

impl fmt::Display for TokenView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line())?;
        if let Some(marker) = self.marker() {
            write!(f, "\n{marker}")?;
        }
        Ok(())
    }
}
