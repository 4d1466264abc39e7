/// Maps diagnostic anchors back onto the original input.
pub mod context;
/// Re-exports from the diagnostics crate.
pub mod diag;
/// JSON serialization helpers for parse results.
pub mod dump;
/// Tokenizer: splits each command node's input into classified tokens.
pub mod lexer;
/// Matcher: assigns tokens to arguments and converts their values.
pub mod matcher;
pub(crate) mod messages;
/// Parse entry point and diagnostic aggregation.
pub mod parser;
