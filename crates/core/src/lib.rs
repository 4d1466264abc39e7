//! argtree core library.
//!
//! Parses command lines against a declared tree of commands, arguments, and
//! subcommands. [`Parser::parse`] tokenizes the input node by node down the
//! activated subcommand chain, matches each node's tokens against its
//! arguments, and collects every diagnostic of the whole chain. Diagnostics
//! point at node-local token ranges; [`ErrorContext`] resolves them against
//! the original input.

#![warn(missing_docs)]

/// Declaration API: commands and arguments.
pub mod command;
/// Parser configuration.
pub mod config;
/// Tokenizer, matcher, error context, and the parse entry point.
pub mod grammar;
/// Parse results.
pub mod parsed;
/// JSON tree definitions.
pub mod tree;
/// Value types and converted values.
pub mod types;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Declaration
pub use command::{Argument, Command, DeclarationError};
pub use config::{ConfigError, ParserConfig, TupleChars, load_config_from_str};
pub use types::{ConvertError, Value, ValueCount, ValueType};

// Parsing
pub use grammar::parser::{ParseFailure, ParseOutcome, Parser, ResolvedDiagnostic};
pub use parsed::{NodeValues, ParsedArguments};

// Tokens and positions
pub use grammar::context::{ErrorContext, TokenView};
pub use grammar::lexer::{NodeTokens, TokKind, Token, TokenizedChain, tokenize};

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Anchor, Diagnostic, Severity, Span, TokenRange, codes, explain};

// Tree definitions
pub use tree::{TreeError, TreeSpec, load_tree_from_str};

// Serialization helpers
pub use grammar::dump::to_pretty_json;
