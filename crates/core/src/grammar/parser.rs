use super::{
    context::{ErrorContext, TokenView},
    diag::{Diagnostic, Severity, Span, TokenRange},
    lexer::{NodeTokens, tokenize},
    matcher::match_chain,
};
use crate::command::{Command, DeclarationError};
use crate::config::ParserConfig;
use crate::parsed::ParsedArguments;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, debug_span};

/// Parses command lines against a validated command tree.
///
/// The tree is borrowed, never mutated: every call to [`Parser::parse`] works
/// on fresh state, so one parser can be reused for any number of inputs.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'c> {
    root: &'c Command,
    config: ParserConfig,
}

impl<'c> Parser<'c> {
    /// Validate `root` with the default configuration.
    pub fn new(root: &'c Command) -> Result<Self, DeclarationError> {
        Self::with_config(root, ParserConfig::default())
    }

    /// Validate `root` against `config` and build a parser for it.
    pub fn with_config(root: &'c Command, config: ParserConfig) -> Result<Self, DeclarationError> {
        root.validate(config)?;
        Ok(Self { root, config })
    }

    /// The root command.
    pub fn root(&self) -> &'c Command {
        self.root
    }

    /// The tree-wide configuration.
    pub fn config(&self) -> ParserConfig {
        self.config
    }

    /// Parse a single command-line string (without the program name).
    ///
    /// The whole activation chain is always tokenized and matched, so the
    /// outcome carries every diagnostic, not just the first.
    pub fn parse(&self, input: &str) -> ParseOutcome {
        let span = debug_span!("parse", root = self.root.name(), len = input.len());
        let _enter = span.enter();

        let chain = tokenize(self.root, self.config, input);
        let nodes = chain.nodes;
        let mut diagnostics = chain.diagnostics;
        let values = match_chain(self.root, &nodes, &mut diagnostics);

        // Stable: within a node, tokenizer diagnostics stay ahead of matcher ones.
        diagnostics.sort_by_key(|d| d.anchor.node);
        let failed = diagnostics.iter().any(Diagnostic::is_error);
        debug!(
            nodes = nodes.len(),
            diagnostics = diagnostics.len(),
            failed,
            "parse finished"
        );

        ParseOutcome {
            input: input.to_string(),
            nodes,
            diagnostics,
            values: (!failed).then(|| ParsedArguments::new(values)),
        }
    }

    /// Parse already-split arguments. They are joined with single spaces, so
    /// an argument containing spaces must carry its own quotes.
    pub fn parse_args<I, S>(&self, args: I) -> ParseOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = args
            .into_iter()
            .map(|a| a.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(" ");
        self.parse(&joined)
    }
}

/// Everything a parse produced: tokens, diagnostics, and (when no error was
/// reported) the converted values.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    input: String,
    nodes: Vec<NodeTokens>,
    diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<ParsedArguments>,
}

impl ParseOutcome {
    /// Whether no error-severity diagnostic was reported.
    pub fn is_ok(&self) -> bool {
        self.values.is_some()
    }

    /// The input that was parsed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Token lists of the activated command nodes, root first.
    pub fn nodes(&self) -> &[NodeTokens] {
        &self.nodes
    }

    /// All diagnostics, ordered by node and then by the phase that produced them.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The values, present only when no error was reported.
    pub fn values(&self) -> Option<&ParsedArguments> {
        self.values.as_ref()
    }

    /// Context for positioning this outcome's diagnostics.
    pub fn error_context(&self) -> ErrorContext<'_> {
        ErrorContext::new(&self.nodes)
    }

    /// Diagnostics with their positions resolved against the whole input.
    pub fn resolved(&self) -> Vec<ResolvedDiagnostic> {
        let ctx = self.error_context();
        self.diagnostics
            .iter()
            .map(|d| ResolvedDiagnostic {
                span: ctx.absolute_span(d.anchor),
                tokens: ctx.absolute_tokens(d.anchor),
                view: ctx.token_view(d.anchor),
                diagnostic: d.clone(),
            })
            .collect()
    }

    /// The values, or every diagnostic if an error was reported.
    pub fn into_result(self) -> Result<ParsedArguments, ParseFailure> {
        match self.values {
            Some(values) => Ok(values),
            None => Err(ParseFailure {
                input: self.input,
                diagnostics: self.diagnostics,
            }),
        }
    }
}

/// A diagnostic together with its absolute positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDiagnostic {
    /// The diagnostic itself.
    pub diagnostic: Diagnostic,
    /// Character span in the original input.
    pub span: Span,
    /// Token range in the concatenated token list.
    pub tokens: TokenRange,
    /// Highlighted token list.
    pub view: TokenView,
}

/// A parse that reported at least one error.
#[derive(Debug, Clone, Error)]
#[error("parsing '{input}' failed with {} error(s)", error_count(.diagnostics))]
pub struct ParseFailure {
    /// The input that was parsed.
    pub input: String,
    /// Every diagnostic of the parse, warnings included.
    pub diagnostics: Vec<Diagnostic>,
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count()
}
