use super::diag::{Anchor, Diagnostic, Span, TokenRange, codes};
use super::messages::diagnostic;
use crate::command::Command;
use crate::config::{ParserConfig, TupleChars};
use serde::Serialize;
use std::borrow::Cow;
use tracing::{debug, trace};

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokKind {
    /// A declared argument name written with its prefix (`--name`, `-n`).
    ArgumentName,
    /// Clustered short flags (`-abc`).
    ArgumentNameList,
    /// A subcommand name. Always the last token of its node.
    Command,
    /// A plain value.
    ArgumentValue,
    /// The tuple-open character.
    TupleStart,
    /// The tuple-close character.
    TupleEnd,
    /// Everything after a `-- ` marker, verbatim.
    ForwardValue,
}

/// A classified unit of input.
///
/// `text` is the token's content after unescaping and quote removal; `span`
/// covers the raw characters it came from, relative to the start of its
/// node's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// The classification of this token.
    pub kind: TokKind,
    /// Token content.
    pub text: String,
    /// Raw extent in the node's input.
    pub span: Span,
}

impl Token {
    /// Text used when reconstructing a command line for display. Values are
    /// written so that they re-tokenize to the same single value: quotes,
    /// backslashes, and the node's tuple delimiters are escaped, and values
    /// that are empty or contain spaces are quoted.
    pub fn display_text(&self, tuple: TupleChars) -> Cow<'_, str> {
        if self.kind != TokKind::ArgumentValue {
            return Cow::Borrowed(&self.text);
        }
        let needs_escape =
            |c: char| matches!(c, '\\' | '"' | '\'') || c == tuple.open || c == tuple.close;
        let needs_quotes = self.text.is_empty() || self.text.contains(' ');
        if !needs_quotes && !self.text.contains(needs_escape) {
            return Cow::Borrowed(&self.text);
        }

        let mut out = String::with_capacity(self.text.len() + 2);
        if needs_quotes {
            out.push('\'');
        }
        for c in self.text.chars() {
            if needs_escape(c) {
                out.push('\\');
            }
            out.push(c);
        }
        if needs_quotes {
            out.push('\'');
        }
        Cow::Owned(out)
    }
}

/// The tokens of one command node of the activation chain.
#[derive(Debug, Clone, Serialize)]
pub struct NodeTokens {
    /// Primary name of the command this node belongs to.
    pub command: String,
    /// Byte offset of this node's input within its parent's input. The root's
    /// offset is 0.
    pub offset: usize,
    /// Byte length of this node's input.
    pub len: usize,
    /// Prefix and tuple delimiters in effect for this node.
    pub config: ParserConfig,
    /// Tokens in input order.
    pub tokens: Vec<Token>,
    /// Index (among the command's subcommands) of the subcommand this node
    /// forwarded the rest of its input to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child: Option<usize>,
}

/// Token lists for every node of an activation chain, root first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenizedChain {
    /// One entry per activated command node.
    pub nodes: Vec<NodeTokens>,
    /// Tokenizer diagnostics from every node.
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenize `input` against `root`, following subcommand names down the tree.
///
/// Each node only sees the suffix of the input that follows its own command
/// name; the first subcommand name a node recognizes ends that node's scan
/// and hands the remainder to the subcommand.
pub fn tokenize(root: &Command, config: ParserConfig, input: &str) -> TokenizedChain {
    let mut chain = TokenizedChain::default();
    tokenize_node(root, root.effective_config(config), input, 0, &mut chain);
    chain
}

fn tokenize_node(
    command: &Command,
    config: ParserConfig,
    input: &str,
    offset: usize,
    chain: &mut TokenizedChain,
) {
    let node = chain.nodes.len();
    let scan = Scanner::new(command, config, input, node).run();
    debug!(
        node,
        command = command.name(),
        tokens = scan.tokens.len(),
        forwarded = scan.forward.is_some(),
        "tokenized command node"
    );

    chain.diagnostics.extend(scan.diagnostics);
    chain.nodes.push(NodeTokens {
        command: command.name().to_string(),
        offset,
        len: input.len(),
        config,
        tokens: scan.tokens,
        child: scan.forward.map(|f| f.child),
    });

    if let Some(Forward { child, at }) = scan.forward {
        let sub = &command.subcommands()[child];
        tokenize_node(sub, sub.effective_config(config), &input[at..], at, chain);
    }
}

#[derive(Debug, Clone, Copy)]
struct Forward {
    /// Subcommand index.
    child: usize,
    /// Byte offset where the subcommand's input starts.
    at: usize,
}

struct Scan {
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    forward: Option<Forward>,
}

/// Per-node scan state. Created fresh for every node of every parse.
struct Scanner<'a> {
    command: &'a Command,
    config: ParserConfig,
    input: &'a str,
    node: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    /// Content of the token being built.
    buf: String,
    /// Where the token being built started; `Some` while a token is pending,
    /// even if `buf` is still empty (after an opening quote, for instance).
    buf_start: Option<usize>,
    tuple_open: bool,
    /// The quote character of the open string, if any.
    quote: Option<char>,
    forward: Option<Forward>,
}

impl<'a> Scanner<'a> {
    fn new(command: &'a Command, config: ParserConfig, input: &'a str, node: usize) -> Self {
        Self {
            command,
            config,
            input,
            node,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            buf: String::new(),
            buf_start: None,
            tuple_open: false,
            quote: None,
            forward: None,
        }
    }

    fn run(mut self) -> Scan {
        let mut failure: Option<&'static str> = None;
        // Where scanning stopped; a pending word ends here.
        let mut stop = self.input.len();
        let mut chars = self.input.char_indices();

        while let Some((i, c)) = chars.next() {
            if c == '\\' {
                self.begin(i);
                // A trailing backslash has nothing to escape and is kept as is.
                self.buf.push(chars.next().map_or('\\', |(_, escaped)| escaped));
                continue;
            }

            if matches!(c, '"' | '\'') {
                match self.quote {
                    Some(open) if open == c => {
                        self.quote = None;
                        self.emit_value(i + c.len_utf8());
                    }
                    Some(_) => self.buf.push(c),
                    None => {
                        self.begin(i);
                        self.quote = Some(c);
                    }
                }
                continue;
            }

            if self.quote.is_some() {
                self.buf.push(c);
                continue;
            }

            if c == self.config.tuple.open {
                if self.tuple_open {
                    failure = Some(codes::TUPLE_ALREADY_OPEN);
                    stop = i;
                    break;
                }
                if self.flush_word(i, true) {
                    break;
                }
                self.push_delimiter(TokKind::TupleStart, c, i);
                self.tuple_open = true;
                continue;
            }

            if c == self.config.tuple.close {
                if !self.tuple_open {
                    failure = Some(codes::UNEXPECTED_TUPLE_CLOSE);
                    stop = i;
                    break;
                }
                if self.buf_start.is_some() {
                    self.emit_value(i);
                }
                self.push_delimiter(TokKind::TupleEnd, c, i);
                self.tuple_open = false;
                continue;
            }

            if c == '-' && !self.tuple_open && self.input[i..].starts_with("-- ") {
                if self.flush_word(i, true) {
                    break;
                }
                let rest = i + 3;
                self.push(
                    TokKind::ForwardValue,
                    self.input[rest..].to_string(),
                    Span::new(rest, self.input.len()),
                );
                break;
            }

            let separates = (c == ' ' && self.buf_start.is_some())
                || (c == '=' && !self.tuple_open && self.is_argument_specifier(&self.buf));
            if separates {
                if self.flush_word(i, true) {
                    break;
                }
                continue;
            }

            if c != ' ' {
                self.begin(i);
                self.buf.push(c);
            }
        }

        if self.forward.is_none() {
            if failure.is_none() {
                if self.tuple_open {
                    failure = Some(codes::TUPLE_NOT_CLOSED);
                } else if self.quote.is_some() {
                    failure = Some(codes::STRING_NOT_CLOSED);
                }
            }

            // After an error the node stops here: a pending subcommand name is
            // kept as a plain value instead of activating the subcommand.
            self.flush_word(stop, failure.is_none());

            if let Some(id) = failure {
                let at = TokenRange::at(self.tokens.len());
                self.diagnostics
                    .push(diagnostic(id, "default", &[], Anchor::new(self.node, at)));
            }
        }

        Scan {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
            forward: self.forward,
        }
    }

    fn begin(&mut self, at: usize) {
        if self.buf_start.is_none() {
            self.buf_start = Some(at);
        }
    }

    fn push(&mut self, kind: TokKind, text: String, span: Span) {
        trace!(node = self.node, ?kind, text = %text, "token");
        self.tokens.push(Token { kind, text, span });
    }

    fn push_delimiter(&mut self, kind: TokKind, c: char, at: usize) {
        self.push(kind, c.to_string(), Span::new(at, at + c.len_utf8()));
    }

    /// Push the pending buffer as a value, without classifying it.
    fn emit_value(&mut self, end: usize) {
        let start = self.buf_start.take().unwrap_or(end);
        let text = std::mem::take(&mut self.buf);
        self.push(TokKind::ArgumentValue, text, Span::new(start, end));
    }

    /// Classify and push the pending buffer, if any. Returns `true` when the
    /// word was a subcommand name and the rest of the input was forwarded.
    fn flush_word(&mut self, end: usize, allow_forward: bool) -> bool {
        let Some(start) = self.buf_start.take() else {
            return false;
        };
        let word = std::mem::take(&mut self.buf);
        let span = Span::new(start, end);

        match self.classify(&word) {
            TokKind::Command if allow_forward => {
                self.forward = self
                    .command
                    .find_subcommand(&word)
                    .map(|child| Forward { child, at: end });
                self.push(TokKind::Command, word, span);
                true
            }
            TokKind::Command => {
                self.push(TokKind::ArgumentValue, word, span);
                false
            }
            kind => {
                self.push(kind, word, span);
                false
            }
        }
    }

    fn classify(&self, word: &str) -> TokKind {
        if self.tuple_open || self.quote.is_some() {
            TokKind::ArgumentValue
        } else if self
            .command
            .argument_by_word(word, self.config.prefix)
            .is_some()
        {
            TokKind::ArgumentName
        } else if self.is_name_list(word) {
            TokKind::ArgumentNameList
        } else if self.command.find_subcommand(word).is_some() {
            TokKind::Command
        } else {
            TokKind::ArgumentValue
        }
    }

    /// `-abc` where every character after the prefix is a short flag here.
    fn is_name_list(&self, word: &str) -> bool {
        let mut chars = word.chars();
        if chars.next() != Some(self.config.prefix) {
            return false;
        }
        let flags = chars.as_str();
        !flags.is_empty()
            && flags
                .chars()
                .all(|c| self.command.argument_by_char(c).is_some())
    }

    fn is_argument_specifier(&self, word: &str) -> bool {
        self.command
            .argument_by_word(word, self.config.prefix)
            .is_some()
            || self.is_name_list(word)
    }
}
