use super::diag::{Anchor, Diagnostic, TokenRange, codes};
use super::lexer::{NodeTokens, TokKind, Token};
use super::messages::diagnostic;
use crate::command::Command;
use crate::config::TupleChars;
use crate::parsed::NodeValues;
use crate::types::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Match the tokens of every node in the chain against its command.
///
/// `nodes` must come from tokenizing against `root`. Matcher diagnostics are
/// appended to `diagnostics`.
pub fn match_chain(
    root: &Command,
    nodes: &[NodeTokens],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<NodeValues> {
    let mut values = Vec::with_capacity(nodes.len());
    let mut command = Some(root);
    for (index, node) in nodes.iter().enumerate() {
        let Some(current) = command else { break };
        let matched = Matcher::new(current, node, index).run();
        debug!(
            node = index,
            command = current.name(),
            values = matched.values.values.len(),
            diagnostics = matched.diagnostics.len(),
            "matched command node"
        );
        diagnostics.extend(matched.diagnostics);
        values.push(matched.values);
        command = node.child.and_then(|child| current.subcommands().get(child));
    }
    values
}

struct Matched {
    values: NodeValues,
    diagnostics: Vec<Diagnostic>,
}

/// Raw values gathered for one use of an argument.
struct Group<'a> {
    raw: Vec<&'a str>,
    /// Tokens the values came from, tuple delimiters included.
    range: TokenRange,
}

impl Group<'_> {
    fn empty(at: usize) -> Self {
        Self {
            raw: Vec::new(),
            range: TokenRange::at(at),
        }
    }
}

struct Matcher<'a> {
    command: &'a Command,
    tokens: &'a [Token],
    prefix: char,
    tuple: TupleChars,
    node: usize,
    pos: usize,
    /// How many times each argument was used, by declaration index.
    uses: Vec<usize>,
    values: BTreeMap<String, Value>,
    forward: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Matcher<'a> {
    fn new(command: &'a Command, node: &'a NodeTokens, index: usize) -> Self {
        Self {
            command,
            tokens: &node.tokens,
            prefix: node.config.prefix,
            tuple: node.config.tuple,
            node: index,
            pos: 0,
            uses: vec![0; command.arguments().len()],
            values: BTreeMap::new(),
            forward: None,
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> Matched {
        let tokens = self.tokens;
        while let Some(token) = tokens.get(self.pos) {
            match token.kind {
                TokKind::ArgumentName => self.named(token),
                TokKind::ArgumentNameList => self.cluster(token),
                TokKind::ArgumentValue | TokKind::TupleStart => self.positional(),
                TokKind::ForwardValue => {
                    self.forward = Some(token.text.clone());
                    self.pos += 1;
                }
                TokKind::TupleEnd => {
                    self.unmatched(TokenRange::single(self.pos));
                    self.pos += 1;
                }
                TokKind::Command => break,
            }
        }

        // Missing obligatory arguments point just before the subcommand name,
        // or at the end of this node's tokens.
        self.check_obligatory(self.pos);
        self.fill_defaults();

        Matched {
            values: NodeValues {
                command: self.command.name().to_string(),
                values: self.values,
                forward: self.forward,
            },
            diagnostics: self.diagnostics,
        }
    }

    fn named(&mut self, token: &'a Token) {
        let name_pos = self.pos;
        self.pos += 1;
        match self.command.argument_by_word(&token.text, self.prefix) {
            Some(index) => {
                let group = self.collect(index);
                self.apply(index, Some(name_pos), group);
            }
            None => self.unmatched(TokenRange::single(name_pos)),
        }
    }

    /// `-abc`: every flag but the last gets no values; the last one may take
    /// values like a single name would.
    fn cluster(&mut self, token: &'a Token) {
        let name_pos = self.pos;
        self.pos += 1;
        let indices: Vec<usize> = token
            .text
            .chars()
            .skip(1)
            .filter_map(|c| self.command.argument_by_char(c))
            .collect();
        let Some((&last, leading)) = indices.split_last() else {
            self.unmatched(TokenRange::single(name_pos));
            return;
        };
        for &index in leading {
            self.apply(index, Some(name_pos), Group::empty(name_pos + 1));
        }
        let group = self.collect(last);
        self.apply(last, Some(name_pos), group);
    }

    /// Bare values go to the first positional argument not used yet.
    fn positional(&mut self) {
        let start = self.pos;
        let next = self
            .command
            .arguments()
            .iter()
            .enumerate()
            .find(|(i, a)| a.is_positional() && self.uses[*i] == 0)
            .map(|(i, _)| i);
        match next {
            Some(index) => {
                let group = self.collect(index);
                if self.pos == start {
                    self.pos += 1;
                }
                self.apply(index, None, group);
            }
            None => {
                let end = self.skip_group();
                self.unmatched(TokenRange::new(start, end));
            }
        }
    }

    /// Gather the values following the current position: a whole tuple if one
    /// starts here, otherwise bare values up to the argument's maximum.
    fn collect(&mut self, index: usize) -> Group<'a> {
        let tokens = self.tokens;
        let start = self.pos;
        let mut raw = Vec::new();
        let mut end = start;

        if tokens
            .get(start)
            .is_some_and(|t| t.kind == TokKind::TupleStart)
        {
            end += 1;
            while let Some(t) = tokens.get(end) {
                match t.kind {
                    TokKind::ArgumentValue => {
                        raw.push(t.text.as_str());
                        end += 1;
                    }
                    TokKind::TupleEnd => {
                        end += 1;
                        break;
                    }
                    _ => break,
                }
            }
        } else {
            let max = self.command.arguments()[index]
                .value_type()
                .value_count()
                .max()
                .unwrap_or(usize::MAX);
            while raw.len() < max {
                match tokens.get(end) {
                    Some(t) if t.kind == TokKind::ArgumentValue => {
                        raw.push(t.text.as_str());
                        end += 1;
                    }
                    _ => break,
                }
            }
        }

        self.pos = end;
        Group {
            raw,
            range: TokenRange::new(start, end),
        }
    }

    fn skip_group(&mut self) -> usize {
        let tokens = self.tokens;
        if tokens
            .get(self.pos)
            .is_some_and(|t| t.kind == TokKind::TupleStart)
        {
            self.pos += 1;
            while let Some(t) = tokens.get(self.pos) {
                self.pos += 1;
                if t.kind == TokKind::TupleEnd {
                    break;
                }
            }
        } else {
            self.pos += 1;
        }
        self.pos
    }

    /// Record one use of argument `index` with the values in `group`.
    fn apply(&mut self, index: usize, name_pos: Option<usize>, group: Group<'a>) {
        let command = self.command;
        let argument = &command.arguments()[index];
        let value_type = argument.value_type();
        let name = argument.name();

        let use_range = match name_pos {
            Some(pos) if group.range.is_empty() => TokenRange::at(pos + 1),
            Some(pos) => TokenRange::new(pos, group.range.end),
            None => group.range,
        };

        self.uses[index] += 1;
        if self.uses[index] > 1 && !value_type.allows_repeats() {
            let at = name_pos.map_or(group.range, TokenRange::single);
            self.push(
                codes::ARGUMENT_REPEATED,
                "default",
                &[("argument", name.to_string())],
                at,
            );
            return;
        }

        let count = value_type.value_count();
        if !count.contains(group.raw.len()) {
            self.push(
                codes::INCORRECT_VALUE_COUNT,
                "default",
                &[
                    ("argument", name.to_string()),
                    ("expected", count.describe()),
                    ("received", group.raw.len().to_string()),
                ],
                use_range,
            );
            return;
        }

        match value_type.convert(&group.raw) {
            Ok(value) => {
                let merged = match self.values.remove(name) {
                    Some(previous) => value_type.accumulate(previous, value),
                    None => value,
                };
                self.values.insert(name.to_string(), merged);
            }
            Err(err) => {
                let at = if group.range.is_empty() {
                    use_range
                } else {
                    group.range
                };
                for reason in err.messages() {
                    self.push(
                        codes::INVALID_VALUE,
                        "default",
                        &[("argument", name.to_string()), ("reason", reason.clone())],
                        at,
                    );
                }
            }
        }
    }

    fn unmatched(&mut self, range: TokenRange) {
        let text = self.tokens[range.start..range.end.min(self.tokens.len())]
            .iter()
            .map(|t| t.display_text(self.tuple))
            .collect::<Vec<_>>()
            .join(" ");
        self.push(
            codes::UNMATCHED_TOKEN,
            "default",
            &[("token", text)],
            range,
        );
    }

    fn check_obligatory(&mut self, at: usize) {
        let command = self.command;
        for (index, argument) in command.arguments().iter().enumerate() {
            if !argument.is_obligatory() || self.uses[index] > 0 {
                continue;
            }
            let name = argument.name().to_string();
            if self.node == 0 {
                self.push(
                    codes::OBLIGATORY_ARGUMENT_MISSING,
                    "root",
                    &[("argument", name)],
                    TokenRange::at(at),
                );
            } else {
                self.push(
                    codes::OBLIGATORY_ARGUMENT_MISSING,
                    "subcommand",
                    &[("argument", name), ("command", command.name().to_string())],
                    TokenRange::at(at),
                );
            }
        }
    }

    fn fill_defaults(&mut self) {
        for (index, argument) in self.command.arguments().iter().enumerate() {
            if self.uses[index] > 0 {
                continue;
            }
            if let Some(default) = argument.value_type().default_value() {
                self.values.insert(argument.name().to_string(), default);
            }
        }
    }

    fn push(
        &mut self,
        id: &'static str,
        variant: &str,
        substitutions: &[(&str, String)],
        range: TokenRange,
    ) {
        self.diagnostics.push(diagnostic(
            id,
            variant,
            substitutions,
            Anchor::new(self.node, range),
        ));
    }
}
