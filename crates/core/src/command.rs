//! Declaration API: commands, their arguments, and their subcommands.
//!
//! A [`Command`] tree is immutable once built. All per-parse state lives in
//! the parse session, so one tree can serve any number of parses.

use crate::config::{ConfigError, ParserConfig, TupleChars};
use crate::types::ValueType;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Errors found while validating a command tree declaration.
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// Two arguments of the same command share a name or short character.
    #[error("duplicate argument identifier '{name}' in command '{command}'")]
    DuplicateArgument {
        /// Command that declares both arguments.
        command: String,
        /// The identifier used twice.
        name: String,
    },

    /// Two subcommands of the same command share a name.
    #[error("duplicate subcommand name '{name}' in command '{command}'")]
    DuplicateCommand {
        /// Parent command.
        command: String,
        /// The name used twice.
        name: String,
    },

    /// A command or argument name cannot be tokenized as written.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The offending name.
        name: String,
        /// Why it is invalid.
        reason: &'static str,
    },

    /// A positional argument whose value type accepts no values.
    #[error("positional argument '{argument}' in command '{command}' must accept at least one value")]
    PositionalWithoutValues {
        /// Command declaring the argument.
        command: String,
        /// The argument.
        argument: String,
    },

    /// A value type composed from parts that cannot work together.
    #[error("invalid value type: {0}")]
    InvalidValueType(String),

    /// The effective prefix/tuple settings of a command are invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A declared argument.
#[derive(Debug, Clone)]
pub struct Argument {
    names: Vec<String>,
    short: Option<char>,
    value_type: Arc<dyn ValueType>,
    positional: bool,
    obligatory: bool,
}

impl Argument {
    /// Declare an argument named `name` whose values are converted by `value_type`.
    pub fn new(name: impl Into<String>, value_type: impl ValueType + 'static) -> Self {
        Self::with_shared_type(name, Arc::new(value_type))
    }

    /// Like [`Argument::new`], for a converter that is already shared.
    pub fn with_shared_type(name: impl Into<String>, value_type: Arc<dyn ValueType>) -> Self {
        Self {
            names: vec![name.into()],
            short: None,
            value_type,
            positional: false,
            obligatory: false,
        }
    }

    /// Add another long name.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Set the short character, usable alone (`-s`) or clustered (`-cs`).
    pub fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    /// Allow the argument to be given as bare values, in declaration order.
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    /// Require the argument to appear at least once.
    pub fn obligatory(mut self) -> Self {
        self.obligatory = true;
        self
    }

    /// Primary name; the key of this argument's value in parse results.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// All long names, primary first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The short character, if any.
    pub fn short_char(&self) -> Option<char> {
        self.short
    }

    /// The converter for this argument's values.
    pub fn value_type(&self) -> &dyn ValueType {
        self.value_type.as_ref()
    }

    /// Whether bare values may fill this argument.
    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Whether the argument must appear.
    pub fn is_obligatory(&self) -> bool {
        self.obligatory
    }

    /// Characters this argument answers to inside a short-flag cluster: the
    /// short character and any single-character name.
    fn cluster_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.short.into_iter().chain(self.names.iter().filter_map(|n| {
            let mut chars = n.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }))
    }

    /// Whether `word` names this argument with one or two prefix characters.
    pub(crate) fn matches_word(&self, word: &str, prefix: char) -> bool {
        let Some(rest) = word.strip_prefix(prefix) else {
            return false;
        };
        let bare = rest.strip_prefix(prefix);
        let is_match = |candidate: &str| Some(candidate) == bare || candidate == rest;
        self.names.iter().any(|n| is_match(n))
            || self
                .short
                .is_some_and(|c| is_match(c.encode_utf8(&mut [0; 4])))
    }

    pub(crate) fn matches_char(&self, c: char) -> bool {
        self.cluster_chars().any(|own| own == c)
    }

    /// Every identifier this argument claims, for uniqueness checks.
    fn identifiers(&self) -> impl Iterator<Item = String> + '_ {
        self.names
            .iter()
            .cloned()
            .chain(self.short.map(String::from))
    }
}

/// One level of the command tree.
#[derive(Debug, Clone)]
pub struct Command {
    names: Vec<String>,
    arguments: Vec<Argument>,
    subcommands: Vec<Command>,
    prefix: Option<char>,
    tuple: Option<TupleChars>,
}

impl Command {
    /// Declare a command named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            arguments: Vec::new(),
            subcommands: Vec::new(),
            prefix: None,
            tuple: None,
        }
    }

    /// Add another name the command can be invoked by.
    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Add an argument.
    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Add a subcommand.
    pub fn subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
        self
    }

    /// Override the argument-name prefix for this command and its subcommands.
    pub fn prefix(mut self, prefix: char) -> Self {
        self.prefix = Some(prefix);
        self
    }

    /// Override the tuple delimiters for this command and its subcommands.
    pub fn tuple_chars(mut self, tuple: TupleChars) -> Self {
        self.tuple = Some(tuple);
        self
    }

    /// Primary name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    /// All names, primary first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Declared arguments, in declaration order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Declared subcommands, in declaration order.
    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    /// Whether `name` is one of this command's names.
    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Settings in effect for this command, given those of its parent.
    pub(crate) fn effective_config(&self, inherited: ParserConfig) -> ParserConfig {
        ParserConfig {
            prefix: self.prefix.unwrap_or(inherited.prefix),
            tuple: self.tuple.unwrap_or(inherited.tuple),
        }
    }

    pub(crate) fn find_subcommand(&self, word: &str) -> Option<usize> {
        self.subcommands.iter().position(|c| c.has_name(word))
    }

    pub(crate) fn argument_by_word(&self, word: &str, prefix: char) -> Option<usize> {
        if word.chars().count() < 2 {
            return None;
        }
        self.arguments
            .iter()
            .position(|a| a.matches_word(word, prefix))
    }

    pub(crate) fn argument_by_char(&self, c: char) -> Option<usize> {
        self.arguments.iter().position(|a| a.matches_char(c))
    }

    /// Validate this command and all its descendants against `config`.
    pub fn validate(&self, config: ParserConfig) -> Result<(), DeclarationError> {
        let config = self.effective_config(config);
        config.validate()?;

        for name in &self.names {
            check_name(name, config)?;
        }

        let mut seen = HashSet::new();
        for arg in &self.arguments {
            for name in &arg.names {
                check_name(name, config)?;
            }
            if let Some(c) = arg.short {
                check_name(c.encode_utf8(&mut [0; 4]), config)?;
            }
            for id in arg.identifiers() {
                if !seen.insert(id.clone()) {
                    return Err(DeclarationError::DuplicateArgument {
                        command: self.name().to_string(),
                        name: id,
                    });
                }
            }
            if arg.positional && arg.value_type.value_count().max() == Some(0) {
                return Err(DeclarationError::PositionalWithoutValues {
                    command: self.name().to_string(),
                    argument: arg.name().to_string(),
                });
            }
        }

        let mut sub_names = HashSet::new();
        for sub in &self.subcommands {
            for name in &sub.names {
                if !sub_names.insert(name.as_str()) {
                    return Err(DeclarationError::DuplicateCommand {
                        command: self.name().to_string(),
                        name: name.clone(),
                    });
                }
            }
            sub.validate(config)?;
        }
        Ok(())
    }
}

fn check_name(name: &str, config: ParserConfig) -> Result<(), DeclarationError> {
    let reason = if name.is_empty() {
        "names cannot be empty"
    } else if name.starts_with(config.prefix) {
        "names cannot start with the argument prefix"
    } else if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '='))
    {
        "names cannot contain whitespace, quotes, backslashes, or '='"
    } else if name.contains(config.tuple.open) || name.contains(config.tuple.close) {
        "names cannot contain tuple delimiters"
    } else if name.contains('.') {
        "names cannot contain '.', which separates result paths"
    } else {
        return Ok(());
    };
    Err(DeclarationError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
