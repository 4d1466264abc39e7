//! Command trees declared in JSON.
//!
//! ```json
//! {
//!   "config": { "prefix": "-", "tuple": { "open": "[", "close": "]" } },
//!   "root": {
//!     "name": "tool",
//!     "arguments": [
//!       { "name": "verbose", "short": "v", "type": { "kind": "counter" } },
//!       { "name": "files", "type": { "kind": "strings", "min": 1, "max": 3 },
//!         "positional": true, "obligatory": true }
//!     ],
//!     "subcommands": [
//!       { "name": "env", "arguments": [
//!         { "name": "set", "type": { "kind": "key-values", "values": { "kind": "integer" } } }
//!       ] }
//!     ]
//!   }
//! }
//! ```

use crate::command::{Argument, Command, DeclarationError};
use crate::config::{ParserConfig, TupleChars};
use crate::types::{Counter, Flag, Integer, KeyValues, Strings, Text, ValueCount, ValueType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when loading a tree definition.
#[derive(Debug, Error)]
pub enum TreeError {
    /// JSON deserialization failed.
    #[error("invalid tree JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The declared tree is not valid.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
}

/// A whole tree definition: configuration plus the root command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TreeSpec {
    /// Tree-wide tokenizer settings.
    #[serde(default)]
    pub config: ParserConfig,
    /// The root command.
    pub root: CommandSpec,
}

/// One command of a tree definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CommandSpec {
    /// Primary name.
    pub name: String,
    /// Additional names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Prefix override for this command and its subcommands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<char>,
    /// Tuple delimiter override for this command and its subcommands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuple: Option<TupleChars>,
    /// Arguments, in declaration order.
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
    /// Subcommands, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSpec>,
}

/// One argument of a tree definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArgumentSpec {
    /// Primary name.
    pub name: String,
    /// Additional long names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Short character.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    /// Value type.
    #[serde(rename = "type")]
    pub value_type: TypeSpec,
    /// Whether bare values may fill the argument.
    #[serde(default)]
    pub positional: bool,
    /// Whether the argument must be used.
    #[serde(default)]
    pub obligatory: bool,
}

/// A built-in value type, selected by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeSpec {
    /// [`Flag`].
    Flag,
    /// [`Counter`].
    Counter,
    /// [`Integer`].
    Integer,
    /// [`Text`].
    Text,
    /// [`Strings`] with `min` (default 1) to `max` (unbounded when absent) values.
    Strings {
        /// Fewest values accepted.
        #[serde(default = "one")]
        min: usize,
        /// Most values accepted.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// [`KeyValues`] whose values are converted by `values`.
    KeyValues {
        /// Type of each entry's value.
        values: Box<TypeSpec>,
    },
}

fn one() -> usize {
    1
}

impl TypeSpec {
    /// Build the converter this declaration describes.
    pub fn build(&self) -> Result<Arc<dyn ValueType>, DeclarationError> {
        Ok(match self {
            TypeSpec::Flag => Arc::new(Flag),
            TypeSpec::Counter => Arc::new(Counter),
            TypeSpec::Integer => Arc::new(Integer),
            TypeSpec::Text => Arc::new(Text),
            TypeSpec::Strings { min, max } => {
                let count = match *max {
                    Some(max) if max < *min => {
                        return Err(DeclarationError::InvalidValueType(format!(
                            "strings: min ({min}) exceeds max ({max})"
                        )));
                    }
                    Some(max) => ValueCount::new(*min, max),
                    None => ValueCount::at_least(*min),
                };
                Arc::new(Strings::new(count))
            }
            TypeSpec::KeyValues { values } => Arc::new(KeyValues::new(values.build()?)?),
        })
    }
}

impl ArgumentSpec {
    fn build(&self) -> Result<Argument, DeclarationError> {
        let mut argument = Argument::with_shared_type(&self.name, self.value_type.build()?);
        for alias in &self.aliases {
            argument = argument.alias(alias);
        }
        if let Some(c) = self.short {
            argument = argument.short(c);
        }
        if self.positional {
            argument = argument.positional();
        }
        if self.obligatory {
            argument = argument.obligatory();
        }
        Ok(argument)
    }
}

impl CommandSpec {
    /// Build the command and its subcommands, without validating them.
    pub fn build(&self) -> Result<Command, DeclarationError> {
        let mut command = Command::new(&self.name);
        for alias in &self.aliases {
            command = command.alias(alias);
        }
        if let Some(prefix) = self.prefix {
            command = command.prefix(prefix);
        }
        if let Some(tuple) = self.tuple {
            command = command.tuple_chars(tuple);
        }
        for argument in &self.arguments {
            command = command.argument(argument.build()?);
        }
        for sub in &self.subcommands {
            command = command.subcommand(sub.build()?);
        }
        Ok(command)
    }
}

impl TreeSpec {
    /// Build and validate the tree.
    pub fn build(&self) -> Result<(Command, ParserConfig), DeclarationError> {
        let root = self.root.build()?;
        root.validate(self.config)?;
        Ok((root, self.config))
    }
}

/// Load, build, and validate a tree definition from a JSON string.
pub fn load_tree_from_str(json: &str) -> Result<(Command, ParserConfig), TreeError> {
    let spec: TreeSpec = serde_json::from_str(json)?;
    Ok(spec.build()?)
}
