//! Parser configuration: argument-name prefix and tuple delimiters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a [`ParserConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON deserialization failed.
    #[error("invalid parser config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A configured character cannot be used in its role.
    #[error("invalid {field} '{value}': {reason}")]
    InvalidChar {
        /// The configuration field that failed validation.
        field: &'static str,
        /// The offending character.
        value: char,
        /// A human-readable explanation of why the character is invalid.
        reason: &'static str,
    },
}

/// The pair of characters that open and close a tuple (a bracketed group of
/// values passed to one argument at once).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleChars {
    /// Character that opens a tuple.
    pub open: char,
    /// Character that closes a tuple.
    pub close: char,
}

impl TupleChars {
    /// `[` and `]`.
    pub const SQUARE_BRACKETS: Self = Self::pair('[', ']');
    /// `(` and `)`.
    pub const PARENTHESIS: Self = Self::pair('(', ')');
    /// `{` and `}`.
    pub const BRACES: Self = Self::pair('{', '}');
    /// `<` and `>`.
    pub const ANGLE_BRACKETS: Self = Self::pair('<', '>');

    const fn pair(open: char, close: char) -> Self {
        Self { open, close }
    }
}

impl Default for TupleChars {
    fn default() -> Self {
        Self::SQUARE_BRACKETS
    }
}

/// Tokenizer settings shared by a whole command tree. Individual commands may
/// override either setting for themselves and their subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Argument-name prefix character (`-` gives `-n` and `--name`).
    pub prefix: char,
    /// Tuple delimiter characters.
    pub tuple: TupleChars,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prefix: '-',
            tuple: TupleChars::default(),
        }
    }
}

impl ParserConfig {
    /// Check that the prefix and delimiters do not collide with characters the
    /// tokenizer already gives meaning to, or with each other.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_char("prefix", self.prefix)?;
        check_char("tuple.open", self.tuple.open)?;
        check_char("tuple.close", self.tuple.close)?;
        if self.tuple.open == self.tuple.close {
            return Err(ConfigError::InvalidChar {
                field: "tuple.close",
                value: self.tuple.close,
                reason: "must differ from tuple.open",
            });
        }
        if self.prefix == self.tuple.open || self.prefix == self.tuple.close {
            return Err(ConfigError::InvalidChar {
                field: "prefix",
                value: self.prefix,
                reason: "must differ from the tuple delimiters",
            });
        }
        Ok(())
    }
}

fn check_char(field: &'static str, value: char) -> Result<(), ConfigError> {
    let reason = if value.is_whitespace() {
        "whitespace separates tokens"
    } else if matches!(value, '"' | '\'') {
        "quotes delimit strings"
    } else if value == '\\' {
        "backslash escapes characters"
    } else if value == '=' {
        "'=' separates names from values"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidChar {
        field,
        value,
        reason,
    })
}

/// Load and validate a [`ParserConfig`] from a JSON string.
///
/// Missing fields fall back to their defaults.
pub fn load_config_from_str(json: &str) -> Result<ParserConfig, ConfigError> {
    let config: ParserConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}
