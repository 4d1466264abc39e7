//! Value-type converters: the contract between the matcher and the code that
//! turns raw value strings into typed values.

mod builtin;

pub use builtin::{Counter, Flag, Integer, KeyValues, Strings, Text};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Inclusive range of how many values an argument accepts per use.
///
/// Invariant: `min <= max` when `max` is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    min: usize,
    max: Option<usize>,
}

impl ValueCount {
    /// No values (flags).
    pub const NONE: Self = Self {
        min: 0,
        max: Some(0),
    };
    /// Exactly one value.
    pub const ONE: Self = Self {
        min: 1,
        max: Some(1),
    };
    /// One or more values.
    pub const AT_LEAST_ONE: Self = Self { min: 1, max: None };
    /// Any number of values, including none.
    pub const ANY: Self = Self { min: 0, max: None };

    /// Create a bounded range `[min, max]`.
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn new(min: usize, max: usize) -> Self {
        assert!(
            min <= max,
            "ValueCount: min ({min}) must not exceed max ({max})"
        );
        Self {
            min,
            max: Some(max),
        }
    }

    /// Create an unbounded range `[min, ∞)`.
    pub fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Exactly `n` values.
    pub fn exactly(n: usize) -> Self {
        Self::new(n, n)
    }

    /// Lower bound (inclusive).
    pub fn min(&self) -> usize {
        self.min
    }

    /// Upper bound (inclusive), `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Whether `n` values satisfy the range.
    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && self.max.is_none_or(|max| n <= max)
    }

    /// Human-readable description used in value-count diagnostics,
    /// e.g. `"from 1 to 3 values"`.
    pub fn describe(&self) -> String {
        match self.max {
            Some(0) => "no values".to_string(),
            Some(max) if max == self.min => plural(max),
            Some(max) => format!("from {} to {max} values", self.min),
            None => format!("at least {}", plural(self.min)),
        }
    }
}

fn plural(n: usize) -> String {
    if n == 1 {
        "1 value".to_string()
    } else {
        format!("{n} values")
    }
}

/// A converted argument value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Flag state.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Number of times a repeatable argument was used.
    Count(u64),
    /// Text value.
    Text(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Key-value map with deterministic key order.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// The boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The count, if this is a [`Value::Count`].
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Value::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// The text, if this is a [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The items, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a [`Value::Map`].
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// One or more messages explaining why raw values could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join(" "))]
pub struct ConvertError {
    messages: Vec<String>,
}

impl ConvertError {
    /// An error with a single message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
        }
    }

    /// An error collecting several messages. Returns `None` if `messages` is empty.
    pub fn from_messages(messages: Vec<String>) -> Option<Self> {
        (!messages.is_empty()).then_some(Self { messages })
    }

    /// The individual messages, in the order they were reported.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

/// Converts the raw strings collected for one use of an argument into a
/// [`Value`].
///
/// Implementations must not keep state between calls: the same converter
/// instance may serve many arguments and many parses.
pub trait ValueType: fmt::Debug + Send + Sync {
    /// Short type name, used in logs and tree definitions.
    fn name(&self) -> &'static str;

    /// How many values one use of the argument accepts.
    fn value_count(&self) -> ValueCount;

    /// Convert the collected raw values. `raw.len()` is already known to lie
    /// within [`ValueType::value_count`].
    fn convert(&self, raw: &[&str]) -> Result<Value, ConvertError>;

    /// Value reported when the argument never appears.
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// Whether the argument may appear more than once in the same command.
    fn allows_repeats(&self) -> bool {
        false
    }

    /// Combine the value of an earlier use with the value of a later one.
    fn accumulate(&self, _previous: Value, next: Value) -> Value {
        next
    }
}
