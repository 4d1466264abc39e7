use super::{ConvertError, Value, ValueCount, ValueType};
use crate::command::DeclarationError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A switch that takes no values. Present → `true`, absent → `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flag;

impl ValueType for Flag {
    fn name(&self) -> &'static str {
        "flag"
    }

    fn value_count(&self) -> ValueCount {
        ValueCount::NONE
    }

    fn convert(&self, _raw: &[&str]) -> Result<Value, ConvertError> {
        Ok(Value::Bool(true))
    }

    fn default_value(&self) -> Option<Value> {
        Some(Value::Bool(false))
    }
}

/// Counts how many times the argument was used (`-vvv` → 3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Counter;

impl ValueType for Counter {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn value_count(&self) -> ValueCount {
        ValueCount::NONE
    }

    fn convert(&self, _raw: &[&str]) -> Result<Value, ConvertError> {
        Ok(Value::Count(1))
    }

    fn default_value(&self) -> Option<Value> {
        Some(Value::Count(0))
    }

    fn allows_repeats(&self) -> bool {
        true
    }

    fn accumulate(&self, previous: Value, next: Value) -> Value {
        match (previous, next) {
            (Value::Count(a), Value::Count(b)) => Value::Count(a.saturating_add(b)),
            (_, next) => next,
        }
    }
}

/// A single signed 64-bit integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl ValueType for Integer {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn value_count(&self) -> ValueCount {
        ValueCount::ONE
    }

    fn convert(&self, raw: &[&str]) -> Result<Value, ConvertError> {
        let [value] = raw else {
            return Err(ConvertError::new("Expected a single integer value."));
        };
        value
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ConvertError::new(format!("Invalid integer value: '{value}'.")))
    }
}

/// A single text value, taken verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl ValueType for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn value_count(&self) -> ValueCount {
        ValueCount::ONE
    }

    fn convert(&self, raw: &[&str]) -> Result<Value, ConvertError> {
        Ok(Value::Text(raw.concat()))
    }
}

/// A list of text values with a configurable count.
#[derive(Debug, Clone, Copy)]
pub struct Strings {
    count: ValueCount,
}

impl Strings {
    /// Accept as many values as `count` allows.
    pub fn new(count: ValueCount) -> Self {
        Self { count }
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::new(ValueCount::AT_LEAST_ONE)
    }
}

impl ValueType for Strings {
    fn name(&self) -> &'static str {
        "strings"
    }

    fn value_count(&self) -> ValueCount {
        self.count
    }

    fn convert(&self, raw: &[&str]) -> Result<Value, ConvertError> {
        Ok(Value::List(
            raw.iter().map(|s| Value::Text((*s).to_string())).collect(),
        ))
    }
}

/// `key=value` entries collected into a map; each value is converted by an
/// inner type that takes exactly one value.
#[derive(Debug, Clone)]
pub struct KeyValues {
    values: Arc<dyn ValueType>,
}

impl KeyValues {
    /// Wrap `values`, which must accept exactly one value per use.
    pub fn new(values: Arc<dyn ValueType>) -> Result<Self, DeclarationError> {
        if values.value_count() != ValueCount::ONE {
            return Err(DeclarationError::InvalidValueType(format!(
                "key-values needs a value type taking exactly 1 value, '{}' takes {}",
                values.name(),
                values.value_count().describe()
            )));
        }
        Ok(Self { values })
    }
}

impl ValueType for KeyValues {
    fn name(&self) -> &'static str {
        "key-values"
    }

    fn value_count(&self) -> ValueCount {
        ValueCount::AT_LEAST_ONE
    }

    fn convert(&self, raw: &[&str]) -> Result<Value, ConvertError> {
        let mut map = BTreeMap::new();
        let mut errors = Vec::new();

        for entry in raw {
            let mut parts = entry.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                errors.push(format!("Invalid key-value pair: '{entry}'."));
                continue;
            };
            if key.is_empty() {
                errors.push("Key cannot be empty.".to_string());
                continue;
            }
            if map.contains_key(key) {
                errors.push(format!("Duplicate key: '{key}'."));
                continue;
            }
            match self.values.convert(&[value]) {
                Ok(v) => {
                    map.insert(key.to_string(), v);
                }
                Err(e) => errors.extend(e.messages().iter().cloned()),
            }
        }

        match ConvertError::from_messages(errors) {
            Some(e) => Err(e),
            None => Ok(Value::Map(map)),
        }
    }
}
