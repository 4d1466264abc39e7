use crate::parsed::ParsedArguments;

/// Serialize parsed values to a pretty-printed JSON string.
pub fn to_pretty_json(values: &ParsedArguments) -> String {
    serde_json::to_string_pretty(values).expect("ParsedArguments serialization cannot fail")
}
