//! Parse results: the converted values of every activated command.

use crate::types::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// Values collected for one command of the activation chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeValues {
    /// Primary name of the command.
    pub command: String,
    /// Converted values keyed by argument primary name. Unused arguments with
    /// a default value appear with that default.
    pub values: BTreeMap<String, Value>,
    /// Text after a `-- ` marker, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward: Option<String>,
}

/// The values of a successful parse, root command first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedArguments {
    nodes: Vec<NodeValues>,
}

impl ParsedArguments {
    pub(crate) fn new(nodes: Vec<NodeValues>) -> Self {
        Self { nodes }
    }

    /// Look up a value by dotted path.
    ///
    /// The last segment is an argument name; the segments before it are
    /// subcommand names walked down from the root, so `"number"` reads the
    /// root and `"sub.inner.number"` reads `inner`. Only the primary names
    /// recorded in the results are matched.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments: Vec<&str> = path.split('.').collect();
        let argument = segments.pop()?;
        let node = self.nodes.get(segments.len())?;
        let chain_matches = segments
            .iter()
            .zip(self.nodes.iter().skip(1))
            .all(|(segment, node)| node.command == *segment);
        if !chain_matches {
            return None;
        }
        node.values.get(argument)
    }

    /// Values of the root command.
    pub fn root(&self) -> Option<&NodeValues> {
        self.nodes.first()
    }

    /// Values of every activated command, root first.
    pub fn nodes(&self) -> &[NodeValues] {
        &self.nodes
    }

    /// Primary names of the activated commands, root first.
    pub fn active_commands(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.command.as_str()).collect()
    }

    /// The forwarded text, from whichever command received a `-- ` marker.
    pub fn forward_value(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| n.forward.as_deref())
    }
}
