//! Translation tables: a tree of groups with string leaves, addressed by
//! dotted keys such as `nav.home.title`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::PolyglotError;

/// One node in a translation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationNode {
    /// A translatable string, possibly containing `{name}` placeholders.
    Text(String),
    /// A nested group of nodes.
    Group(BTreeMap<String, TranslationNode>),
    /// Any other JSON value (numbers, booleans, arrays, null), kept as-is.
    Value(Value),
}

impl TranslationNode {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert back to plain JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Group(children) => Value::Object(
                children
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            Self::Value(v) => v.clone(),
        }
    }
}

impl From<Value> for TranslationNode {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Text(s),
            Value::Object(map) => Self::Group(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
            other => Self::Value(other),
        }
    }
}

impl fmt::Display for TranslationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Result of walking a dotted key through a table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// The key ends on a string leaf.
    Text(&'a str),
    /// The key ends on a group or a non-string value.
    Node(&'a TranslationNode),
    /// A segment was absent, or a non-group was reached before the last segment.
    Missing,
}

/// The full translation tree for one language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct TranslationTable {
    root: BTreeMap<String, TranslationNode>,
}

impl TranslationTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a table from JSON text. The document must be a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self, PolyglotError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| PolyglotError::Parse(format!("invalid translation JSON: {e}")))?;
        Self::try_from(value)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Walk `key` segment by segment, failing closed on any shape mismatch.
    pub fn lookup(&self, key: &str) -> Lookup<'_> {
        let mut level = &self.root;
        let mut segments = key.split('.').peekable();

        while let Some(segment) = segments.next() {
            let Some(node) = level.get(segment) else {
                return Lookup::Missing;
            };
            if segments.peek().is_none() {
                return match node {
                    TranslationNode::Text(s) => Lookup::Text(s),
                    other => Lookup::Node(other),
                };
            }
            match node {
                TranslationNode::Group(children) => level = children,
                _ => return Lookup::Missing,
            }
        }

        Lookup::Missing
    }

    /// Count every string leaf in the tree.
    pub fn leaf_count(&self) -> usize {
        fn count(nodes: &BTreeMap<String, TranslationNode>) -> usize {
            nodes
                .values()
                .map(|node| match node {
                    TranslationNode::Text(_) => 1,
                    TranslationNode::Group(children) => count(children),
                    TranslationNode::Value(_) => 0,
                })
                .sum()
        }
        count(&self.root)
    }
}

impl TryFrom<Value> for TranslationTable {
    type Error = PolyglotError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self {
                root: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            }),
            other => Err(PolyglotError::Parse(format!(
                "translation table must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<TranslationTable> for Value {
    fn from(table: TranslationTable) -> Self {
        TranslationNode::Group(table.root).to_json()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
