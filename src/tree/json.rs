//! Conversion between JSON configuration snapshots and [`ConfigNode`] trees.
//!
//! JSON does not distinguish records from key-value maps, so objects become
//! records unless their key path matches one of the configured
//! [`MappingPatterns`].

use serde_json::{Map, Number, Value};

use super::node::{ConfigNode, FloatWidth, Leaf, Mapping, Record};
use super::path::DELIMITER;

/// Mapping patterns for a stock Mattermost configuration.
pub const DEFAULT_MAPPING_PATHS: &[&str] = &[
    "PluginSettings.Plugins",
    "PluginSettings.Plugins.*",
    "PluginSettings.PluginStates",
];

const WILDCARD: &str = "*";

/// Dot-separated key paths (with `*` matching any single key) whose JSON
/// objects are key-value maps rather than records.
///
/// Patterns are matched against the actual keys walked from the root, so a
/// key that itself contains dots (`com.mattermost.nps`) is matched by a
/// single `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingPatterns {
    patterns: Vec<Vec<String>>,
}

impl MappingPatterns {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().split(DELIMITER).map(String::from).collect())
                .collect(),
        }
    }

    /// No mappings at all: every object is a record.
    pub fn none() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    pub fn matches(&self, keys: &[String]) -> bool {
        self.patterns.iter().any(|pattern| {
            pattern.len() == keys.len()
                && pattern
                    .iter()
                    .zip(keys)
                    .all(|(want, key)| want == WILDCARD || want == key)
        })
    }
}

impl Default for MappingPatterns {
    fn default() -> Self {
        Self::new(DEFAULT_MAPPING_PATHS)
    }
}

/// Build a tree from a JSON snapshot.
///
/// - `null` becomes an empty optional
/// - arrays of strings (including empty arrays) become string lists; any
///   other array is kept as an opaque leaf
/// - integral numbers become 64-bit ints, other numbers 64-bit floats
pub fn from_json(value: &Value, patterns: &MappingPatterns) -> ConfigNode {
    let mut keys = Vec::new();
    node_from_json(value, patterns, &mut keys)
}

fn node_from_json(value: &Value, patterns: &MappingPatterns, keys: &mut Vec<String>) -> ConfigNode {
    match value {
        Value::Null => ConfigNode::none(),
        Value::Bool(b) => ConfigNode::bool(*b),
        Value::String(s) => ConfigNode::string(s.as_str()),
        Value::Number(n) => number_to_node(n),
        Value::Array(items) => match items
            .iter()
            .map(|item| item.as_str().map(String::from))
            .collect::<Option<Vec<String>>>()
        {
            Some(strings) => ConfigNode::Leaf(Leaf::StringList(strings)),
            None => ConfigNode::Leaf(Leaf::Opaque(value.clone())),
        },
        Value::Object(object) => {
            if patterns.matches(keys) {
                let mut mapping = Mapping::new();
                for (key, child) in object {
                    keys.push(key.clone());
                    mapping.insert(key.as_str(), node_from_json(child, patterns, keys));
                    keys.pop();
                }
                ConfigNode::Mapping(mapping)
            } else {
                let mut record = Record::new();
                for (key, child) in object {
                    keys.push(key.clone());
                    record.insert(key.as_str(), node_from_json(child, patterns, keys));
                    keys.pop();
                }
                ConfigNode::Record(record)
            }
        }
    }
}

fn number_to_node(n: &Number) -> ConfigNode {
    match n.as_i64() {
        Some(i) => ConfigNode::int(i),
        None => ConfigNode::float(n.as_f64().unwrap_or_default()),
    }
}

/// Render a tree back to JSON. Non-finite floats render as `null`.
pub fn to_json(node: &ConfigNode) -> Value {
    match node {
        ConfigNode::Record(record) => Value::Object(
            record
                .iter()
                .map(|(name, child)| (name.to_string(), to_json(child)))
                .collect::<Map<String, Value>>(),
        ),
        ConfigNode::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .map(|(key, child)| (key.to_string(), to_json(child)))
                .collect::<Map<String, Value>>(),
        ),
        ConfigNode::Optional(None) => Value::Null,
        ConfigNode::Optional(Some(inner)) => to_json(inner),
        ConfigNode::Leaf(leaf) => leaf_to_json(leaf),
    }
}

fn leaf_to_json(leaf: &Leaf) -> Value {
    match leaf {
        Leaf::String(s) => Value::String(s.clone()),
        Leaf::Int { value, .. } => Value::from(*value),
        Leaf::Float { value, width } => {
            let value = match width {
                FloatWidth::W32 => f64::from(*value as f32),
                FloatWidth::W64 => *value,
            };
            Number::from_f64(value).map_or(Value::Null, Value::Number)
        }
        Leaf::Bool(b) => Value::Bool(*b),
        Leaf::StringList(items) => Value::from(items.clone()),
        Leaf::Opaque(raw) => raw.clone(),
    }
}

/// Render a leaf for humans: strings bare, lists comma-separated.
pub fn leaf_to_display(leaf: &Leaf) -> String {
    match leaf {
        Leaf::String(s) => s.clone(),
        Leaf::Int { value, .. } => value.to_string(),
        Leaf::Float { value, .. } => value.to_string(),
        Leaf::Bool(b) => b.to_string(),
        Leaf::StringList(items) => items.join(", "),
        Leaf::Opaque(raw) => raw.to_string(),
    }
}
