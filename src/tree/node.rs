//! Node types for the configuration tree.
//!
//! A configuration snapshot is modelled as a tree of [`ConfigNode`]s:
//! records with named fields, string-keyed mappings, optional (pointer-like)
//! slots, and scalar leaves. Each node also reports its declared
//! [`ValueType`], which is what writes coerce new values against.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::path::{key_prefix_len, segment_count};

/// Bit width of an integer leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// Check whether `value` fits a signed integer of this width.
    pub fn contains(self, value: i64) -> bool {
        match self {
            IntWidth::W8 => i8::try_from(value).is_ok(),
            IntWidth::W16 => i16::try_from(value).is_ok(),
            IntWidth::W32 => i32::try_from(value).is_ok(),
            IntWidth::W64 => true,
        }
    }
}

/// Bit width of a floating-point leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatWidth {
    W32,
    W64,
}

impl FloatWidth {
    pub fn bits(self) -> u32 {
        match self {
            FloatWidth::W32 => 32,
            FloatWidth::W64 => 64,
        }
    }
}

/// The declared type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Record,
    Mapping,
    Optional,
    String,
    Int(IntWidth),
    Float(FloatWidth),
    Bool,
    StringList,
    /// A kind the coercer has no rule for.
    Unsupported,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::Record => write!(f, "record"),
            ValueType::Mapping => write!(f, "mapping"),
            ValueType::Optional => write!(f, "optional"),
            ValueType::String => write!(f, "string"),
            ValueType::Int(width) => write!(f, "int{}", width.bits()),
            ValueType::Float(width) => write!(f, "float{}", width.bits()),
            ValueType::Bool => write!(f, "bool"),
            ValueType::StringList => write!(f, "string list"),
            ValueType::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// A scalar (or string-list) value at the bottom of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    String(String),
    Int { value: i64, width: IntWidth },
    Float { value: f64, width: FloatWidth },
    Bool(bool),
    StringList(Vec<String>),
    /// Snapshot value kept verbatim because no coercion rule covers it
    /// (for example an array of objects).
    Opaque(serde_json::Value),
}

impl Leaf {
    pub fn value_type(&self) -> ValueType {
        match self {
            Leaf::String(_) => ValueType::String,
            Leaf::Int { width, .. } => ValueType::Int(*width),
            Leaf::Float { width, .. } => ValueType::Float(*width),
            Leaf::Bool(_) => ValueType::Bool,
            Leaf::StringList(_) => ValueType::StringList,
            Leaf::Opaque(_) => ValueType::Unsupported,
        }
    }
}

/// Record node: named fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, ConfigNode)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with_field(mut self, name: impl Into<String>, value: ConfigNode) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a field, replacing an existing field of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, value: ConfigNode) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConfigNode> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Mapping node: string keys to nodes. Keys may contain literal dots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: BTreeMap<String, ConfigNode>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry insertion.
    pub fn with_entry(mut self, key: impl Into<String>, value: ConfigNode) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert an entry, replacing any existing entry under `key` wholesale.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigNode) -> Option<ConfigNode> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in the order candidates are tried during dotted-key resolution.
    ///
    /// Keys spanning more path segments come first; keys with the same
    /// segment count are ordered lexicographically. The order depends only
    /// on the key set, never on insertion history.
    pub fn resolution_order(&self) -> Vec<&str> {
        // BTreeMap iteration is already lexicographic, and the sort is stable.
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_by_key(|key| Reverse(segment_count(key)));
        keys
    }

    /// Pick the entry addressed by the front of `remaining`.
    ///
    /// Returns the matched key, its entry, and the number of path segments
    /// the key consumes. With a single segment left only a direct key lookup
    /// applies; otherwise the first key in [`Self::resolution_order`] that is
    /// a dot-respecting prefix of the remaining path wins.
    pub fn resolve(&self, remaining: &[String]) -> Option<(&str, &ConfigNode, usize)> {
        if let [segment] = remaining {
            return self
                .entries
                .get_key_value(segment.as_str())
                .map(|(key, entry)| (key.as_str(), entry, 1));
        }

        self.resolution_order().into_iter().find_map(|key| {
            let consumed = key_prefix_len(key, remaining)?;
            let entry = self.entries.get(key)?;
            Some((key, entry, consumed))
        })
    }
}

/// A node in the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Record(Record),
    Mapping(Mapping),
    /// Zero-or-one owned node, dereferenced transparently during traversal.
    Optional(Option<Box<ConfigNode>>),
    Leaf(Leaf),
}

impl ConfigNode {
    pub fn string(value: impl Into<String>) -> Self {
        ConfigNode::Leaf(Leaf::String(value.into()))
    }

    pub fn int(value: i64) -> Self {
        ConfigNode::Leaf(Leaf::Int {
            value,
            width: IntWidth::W64,
        })
    }

    pub fn int_with_width(value: i64, width: IntWidth) -> Self {
        ConfigNode::Leaf(Leaf::Int { value, width })
    }

    pub fn float(value: f64) -> Self {
        ConfigNode::Leaf(Leaf::Float {
            value,
            width: FloatWidth::W64,
        })
    }

    pub fn bool(value: bool) -> Self {
        ConfigNode::Leaf(Leaf::Bool(value))
    }

    pub fn string_list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConfigNode::Leaf(Leaf::StringList(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn some(inner: ConfigNode) -> Self {
        ConfigNode::Optional(Some(Box::new(inner)))
    }

    pub fn none() -> Self {
        ConfigNode::Optional(None)
    }

    /// Declared type of this node.
    pub fn value_type(&self) -> ValueType {
        match self {
            ConfigNode::Record(_) => ValueType::Record,
            ConfigNode::Mapping(_) => ValueType::Mapping,
            ConfigNode::Optional(_) => ValueType::Optional,
            ConfigNode::Leaf(leaf) => leaf.value_type(),
        }
    }

    /// Peel off any optional wrappers. `None` if an empty optional is hit.
    pub fn deref_optional(&self) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Optional(inner) => inner.as_deref()?.deref_optional(),
            other => Some(other),
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self.deref_optional()? {
            ConfigNode::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self.deref_optional()? {
            ConfigNode::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self.deref_optional()? {
            ConfigNode::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }
}

impl From<Record> for ConfigNode {
    fn from(record: Record) -> Self {
        ConfigNode::Record(record)
    }
}

impl From<Mapping> for ConfigNode {
    fn from(mapping: Mapping) -> Self {
        ConfigNode::Mapping(mapping)
    }
}

impl From<Leaf> for ConfigNode {
    fn from(leaf: Leaf) -> Self {
        ConfigNode::Leaf(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(path: &str) -> Vec<String> {
        path.split('.').map(String::from).collect()
    }

    #[test]
    fn test_int_width_contains() {
        assert!(IntWidth::W8.contains(127));
        assert!(!IntWidth::W8.contains(128));
        assert!(IntWidth::W16.contains(-32768));
        assert!(!IntWidth::W32.contains(i64::from(i32::MAX) + 1));
        assert!(IntWidth::W64.contains(i64::MIN));
    }

    #[test]
    fn test_value_type_display() {
        assert_eq!(ValueType::Int(IntWidth::W32).to_string(), "int32");
        assert_eq!(ValueType::Float(FloatWidth::W64).to_string(), "float64");
        assert_eq!(ValueType::StringList.to_string(), "string list");
    }

    #[test]
    fn test_record_insert_replaces_in_place() {
        let mut record = Record::new()
            .with_field("A", ConfigNode::int(1))
            .with_field("B", ConfigNode::int(2));
        record.insert("A", ConfigNode::int(10));

        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(record.get("A"), Some(&ConfigNode::int(10)));
    }

    #[test]
    fn test_resolution_order_prefers_more_segments() {
        let mapping = Mapping::new()
            .with_entry("A", ConfigNode::int(1))
            .with_entry("B.C", ConfigNode::int(2))
            .with_entry("A.B", ConfigNode::int(3))
            .with_entry("x.y.z", ConfigNode::int(4));

        assert_eq!(mapping.resolution_order(), vec!["x.y.z", "A.B", "B.C", "A"]);
    }

    #[test]
    fn test_resolve_single_segment_is_direct_lookup() {
        let mapping = Mapping::new().with_entry("A", ConfigNode::int(1));

        let (key, entry, consumed) = mapping.resolve(&segments("A")).unwrap();
        assert_eq!(key, "A");
        assert_eq!(entry, &ConfigNode::int(1));
        assert_eq!(consumed, 1);
        assert!(mapping.resolve(&segments("B")).is_none());
    }

    #[test]
    fn test_resolve_requires_dot_boundary() {
        let mapping = Mapping::new().with_entry("Feat", ConfigNode::int(1));

        // "Feature.X" starts with "Feat" as a string, but not on a segment boundary
        assert!(mapping.resolve(&segments("Feature.X")).is_none());
    }

    #[test]
    fn test_deref_optional() {
        let node = ConfigNode::some(ConfigNode::some(ConfigNode::bool(true)));
        assert_eq!(node.deref_optional(), Some(&ConfigNode::bool(true)));
        assert_eq!(ConfigNode::none().deref_optional(), None);
        assert_eq!(node.as_leaf(), Some(&Leaf::Bool(true)));
    }
}
