//! String-to-typed-value coercion for leaf writes.

use super::error::TreeError;
use super::node::{ConfigNode, FloatWidth, IntWidth, Leaf, ValueType};

/// A value supplied by the caller for a write.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Single string, parsed according to the target type.
    Text(String),
    /// Sequence of strings, only accepted by string-list targets.
    List(Vec<String>),
    /// Already structured value, used when copying whole sections.
    Node(ConfigNode),
}

impl RawValue {
    /// Build a raw value from command-line arguments.
    ///
    /// One argument is text unless `force_list` is set; several arguments
    /// always form a list.
    pub fn from_args(mut values: Vec<String>, force_list: bool) -> Self {
        if values.len() == 1 && !force_list {
            RawValue::Text(values.remove(0))
        } else {
            RawValue::List(values)
        }
    }

    /// The raw form of an existing leaf, such that writing it back is a no-op.
    ///
    /// `None` for opaque leaves, which cannot be written.
    pub fn from_leaf(leaf: &Leaf) -> Option<Self> {
        let raw = match leaf {
            Leaf::String(s) => RawValue::Text(s.clone()),
            Leaf::Int { value, .. } => RawValue::Text(value.to_string()),
            Leaf::Float { value, .. } => RawValue::Text(value.to_string()),
            Leaf::Bool(b) => RawValue::Text(b.to_string()),
            Leaf::StringList(items) => RawValue::List(items.clone()),
            Leaf::Opaque(_) => return None,
        };
        Some(raw)
    }

    fn describe(&self) -> String {
        match self {
            RawValue::Text(s) => format!("{:?}", s),
            RawValue::List(items) => format!("list of {} strings", items.len()),
            RawValue::Node(node) => format!("{} value", node.value_type()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<Vec<String>> for RawValue {
    fn from(items: Vec<String>) -> Self {
        RawValue::List(items)
    }
}

/// Coerce `raw` into a node of the declared `target` type.
pub fn coerce(target: ValueType, raw: &RawValue) -> Result<ConfigNode, TreeError> {
    let mismatch = || TreeError::TypeMismatch {
        expected: target,
        found: raw.describe(),
    };

    match target {
        ValueType::Record => match raw {
            RawValue::Node(node @ ConfigNode::Record(_)) => Ok(node.clone()),
            _ => Err(mismatch()),
        },
        ValueType::StringList => match raw {
            RawValue::List(items) => Ok(ConfigNode::Leaf(Leaf::StringList(items.clone()))),
            _ => Err(mismatch()),
        },
        ValueType::Int(width) => {
            let text = text_of(raw).ok_or_else(mismatch)?;
            let value = parse_int(text, width).ok_or_else(mismatch)?;
            Ok(ConfigNode::Leaf(Leaf::Int { value, width }))
        }
        ValueType::Float(width) => {
            let text = text_of(raw).ok_or_else(mismatch)?;
            let value = parse_float(text, width).ok_or_else(mismatch)?;
            Ok(ConfigNode::Leaf(Leaf::Float { value, width }))
        }
        ValueType::String => {
            let text = text_of(raw).ok_or_else(mismatch)?;
            Ok(ConfigNode::string(text))
        }
        ValueType::Bool => {
            let text = text_of(raw).ok_or_else(mismatch)?;
            let value = parse_bool(text).ok_or_else(mismatch)?;
            Ok(ConfigNode::bool(value))
        }
        ValueType::Mapping | ValueType::Optional | ValueType::Unsupported => {
            Err(TreeError::UnsupportedKind { kind: target })
        }
    }
}

fn text_of(raw: &RawValue) -> Option<&str> {
    match raw {
        RawValue::Text(s) => Some(s),
        _ => None,
    }
}

fn parse_int(text: &str, width: IntWidth) -> Option<i64> {
    let value: i64 = text.parse().ok()?;
    width.contains(value).then_some(value)
}

fn parse_float(text: &str, width: FloatWidth) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    // NaN and infinities have no JSON form
    if !value.is_finite() {
        return None;
    }
    match width {
        FloatWidth::W64 => Some(value),
        // Finite input that only becomes infinite when narrowed is an overflow
        FloatWidth::W32 if (value as f32).is_infinite() => None,
        FloatWidth::W32 => Some(f64::from(value as f32)),
    }
}

/// Canonical boolean forms: `true`/`false`/`t`/`f`/`1`/`0`, any case.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::Record;

    #[test]
    fn test_coerce_int() {
        let node = coerce(ValueType::Int(IntWidth::W64), &"42".into()).unwrap();
        assert_eq!(node, ConfigNode::int(42));

        let node = coerce(ValueType::Int(IntWidth::W64), &"+7".into()).unwrap();
        assert_eq!(node, ConfigNode::int(7));
    }

    #[test]
    fn test_coerce_int_rejects_malformed() {
        let err = coerce(ValueType::Int(IntWidth::W64), &"abc".into()).unwrap_err();
        assert!(matches!(err, TreeError::TypeMismatch { .. }));

        let err = coerce(ValueType::Int(IntWidth::W64), &"1.5".into()).unwrap_err();
        assert!(matches!(err, TreeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_coerce_int_width_overflow() {
        assert_eq!(
            coerce(ValueType::Int(IntWidth::W8), &"-128".into()).unwrap(),
            ConfigNode::int_with_width(-128, IntWidth::W8)
        );
        assert!(coerce(ValueType::Int(IntWidth::W8), &"128".into()).is_err());
        assert!(coerce(ValueType::Int(IntWidth::W32), &"2147483648".into()).is_err());
        assert!(coerce(ValueType::Int(IntWidth::W64), &"9223372036854775808".into()).is_err());
    }

    #[test]
    fn test_coerce_float() {
        let node = coerce(ValueType::Float(FloatWidth::W64), &"0.25".into()).unwrap();
        assert_eq!(node, ConfigNode::float(0.25));

        assert!(coerce(ValueType::Float(FloatWidth::W64), &"1,5".into()).is_err());
        assert!(coerce(ValueType::Float(FloatWidth::W32), &"1e40".into()).is_err());
        assert!(coerce(ValueType::Float(FloatWidth::W32), &"1e30".into()).is_ok());
    }

    #[test]
    fn test_coerce_float_rejects_non_finite() {
        for text in ["NaN", "nan", "inf", "-inf", "infinity", "-Infinity"] {
            for width in [FloatWidth::W32, FloatWidth::W64] {
                let err = coerce(ValueType::Float(width), &text.into()).unwrap_err();
                assert!(matches!(err, TreeError::TypeMismatch { .. }), "{text}");
            }
        }
    }

    #[test]
    fn test_coerce_string_is_verbatim() {
        let node = coerce(ValueType::String, &"  spaced 42 ".into()).unwrap();
        assert_eq!(node, ConfigNode::string("  spaced 42 "));
    }

    #[test]
    fn test_coerce_bool_forms() {
        for text in ["true", "TRUE", "True", "t", "T", "1"] {
            assert_eq!(
                coerce(ValueType::Bool, &text.into()).unwrap(),
                ConfigNode::bool(true),
                "{text}"
            );
        }
        for text in ["false", "FALSE", "f", "0"] {
            assert_eq!(
                coerce(ValueType::Bool, &text.into()).unwrap(),
                ConfigNode::bool(false),
                "{text}"
            );
        }
    }

    #[test]
    fn test_coerce_bool_rejects_fuzzy_truthy() {
        for text in ["yes", "no", "on", "off", ""] {
            let err = coerce(ValueType::Bool, &text.into()).unwrap_err();
            assert!(matches!(err, TreeError::TypeMismatch { .. }), "{text}");
        }
    }

    #[test]
    fn test_coerce_string_list_requires_list() {
        let raw = RawValue::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            coerce(ValueType::StringList, &raw).unwrap(),
            ConfigNode::string_list(["a", "b"])
        );

        let err = coerce(ValueType::StringList, &"a".into()).unwrap_err();
        assert!(matches!(err, TreeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_coerce_scalar_rejects_list() {
        let raw = RawValue::List(vec!["1".to_string()]);
        assert!(coerce(ValueType::Int(IntWidth::W64), &raw).is_err());
        assert!(coerce(ValueType::String, &raw).is_err());
    }

    #[test]
    fn test_coerce_record_accepts_structured_only() {
        let record = ConfigNode::Record(Record::new().with_field("Enable", ConfigNode::bool(true)));
        let node = coerce(ValueType::Record, &RawValue::Node(record.clone())).unwrap();
        assert_eq!(node, record);

        let err = coerce(ValueType::Record, &"{}".into()).unwrap_err();
        assert!(matches!(err, TreeError::TypeMismatch { .. }));
    }

    #[test]
    fn test_coerce_unsupported_kinds() {
        for target in [ValueType::Mapping, ValueType::Unsupported] {
            let err = coerce(target, &"x".into()).unwrap_err();
            assert_eq!(err, TreeError::UnsupportedKind { kind: target });
            assert!(err.is_value_rejected());
        }
    }

    #[test]
    fn test_raw_value_from_args() {
        assert_eq!(
            RawValue::from_args(vec!["a".to_string()], false),
            RawValue::Text("a".to_string())
        );
        assert_eq!(
            RawValue::from_args(vec!["a".to_string()], true),
            RawValue::List(vec!["a".to_string()])
        );
        assert_eq!(
            RawValue::from_args(vec!["a".to_string(), "b".to_string()], false),
            RawValue::List(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_raw_value_from_leaf() {
        let leaf = Leaf::Int {
            value: -3,
            width: IntWidth::W64,
        };
        assert_eq!(RawValue::from_leaf(&leaf), Some(RawValue::Text("-3".to_string())));
        assert_eq!(RawValue::from_leaf(&Leaf::Opaque(serde_json::json!([1]))), None);
    }
}
