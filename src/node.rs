//! @acp:module "Output Tree"
//! @acp:summary "Generic JSON-compatible tree produced by projection"
//! @acp:domain serialization
//! @acp:layer model
//!
//! Like `serde_json::Value`, plus a `Raw` variant that carries pre-encoded
//! hook output through to the encoder untouched. Objects are `BTreeMap`s so
//! encoding is deterministic.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use serde_json::{Number, Value};

/// @acp:summary "One node of a projected tree"
#[derive(Debug, Clone, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(BTreeMap<String, Node>),
    /// Pre-encoded JSON written verbatim by the encoder.
    Raw(Box<RawValue>),
}

impl Node {
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key of an object node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|entries| entries.get(key))
    }

    /// @acp:summary "Convert into a `serde_json::Value`, decoding raw content"
    pub fn to_value(&self) -> serde_json::Result<Value> {
        Ok(match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(
                items
                    .iter()
                    .map(Node::to_value)
                    .collect::<serde_json::Result<_>>()?,
            ),
            Node::Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, node)| Ok((key.clone(), node.to_value()?)))
                    .collect::<serde_json::Result<_>>()?,
            ),
            Node::Raw(raw) => serde_json::from_str(raw.get())?,
        })
    }
}

// RawValue has no PartialEq; raw nodes compare by their encoded text.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => a == b,
            (Node::Raw(a), Node::Raw(b)) => a.get() == b.get(),
            _ => false,
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Node::Raw(raw) => raw.serialize(serializer),
        }
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Node::Number(i.into())
    }
}

impl From<u64> for Node {
    fn from(u: u64) -> Self {
        Node::Number(u.into())
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => Node::Array(items.into_iter().map(Node::from).collect()),
            Value::Object(entries) => Node::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Node::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_is_written_verbatim() {
        let raw = RawValue::from_string(r#"{"b":1,  "a":2}"#.to_string()).unwrap();
        let node = Node::Array(vec![Node::Raw(raw), Node::from(3i64)]);
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"[{"b":1,  "a":2},3]"#
        );
    }

    #[test]
    fn test_objects_encode_in_key_order() {
        let node = Node::from(json!({"z": 1, "a": [true, null], "m": "x"}));
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"a":[true,null],"m":"x","z":1}"#
        );
    }

    #[test]
    fn test_to_value_decodes_raw() {
        let raw = RawValue::from_string("[1,2]".to_string()).unwrap();
        let node = Node::Object(BTreeMap::from([("list".to_string(), Node::Raw(raw))]));
        assert_eq!(node.to_value().unwrap(), json!({"list": [1, 2]}));
    }

    #[test]
    fn test_accessors() {
        let node = Node::from(json!({"name": "one", "tags": ["a"]}));
        assert_eq!(node.get("name").and_then(Node::as_str), Some("one"));
        assert_eq!(node.get("tags").and_then(Node::as_array).map(<[Node]>::len), Some(1));
        assert!(node.get("missing").is_none());
        assert!(Node::default().is_null());
    }
}
