/*
 * value.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The dynamically-typed values tree.
//!
//! Every node is one of four variants. Scalars are always raw text: values
//! read from YAML are stringified and `--set` values are taken verbatim, so
//! no type inference happens anywhere in this crate.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::path::{Field, FieldKind};

/// A mapping from string keys to values, in insertion order.
pub type Mapping = IndexMap<String, Value>;

/// The variant of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Scalar,
    Mapping,
    Sequence,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Null => "null",
            NodeKind::Scalar => "scalar",
            NodeKind::Mapping => "mapping",
            NodeKind::Sequence => "sequence",
        })
    }
}

/// A node in the values tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// No value. Used for fresh trees and for holes in grown sequences.
    #[default]
    Null,

    /// Raw text.
    Scalar(String),

    /// String keys to values.
    Mapping(Mapping),

    /// 0-indexed list of values.
    Sequence(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Value::Null => NodeKind::Null,
            Value::Scalar(_) => NodeKind::Scalar,
            Value::Mapping(_) => NodeKind::Mapping,
            Value::Sequence(_) => NodeKind::Sequence,
        }
    }

    /// Read the value stored at `fields`, if the path exists.
    ///
    /// An empty path returns `self`. Map keys only match mappings and
    /// indices only match sequences; a mismatch is reported as `None`
    /// rather than an error because this is a lookup, not an assignment.
    pub fn get_path(&self, fields: &[Field]) -> Option<&Value> {
        let Some((first, rest)) = fields.split_first() else {
            return Some(self);
        };

        match (self, first.kind) {
            (Value::Mapping(m), FieldKind::MapKey) => m.get(&first.name)?.get_path(rest),
            (Value::Sequence(items), FieldKind::ArrayIndex) => {
                let index: usize = first.name.parse().ok()?;
                items.get(index)?.get_path(rest)
            }
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Mapping(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Scalar(s) => serializer.serialize_str(s),
            Value::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (key, value) in m {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse_path;

    fn sample() -> Value {
        let mut inner = Mapping::new();
        inner.insert("name".to_string(), Value::from("web"));
        let mut root = Mapping::new();
        root.insert(
            "servers".to_string(),
            Value::Sequence(vec![Value::Null, Value::Mapping(inner)]),
        );
        Value::Mapping(root)
    }

    #[test]
    fn test_get_path_nested() {
        let value = sample();
        let path = parse_path("servers[1].name").unwrap();
        assert_eq!(value.get_path(&path), Some(&Value::from("web")));
    }

    #[test]
    fn test_get_path_hole_and_missing() {
        let value = sample();
        assert_eq!(
            value.get_path(&parse_path("servers[0]").unwrap()),
            Some(&Value::Null)
        );
        assert_eq!(value.get_path(&parse_path("servers[5]").unwrap()), None);
        assert_eq!(value.get_path(&parse_path("missing").unwrap()), None);
    }

    #[test]
    fn test_get_path_kind_mismatch_is_none() {
        let value = sample();
        // `servers` is a sequence, so a map key lookup does not match
        assert_eq!(value.get_path(&parse_path("servers.name").unwrap()), None);
    }

    #[test]
    fn test_get_path_empty_returns_self() {
        let value = sample();
        assert_eq!(value.get_path(&[]), Some(&value));
    }

    #[test]
    fn test_serialize_to_json() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(json, r#"{"servers":[null,{"name":"web"}]}"#);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Value::Null.kind(), NodeKind::Null);
        assert_eq!(Value::from("x").kind(), NodeKind::Scalar);
        assert_eq!(Value::Mapping(Mapping::new()).kind(), NodeKind::Mapping);
        assert_eq!(Value::Sequence(vec![]).kind().to_string(), "sequence");
    }
}
