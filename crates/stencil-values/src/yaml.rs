/*
 * yaml.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Conversion between YAML documents and the values tree.
//!
//! Decoding keeps the text of every scalar: `port: 8080` becomes the
//! scalar `"8080"` and `debug: false` the scalar `"false"`. Only the first
//! document of a multi-document stream is used.

use yaml_rust2::yaml::Hash;
use yaml_rust2::{Yaml, YamlEmitter, YamlLoader};

use crate::error::YamlError;
use crate::value::{Mapping, Value};

/// Decode YAML text into a values tree.
///
/// An empty document decodes to [`Value::Null`].
pub fn from_yaml_str(content: &str) -> Result<Value, YamlError> {
    let docs = YamlLoader::load_from_str(content)?;
    match docs.into_iter().next() {
        Some(doc) => from_yaml(doc),
        None => Ok(Value::Null),
    }
}

/// Convert an already-parsed YAML node.
pub fn from_yaml(yaml: Yaml) -> Result<Value, YamlError> {
    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::String(s) | Yaml::Real(s) => Value::Scalar(s),
        Yaml::Integer(i) => Value::Scalar(i.to_string()),
        Yaml::Boolean(b) => Value::Scalar(b.to_string()),
        Yaml::Array(items) => Value::Sequence(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Yaml::Hash(hash) => {
            let mut map = Mapping::with_capacity(hash.len());
            for (key, value) in hash {
                map.insert(key_to_string(key)?, from_yaml(value)?);
            }
            Value::Mapping(map)
        }
        Yaml::Alias(id) => {
            return Err(YamlError::InvalidValue {
                message: format!("unresolved alias #{id}"),
            });
        }
        Yaml::BadValue => {
            return Err(YamlError::InvalidValue {
                message: "value could not be parsed".to_string(),
            });
        }
    })
}

fn key_to_string(key: Yaml) -> Result<String, YamlError> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Ok(s),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Boolean(b) => Ok(b.to_string()),
        other => Err(YamlError::UnsupportedKey {
            key: format!("{other:?}"),
        }),
    }
}

/// Convert a values tree to a YAML node. Scalars become YAML strings.
pub fn to_yaml(value: &Value) -> Yaml {
    match value {
        Value::Null => Yaml::Null,
        Value::Scalar(s) => Yaml::String(s.clone()),
        Value::Sequence(items) => Yaml::Array(items.iter().map(to_yaml).collect()),
        Value::Mapping(map) => {
            let mut hash = Hash::new();
            for (key, value) in map {
                hash.insert(Yaml::String(key.clone()), to_yaml(value));
            }
            Yaml::Hash(hash)
        }
    }
}

/// Render a values tree as a YAML document.
pub fn to_yaml_string(value: &Value) -> Result<String, YamlError> {
    let mut out = String::new();
    let mut emitter = YamlEmitter::new(&mut out);
    emitter.dump(&to_yaml(value))?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalars_keep_their_text() {
        let value = from_yaml_str("name: web\nport: 8080\nratio: 0.50\ndebug: false\nnone: ~\n")
            .unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map["name"], Value::from("web"));
        assert_eq!(map["port"], Value::from("8080"));
        assert_eq!(map["ratio"], Value::from("0.50"));
        assert_eq!(map["debug"], Value::from("false"));
        assert_eq!(map["none"], Value::Null);
    }

    #[test]
    fn test_key_order_is_preserved() {
        let value = from_yaml_str("z: 1\na: 2\nm: 3\n").unwrap();
        let keys: Vec<&str> = value
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_nested_structures() {
        let value = from_yaml_str("servers:\n  - host: a\n  - host: b\n").unwrap();
        let servers = value.as_mapping().unwrap()["servers"].as_sequence().unwrap();
        assert_eq!(servers.len(), 2);
        assert_eq!(
            servers[1].as_mapping().unwrap()["host"],
            Value::from("b")
        );
    }

    #[test]
    fn test_numeric_keys_are_stringified() {
        let value = from_yaml_str("1: one\ntrue: yes\n").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map["1"], Value::from("one"));
        assert_eq!(map["true"], Value::from("yes"));
    }

    #[test]
    fn test_complex_key_is_rejected() {
        let err = from_yaml_str("? [a, b]\n: value\n").unwrap_err();
        assert!(matches!(err, YamlError::UnsupportedKey { .. }));
    }

    #[test]
    fn test_empty_document_is_null() {
        assert_eq!(from_yaml_str("").unwrap(), Value::Null);
        assert_eq!(from_yaml_str("# only a comment\n").unwrap(), Value::Null);
    }

    #[test]
    fn test_syntax_error() {
        let err = from_yaml_str("a: [1, 2\n").unwrap_err();
        assert!(matches!(err, YamlError::Scan(_)));
    }

    #[test]
    fn test_emit_then_decode_preserves_tree() {
        let original = from_yaml_str("a:\n  - x\n  - ~\n  - b: c\n").unwrap();
        let text = to_yaml_string(&original).unwrap();
        assert_eq!(from_yaml_str(&text).unwrap(), original);
    }
}
