/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Key paths for `--set` assignments.
//!
//! A key such as `servers[0].ports[1]` is split into typed fields:
//! `.` descends into a mapping and `[n]` into a sequence. A leading `.` is
//! optional. There is no escaping; the first `]` always closes an index.

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::PathError;

/// What kind of node a field addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `.name`
    MapKey,
    /// `[name]`
    ArrayIndex,
}

/// One segment of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn map_key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::MapKey,
        }
    }

    pub fn index(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::ArrayIndex,
        }
    }

    pub fn is_index(&self) -> bool {
        self.kind == FieldKind::ArrayIndex
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FieldKind::MapKey => write!(f, ".{}", self.name),
            FieldKind::ArrayIndex => write!(f, "[{}]", self.name),
        }
    }
}

/// A validated key path: non-empty, starts with a map key, no empty names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath(Vec<Field>);

impl KeyPath {
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.0
    }
}

impl Deref for KeyPath {
    type Target = [Field];

    fn deref(&self) -> &[Field] {
        &self.0
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            match field.kind {
                FieldKind::MapKey if i == 0 => f.write_str(&field.name)?,
                _ => write!(f, "{field}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

/// Split off the next field of `key`, returning it with the remainder.
fn next_field(key: &str) -> (Field, &str) {
    if let Some(rest) = key.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => (Field::index(&rest[..end]), &rest[end + 1..]),
            // Unterminated index: swallow the rest so tokenizing always advances.
            None => (Field::index(""), ""),
        };
    }

    let body = key.strip_prefix('.').unwrap_or(key);
    match body.find(['.', '[']) {
        Some(end) => (Field::map_key(&body[..end]), &body[end..]),
        None => (Field::map_key(body), ""),
    }
}

/// Tokenize `key` into fields without validating them.
///
/// Never fails. `"."` yields one empty map key, `"[]"` one empty index and
/// `"a..b"` an empty field between `a` and `b`; [`parse_path`] rejects all
/// of these.
pub fn split_fields(key: &str) -> Vec<Field> {
    let mut fields = Vec::new();
    let mut rest = key;
    while !rest.is_empty() {
        let (field, remainder) = next_field(rest);
        fields.push(field);
        rest = remainder;
    }
    fields
}

/// Parse and validate an assignment key.
pub fn parse_path(key: &str) -> Result<KeyPath, PathError> {
    let fields = split_fields(key);

    let valid = match fields.first() {
        None => false,
        Some(first) => !first.is_index() && fields.iter().all(|f| !f.name.is_empty()),
    };
    if !valid {
        return Err(PathError::InvalidKeyField {
            key: key.to_string(),
        });
    }

    Ok(KeyPath(fields))
}
