/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Applying a single key path assignment to a values tree.
//!
//! Semantics:
//! - Empty path: the node is replaced by the scalar (prior structure is dropped)
//! - Null: materialized as a sequence for `[n]` and a mapping for `.name`
//! - Mapping: descends by key, rejects index fields
//! - Sequence: descends by index, growing with null holes, rejects map keys
//! - Scalar: cannot be descended into

use crate::error::MergeError;
use crate::path::{Field, FieldKind};
use crate::value::{Mapping, NodeKind, Value};

/// Largest index a `[n]` field may address.
///
/// Growth allocates every slot up to the index, so a typo such as
/// `items[99999999999]` must fail instead of exhausting memory.
pub const MAX_SEQUENCE_INDEX: usize = 1_000_000;

/// Assign `scalar` at `fields` below `node` and return the updated node.
///
/// Mappings and sequences are updated in place; the caller stores the
/// returned node back into its own parent.
pub fn apply(node: Value, fields: &[Field], scalar: &str) -> Result<Value, MergeError> {
    let Some((field, rest)) = fields.split_first() else {
        return Ok(Value::Scalar(scalar.to_string()));
    };

    match node {
        Value::Null => {
            let materialized = if field.is_index() {
                Value::Sequence(Vec::new())
            } else {
                Value::Mapping(Mapping::new())
            };
            apply(materialized, fields, scalar)
        }
        Value::Mapping(mut map) => {
            if field.kind == FieldKind::ArrayIndex {
                return Err(type_mismatch(field, NodeKind::Mapping));
            }
            let slot = map.entry(field.name.clone()).or_default();
            let child = std::mem::take(slot);
            *slot = apply(child, rest, scalar)?;
            Ok(Value::Mapping(map))
        }
        Value::Sequence(mut items) => {
            if field.kind == FieldKind::MapKey {
                return Err(type_mismatch(field, NodeKind::Sequence));
            }
            let index = parse_index(field)?;
            if index >= items.len() {
                items.resize(index + 1, Value::Null);
            }
            let child = std::mem::take(&mut items[index]);
            items[index] = apply(child, rest, scalar)?;
            Ok(Value::Sequence(items))
        }
        Value::Scalar(_) => Err(type_mismatch(field, NodeKind::Scalar)),
    }
}

fn type_mismatch(field: &Field, found: NodeKind) -> MergeError {
    MergeError::TypeMismatch {
        field: field.to_string(),
        found,
    }
}

fn parse_index(field: &Field) -> Result<usize, MergeError> {
    let invalid = || MergeError::InvalidIndex {
        field: field.to_string(),
    };
    // `usize::from_str` accepts a leading `+`; indices are plain digits.
    if !field.name.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let index: usize = field.name.parse().map_err(|_| invalid())?;
    if index > MAX_SEQUENCE_INDEX {
        return Err(MergeError::IndexTooLarge {
            field: field.to_string(),
            max: MAX_SEQUENCE_INDEX,
        });
    }
    Ok(index)
}
