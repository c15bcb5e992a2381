/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for key parsing, merging, overlays and YAML decoding.
//!
//! Each layer has its own small closed enum so callers can match on the
//! kind of failure instead of the message text.

use std::path::PathBuf;

use thiserror::Error;

use crate::value::NodeKind;

/// A key string that does not describe a usable path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Empty key, empty field name, or a key starting with an index.
    #[error("Invalid key field: {key}")]
    InvalidKeyField { key: String },
}

/// A path that disagrees with the shape of the tree it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// The field kind does not match the node, or the node is a scalar.
    ///
    /// `field` is the display form of the accessor (`.name` or `[name]`),
    /// `found` the kind of node it was applied to.
    #[error("{}", type_mismatch_message(.field, .found))]
    TypeMismatch { field: String, found: NodeKind },

    /// An index field whose name is not plain decimal digits.
    #[error("Invalid sequence index: {field}")]
    InvalidIndex { field: String },

    /// A numeric index beyond the largest sequence that may be grown.
    #[error("Sequence index too large: {field} (maximum is {max})")]
    IndexTooLarge { field: String, max: usize },
}

fn type_mismatch_message(field: &str, found: &NodeKind) -> String {
    match found {
        NodeKind::Mapping => format!("Cannot index a mapping with {field}"),
        NodeKind::Sequence => format!("Cannot address a sequence with {field}"),
        NodeKind::Scalar | NodeKind::Null => {
            format!("Cannot assign through a {found} value at {field}")
        }
    }
}

/// Failure of a whole overlay run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// An assignment without `=`.
    #[error("Invalid assign expression: {raw}")]
    MalformedAssignment { raw: String },

    #[error(transparent)]
    InvalidKey(#[from] PathError),

    #[error("Cannot assign {key}: {source}")]
    MergeFailed {
        key: String,
        #[source]
        source: MergeError,
    },
}

/// Errors converting between YAML and the values tree.
#[derive(Debug, Error)]
pub enum YamlError {
    #[error("YAML syntax error: {0}")]
    Scan(#[from] yaml_rust2::ScanError),

    /// Mapping keys must be scalars.
    #[error("Unsupported mapping key: {key}")]
    UnsupportedKey { key: String },

    /// Aliases that did not resolve and values the scanner could not type.
    #[error("Invalid YAML value: {message}")]
    InvalidValue { message: String },

    #[error("Failed to emit YAML: {0}")]
    Emit(#[from] yaml_rust2::EmitError),
}

/// Failure to produce the final values tree.
///
/// Reading and decoding the base document are distinct from overlay
/// failures: they happen before any assignment is applied.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read values file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode values file {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: YamlError,
    },

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}
