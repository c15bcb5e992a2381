/*
 * overlay.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Overlaying `key=value` assignments onto a base values tree.
//!
//! Assignments are applied strictly in order. The first failing
//! assignment aborts the whole run and nothing built so far is returned.

use std::path::Path;

use tracing::{debug, trace};

use crate::error::{LoadError, OverlayError};
use crate::merge::apply;
use crate::path::parse_path;
use crate::value::Value;
use crate::yaml::from_yaml_str;

/// A `key=value` pair taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub value: String,
}

impl Assignment {
    /// Split `raw` on its first `=`. The value is kept verbatim and may
    /// itself contain `=`.
    pub fn parse(raw: &str) -> Result<Self, OverlayError> {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| OverlayError::MalformedAssignment {
                raw: raw.to_string(),
            })?;
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Apply this assignment to `tree`, consuming it.
    pub fn apply_to(&self, tree: Value) -> Result<Value, OverlayError> {
        let path = parse_path(&self.key)?;
        apply(tree, &path, &self.value).map_err(|source| OverlayError::MergeFailed {
            key: self.key.clone(),
            source,
        })
    }
}

/// Apply every raw assignment, in order, on top of `base`.
pub fn overlay<I>(base: Option<Value>, assignments: I) -> Result<Value, OverlayError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut tree = base.unwrap_or_default();
    for raw in assignments {
        let assignment = Assignment::parse(raw.as_ref())?;
        trace!(key = %assignment.key, "Applying assignment");
        tree = assignment.apply_to(tree)?;
    }
    Ok(tree)
}

/// Read the optional YAML base document and overlay `assignments` on it.
pub fn load_values<I>(base_file: Option<&Path>, assignments: I) -> Result<Value, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let base = match base_file {
        Some(path) => {
            debug!(path = %path.display(), "Loading values file");
            let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let decoded = from_yaml_str(&content).map_err(|source| LoadError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
            Some(decoded)
        }
        None => None,
    };

    Ok(overlay(base, assignments)?)
}
