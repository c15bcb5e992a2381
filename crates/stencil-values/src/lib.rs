/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Values trees for stencil templates.
//!
//! A values tree is seeded from an optional YAML document and then
//! modified by `key=value` assignments, where the key is a path such as
//! `servers[0].host`:
//!
//! - `.name` descends into a mapping, creating it when absent
//! - `[n]` descends into a sequence, growing it with null holes
//! - the value is always stored as raw text
//!
//! # Example
//!
//! ```rust
//! use stencil_values::{Value, overlay};
//!
//! let values = overlay(None, ["servers[1].host=db", "name=prod"]).unwrap();
//! let servers = values.as_mapping().unwrap()["servers"].as_sequence().unwrap();
//! assert_eq!(servers[0], Value::Null);
//! ```

pub mod error;
pub mod merge;
pub mod overlay;
pub mod path;
pub mod value;
pub mod yaml;

pub use error::{LoadError, MergeError, OverlayError, PathError, YamlError};
pub use merge::apply;
pub use overlay::{Assignment, load_values, overlay};
pub use path::{Field, FieldKind, KeyPath, parse_path, split_fields};
pub use value::{Mapping, NodeKind, Value};
pub use yaml::{from_yaml_str, to_yaml_string};
