/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render template sets against a YAML values file with `key=value`
//! overrides.
//!
//! The values pipeline lives in `stencil-values` and the template engine in
//! `stencil-template`; this crate wires them to the file system.

pub mod context;
pub mod render;
pub mod writer;

pub use context::{build_context, value_to_template};
pub use render::{DebugFormat, RenderOptions, ValuesSource, run};
pub use writer::{OutputMode, OutputWriter};
