/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template parsing and evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during template operations.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Error parsing the template syntax. `line` and `column` are 1-based.
    #[error("Parse error at {line}:{column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Error loading a partial template.
    #[error("Partial not found: {name}")]
    PartialNotFound { name: String },

    /// Recursive partial inclusion detected.
    #[error("Recursive partial inclusion detected (depth > {max_depth}): {name}")]
    RecursivePartial { name: String, max_depth: usize },

    /// Unknown pipe name.
    #[error("Unknown pipe: {name}")]
    UnknownPipe { name: String },

    /// Unknown escape mode.
    #[error("Unknown escape mode: {name} (expected none, html or js)")]
    UnknownEscape { name: String },

    /// A file named by the `file` pipe could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file named by the `loadcsv` pipe could not be read or parsed.
    #[error("Failed to load CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// I/O error (e.g., reading a template file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;
