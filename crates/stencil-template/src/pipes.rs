/*
 * pipes.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Pipes: value transformations written as `$var/pipe$`.
//!
//! `file` and `loadcsv` treat the value as a file name relative to the
//! render root and replace it with the file's content.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::context::TemplateValue;
use crate::error::{TemplateError, TemplateResult};

/// A pipe transformation applied to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipe {
    Uppercase,
    Lowercase,
    /// Number of items in a list or map, or characters in a string.
    Length,
    Reverse,
    First,
    Last,
    /// Double-quoted string with Go-style escapes.
    Quote,
    /// Text of the named file.
    File,
    /// Rows of the named CSV file, as maps keyed by the header row.
    LoadCsv,
}

impl FromStr for Pipe {
    type Err = TemplateError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(match name {
            "uppercase" => Pipe::Uppercase,
            "lowercase" => Pipe::Lowercase,
            "length" => Pipe::Length,
            "reverse" => Pipe::Reverse,
            "first" => Pipe::First,
            "last" => Pipe::Last,
            "quote" => Pipe::Quote,
            "file" => Pipe::File,
            "loadcsv" => Pipe::LoadCsv,
            _ => {
                return Err(TemplateError::UnknownPipe {
                    name: name.to_string(),
                });
            }
        })
    }
}

impl Pipe {
    /// Apply this pipe to `value`. Only `file` and `loadcsv` touch `root`,
    /// and only they can fail.
    pub fn apply(self, value: TemplateValue, root: &Path) -> TemplateResult<TemplateValue> {
        Ok(match self {
            Pipe::Uppercase => map_strings(value, &|s| s.to_uppercase()),
            Pipe::Lowercase => map_strings(value, &|s| s.to_lowercase()),
            Pipe::Length => {
                let len = match &value {
                    TemplateValue::List(items) => items.len(),
                    TemplateValue::Map(m) => m.len(),
                    TemplateValue::String(s) => s.chars().count(),
                    TemplateValue::Bool(_) => 1,
                    TemplateValue::Null => 0,
                };
                TemplateValue::String(len.to_string())
            }
            Pipe::Reverse => match value {
                TemplateValue::List(mut items) => {
                    items.reverse();
                    TemplateValue::List(items)
                }
                TemplateValue::String(s) => TemplateValue::String(s.chars().rev().collect()),
                other => other,
            },
            Pipe::First => match value {
                TemplateValue::List(items) => items.into_iter().next().unwrap_or_default(),
                other => other,
            },
            Pipe::Last => match value {
                TemplateValue::List(items) => items.into_iter().last().unwrap_or_default(),
                other => other,
            },
            Pipe::Quote => TemplateValue::String(quote(&value.render())),
            Pipe::File => TemplateValue::String(read_file(&root.join(value.render()))?),
            Pipe::LoadCsv => load_csv(&root.join(value.render()))?,
        })
    }
}

fn read_file(path: &Path) -> TemplateResult<String> {
    debug!(path = %path.display(), "Reading file");
    fs::read_to_string(path).map_err(|source| TemplateError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a CSV file whose first record is the header. Every later record
/// must have as many fields as the header.
fn load_csv(path: &Path) -> TemplateResult<TemplateValue> {
    debug!(path = %path.display(), "Loading CSV");
    let csv_error = |source| TemplateError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let header = reader.headers().map_err(csv_error)?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let row: HashMap<String, TemplateValue> = header
            .iter()
            .zip(record.iter())
            .map(|(key, field)| (key.to_string(), TemplateValue::from(field)))
            .collect();
        rows.push(TemplateValue::Map(row));
    }
    Ok(TemplateValue::List(rows))
}

fn map_strings(value: TemplateValue, f: &dyn Fn(&str) -> String) -> TemplateValue {
    match value {
        TemplateValue::String(s) => TemplateValue::String(f(&s)),
        TemplateValue::List(items) => {
            TemplateValue::List(items.into_iter().map(|v| map_strings(v, f)).collect())
        }
        TemplateValue::Map(m) => {
            TemplateValue::Map(m.into_iter().map(|(k, v)| (k, map_strings(v, f))).collect())
        }
        other => other,
    }
}

/// Quote `s` as a double-quoted literal, escaping quotes, backslashes and
/// control characters. Printable non-ASCII characters are kept.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{0c}' => out.push_str("\\f"),
            c if c.is_control() => {
                let code = c as u32;
                if code < 0x80 {
                    out.push_str(&format!("\\x{code:02x}"));
                } else {
                    out.push_str(&format!("\\u{code:04x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
