/*
 * writer.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Output writer for rendered templates.
//!
//! The `--output` argument selects one of three destinations:
//!
//! - `-`: every output goes to stdout, one after another
//! - a path whose file name contains a `.`: every output goes to that file
//! - any other path: a directory with one file per template
//!
//! The first two are single-stream modes, where an optional separator line
//! is written between consecutive outputs. Directory mode can rename the
//! extension of each output file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where rendered outputs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Stdout,
    File(PathBuf),
    Directory(PathBuf),
}

impl OutputMode {
    pub fn from_arg(output: &str) -> Self {
        if output == "-" {
            return OutputMode::Stdout;
        }
        let path = PathBuf::from(output);
        let is_file = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().contains('.'));
        if is_file {
            OutputMode::File(path)
        } else {
            OutputMode::Directory(path)
        }
    }
}

enum Sink {
    Stream(BufWriter<Box<dyn Write>>),
    Directory {
        dir: PathBuf,
        extension: Option<String>,
    },
}

/// Writes rendered template outputs to the selected destination.
pub struct OutputWriter {
    sink: Sink,
    separator: Option<String>,
    written: usize,
}

impl OutputWriter {
    /// Open the destination for `mode`.
    ///
    /// `separator` applies only to single-stream modes and `extension` only
    /// to directory mode. Empty strings count as unset. The output directory
    /// and the parent of an output file are created as needed.
    pub fn create(
        mode: &OutputMode,
        separator: Option<&str>,
        extension: Option<&str>,
    ) -> io::Result<Self> {
        let sink = match mode {
            OutputMode::Stdout => Sink::Stream(BufWriter::new(Box::new(io::stdout()))),
            OutputMode::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                Sink::Stream(BufWriter::new(Box::new(File::create(path)?)))
            }
            OutputMode::Directory(dir) => {
                fs::create_dir_all(dir)?;
                Sink::Directory {
                    dir: dir.clone(),
                    extension: extension
                        .map(|ext| ext.trim_start_matches('.'))
                        .filter(|ext| !ext.is_empty())
                        .map(str::to_string),
                }
            }
        };

        Ok(Self {
            sink,
            separator: separator
                .filter(|sep| !sep.is_empty())
                .map(|sep| format!("{sep}\n")),
            written: 0,
        })
    }

    /// Write the output rendered from template `name`, a path relative to
    /// the template set. Returns the file written in directory mode.
    pub fn write_output(&mut self, name: &Path, content: &str) -> io::Result<Option<PathBuf>> {
        let written = match &mut self.sink {
            Sink::Stream(out) => {
                if self.written > 0
                    && let Some(sep) = &self.separator
                {
                    out.write_all(sep.as_bytes())?;
                }
                out.write_all(content.as_bytes())?;
                None
            }
            Sink::Directory { dir, extension } => {
                let mut target = dir.join(name);
                if let Some(ext) = extension {
                    target.set_extension(ext);
                }
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&target, content)?;
                Some(target)
            }
        };
        self.written += 1;
        Ok(written)
    }

    /// Flush any buffered output.
    pub fn finish(self) -> io::Result<()> {
        match self.sink {
            Sink::Stream(mut out) => out.flush(),
            Sink::Directory { .. } => Ok(()),
        }
    }
}
