/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rendering driver.
//!
//! Loads values, finds the templates of a template set, renders each one
//! against the values and hands the results to the [`OutputWriter`].

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use stencil_template::{Escape, Template, TemplateContext};
use stencil_values::{Value, load_values, to_yaml_string};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::context::build_context;
use crate::writer::{OutputMode, OutputWriter};

/// File extension of templates found by discovery.
pub const TEMPLATE_EXTENSION: &str = "template";

/// File name prefix of partials, which discovery skips.
pub const PARTIAL_PREFIX: &str = "_";

/// Values file read when `--values` is not given.
pub const DEFAULT_VALUES_FILE: &str = "./values.yaml";

/// Which base values document to load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValuesSource {
    /// [`DEFAULT_VALUES_FILE`] if it exists, otherwise no base document.
    #[default]
    Default,
    /// A file that must exist.
    File(PathBuf),
    /// No base document.
    Disabled,
}

impl ValuesSource {
    /// Interpret the `--values` argument. An empty string disables the
    /// base document.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => ValuesSource::Default,
            Some("") => ValuesSource::Disabled,
            Some(path) => ValuesSource::File(PathBuf::from(path)),
        }
    }

    fn resolve(&self) -> Option<PathBuf> {
        match self {
            ValuesSource::Default => {
                let path = PathBuf::from(DEFAULT_VALUES_FILE);
                if path.exists() {
                    Some(path)
                } else {
                    debug!("No {DEFAULT_VALUES_FILE}, starting from empty values");
                    None
                }
            }
            ValuesSource::File(path) => Some(path.clone()),
            ValuesSource::Disabled => None,
        }
    }
}

/// Format of the `--debug-values` dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DebugFormat {
    #[default]
    Yaml,
    Json,
}

/// Everything one run of the renderer needs.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Root directory holding template sets.
    pub dir: PathBuf,
    /// Template set name, a directory below `dir`.
    pub name: Option<String>,
    /// Templates to render, relative to the set. Empty means all of them.
    pub files: Vec<PathBuf>,
    pub assignments: Vec<String>,
    pub values: ValuesSource,
    /// Raw `--output` argument.
    pub output: String,
    pub separator: Option<String>,
    pub extension: Option<String>,
    pub escape: Escape,
    pub debug_values: Option<DebugFormat>,
}

/// Run the renderer. The values dump, if requested, goes to `debug_out`.
pub fn run(options: &RenderOptions, debug_out: &mut dyn Write) -> Result<()> {
    if options.name.is_none() && options.debug_values.is_none() {
        bail!("specify a template set name");
    }

    let values_file = options.values.resolve();
    let values = load_values(values_file.as_deref(), &options.assignments)?;

    if let Some(format) = options.debug_values {
        let dump = dump_values(&values, format)?;
        debug_out
            .write_all(dump.as_bytes())
            .context("Failed to write values dump")?;
    }

    let Some(name) = &options.name else {
        return Ok(());
    };
    validate_set_name(name)?;

    let set_dir = options.dir.join(name);
    let files = if options.files.is_empty() {
        let found = discover_templates(&set_dir)?;
        if found.is_empty() {
            bail!("No templates found in {}", set_dir.display());
        }
        found
    } else {
        options.files.clone()
    };
    info!(set = %set_dir.display(), count = files.len(), "Rendering template set");

    let ctx = build_context(&values, std::env::vars());
    let mode = OutputMode::from_arg(&options.output);
    let mut writer = OutputWriter::create(
        &mode,
        options.separator.as_deref(),
        options.extension.as_deref(),
    )
    .with_context(|| format!("Failed to open output {}", options.output))?;

    render_templates(
        &options.dir,
        &set_dir,
        &files,
        &ctx,
        options.escape,
        &mut writer,
    )?;
    writer.finish().context("Failed to flush output")?;
    Ok(())
}

/// Render the final values for `--debug-values`.
pub fn dump_values(values: &Value, format: DebugFormat) -> Result<String> {
    match format {
        DebugFormat::Yaml => Ok(to_yaml_string(values)?),
        DebugFormat::Json => {
            let mut json = serde_json::to_string_pretty(values)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Reject template set names that could escape the templates root.
pub fn validate_set_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains("..") {
        bail!("Invalid template set name: {name}");
    }
    Ok(())
}

/// Every `*.template` file below `set_dir` except partials, relative to it,
/// in sorted order.
pub fn discover_templates(set_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(set_dir) {
        let entry = entry
            .with_context(|| format!("Failed to read template set {}", set_dir.display()))?;
        let path = entry.path();
        if entry.file_type().is_file() && is_renderable(path) {
            let relative = path
                .strip_prefix(set_dir)
                .context("Failed to compute relative template path")?;
            files.push(relative.to_path_buf());
        }
    }
    files.sort();
    debug!(count = files.len(), set = %set_dir.display(), "Discovered templates");
    Ok(files)
}

/// A `*.template` file that is not a partial. Partials start with `_`.
fn is_renderable(path: &Path) -> bool {
    let is_partial = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with(PARTIAL_PREFIX));
    !is_partial && path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION)
}

/// Compile and render each template of `files`, in order, into `writer`.
/// The `file` and `loadcsv` pipes read relative to `root`.
pub fn render_templates(
    root: &Path,
    set_dir: &Path,
    files: &[PathBuf],
    ctx: &TemplateContext,
    escape: Escape,
    writer: &mut OutputWriter,
) -> Result<()> {
    for file in files {
        let path = set_dir.join(file);
        debug!(template = %path.display(), "Rendering template");

        let template = Template::compile_from_file(&path)
            .with_context(|| format!("Failed to load template {}", path.display()))?;
        let rendered = template
            .render_in(ctx, escape, root)
            .with_context(|| format!("Failed to render template {}", path.display()))?;

        if let Some(target) = writer
            .write_output(file, &rendered)
            .with_context(|| format!("Failed to write output of {}", file.display()))?
        {
            info!(output = %target.display(), "Wrote output");
        }
    }
    Ok(())
}
