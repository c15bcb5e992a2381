/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! stencil - render template sets against YAML values

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use stencil::{DebugFormat, RenderOptions, ValuesSource};
use stencil_template::Escape;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "stencil")]
#[command(version)]
#[command(about = "Render template sets against YAML values", long_about = None)]
struct Args {
    /// Template set to render, a directory below --dir
    #[arg(value_name = "NAME")]
    name: Option<String>,

    /// Templates to render, relative to the set (default: every *.template)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Templates root directory
    #[arg(short = 'd', long, default_value = ".")]
    dir: PathBuf,

    /// Set a value (KEY=VALUE), applied in order after the values file
    #[arg(long = "set", value_name = "KEY=VALUE", allow_hyphen_values = true)]
    assignments: Vec<String>,

    /// Base values file [default: ./values.yaml if present; '' for none].
    /// Scalars `true` and `false` act as booleans in $if$
    #[arg(short = 'f', long = "values", value_name = "FILE")]
    values: Option<String>,

    /// Output: '-' for stdout, a file name with an extension, or a directory
    #[arg(short = 'o', long, default_value = "-")]
    output: String,

    /// Separator line written between outputs on stdout or in a single file
    #[arg(long, allow_hyphen_values = true)]
    sep: Option<String>,

    /// Escaping of interpolated values (none, html, js)
    #[arg(long, alias = "safe-writer", default_value = "none")]
    escape: Escape,

    /// Rename the extension of output files in directory mode
    #[arg(short = 'e', long, allow_hyphen_values = true)]
    extension: Option<String>,

    /// Print the final values to stderr
    #[arg(long)]
    debug_values: bool,

    /// Format of --debug-values
    #[arg(long, value_enum, default_value_t = DebugFormat::Yaml)]
    debug_format: DebugFormat,

    /// Verbose logging (-v for info, -vv for debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<Args> for RenderOptions {
    fn from(args: Args) -> Self {
        RenderOptions {
            dir: args.dir,
            name: args.name,
            files: args.files,
            assignments: args.assignments,
            values: ValuesSource::from_arg(args.values.as_deref()),
            output: args.output,
            separator: args.sep,
            extension: args.extension,
            escape: args.escape,
            debug_values: args.debug_values.then_some(args.debug_format),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "stencil=warn",
        1 => "stencil=info",
        _ => "stencil=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = RenderOptions::from(args);
    stencil::run(&options, &mut std::io::stderr())
}
