/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Pandoc-style document templates.
//!
//! Supported syntax:
//!
//! - Variable interpolation: `$variable$` or `${variable}`
//! - Nested field access: `$server.host$`, with numeric segments indexing
//!   lists: `$servers.0.host$`
//! - Conditionals: `$if(var)$...$elseif(other)$...$else$...$endif$`
//! - For loops: `$for(items)$...$sep$...$endfor$`
//! - Partials: `$partial()$` or `$var:partial()[sep]$`
//! - Literal list separators: `$items[, ]$`
//! - Pipes: `$var/uppercase$`, chained left to right, also inside `if(...)`
//!   and `for(...)`. `file` and `loadcsv` read the named file relative to
//!   the render root.
//! - Comments: `$-- comment` up to end of line
//! - `$$` for a literal dollar sign
//!
//! The engine works on its own [`TemplateValue`] and [`TemplateContext`]
//! types and knows nothing about where values come from.
//!
//! # Example
//!
//! ```
//! use stencil_template::{Template, TemplateContext, TemplateValue};
//!
//! let template = Template::compile("Hello, $name$!").unwrap();
//!
//! let mut ctx = TemplateContext::new();
//! ctx.insert("name", TemplateValue::from("World"));
//!
//! assert_eq!(template.render(&ctx).unwrap(), "Hello, World!");
//! ```

pub mod ast;
pub mod context;
pub mod error;
pub mod escape;
pub mod evaluator;
pub mod parser;
pub mod pipes;
pub mod resolver;

pub use ast::{Conditional, ForLoop, Partial, TemplateNode, VariableRef};
pub use context::{TemplateContext, TemplateValue};
pub use error::{TemplateError, TemplateResult};
pub use escape::Escape;
pub use parser::{MAX_PARTIAL_DEPTH, Template};
pub use pipes::Pipe;
pub use resolver::{FileSystemResolver, MemoryResolver, NullResolver, PartialResolver};
