/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template parser.
//!
//! Parsing happens in two passes. The scanner splits the source into
//! literal text and `$...$` directives, dropping comments and the lines
//! of standalone block keywords. The builder then nests the directive
//! stream into conditionals and loops.
//!
//! A block keyword (`if`, `elseif`, `else`, `endif`, `for`, `sep`,
//! `endfor`) that is alone on its line, apart from spaces and tabs, removes
//! that whole line from the output, as in Pandoc.

use std::path::Path;

use crate::ast::{Conditional, ForLoop, Partial, TemplateNode, VariableRef};
use crate::error::{TemplateError, TemplateResult};
use crate::pipes::Pipe;
use crate::resolver::{
    FileSystemResolver, NullResolver, PartialResolver, remove_final_newline, resolve_partial_path,
};

/// Maximum nesting depth of partials within partials.
pub const MAX_PARTIAL_DEPTH: usize = 50;

/// A compiled template ready for evaluation.
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) nodes: Vec<TemplateNode>,
}

impl Template {
    /// Compile a template that does not use partials.
    ///
    /// A partial reference in `source` fails with
    /// [`TemplateError::PartialNotFound`].
    pub fn compile(source: &str) -> TemplateResult<Self> {
        Self::compile_with_resolver(source, Path::new("<template>"), &NullResolver)
    }

    /// Compile a template file, loading partials from its directory.
    pub fn compile_from_file(path: &Path) -> TemplateResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::compile_with_resolver(&source, path, &FileSystemResolver).map_err(|e| match e {
            TemplateError::ParseError {
                message,
                line,
                column,
            } => TemplateError::ParseError {
                message: format!("{}: {}", path.display(), message),
                line,
                column,
            },
            other => other,
        })
    }

    /// Compile `source`, loading partials through `resolver`.
    ///
    /// `template_path` is the path partial names are resolved against.
    pub fn compile_with_resolver(
        source: &str,
        template_path: &Path,
        resolver: &impl PartialResolver,
    ) -> TemplateResult<Self> {
        Self::compile_at_depth(source, template_path, resolver, 0)
    }

    fn compile_at_depth(
        source: &str,
        template_path: &Path,
        resolver: &impl PartialResolver,
        depth: usize,
    ) -> TemplateResult<Self> {
        let tokens = Scanner::new(source).scan()?;
        let mut nodes = Builder::new(source, tokens).build()?;
        resolve_partials(&mut nodes, template_path, resolver, depth)?;
        Ok(Template { nodes })
    }

    /// Get the AST nodes of this template.
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }
}

/// Load, parse and attach the body of every partial in `nodes`.
fn resolve_partials(
    nodes: &mut [TemplateNode],
    template_path: &Path,
    resolver: &impl PartialResolver,
    depth: usize,
) -> TemplateResult<()> {
    for node in nodes.iter_mut() {
        match node {
            TemplateNode::Partial(partial) => {
                if depth >= MAX_PARTIAL_DEPTH {
                    return Err(TemplateError::RecursivePartial {
                        name: partial.name.clone(),
                        max_depth: MAX_PARTIAL_DEPTH,
                    });
                }
                let source = resolver
                    .get_partial(&partial.name, template_path)
                    .ok_or_else(|| TemplateError::PartialNotFound {
                        name: partial.name.clone(),
                    })?;
                let partial_path = resolve_partial_path(&partial.name, template_path);
                let compiled = Template::compile_at_depth(
                    remove_final_newline(&source),
                    &partial_path,
                    resolver,
                    depth + 1,
                )?;
                partial.resolved = Some(compiled.nodes);
            }
            TemplateNode::Conditional(cond) => {
                for (_, body) in &mut cond.branches {
                    resolve_partials(body, template_path, resolver, depth)?;
                }
                if let Some(else_branch) = &mut cond.else_branch {
                    resolve_partials(else_branch, template_path, resolver, depth)?;
                }
            }
            TemplateNode::ForLoop(for_loop) => {
                resolve_partials(&mut for_loop.body, template_path, resolver, depth)?;
                if let Some(sep) = &mut for_loop.separator {
                    resolve_partials(sep, template_path, resolver, depth)?;
                }
            }
            TemplateNode::Literal(_) | TemplateNode::Variable(_) => {}
        }
    }
    Ok(())
}

/// 1-based line and column of byte `offset` in `source`.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset.min(source.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

fn parse_error(source: &str, offset: usize, message: impl Into<String>) -> TemplateError {
    let (line, column) = line_col(source, offset);
    TemplateError::ParseError {
        message: message.into(),
        line,
        column,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Variable(VariableRef),
    Partial(Partial),
    If(VariableRef),
    ElseIf(VariableRef),
    Else,
    EndIf,
    For(VariableRef),
    Sep,
    EndFor,
}

impl Token {
    fn is_block_keyword(&self) -> bool {
        !matches!(
            self,
            Token::Text(_) | Token::Variable(_) | Token::Partial(_)
        )
    }

    fn describe(&self) -> &'static str {
        match self {
            Token::Text(_) => "text",
            Token::Variable(_) => "variable",
            Token::Partial(_) => "partial",
            Token::If(_) => "$if$",
            Token::ElseIf(_) => "$elseif$",
            Token::Else => "$else$",
            Token::EndIf => "$endif$",
            Token::For(_) => "$for$",
            Token::Sep => "$sep$",
            Token::EndFor => "$endfor$",
        }
    }
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    text: String,
    tokens: Vec<(Token, usize)>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            text: String::new(),
            tokens: Vec::new(),
        }
    }

    fn scan(mut self) -> TemplateResult<Vec<(Token, usize)>> {
        while let Some(rel) = self.source[self.pos..].find('$') {
            let dollar = self.pos + rel;
            self.text.push_str(&self.source[self.pos..dollar]);
            let after = &self.source[dollar + 1..];

            if after.starts_with('$') {
                self.text.push('$');
                self.pos = dollar + 2;
                continue;
            }

            if after.starts_with("--") {
                self.pos = match after.find('\n') {
                    Some(nl) => dollar + 1 + nl + 1,
                    None => self.source.len(),
                };
                continue;
            }

            let (content, mut end) = if let Some(inner) = after.strip_prefix('{') {
                let close = inner
                    .find('}')
                    .ok_or_else(|| parse_error(self.source, dollar, "unterminated ${...}"))?;
                (&inner[..close], dollar + 2 + close + 1)
            } else {
                let close = after
                    .find('$')
                    .ok_or_else(|| parse_error(self.source, dollar, "unterminated $...$"))?;
                (&after[..close], dollar + 1 + close + 1)
            };

            let token = parse_directive(content.trim())
                .map_err(|message| parse_error(self.source, dollar, message))?;

            if token.is_block_keyword()
                && let Some(after_line) = self.standalone_end(dollar, end)
            {
                let line_start = self.source[..dollar].rfind('\n').map_or(0, |i| i + 1);
                let indent = &self.source[line_start..dollar];
                if self.text.ends_with(indent) {
                    self.text.truncate(self.text.len() - indent.len());
                }
                end = after_line;
            }

            self.flush_text(dollar);
            self.tokens.push((token, dollar));
            self.pos = end;
        }

        self.text.push_str(&self.source[self.pos..]);
        self.flush_text(self.source.len());
        Ok(self.tokens)
    }

    /// If the directive at `start..end` is alone on its line, return the
    /// offset just past that line's newline.
    fn standalone_end(&self, start: usize, end: usize) -> Option<usize> {
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let before = &self.source[line_start..start];
        if !before.chars().all(|c| c == ' ' || c == '\t') {
            return None;
        }

        let rest = &self.source[end..];
        if rest.is_empty() {
            Some(end)
        } else if rest.starts_with("\r\n") {
            Some(end + 2)
        } else if rest.starts_with('\n') {
            Some(end + 1)
        } else {
            None
        }
    }

    fn flush_text(&mut self, offset: usize) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.tokens.push((Token::Text(text), offset));
        }
    }
}

/// Parse the inside of a `$...$` directive.
fn parse_directive(content: &str) -> Result<Token, String> {
    match content {
        "else" => return Ok(Token::Else),
        "endif" => return Ok(Token::EndIf),
        "sep" => return Ok(Token::Sep),
        "endfor" => return Ok(Token::EndFor),
        _ => {}
    }

    if let Some(rest) = content.strip_prefix("if(") {
        return keyword_argument(content, rest).map(Token::If);
    }
    if let Some(rest) = content.strip_prefix("elseif(") {
        return keyword_argument(content, rest).map(Token::ElseIf);
    }
    if let Some(rest) = content.strip_prefix("for(") {
        return keyword_argument(content, rest).map(Token::For);
    }

    let head_end = content.find(['[', '/']).unwrap_or(content.len());
    if let Some(head) = content[..head_end].strip_suffix("()") {
        return parse_partial(head, &content[head_end..]).map(Token::Partial);
    }

    parse_variable(content).map(Token::Variable)
}

/// The `var/pipe)` that follows `if(`, `elseif(` or `for(`.
fn keyword_argument(content: &str, rest: &str) -> Result<VariableRef, String> {
    let inner = rest
        .strip_suffix(')')
        .ok_or_else(|| format!("missing ')' in {content}"))?;
    let var = parse_variable(inner.trim())?;
    if var.separator.is_some() {
        return Err(format!("unexpected separator in {content}"));
    }
    Ok(var)
}

/// `path[sep]/pipe/pipe`
fn parse_variable(content: &str) -> Result<VariableRef, String> {
    let path_end = content.find(['[', '/']).unwrap_or(content.len());
    let path = validate_path(&content[..path_end])?;
    let (separator, pipes) = parse_suffix(&content[path_end..])?;
    Ok(VariableRef {
        path: path.split('.').map(str::to_string).collect(),
        pipes,
        separator,
    })
}

/// `var:name` head and `[sep]/pipe` tail around the `()` of a partial.
fn parse_partial(head: &str, tail: &str) -> Result<Partial, String> {
    let (var, name) = match head.split_once(':') {
        Some((var, name)) => (Some(VariableRef::new(&validate_path(var)?)), name),
        None => (None, head),
    };
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("invalid partial name '{name}'"));
    }
    let (separator, pipes) = parse_suffix(tail)?;
    Ok(Partial {
        name: name.to_string(),
        var,
        separator,
        pipes,
        resolved: None,
    })
}

/// Optional `[separator]` followed by any number of `/pipe`.
fn parse_suffix(suffix: &str) -> Result<(Option<String>, Vec<Pipe>), String> {
    let mut rest = suffix;
    let mut separator = None;
    if let Some(inner) = rest.strip_prefix('[') {
        let close = inner
            .find(']')
            .ok_or_else(|| "unterminated separator '['".to_string())?;
        separator = Some(inner[..close].to_string());
        rest = &inner[close + 1..];
    }

    let mut pipes = Vec::new();
    if !rest.is_empty() {
        let Some(names) = rest.strip_prefix('/') else {
            return Err(format!("unexpected '{rest}'"));
        };
        for name in names.split('/') {
            pipes.push(name.trim().parse::<Pipe>().map_err(|e| e.to_string())?);
        }
    }
    Ok((separator, pipes))
}

fn validate_path(path: &str) -> Result<String, String> {
    let valid_segment = |seg: &str| {
        !seg.is_empty()
            && seg
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    };
    if path.split('.').all(valid_segment) {
        Ok(path.to_string())
    } else {
        Err(format!("invalid variable name '{path}'"))
    }
}

struct Builder<'a> {
    source: &'a str,
    tokens: std::vec::IntoIter<(Token, usize)>,
}

impl<'a> Builder<'a> {
    fn new(source: &'a str, tokens: Vec<(Token, usize)>) -> Self {
        Self {
            source,
            tokens: tokens.into_iter(),
        }
    }

    fn build(mut self) -> TemplateResult<Vec<TemplateNode>> {
        let (nodes, stop) = self.block()?;
        match stop {
            None => Ok(nodes),
            Some((token, offset)) => Err(self.unexpected(&token, offset)),
        }
    }

    /// Collect nodes until a block keyword that closes or splits the
    /// enclosing block, which is returned to the caller.
    fn block(&mut self) -> TemplateResult<(Vec<TemplateNode>, Option<(Token, usize)>)> {
        let mut nodes = Vec::new();
        while let Some((token, offset)) = self.tokens.next() {
            match token {
                Token::Text(text) => nodes.push(TemplateNode::Literal(text)),
                Token::Variable(var) => nodes.push(TemplateNode::Variable(var)),
                Token::Partial(partial) => nodes.push(TemplateNode::Partial(partial)),
                Token::If(var) => nodes.push(self.conditional(var, offset)?),
                Token::For(var) => nodes.push(self.for_loop(var, offset)?),
                stop => return Ok((nodes, Some((stop, offset)))),
            }
        }
        Ok((nodes, None))
    }

    fn conditional(&mut self, first: VariableRef, start: usize) -> TemplateResult<TemplateNode> {
        let mut cond = Conditional::default();
        let mut condition = first;
        loop {
            let (body, stop) = self.block()?;
            cond.branches.push((condition, body));
            match stop {
                Some((Token::ElseIf(next), _)) => condition = next,
                Some((Token::Else, _)) => {
                    let (else_body, stop) = self.block()?;
                    match stop {
                        Some((Token::EndIf, _)) => {}
                        Some((token, offset)) => return Err(self.unexpected(&token, offset)),
                        None => return Err(parse_error(self.source, start, "unclosed $if$")),
                    }
                    cond.else_branch = Some(else_body);
                    break;
                }
                Some((Token::EndIf, _)) => break,
                Some((token, offset)) => return Err(self.unexpected(&token, offset)),
                None => return Err(parse_error(self.source, start, "unclosed $if$")),
            }
        }
        Ok(TemplateNode::Conditional(cond))
    }

    fn for_loop(&mut self, var: VariableRef, start: usize) -> TemplateResult<TemplateNode> {
        let (body, stop) = self.block()?;
        let separator = match stop {
            Some((Token::EndFor, _)) => None,
            Some((Token::Sep, _)) => {
                let (sep, stop) = self.block()?;
                match stop {
                    Some((Token::EndFor, _)) => Some(sep),
                    Some((token, offset)) => return Err(self.unexpected(&token, offset)),
                    None => return Err(parse_error(self.source, start, "unclosed $for$")),
                }
            }
            Some((token, offset)) => return Err(self.unexpected(&token, offset)),
            None => return Err(parse_error(self.source, start, "unclosed $for$")),
        };
        Ok(TemplateNode::ForLoop(ForLoop {
            var,
            body,
            separator,
        }))
    }

    fn unexpected(&self, token: &Token, offset: usize) -> TemplateError {
        parse_error(self.source, offset, format!("unexpected {}", token.describe()))
    }
}
