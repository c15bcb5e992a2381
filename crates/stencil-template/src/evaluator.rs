/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template evaluation engine.
//!
//! Evaluation walks the parsed nodes against a [`TemplateContext`] and
//! writes straight into an output string. Escaping applies only to
//! interpolated variable values.

use std::borrow::Cow;
use std::path::Path;

use crate::ast::{Conditional, ForLoop, Partial, TemplateNode, VariableRef};
use crate::context::{TemplateContext, TemplateValue};
use crate::error::{TemplateError, TemplateResult};
use crate::escape::Escape;
use crate::parser::Template;
use crate::pipes::Pipe;

impl Template {
    /// Render this template with the given context, without escaping.
    pub fn render(&self, context: &TemplateContext) -> TemplateResult<String> {
        self.render_with(context, Escape::None)
    }

    /// Render this template, escaping every interpolated value with `escape`.
    /// Files named by the `file` and `loadcsv` pipes are read relative to
    /// the working directory.
    pub fn render_with(&self, context: &TemplateContext, escape: Escape) -> TemplateResult<String> {
        self.render_in(context, escape, Path::new(""))
    }

    /// Like [`Template::render_with`], with `file` and `loadcsv` reading
    /// relative to `root`.
    pub fn render_in(
        &self,
        context: &TemplateContext,
        escape: Escape,
        root: &Path,
    ) -> TemplateResult<String> {
        let mut out = String::new();
        Evaluator { escape, root }.evaluate(&self.nodes, context, &mut out)?;
        Ok(out)
    }
}

struct Evaluator<'a> {
    escape: Escape,
    root: &'a Path,
}

impl Evaluator<'_> {
    fn evaluate(
        &self,
        nodes: &[TemplateNode],
        context: &TemplateContext,
        out: &mut String,
    ) -> TemplateResult<()> {
        for node in nodes {
            self.evaluate_node(node, context, out)?;
        }
        Ok(())
    }

    fn evaluate_node(
        &self,
        node: &TemplateNode,
        context: &TemplateContext,
        out: &mut String,
    ) -> TemplateResult<()> {
        match node {
            TemplateNode::Literal(text) => out.push_str(text),
            TemplateNode::Variable(var) => self.render_variable(var, context, out)?,
            TemplateNode::Conditional(cond) => self.evaluate_conditional(cond, context, out)?,
            TemplateNode::ForLoop(for_loop) => self.evaluate_for_loop(for_loop, context, out)?,
            TemplateNode::Partial(partial) => self.evaluate_partial(partial, context, out)?,
        }
        Ok(())
    }

    fn render_variable(
        &self,
        var: &VariableRef,
        context: &TemplateContext,
        out: &mut String,
    ) -> TemplateResult<()> {
        let value = self.value_of(var, context)?;

        match (&var.separator, value.as_ref()) {
            (Some(sep), TemplateValue::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(sep);
                    }
                    out.push_str(&self.escape.apply(&item.render()));
                }
            }
            (_, value) => out.push_str(&self.escape.apply(&value.render())),
        }
        Ok(())
    }

    /// Value of `var` after its pipes. Unbound variables are null.
    fn value_of<'c>(
        &self,
        var: &VariableRef,
        context: &'c TemplateContext,
    ) -> TemplateResult<Cow<'c, TemplateValue>> {
        let value = resolve(var, context);
        if var.pipes.is_empty() {
            return Ok(value.map_or(Cow::Owned(TemplateValue::Null), Cow::Borrowed));
        }
        let value = value.cloned().unwrap_or_default();
        Ok(Cow::Owned(self.apply_pipes(&var.pipes, value)?))
    }

    fn apply_pipes(&self, pipes: &[Pipe], value: TemplateValue) -> TemplateResult<TemplateValue> {
        pipes
            .iter()
            .try_fold(value, |value, pipe| pipe.apply(value, self.root))
    }

    fn evaluate_conditional(
        &self,
        cond: &Conditional,
        context: &TemplateContext,
        out: &mut String,
    ) -> TemplateResult<()> {
        for (condition, body) in &cond.branches {
            if self.value_of(condition, context)?.is_truthy() {
                return self.evaluate(body, context, out);
            }
        }

        match &cond.else_branch {
            Some(else_body) => self.evaluate(else_body, context, out),
            None => Ok(()),
        }
    }

    fn evaluate_for_loop(
        &self,
        for_loop: &ForLoop,
        context: &TemplateContext,
        out: &mut String,
    ) -> TemplateResult<()> {
        let value = self.value_of(&for_loop.var, context)?;
        let items = iteration_items(&value);
        if items.is_empty() {
            return Ok(());
        }

        let separator = match &for_loop.separator {
            Some(sep_nodes) => {
                let mut sep = String::new();
                self.evaluate(sep_nodes, context, &mut sep)?;
                Some(sep)
            }
            None => None,
        };

        let var_name = for_loop.var.binding_name();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0
                && let Some(sep) = &separator
            {
                out.push_str(sep);
            }
            // Pandoc binds the item both to the loop variable and to `it`.
            let mut child = context.child();
            child.insert(var_name, item.clone());
            child.insert("it", item.clone());
            self.evaluate(&for_loop.body, &child, out)?;
        }
        Ok(())
    }

    fn evaluate_partial(
        &self,
        partial: &Partial,
        context: &TemplateContext,
        out: &mut String,
    ) -> TemplateResult<()> {
        let Some(body) = &partial.resolved else {
            return Err(TemplateError::PartialNotFound {
                name: partial.name.clone(),
            });
        };

        let mut rendered = String::new();
        match &partial.var {
            None => self.evaluate(body, context, &mut rendered)?,
            Some(var) => {
                let value = self.value_of(var, context)?;
                let items = iteration_items(&value);
                for (i, item) in items.into_iter().enumerate() {
                    if i > 0
                        && let Some(sep) = &partial.separator
                    {
                        rendered.push_str(sep);
                    }
                    let mut child = context.child();
                    if let TemplateValue::Map(fields) = item {
                        for (key, value) in fields {
                            child.insert(key.clone(), value.clone());
                        }
                    }
                    child.insert("it", item.clone());
                    self.evaluate(body, &child, &mut rendered)?;
                }
            }
        }

        if partial.pipes.is_empty() {
            out.push_str(&rendered);
        } else {
            let value = self.apply_pipes(&partial.pipes, TemplateValue::String(rendered))?;
            out.push_str(&value.render());
        }
        Ok(())
    }
}

fn resolve<'a>(var: &VariableRef, context: &'a TemplateContext) -> Option<&'a TemplateValue> {
    let path: Vec<&str> = var.path.iter().map(String::as_str).collect();
    context.get_path(&path)
}

/// Items a loop runs over: each element of a list, or the value itself
/// once when it is a map or any other truthy value.
fn iteration_items(value: &TemplateValue) -> Vec<&TemplateValue> {
    match value {
        TemplateValue::List(items) => items.iter().collect(),
        v if v.is_truthy() => vec![v],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MemoryResolver;
    use std::collections::HashMap;
    use std::path::Path;

    fn compile(source: &str) -> Template {
        Template::compile(source).expect("template should parse")
    }

    fn ctx() -> TemplateContext<'static> {
        TemplateContext::new()
    }

    fn list(items: &[&str]) -> TemplateValue {
        TemplateValue::List(items.iter().map(|s| TemplateValue::from(*s)).collect())
    }

    fn map(entries: &[(&str, &str)]) -> TemplateValue {
        TemplateValue::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), TemplateValue::from(*v)))
                .collect(),
        )
    }

    #[test]
    fn test_literal_text() {
        assert_eq!(compile("Hello, world!").render(&ctx()).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_simple_and_missing_variable() {
        let template = compile("Hello, $name$!");
        assert_eq!(template.render(&ctx()).unwrap(), "Hello, !");

        let mut ctx = ctx();
        ctx.insert("name", TemplateValue::from("Alice"));
        assert_eq!(template.render(&ctx).unwrap(), "Hello, Alice!");
    }

    #[test]
    fn test_nested_variable() {
        let mut ctx = ctx();
        ctx.insert("employee", map(&[("salary", "50000")]));
        assert_eq!(
            compile("Salary: $employee.salary$").render(&ctx).unwrap(),
            "Salary: 50000"
        );
    }

    #[test]
    fn test_list_with_separator_and_pipes() {
        let mut ctx = ctx();
        ctx.insert("items", list(&["a", "b", "c"]));
        assert_eq!(compile("$items$").render(&ctx).unwrap(), "abc");
        assert_eq!(
            compile("$items[, ]/uppercase/reverse$").render(&ctx).unwrap(),
            "C, B, A"
        );
        assert_eq!(compile("$items/length$").render(&ctx).unwrap(), "3");
        assert_eq!(compile("$missing/length$").render(&ctx).unwrap(), "0");
    }

    #[test]
    fn test_conditionals() {
        let template = compile("$if(a)$A$elseif(b)$B$else$C$endif$");
        assert_eq!(template.render(&ctx()).unwrap(), "C");

        let mut ctx = ctx();
        ctx.insert("b", TemplateValue::from("yes"));
        assert_eq!(template.render(&ctx).unwrap(), "B");

        ctx.insert("a", TemplateValue::Bool(true));
        assert_eq!(template.render(&ctx).unwrap(), "A");
    }

    #[test]
    fn test_string_false_is_truthy() {
        let mut ctx = ctx();
        ctx.insert("flag", TemplateValue::from("false"));
        assert_eq!(compile("$if(flag)$on$endif$").render(&ctx).unwrap(), "on");
    }

    #[test]
    fn test_for_loop_binds_name_and_it() {
        let mut ctx = ctx();
        ctx.insert("xs", list(&["1", "2", "3"]));
        assert_eq!(
            compile("$for(xs)$[$xs$=$it$]$sep$,$endfor$").render(&ctx).unwrap(),
            "[1=1],[2=2],[3=3]"
        );
    }

    #[test]
    fn test_for_loop_over_map_and_scalar() {
        let mut ctx = ctx();
        ctx.insert("server", map(&[("host", "db"), ("port", "5432")]));
        ctx.insert("single", TemplateValue::from("only"));
        assert_eq!(
            compile("$for(server)$$server.host$:$it.port$$endfor$")
                .render(&ctx)
                .unwrap(),
            "db:5432"
        );
        assert_eq!(
            compile("$for(single)$<$it$>$endfor$").render(&ctx).unwrap(),
            "<only>"
        );
        assert_eq!(compile("$for(none)$x$endfor$").render(&ctx).unwrap(), "");
    }

    #[test]
    fn test_loop_scope_does_not_leak() {
        let mut ctx = ctx();
        ctx.insert("xs", list(&["a"]));
        assert_eq!(
            compile("$for(xs)$$it$$endfor$|$it$").render(&ctx).unwrap(),
            "a|"
        );
    }

    #[test]
    fn test_escaping_applies_to_values_only() {
        let mut ctx = ctx();
        ctx.insert("title", TemplateValue::from("Tom & <Jerry>"));
        let template = compile("<h1>$title$</h1>");
        assert_eq!(
            template.render_with(&ctx, Escape::Html).unwrap(),
            "<h1>Tom &amp; &lt;Jerry&gt;</h1>"
        );
        assert_eq!(template.render(&ctx).unwrap(), "<h1>Tom & <Jerry></h1>");
    }

    #[test]
    fn test_partials() {
        let resolver = MemoryResolver::with_partials([
            ("greet", "Hi $name$"),
            ("row", "$host$:$port$"),
            ("item", "<$it$>"),
        ]);
        let template = Template::compile_with_resolver(
            "$greet()$ $servers:row()[; ]$ $xs:item()/uppercase$",
            Path::new("main.template"),
            &resolver,
        )
        .unwrap();

        let mut ctx = ctx();
        ctx.insert("name", TemplateValue::from("Ann"));
        ctx.insert(
            "servers",
            TemplateValue::List(vec![
                map(&[("host", "a"), ("port", "1")]),
                map(&[("host", "b"), ("port", "2")]),
            ]),
        );
        ctx.insert("xs", list(&["x", "y"]));
        assert_eq!(
            template.render(&ctx).unwrap(),
            "Hi Ann a:1; b:2 <X><Y>"
        );
    }

    #[test]
    fn test_map_render_in_context() {
        let mut ctx = ctx();
        ctx.insert("m", TemplateValue::Map(HashMap::new()));
        assert_eq!(compile("[$m$]").render(&ctx).unwrap(), "[true]");
    }

    #[test]
    fn test_numeric_segment_indexes_list() {
        let mut ctx = ctx();
        ctx.insert(
            "servers",
            TemplateValue::List(vec![map(&[("host", "db")]), map(&[("host", "web")])]),
        );
        assert_eq!(
            compile("[$servers.1.host$] [$servers.0.host$] [$servers.2.host$]")
                .render(&ctx)
                .unwrap(),
            "[web] [db] []"
        );
        assert_eq!(
            compile("$if(servers.1)$second$endif$").render(&ctx).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_file_pipes_read_from_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("banner.txt"), "WELCOME").unwrap();
        std::fs::write(dir.path().join("users.csv"), "name,role\nann,admin\nbob,dev\n").unwrap();

        let mut ctx = ctx();
        ctx.insert("banner", TemplateValue::from("banner.txt"));
        ctx.insert("users", TemplateValue::from("users.csv"));

        let template = compile("$for(users/loadcsv)$$it.name$=$it.role$$sep$,$endfor$");
        assert_eq!(
            template.render_in(&ctx, Escape::None, dir.path()).unwrap(),
            "ann=admin,bob=dev"
        );

        let template = compile("$banner/file/lowercase$: $users/loadcsv/length$ users");
        assert_eq!(
            template.render_in(&ctx, Escape::None, dir.path()).unwrap(),
            "welcome: 2 users"
        );

        let err = compile("$banner/file$")
            .render_in(&ctx, Escape::None, Path::new("/nonexistent-root"))
            .unwrap_err();
        assert!(matches!(err, TemplateError::FileRead { .. }));
    }
}
