/*
 * integration_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for stencil-template using test fixtures.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use stencil_template::{Escape, Template, TemplateContext, TemplateError, TemplateValue};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_template(name: &str) -> Template {
    Template::compile_from_file(&fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load template {name}: {e}"))
}

fn server(host: &str, port: &str) -> TemplateValue {
    let mut fields = HashMap::new();
    fields.insert("host".to_string(), TemplateValue::from(host));
    fields.insert("port".to_string(), TemplateValue::from(port));
    TemplateValue::Map(fields)
}

#[test]
fn test_simple_interpolation() {
    let template = load_template("simple.template");

    let mut ctx = TemplateContext::new();
    ctx.insert("name", TemplateValue::from("World"));

    assert_eq!(template.render(&ctx).unwrap(), "Hello, World!");
}

#[test]
fn test_page_with_partial_loop_and_conditional() {
    let template = load_template("page.template");

    let mut ctx = TemplateContext::new();
    ctx.insert("title", TemplateValue::from("demo"));
    ctx.insert(
        "servers",
        TemplateValue::List(vec![server("a", "1"), server("b", "2")]),
    );

    assert_eq!(
        template.render(&ctx).unwrap(),
        "# DEMO\n- a:1\n- b:2\ndebug off\n"
    );

    ctx.insert("debug", TemplateValue::Bool(true));
    assert_eq!(
        template.render(&ctx).unwrap(),
        "# DEMO\n- a:1\n- b:2\ndebug on\n"
    );
}

#[test]
fn test_empty_context_renders_structure_only() {
    let template = load_template("page.template");
    assert_eq!(
        template.render(&TemplateContext::new()).unwrap(),
        "# \ndebug off\n"
    );
}

#[test]
fn test_html_escaping() {
    let template = load_template("escaped.template");

    let mut ctx = TemplateContext::new();
    ctx.insert("title", TemplateValue::from(r#"a "b""#));
    ctx.insert(
        "items",
        TemplateValue::List(vec![TemplateValue::from("<x>"), TemplateValue::from("y")]),
    );

    assert_eq!(
        template.render_with(&ctx, Escape::Html).unwrap(),
        "<p title=\"a &#34;b&#34;\">$ &lt;x&gt;, y (2)</p>\n"
    );
    assert_eq!(
        template.render(&ctx).unwrap(),
        "<p title=\"a \"b\"\">$ <x>, y (2)</p>\n"
    );
}

#[test]
fn test_parse_error_names_file_and_position() {
    let path = fixture_path("broken.template");
    let err = Template::compile_from_file(&path).unwrap_err();
    match err {
        TemplateError::ParseError {
            message,
            line,
            column,
        } => {
            assert!(message.contains("broken.template"), "{message}");
            assert!(message.ends_with("unclosed $if$"), "{message}");
            assert_eq!((line, column), (2, 1));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_missing_file() {
    let err = Template::compile_from_file(&fixture_path("nope.template")).unwrap_err();
    assert!(matches!(err, TemplateError::Io(_)));
}

#[test]
fn test_missing_partial_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let main = dir.path().join("main.template");
    std::fs::write(&main, "$absent()$\n").unwrap();

    let err = Template::compile_from_file(&main).unwrap_err();
    assert!(matches!(err, TemplateError::PartialNotFound { name } if name == "absent"));
}
