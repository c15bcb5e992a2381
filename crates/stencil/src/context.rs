/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template context building.
//!
//! Converts the final values tree into template values and binds it, along
//! with the process environment, into a [`TemplateContext`].

use std::collections::HashMap;

use stencil_template::{TemplateContext, TemplateValue};
use stencil_values::Value;

/// Name the whole values tree is bound to.
pub const VALUES_VARIABLE: &str = "values";

/// Name the process environment is bound to.
pub const ENV_VARIABLE: &str = "env";

/// Name of the shared map available to every template, empty at start.
pub const GLOBAL_VARIABLE: &str = "global";

/// Convert a values tree to a template value.
///
/// - Null → Null
/// - Scalar `true` / `false` → Bool, so `debug: false` is falsy in `$if$`
/// - any other Scalar → String
/// - Mapping → Map
/// - Sequence → List, holes stay Null
///
/// Booleans render back as `true` / `false`, so output text is unchanged.
pub fn value_to_template(value: &Value) -> TemplateValue {
    match value {
        Value::Null => TemplateValue::Null,
        Value::Scalar(s) => match s.as_str() {
            "true" => TemplateValue::Bool(true),
            "false" => TemplateValue::Bool(false),
            _ => TemplateValue::String(s.clone()),
        },
        Value::Mapping(m) => TemplateValue::Map(
            m.iter()
                .map(|(k, v)| (k.clone(), value_to_template(v)))
                .collect(),
        ),
        Value::Sequence(items) => TemplateValue::List(items.iter().map(value_to_template).collect()),
    }
}

/// Build the root context for rendering.
///
/// `values`, `env` and `global` are bound first. When the tree is a
/// mapping each of its top-level keys is then bound as a variable of its
/// own, so a values key named `env` shadows the environment.
pub fn build_context<I, K, V>(values: &Value, env: I) -> TemplateContext<'static>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let env: HashMap<String, TemplateValue> = env
        .into_iter()
        .map(|(k, v)| (k.into(), TemplateValue::String(v.into())))
        .collect();

    let mut ctx = TemplateContext::new();
    ctx.insert(VALUES_VARIABLE, value_to_template(values));
    ctx.insert(ENV_VARIABLE, TemplateValue::Map(env));
    ctx.insert(GLOBAL_VARIABLE, TemplateValue::Map(HashMap::new()));

    if let Some(mapping) = values.as_mapping() {
        for (key, value) in mapping {
            ctx.insert(key.clone(), value_to_template(value));
        }
    }
    ctx
}
