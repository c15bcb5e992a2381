/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template value and context types.
//!
//! These types are independent of the values tree that feeds them;
//! conversion happens in the command-line crate.

use std::collections::HashMap;

/// A value that can be used in template evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TemplateValue {
    /// A string value.
    String(String),

    /// A boolean value.
    Bool(bool),

    /// A list of values.
    List(Vec<TemplateValue>),

    /// A map of string keys to values.
    Map(HashMap<String, TemplateValue>),

    /// A null/missing value.
    #[default]
    Null,
}

impl TemplateValue {
    /// Check if this value is "truthy" for conditional evaluation.
    ///
    /// Truthiness rules (matching Pandoc):
    /// - Any non-empty map is truthy
    /// - Any array containing at least one truthy value is truthy
    /// - Any non-empty string is truthy (even "false")
    /// - Boolean true is truthy
    /// - Everything else is falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            TemplateValue::Bool(b) => *b,
            TemplateValue::String(s) => !s.is_empty(),
            TemplateValue::List(items) => items.iter().any(TemplateValue::is_truthy),
            TemplateValue::Map(m) => !m.is_empty(),
            TemplateValue::Null => false,
        }
    }

    /// Get a nested field by path. A numeric segment indexes into a list,
    /// so `servers.1.host` reads the second element of `servers`.
    pub fn get_path(&self, path: &[&str]) -> Option<&TemplateValue> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };

        match self {
            TemplateValue::Map(m) => m.get(*first).and_then(|v| v.get_path(rest)),
            TemplateValue::List(items) => {
                let index: usize = first.parse().ok()?;
                items.get(index)?.get_path(rest)
            }
            _ => None,
        }
    }

    /// Render this value as a string for output.
    ///
    /// - String: returned as-is
    /// - Bool: "true" or "false"
    /// - List: concatenation of rendered elements
    /// - Map: "true"
    /// - Null: ""
    pub fn render(&self) -> String {
        match self {
            TemplateValue::String(s) => s.clone(),
            TemplateValue::Bool(b) => b.to_string(),
            TemplateValue::List(items) => items.iter().map(TemplateValue::render).collect(),
            TemplateValue::Map(_) => "true".to_string(),
            TemplateValue::Null => String::new(),
        }
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

/// Variable bindings for template evaluation.
///
/// Nested scopes (loop bodies, partials) borrow their parent instead of
/// copying it, so a child context is cheap to create per iteration.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext<'p> {
    variables: HashMap<String, TemplateValue>,
    parent: Option<&'p TemplateContext<'p>>,
}

impl<'p> TemplateContext<'p> {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: TemplateValue) {
        self.variables.insert(key.into(), value);
    }

    /// Get a variable from the context, checking parent scopes.
    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.variables
            .get(key)
            .or_else(|| self.parent.and_then(|p| p.get(key)))
    }

    /// Get a variable by path (e.g., `["employee", "salary"]`).
    pub fn get_path(&self, path: &[&str]) -> Option<&TemplateValue> {
        let (first, rest) = path.split_first()?;
        self.get(first).and_then(|v| v.get_path(rest))
    }

    /// Create a child context for a nested scope.
    pub fn child(&self) -> TemplateContext<'_> {
        TemplateContext {
            variables: HashMap::new(),
            parent: Some(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(TemplateValue::Bool(true).is_truthy());
        assert!(!TemplateValue::Bool(false).is_truthy());

        assert!(TemplateValue::from("hello").is_truthy());
        assert!(TemplateValue::from("false").is_truthy());
        assert!(!TemplateValue::from("").is_truthy());

        assert!(TemplateValue::List(vec![TemplateValue::Bool(true)]).is_truthy());
        assert!(!TemplateValue::List(vec![TemplateValue::Null]).is_truthy());
        assert!(!TemplateValue::List(vec![]).is_truthy());

        let mut map = HashMap::new();
        map.insert("key".to_string(), TemplateValue::Null);
        assert!(TemplateValue::Map(map).is_truthy());

        assert!(!TemplateValue::Map(HashMap::new()).is_truthy());
        assert!(!TemplateValue::Null.is_truthy());
    }

    #[test]
    fn test_get_path() {
        let mut inner = HashMap::new();
        inner.insert("salary".to_string(), TemplateValue::from("50000"));
        let mut outer = HashMap::new();
        outer.insert("employee".to_string(), TemplateValue::Map(inner));
        let value = TemplateValue::Map(outer);

        assert_eq!(
            value.get_path(&["employee", "salary"]),
            Some(&TemplateValue::from("50000"))
        );
        assert_eq!(value.get_path(&["employee", "name"]), None);
        assert_eq!(value.get_path(&["nonexistent"]), None);
    }

    #[test]
    fn test_get_path_indexes_lists() {
        let mut host = HashMap::new();
        host.insert("host".to_string(), TemplateValue::from("web"));
        let servers = TemplateValue::List(vec![TemplateValue::Null, TemplateValue::Map(host)]);
        let mut root = HashMap::new();
        root.insert("servers".to_string(), servers);
        let value = TemplateValue::Map(root);

        assert_eq!(
            value.get_path(&["servers", "1", "host"]),
            Some(&TemplateValue::from("web"))
        );
        assert_eq!(value.get_path(&["servers", "0"]), Some(&TemplateValue::Null));
        assert_eq!(value.get_path(&["servers", "2", "host"]), None);
        assert_eq!(value.get_path(&["servers", "host"]), None);
    }

    #[test]
    fn test_context_scoping() {
        let mut parent = TemplateContext::new();
        parent.insert("x", TemplateValue::from("parent_x"));
        parent.insert("y", TemplateValue::from("parent_y"));

        let mut child = parent.child();
        child.insert("x", TemplateValue::from("child_x"));

        assert_eq!(child.get("x"), Some(&TemplateValue::from("child_x")));
        assert_eq!(child.get("y"), Some(&TemplateValue::from("parent_y")));
        assert_eq!(parent.get("x"), Some(&TemplateValue::from("parent_x")));
    }

    #[test]
    fn test_render_list_and_map() {
        let list = TemplateValue::List(vec![TemplateValue::from("a"), TemplateValue::Null]);
        assert_eq!(list.render(), "a");
        assert_eq!(TemplateValue::Map(HashMap::new()).render(), "true");
        assert_eq!(TemplateValue::Bool(false).render(), "false");
    }
}
