/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template AST types.

use crate::pipes::Pipe;

/// A node in the template AST.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// Literal text to be output as-is.
    Literal(String),

    /// Variable interpolation: `$var$` or `$obj.field$`
    Variable(VariableRef),

    /// Conditional block: `$if(var)$...$else$...$endif$`
    Conditional(Conditional),

    /// For loop: `$for(var)$...$sep$...$endfor$`
    ForLoop(ForLoop),

    /// Partial (sub-template): `$partial()$` or `$var:partial()$`
    Partial(Partial),
}

/// Conditional block: `$if(var)$...$elseif(var)$...$else$...$endif$`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Conditional {
    /// List of (condition, body) pairs for if/elseif branches.
    pub branches: Vec<(VariableRef, Vec<TemplateNode>)>,
    /// Optional else branch.
    pub else_branch: Option<Vec<TemplateNode>>,
}

/// For loop: `$for(var)$...$sep$...$endfor$`
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    /// Variable to iterate over.
    pub var: VariableRef,
    /// Loop body.
    pub body: Vec<TemplateNode>,
    /// Optional separator between iterations (from `$sep$`).
    pub separator: Option<Vec<TemplateNode>>,
}

/// Partial (sub-template): `$partial()$` or `$var:partial()$`
#[derive(Debug, Clone, PartialEq)]
pub struct Partial {
    /// Partial template name.
    pub name: String,
    /// Optional variable to apply the partial to.
    pub var: Option<VariableRef>,
    /// Literal separator when `var` is a list (from `$var:partial()[, ]$`).
    pub separator: Option<String>,
    /// Pipes applied to the partial output.
    pub pipes: Vec<Pipe>,
    /// Parsed partial body. `None` until partials are resolved.
    pub resolved: Option<Vec<TemplateNode>>,
}

/// A reference to a variable, possibly with pipes and separator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariableRef {
    /// Path components (e.g., `["employee", "salary"]` for `employee.salary`).
    pub path: Vec<String>,
    /// Pipes to apply to the variable value, left to right.
    pub pipes: Vec<Pipe>,
    /// Literal separator for list values (from `$var[, ]$`).
    pub separator: Option<String>,
}

impl VariableRef {
    /// Create a variable reference from a dotted path.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.split('.').map(str::to_string).collect(),
            ..Default::default()
        }
    }

    /// The name bound inside a `for` loop over this variable.
    pub fn binding_name(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }
}
