/*
 * escape.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Escaping of interpolated values. Literal template text is never escaped.

use std::str::FromStr;

use crate::error::TemplateError;

/// How interpolated values are escaped on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Escape {
    #[default]
    None,
    /// Escape `& < > " '` for HTML text and attributes.
    Html,
    /// Escape for inclusion inside a JavaScript string literal.
    Js,
}

impl FromStr for Escape {
    type Err = TemplateError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "" | "none" => Ok(Escape::None),
            "html" => Ok(Escape::Html),
            "js" => Ok(Escape::Js),
            _ => Err(TemplateError::UnknownEscape {
                name: name.to_string(),
            }),
        }
    }
}

impl Escape {
    pub fn apply(self, text: &str) -> String {
        match self {
            Escape::None => text.to_string(),
            Escape::Html => escape_html(text),
            Escape::Js => escape_js(text),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_js(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '&' => out.push_str("\\u0026"),
            '=' => out.push_str("\\u003D"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("html".parse::<Escape>().unwrap(), Escape::Html);
        assert_eq!("none".parse::<Escape>().unwrap(), Escape::None);
        assert!("xml".parse::<Escape>().is_err());
    }

    #[test]
    fn test_html() {
        assert_eq!(
            Escape::Html.apply(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&#34;x&#34;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_js() {
        assert_eq!(Escape::Js.apply("it's <b>"), "it\\'s \\u003Cb\\u003E");
        assert_eq!(Escape::Js.apply("a\nb"), "a\\u000Ab");
    }

    #[test]
    fn test_none_is_identity() {
        assert_eq!(Escape::None.apply("<&>"), "<&>");
    }
}
