/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Partial template resolution.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Loads partial templates by name.
pub trait PartialResolver {
    /// Load the source of partial `name`, referenced from the template at
    /// `base_path`. Returns `None` when the partial does not exist.
    fn get_partial(&self, name: &str, base_path: &Path) -> Option<String>;
}

/// Loads partials from files next to the referencing template.
///
/// A partial name without an extension takes the extension of the
/// referencing template, so `$header()$` inside `page.template` reads
/// `header.template`.
#[derive(Debug, Clone, Default)]
pub struct FileSystemResolver;

impl PartialResolver for FileSystemResolver {
    fn get_partial(&self, name: &str, base_path: &Path) -> Option<String> {
        let partial_path = resolve_partial_path(name, base_path);
        tracing::debug!(partial = %partial_path.display(), "Loading partial");
        std::fs::read_to_string(&partial_path).ok()
    }
}

/// Resolver with no partials at all.
#[derive(Debug, Clone, Default)]
pub struct NullResolver;

impl PartialResolver for NullResolver {
    fn get_partial(&self, _name: &str, _base_path: &Path) -> Option<String> {
        None
    }
}

/// Partials held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    partials: HashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.partials.insert(name.into(), content.into());
        self
    }

    pub fn with_partials(
        partials: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        let mut resolver = Self::new();
        for (name, content) in partials {
            resolver.add(name, content);
        }
        resolver
    }
}

impl PartialResolver for MemoryResolver {
    fn get_partial(&self, name: &str, _base_path: &Path) -> Option<String> {
        self.partials.get(name).cloned()
    }
}

/// Path of partial `partial_name` relative to the template at `base_path`.
pub fn resolve_partial_path(partial_name: &str, base_path: &Path) -> PathBuf {
    let base_dir = base_path.parent().unwrap_or(Path::new("."));
    let joined = base_dir.join(partial_name);

    if Path::new(partial_name).extension().is_some() {
        return joined;
    }
    match base_path.extension() {
        Some(ext) => joined.with_extension(ext),
        None => joined,
    }
}

/// Strip one trailing newline so a partial on its own line does not add a
/// blank line.
pub fn remove_final_newline(content: &str) -> &str {
    content.strip_suffix('\n').unwrap_or(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_partial_path() {
        let base = Path::new("/templates/app/main.template");
        assert_eq!(
            resolve_partial_path("header", base),
            PathBuf::from("/templates/app/header.template")
        );
        assert_eq!(
            resolve_partial_path("header.txt", base),
            PathBuf::from("/templates/app/header.txt")
        );
        assert_eq!(
            resolve_partial_path("inc/footer", base),
            PathBuf::from("/templates/app/inc/footer.template")
        );
        assert_eq!(
            resolve_partial_path("header", Path::new("/templates/main")),
            PathBuf::from("/templates/header")
        );
    }

    #[test]
    fn test_remove_final_newline() {
        assert_eq!(remove_final_newline("hello\n"), "hello");
        assert_eq!(remove_final_newline("hello"), "hello");
        assert_eq!(remove_final_newline("hello\n\n"), "hello\n");
    }

    #[test]
    fn test_memory_and_null_resolvers() {
        let resolver = MemoryResolver::with_partials([("a", "content a")]);
        let base = Path::new("/x.template");
        assert_eq!(resolver.get_partial("a", base), Some("content a".to_string()));
        assert_eq!(resolver.get_partial("b", base), None);
        assert_eq!(NullResolver.get_partial("a", base), None);
    }

    #[test]
    fn test_file_system_resolver() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("row.template"), "<$it$>\n").unwrap();
        let base = dir.path().join("main.template");
        assert_eq!(
            FileSystemResolver.get_partial("row", &base),
            Some("<$it$>\n".to_string())
        );
        assert_eq!(FileSystemResolver.get_partial("missing", &base), None);
    }
}
