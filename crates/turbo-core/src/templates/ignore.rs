//! Glob patterns excluding files from placeholder rendering
//!
//! Patterns are matched against `/`-separated paths relative to the project
//! root with npm `glob` conventions: `*` and `?` stay within one segment,
//! `**` spans any number of segments, and `{a,b}` / `[ab]` are supported.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Always excluded: installed dependencies and git internals are never rendered
pub const DEFAULT_IGNORE: &[&str] = &["**/node_modules/**", "**/.git/**"];

#[derive(Debug, Clone)]
pub struct IgnoreSet {
    files: GlobSet,
    /// Directories whose whole subtree is excluded (`<dir>/**` patterns)
    dirs: GlobSet,
}

impl IgnoreSet {
    /// Template patterns unioned with [`DEFAULT_IGNORE`]
    ///
    /// A pattern that fails to parse is logged and dropped.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut files = GlobSetBuilder::new();
        let mut dirs = GlobSetBuilder::new();

        let patterns = DEFAULT_IGNORE
            .iter()
            .copied()
            .chain(patterns.iter().map(|p| p.as_ref()))
            .map(|p| p.trim().trim_start_matches("./"))
            .filter(|p| !p.is_empty());

        for pattern in patterns {
            let Some(glob) = compile(pattern) else {
                continue;
            };
            files.add(glob);
            if let Some(dir) = pattern.strip_suffix("/**").and_then(compile) {
                dirs.add(dir);
            }
        }

        Self {
            files: build(files),
            dirs: build(dirs),
        }
    }

    /// Whether the file at `relative` (a path under the project root) is excluded
    pub fn is_ignored(&self, relative: &Path) -> bool {
        self.files.is_match(relative)
    }

    /// Whether the directory at `relative` can be skipped without descending
    pub fn is_ignored_dir(&self, relative: &Path) -> bool {
        self.dirs.is_match(relative)
    }
}

fn compile(pattern: &str) -> Option<Glob> {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Some(glob),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "ignoring invalid ignore pattern");
            None
        }
    }
}

fn build(builder: GlobSetBuilder) -> GlobSet {
    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to build ignore set");
        GlobSet::empty()
    })
}
