//! Ignore rules: fixed defaults merged with a project's `.gitignore`.

use crate::error::Result;
use ::ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Patterns that are always excluded from a scan.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "coverage",
    ".next",
    ".cache",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    "*.log",
    ".DS_Store",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
];

/// Name of the project-local ignore file.
pub const IGNORE_FILE: &str = ".gitignore";

/// Compiled gitignore matcher for `/`-separated paths relative to the root.
#[derive(Debug, Clone)]
pub struct IgnoreRules {
    matcher: Gitignore,
    patterns: Vec<String>,
}

impl IgnoreRules {
    /// Compile rules from gitignore-style lines.
    ///
    /// Lines that fail to compile are logged and skipped.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(".");
        let mut kept = Vec::new();
        add_lines(&mut builder, None, patterns, &mut kept);
        Self::finish(builder, kept)
    }

    /// Default rules only.
    pub fn defaults() -> Result<Self> {
        Self::new(DEFAULT_IGNORE_PATTERNS)
    }

    /// Defaults, extra patterns, then the project's `.gitignore` if present.
    ///
    /// Later rules win, so a `!pattern` in `.gitignore` can re-include a
    /// path excluded by the defaults.
    pub fn for_project(root: &Path, extra: &[String]) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        let mut kept = Vec::new();
        add_lines(&mut builder, None, DEFAULT_IGNORE_PATTERNS, &mut kept);
        add_lines(&mut builder, None, extra, &mut kept);

        let ignore_file = root.join(IGNORE_FILE);
        if ignore_file.is_file() {
            match std::fs::read_to_string(&ignore_file) {
                Ok(content) => add_lines(
                    &mut builder,
                    Some(&ignore_file),
                    parse_ignore_file(&content),
                    &mut kept,
                ),
                Err(e) => tracing::warn!("Could not read {}: {}", ignore_file.display(), e),
            }
        }

        Self::finish(builder, kept)
    }

    fn finish(builder: GitignoreBuilder, patterns: Vec<String>) -> Result<Self> {
        Ok(Self {
            matcher: builder.build()?,
            patterns,
        })
    }

    /// Whether a relative path is excluded, either directly or through one
    /// of its parent directories.
    pub fn is_ignored(&self, relative: &str, is_dir: bool) -> bool {
        self.matcher
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }

    /// The source patterns that compiled successfully.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn add_lines<I, S>(
    builder: &mut GitignoreBuilder,
    from: Option<&Path>,
    lines: I,
    kept: &mut Vec<String>,
) where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match builder.add_line(from.map(Path::to_path_buf), line) {
            Ok(_) => kept.push(line.to_string()),
            Err(e) => tracing::warn!("Skipping ignore pattern '{}': {}", line, e),
        }
    }
}

/// Extract rules from ignore-file content: one per line, blank lines and
/// `#` comments dropped.
pub fn parse_ignore_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
