//! Files discovered during a directory scan.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// A single file recorded by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedFile {
    /// Path relative to the project root, `/` separated
    pub path: String,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    /// Extension without the leading dot (empty if none)
    pub extension: String,
    /// Base name
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

impl AnalyzedFile {
    /// Create a file record from its relative path, absolute path and size.
    pub fn new(path: impl Into<String>, absolute_path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        let extension = extension_of(&name);
        Self {
            path,
            absolute_path: absolute_path.into(),
            extension,
            name,
            size,
        }
    }

    /// Lowercased extension, for classification.
    pub fn extension_lower(&self) -> String {
        self.extension.to_ascii_lowercase()
    }

    /// Whether the file sits directly under the project root.
    pub fn is_root_level(&self) -> bool {
        !self.path.contains('/')
    }
}

/// Extension of a file name, following `Path::extension` rules
/// (`.gitignore` has none, `archive.tar.gz` has `gz`).
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string()
}

/// Path of `path` relative to `root`, joined with `/`.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Resolve a caller-supplied relative path under `root`, refusing anything
/// that could escape it.
pub fn resolve_within(root: &Path, relative: &str) -> Option<PathBuf> {
    let candidate = Path::new(relative);
    let mut resolved = root.to_path_buf();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if resolved == root {
        return None;
    }
    Some(resolved)
}
