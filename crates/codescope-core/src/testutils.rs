//! Test utilities for Codescope.
//!
//! Provides project fixtures and stub import extractors.

use crate::error::{Error, Result};
use crate::imports::ImportExtractor;
use tempfile::TempDir;

/// Builder for a throwaway project directory.
#[derive(Default)]
pub struct ProjectFixture {
    files: Vec<(String, String)>,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file at a `/`-separated relative path.
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    /// Write every file into a fresh temporary directory.
    pub fn build(self) -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for (path, content) in self.files {
            let full = dir.path().join(&path);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
            }
            std::fs::write(&full, content).expect("Failed to write fixture file");
        }
        dir
    }
}

/// Treats every `import ... 'x'` line as an import of `x`.
pub struct LineExtractor;

impl ImportExtractor for LineExtractor {
    fn extract(&self, source: &str, _extension: &str) -> Result<Vec<String>> {
        Ok(source
            .lines()
            .filter(|line| line.trim_start().starts_with("import "))
            .filter_map(|line| {
                let start = line.find(|c: char| c == '\'' || c == '"')?;
                let rest = &line[start + 1..];
                let end = rest.find(|c: char| c == '\'' || c == '"')?;
                Some(rest[..end].to_string())
            })
            .collect())
    }
}

/// Always fails.
pub struct FailingExtractor;

impl ImportExtractor for FailingExtractor {
    fn extract(&self, _source: &str, _extension: &str) -> Result<Vec<String>> {
        Err(Error::Parse("stub failure".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_fixture_writes_nested_files() {
        let dir = ProjectFixture::new().file("a/b/c.txt", "hi").build();
        let content = std::fs::read_to_string(dir.path().join("a/b/c.txt")).unwrap();
        assert_eq!(content, "hi");
    }

    #[test]
    fn test_line_extractor() {
        let imports = LineExtractor
            .extract("import a from 'alpha'\nconst b = 1;\nimport \"beta\";\n", "js")
            .unwrap();
        assert_eq!(imports, vec!["alpha", "beta"]);
    }
}
