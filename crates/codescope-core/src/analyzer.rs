//! Project analysis.
//!
//! Walks a project directory, respecting ignore rules, and produces the file
//! list, file tree, tech stack, entry points and per-file import lists.

use crate::error::{Error, Result};
use crate::file::{relative_path, resolve_within, AnalyzedFile};
use crate::ignore::IgnoreRules;
use crate::imports::{is_script_extension, DependencyMap, ImportExtractor};
use crate::stack::{PackageManifest, TechStack};
use crate::tree::FileTree;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

/// Number of source files scanned for imports unless configured otherwise.
pub const DEFAULT_MAX_IMPORT_FILES: usize = 50;

const ENTRY_STEMS: &[&str] = &["index", "main", "app", "server"];
const ENTRY_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "py"];
const HTML_ENTRY_POINTS: &[&str] = &["index.html", "public/index.html"];

/// Tuning knobs for an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Cap on the number of source files scanned for imports
    pub max_import_files: usize,
    /// Ignore patterns on top of the defaults and `.gitignore`
    pub extra_ignores: Vec<String>,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            max_import_files: DEFAULT_MAX_IMPORT_FILES,
            extra_ignores: Vec::new(),
        }
    }
}

/// Headline numbers for an analyzed project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub total_files: usize,
    pub total_size: u64,
    /// File count per lowercased extension (`""` for none)
    pub extensions: BTreeMap<String, usize>,
    pub description: String,
}

impl ProjectSummary {
    fn new(name: String, files: &[AnalyzedFile], stack: &TechStack) -> Self {
        let total_size = files.iter().map(|f| f.size).sum();
        let mut extensions = BTreeMap::new();
        for file in files {
            *extensions.entry(file.extension_lower()).or_insert(0) += 1;
        }

        let stack_names = stack.names();
        let description = if stack_names.is_empty() {
            format!("{}: {} files, {} bytes", name, files.len(), total_size)
        } else {
            format!(
                "{}: {} files, {} bytes, built with {}",
                name,
                files.len(),
                total_size,
                stack_names.join(", ")
            )
        };

        Self {
            name,
            total_files: files.len(),
            total_size,
            extensions,
            description,
        }
    }
}

/// Result of analyzing one project directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub summary: ProjectSummary,
    pub file_tree: FileTree,
    pub tech_stack: TechStack,
    pub entry_points: Vec<String>,
    pub file_count: usize,
    pub dependencies: DependencyMap,
    pub files: Vec<AnalyzedFile>,
}

impl ProjectAnalysis {
    /// Case-insensitive regex search over this analysis' files.
    pub fn search(&self, pattern: &str) -> Result<Vec<&AnalyzedFile>> {
        search_files(&self.files, pattern)
    }

    /// Look up a recorded file by relative path.
    pub fn file(&self, path: &str) -> Option<&AnalyzedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Analyzes project directories.
pub struct ProjectAnalyzer {
    extractor: Arc<dyn ImportExtractor>,
    options: AnalyzerOptions,
}

impl ProjectAnalyzer {
    /// Create an analyzer with default options.
    pub fn new(extractor: Arc<dyn ImportExtractor>) -> Self {
        Self {
            extractor,
            options: AnalyzerOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Analyze the project rooted at `root`.
    pub fn analyze(&self, root: &Path) -> Result<ProjectAnalysis> {
        if !root.is_dir() {
            return Err(Error::NotFound(format!(
                "project directory {}",
                root.display()
            )));
        }

        let ignore = IgnoreRules::for_project(root, &self.options.extra_ignores)?;
        let files = self.scan(root, &ignore);

        let manifest = match PackageManifest::load(root) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Skipping malformed package.json in {}: {}", root.display(), e);
                None
            }
        };

        let tech_stack = TechStack::detect(manifest.as_ref(), &files);
        let entry_points = find_entry_points(&files);
        let dependencies = self.extract_dependencies(&files);
        let file_tree = FileTree::build(&files)?;

        let name = manifest
            .as_ref()
            .and_then(|m| m.name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| {
                root.file_name()
                    .map(|n| n.to_string_lossy().to_string())
            })
            .unwrap_or_else(|| "project".to_string());
        let summary = ProjectSummary::new(name, &files, &tech_stack);

        tracing::info!(
            "Analyzed {}: {} files, {} technologies, {} files with imports",
            root.display(),
            files.len(),
            tech_stack.len(),
            dependencies.len()
        );

        Ok(ProjectAnalysis {
            summary,
            file_tree,
            tech_stack,
            entry_points,
            file_count: files.len(),
            dependencies,
            files,
        })
    }

    /// Enumerate non-ignored files under `root`, sorted by relative path.
    pub fn scan(&self, root: &Path, ignore: &IgnoreRules) -> Vec<AnalyzedFile> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                match relative_path(root, e.path()) {
                    Some(rel) => !ignore.is_ignored(&rel, e.file_type().is_dir()),
                    None => false,
                }
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Error walking directory: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(rel) = relative_path(root, entry.path()) else {
                continue;
            };
            let size = match entry.metadata() {
                Ok(m) => m.len(),
                Err(e) => {
                    tracing::warn!("Error reading metadata for {}: {}", rel, e);
                    continue;
                }
            };

            files.push(AnalyzedFile::new(rel, entry.path(), size));
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Extract imports from the first `max_import_files` script files.
    fn extract_dependencies(&self, files: &[AnalyzedFile]) -> DependencyMap {
        let mut dependencies = DependencyMap::new();

        let candidates = files
            .iter()
            .filter(|f| is_script_extension(&f.extension))
            .take(self.options.max_import_files);

        for file in candidates {
            let source = match std::fs::read_to_string(&file.absolute_path) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Error reading {}: {}", file.path, e);
                    continue;
                }
            };

            match self.extractor.extract(&source, &file.extension) {
                Ok(imports) if !imports.is_empty() => {
                    dependencies.insert(file.path.clone(), imports);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Error extracting imports from {}: {}", file.path, e),
            }
        }

        dependencies
    }
}

/// Files whose names mark a conventional entry point.
pub fn find_entry_points(files: &[AnalyzedFile]) -> Vec<String> {
    files
        .iter()
        .filter(|f| is_entry_point(f))
        .map(|f| f.path.clone())
        .collect()
}

fn is_entry_point(file: &AnalyzedFile) -> bool {
    if HTML_ENTRY_POINTS.contains(&file.path.as_str()) {
        return true;
    }
    let ext = file.extension_lower();
    if !ENTRY_EXTENSIONS.contains(&ext.as_str()) {
        return false;
    }
    let stem = Path::new(&file.name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    ENTRY_STEMS.contains(&stem.as_str())
}

/// Read a file of the project by its relative path.
pub fn read_file(root: &Path, relative: &str) -> Result<String> {
    let path = resolve_within(root, relative)
        .ok_or_else(|| Error::NotFound(format!("cannot read file {}", relative)))?;
    std::fs::read_to_string(&path)
        .map_err(|e| Error::NotFound(format!("cannot read file {}: {}", relative, e)))
}

/// Case-insensitive regex search over file paths and names.
pub fn search_files<'a>(files: &'a [AnalyzedFile], pattern: &str) -> Result<Vec<&'a AnalyzedFile>> {
    let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
    Ok(files
        .iter()
        .filter(|f| regex.is_match(&f.path) || regex.is_match(&f.name))
        .collect())
}
