//! Technology stack detection.
//!
//! Detects technologies from three sources, in order: the root
//! `package.json` manifest, well-known marker files (Cargo.toml, go.mod, ...),
//! and the file extensions present in the tree. A label found by an earlier
//! source is never overwritten by a later one.

use crate::error::Result;
use crate::file::AnalyzedFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Broad kind of a detected technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechCategory {
    Language,
    Runtime,
    Framework,
    Library,
    Tool,
}

/// Where a technology was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionSource {
    Manifest,
    Marker,
    Extension,
}

/// A detected technology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technology {
    pub name: String,
    pub category: TechCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub source: DetectionSource,
}

impl Technology {
    pub fn new(name: impl Into<String>, category: TechCategory, source: DetectionSource) -> Self {
        Self {
            name: name.into(),
            category,
            version: None,
            source,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Known npm packages and the label they map to.
const KNOWN_PACKAGES: &[(&str, &str, TechCategory)] = &[
    ("react", "React", TechCategory::Framework),
    ("vue", "Vue.js", TechCategory::Framework),
    ("@angular/core", "Angular", TechCategory::Framework),
    ("next", "Next.js", TechCategory::Framework),
    ("svelte", "Svelte", TechCategory::Framework),
    ("express", "Express", TechCategory::Framework),
    ("@mui/material", "Material-UI", TechCategory::Library),
    ("@material-ui/core", "Material-UI", TechCategory::Library),
    ("redux", "Redux", TechCategory::Library),
    ("@reduxjs/toolkit", "Redux", TechCategory::Library),
    ("@apollo/client", "Apollo Client", TechCategory::Library),
    ("graphql", "GraphQL", TechCategory::Library),
    ("tailwindcss", "Tailwind CSS", TechCategory::Library),
    ("axios", "Axios", TechCategory::Library),
    ("mongoose", "MongoDB", TechCategory::Library),
    ("socket.io", "Socket.IO", TechCategory::Library),
    ("typescript", "TypeScript", TechCategory::Language),
    ("vite", "Vite", TechCategory::Tool),
    ("webpack", "Webpack", TechCategory::Tool),
    ("jest", "Jest", TechCategory::Tool),
];

/// Marker file names and the label they imply.
const MARKER_FILES: &[(&str, &str, TechCategory)] = &[
    ("requirements.txt", "Python", TechCategory::Language),
    ("pyproject.toml", "Python", TechCategory::Language),
    ("setup.py", "Python", TechCategory::Language),
    ("Cargo.toml", "Rust", TechCategory::Language),
    ("go.mod", "Go", TechCategory::Language),
    ("pom.xml", "Java", TechCategory::Language),
    ("build.gradle", "Java", TechCategory::Language),
    ("Gemfile", "Ruby", TechCategory::Language),
    ("composer.json", "PHP", TechCategory::Language),
    ("Dockerfile", "Docker", TechCategory::Tool),
];

/// Lowercase file extensions and the label they imply.
const EXTENSION_LABELS: &[(&str, &str, TechCategory)] = &[
    ("py", "Python", TechCategory::Language),
    ("js", "JavaScript", TechCategory::Language),
    ("jsx", "JavaScript", TechCategory::Language),
    ("mjs", "JavaScript", TechCategory::Language),
    ("cjs", "JavaScript", TechCategory::Language),
    ("ts", "TypeScript", TechCategory::Language),
    ("tsx", "TypeScript", TechCategory::Language),
    ("java", "Java", TechCategory::Language),
    ("go", "Go", TechCategory::Language),
    ("rs", "Rust", TechCategory::Language),
    ("rb", "Ruby", TechCategory::Language),
    ("php", "PHP", TechCategory::Language),
    ("cs", "C#", TechCategory::Language),
    ("kt", "Kotlin", TechCategory::Language),
    ("swift", "Swift", TechCategory::Language),
    ("html", "HTML", TechCategory::Language),
    ("css", "CSS", TechCategory::Language),
    ("scss", "Sass", TechCategory::Language),
    ("sass", "Sass", TechCategory::Language),
    ("vue", "Vue.js", TechCategory::Framework),
    ("svelte", "Svelte", TechCategory::Framework),
];

/// Name of the manifest file read for declared dependencies.
pub const MANIFEST_FILE: &str = "package.json";

/// The parts of `package.json` the analyzer uses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, serde_json::Value>,
}

impl PackageManifest {
    /// Parse manifest JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the manifest from a project root. `Ok(None)` when absent.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_json(&content).map(Some)
    }

    /// Runtime then dev dependencies with their declared version strings.
    pub fn all_dependencies(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .map(|(name, version)| (name.as_str(), version.as_str()))
    }
}

/// Deduplicated set of technologies keyed by label.
///
/// Serializes as a list sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Technology>", into = "Vec<Technology>")]
pub struct TechStack {
    entries: BTreeMap<String, Technology>,
}

impl From<Vec<Technology>> for TechStack {
    fn from(list: Vec<Technology>) -> Self {
        let mut stack = TechStack::default();
        for tech in list {
            stack.insert(tech);
        }
        stack
    }
}

impl From<TechStack> for Vec<Technology> {
    fn from(stack: TechStack) -> Self {
        stack.entries.into_values().collect()
    }
}

impl TechStack {
    /// Detect the stack of a project from its manifest and file list.
    pub fn detect(manifest: Option<&PackageManifest>, files: &[AnalyzedFile]) -> Self {
        let mut stack = Self::default();
        if let Some(manifest) = manifest {
            stack.detect_from_manifest(manifest);
        }
        stack.detect_from_markers(files);
        stack.detect_from_extensions(files);
        stack
    }

    /// Insert a technology unless its label is already present.
    pub fn insert(&mut self, tech: Technology) -> bool {
        if self.entries.contains_key(&tech.name) {
            return false;
        }
        self.entries.insert(tech.name.clone(), tech);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Technology> {
        self.entries.get(name)
    }

    /// Labels, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Technology> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn detect_from_manifest(&mut self, manifest: &PackageManifest) {
        self.insert(Technology::new(
            "Node.js",
            TechCategory::Runtime,
            DetectionSource::Manifest,
        ));

        for (package, version) in manifest.all_dependencies() {
            let Some((_, label, category)) = KNOWN_PACKAGES.iter().find(|(p, _, _)| *p == package)
            else {
                continue;
            };
            let mut tech = Technology::new(*label, *category, DetectionSource::Manifest);
            if let Some(version) = version {
                tech = tech.with_version(version);
            }
            self.insert(tech);
        }
    }

    fn detect_from_markers(&mut self, files: &[AnalyzedFile]) {
        for file in files {
            if let Some((_, label, category)) =
                MARKER_FILES.iter().find(|(marker, _, _)| *marker == file.name)
            {
                self.insert(Technology::new(*label, *category, DetectionSource::Marker));
            }
        }
    }

    fn detect_from_extensions(&mut self, files: &[AnalyzedFile]) {
        for file in files {
            let ext = file.extension_lower();
            if let Some((_, label, category)) =
                EXTENSION_LABELS.iter().find(|(e, _, _)| *e == ext)
            {
                self.insert(Technology::new(
                    *label,
                    *category,
                    DetectionSource::Extension,
                ));
            }
        }
    }
}
