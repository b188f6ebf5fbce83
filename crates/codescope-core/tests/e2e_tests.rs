//! End-to-end tests for Codescope analysis.
//!
//! These tests verify the full workflow: scan → tech stack → imports → tree,
//! using the real tree-sitter extractor.

use codescope_core::analyzer::read_file;
use codescope_core::{AnalyzerOptions, FileTreeNode, ProjectAnalyzer};
use codescope_parser::default_extractor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Copy the sample project into a temp dir, installing its ignore file.
fn sample_project() -> TempDir {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample_app");
    let temp_dir = TempDir::new().unwrap();

    for entry in WalkDir::new(&fixture) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&fixture).unwrap();
        let target = if rel == Path::new("gitignore.txt") {
            temp_dir.path().join(".gitignore")
        } else {
            temp_dir.path().join(rel)
        };
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).unwrap();
        } else {
            std::fs::copy(entry.path(), &target).unwrap();
        }
    }
    temp_dir
}

/// Test the full analysis of a mixed React/Express/Python project.
#[test]
fn test_analyze_sample_project() {
    let project = sample_project();
    let analysis = ProjectAnalyzer::new(default_extractor())
        .analyze(project.path())
        .unwrap();

    let paths: Vec<&str> = analysis.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            ".gitignore",
            "package.json",
            "public/index.html",
            "scripts/recommend.py",
            "server/server.js",
            "src/App.tsx",
            "src/components/ProductGrid.jsx",
            "src/index.css",
            "src/index.jsx",
            "src/store/cartSlice.ts",
        ]
    );
    assert_eq!(analysis.file_count, paths.len());
    assert_eq!(analysis.summary.name, "ai-amazon-clone");

    for label in ["React", "Python", "Node.js", "Express", "Material-UI", "Redux", "TypeScript", "HTML"] {
        assert!(analysis.tech_stack.contains(label), "missing {}", label);
    }

    assert_eq!(
        analysis.entry_points,
        vec!["public/index.html", "server/server.js", "src/App.tsx", "src/index.jsx"]
    );
}

/// Test import extraction across AST and regex-fallback files.
#[test]
fn test_dependency_map() {
    let project = sample_project();
    let analysis = ProjectAnalyzer::new(default_extractor())
        .analyze(project.path())
        .unwrap();
    let deps = &analysis.dependencies;

    assert_eq!(deps["server/server.js"], vec!["express", "cors"]);
    assert_eq!(
        deps["src/App.tsx"],
        vec![
            "react",
            "./store/cartSlice",
            "./components/ProductGrid",
            "./components/Recommendations",
        ]
    );
    assert_eq!(
        deps["src/index.jsx"],
        vec![
            "react",
            "react-dom/client",
            "react-redux",
            "./App",
            "./store/cartSlice",
            "./index.css",
        ]
    );
    assert_eq!(deps["src/store/cartSlice.ts"], vec!["@reduxjs/toolkit"]);
    // Does not parse; picked up by the regex fallback.
    assert_eq!(deps["src/components/ProductGrid.jsx"], vec!["@mui/material"]);
    assert_eq!(deps.len(), 5);
}

/// Test that the import scan honours the file cap.
#[test]
fn test_import_scan_cap() {
    let project = sample_project();
    let options = AnalyzerOptions {
        max_import_files: 2,
        ..Default::default()
    };
    let analysis = ProjectAnalyzer::new(default_extractor())
        .with_options(options)
        .analyze(project.path())
        .unwrap();

    let keys: Vec<&str> = analysis.dependencies.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["server/server.js", "src/App.tsx"]);
}

/// Test that repeated analysis is stable.
#[test]
fn test_analysis_is_repeatable() {
    let project = sample_project();
    let analyzer = ProjectAnalyzer::new(default_extractor());

    let first = analyzer.analyze(project.path()).unwrap();
    let second = analyzer.analyze(project.path()).unwrap();

    assert_eq!(first.tech_stack, second.tech_stack);
    assert_eq!(first.file_tree, second.file_tree);
    assert_eq!(first.dependencies, second.dependencies);
}

/// Test that every listed file is reachable in the tree and readable.
#[test]
fn test_tree_and_content_lookup() {
    let project = sample_project();
    let analysis = ProjectAnalyzer::new(default_extractor())
        .analyze(project.path())
        .unwrap();

    for file in &analysis.files {
        match analysis.file_tree.lookup(&file.path) {
            Some(FileTreeNode::File { extension, size }) => {
                assert_eq!(extension, &file.extension);
                assert_eq!(*size, file.size);
            }
            other => panic!("{} is not a file leaf: {:?}", file.path, other),
        }
    }

    let content = read_file(project.path(), "server/server.js").unwrap();
    assert!(content.contains("require('express')"));

    let hits = analysis.search("SLICE").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "src/store/cartSlice.ts");
}

/// A minified bundle with a very deep expression is analyzed like any file.
#[test]
fn test_deeply_nested_bundle() {
    let project = TempDir::new().unwrap();
    let mut bundle = String::from("import a from 'a';\nconst x = 1");
    bundle.push_str(&"+1".repeat(200_000));
    bundle.push_str(";\n");
    std::fs::write(project.path().join("bundle.js"), bundle).unwrap();
    std::fs::write(project.path().join("index.js"), "require('express');\n").unwrap();

    let analysis = ProjectAnalyzer::new(default_extractor())
        .analyze(project.path())
        .unwrap();

    assert_eq!(analysis.file_count, 2);
    assert_eq!(analysis.dependencies["bundle.js"], vec!["a"]);
    assert_eq!(analysis.dependencies["index.js"], vec!["express"]);
}
