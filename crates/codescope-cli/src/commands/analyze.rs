//! Analyze command implementation.

use anyhow::Result;
use codescope_core::{AnalyzerOptions, FileTree, FileTreeNode, ProjectAnalysis};
use colored::Colorize;
use std::path::PathBuf;

use super::{analyzer, format_size};

/// Run the analyze command.
pub async fn run(
    path: PathBuf,
    json: bool,
    tree: bool,
    max_import_files: usize,
    ignore: Vec<String>,
) -> Result<()> {
    if !path.is_dir() {
        eprintln!("{} Not a directory: {}", "✗".red(), path.display());
        return Ok(());
    }

    let options = AnalyzerOptions {
        max_import_files,
        extra_ignores: ignore,
    };
    let analysis = analyzer(options).analyze(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    print_summary(&analysis);
    if tree {
        println!();
        println!("{} File tree", "→".blue());
        print!("{}", render_tree(&analysis.file_tree));
    }

    Ok(())
}

fn print_summary(analysis: &ProjectAnalysis) {
    let summary = &analysis.summary;
    println!("{} {}", "✓".green(), summary.name.bold());
    println!(
        "  Files: {}  Size: {}",
        summary.total_files.to_string().green(),
        format_size(summary.total_size)
    );

    if !summary.extensions.is_empty() {
        let mut extensions: Vec<_> = summary.extensions.iter().collect();
        extensions.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        let line: Vec<String> = extensions
            .iter()
            .map(|(ext, count)| format!("{} {}", ext, count))
            .collect();
        println!("  Extensions: {}", line.join(", ").dimmed());
    }

    println!();
    println!("{} Tech stack", "→".blue());
    if analysis.tech_stack.is_empty() {
        println!("  {}", "(none detected)".dimmed());
    }
    for tech in analysis.tech_stack.iter() {
        match &tech.version {
            Some(version) => println!("  {} {} {}", "•".dimmed(), tech.name.cyan(), version.dimmed()),
            None => println!("  {} {}", "•".dimmed(), tech.name.cyan()),
        }
    }

    println!();
    println!("{} Entry points", "→".blue());
    for entry in &analysis.entry_points {
        println!("  {} {}", "•".dimmed(), entry.yellow());
    }

    if !analysis.dependencies.is_empty() {
        println!();
        println!("{} Imports", "→".blue());
        for (file, imports) in &analysis.dependencies {
            println!("  {}", file.yellow());
            for import in imports {
                println!("    {} {}", "←".dimmed(), import);
            }
        }
    }
}

/// Render a file tree as an indented listing, directories first.
pub fn render_tree(tree: &FileTree) -> String {
    let mut out = String::new();
    let entries: Vec<_> = tree.entries().iter().collect();
    render_level(&entries, 0, &mut out);
    out
}

fn render_level(entries: &[(&String, &FileTreeNode)], depth: usize, out: &mut String) {
    let mut ordered = entries.to_vec();
    ordered.sort_by(|a, b| is_file(a.1).cmp(&is_file(b.1)).then_with(|| a.0.cmp(b.0)));

    for (name, node) in ordered {
        let indent = "  ".repeat(depth + 1);
        match node {
            FileTreeNode::Directory { children } => {
                out.push_str(&format!("{}{}/\n", indent, name));
                let nested: Vec<_> = children.iter().collect();
                render_level(&nested, depth + 1, out);
            }
            FileTreeNode::File { size, .. } => {
                out.push_str(&format!("{}{} ({})\n", indent, name, format_size(*size)));
            }
        }
    }
}

fn is_file(node: &FileTreeNode) -> bool {
    matches!(node, FileTreeNode::File { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_core::AnalyzedFile;

    #[test]
    fn test_render_tree_directories_first() {
        let files = vec![
            AnalyzedFile::new("package.json", "/p/package.json", 120),
            AnalyzedFile::new("src/App.tsx", "/p/src/App.tsx", 2048),
            AnalyzedFile::new("src/components/Nav.jsx", "/p/src/components/Nav.jsx", 10),
        ];
        let tree = FileTree::build(&files).unwrap();

        let rendered = render_tree(&tree);
        assert_eq!(
            rendered,
            "  src/\n    components/\n      Nav.jsx (10 B)\n    App.tsx (2.0 KB)\n  package.json (120 B)\n"
        );
    }
}
