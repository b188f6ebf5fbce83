//! Search command implementation.

use anyhow::Result;
use codescope_core::AnalyzerOptions;
use colored::Colorize;
use std::path::PathBuf;

use super::{analyzer, format_size};

/// Run the search command.
pub async fn run(path: PathBuf, pattern: String) -> Result<()> {
    if !path.is_dir() {
        eprintln!("{} Not a directory: {}", "✗".red(), path.display());
        return Ok(());
    }

    println!("{} Searching for: {}", "→".blue(), pattern.yellow());
    println!();

    // Import extraction is not needed to list files
    let options = AnalyzerOptions {
        max_import_files: 0,
        ..AnalyzerOptions::default()
    };
    let analysis = analyzer(options).analyze(&path)?;
    let results = analysis.search(&pattern)?;

    if results.is_empty() {
        println!("{} No matching files.", "→".yellow());
        return Ok(());
    }

    println!("{} Found {} files:", "✓".green(), results.len());
    for file in results {
        println!(
            "  {} {}",
            file.path.as_str().cyan(),
            format!("({})", format_size(file.size)).dimmed()
        );
    }

    Ok(())
}
