//! Show command implementation.

use anyhow::Result;
use codescope_core::analyzer::read_file;
use colored::Colorize;
use std::path::PathBuf;

/// Run the show command.
pub async fn run(path: PathBuf, file: String) -> Result<()> {
    match read_file(&path, &file) {
        Ok(content) => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
        }
    }
    Ok(())
}
