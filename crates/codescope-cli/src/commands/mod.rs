//! CLI command implementations.

pub mod analyze;
pub mod chat;
pub mod models;
pub mod search;
pub mod show;

use anyhow::Result;
use codescope_core::{AnalyzerOptions, Config, ProjectAnalyzer};
use codescope_ollama::OllamaClient;

/// Analyzer backed by the tree-sitter extractor with regex fallback.
pub fn analyzer(options: AnalyzerOptions) -> ProjectAnalyzer {
    ProjectAnalyzer::new(codescope_parser::default_extractor()).with_options(options)
}

/// Ollama client from the environment, with an optional URL override.
pub fn ollama_client(url: Option<String>) -> Result<(OllamaClient, Config)> {
    let mut config = Config::from_env()?;
    if let Some(url) = url {
        config.ollama_url = url.trim_end_matches('/').to_string();
    }
    Ok((OllamaClient::from_config(&config), config))
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
