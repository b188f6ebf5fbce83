//! Models command implementation.

use anyhow::Result;
use codescope_core::ModelClient;
use colored::Colorize;

use super::{format_size, ollama_client};

/// Run the models command.
pub async fn run(ollama_url: Option<String>) -> Result<()> {
    let (client, _config) = ollama_client(ollama_url)?;

    let models = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            return Ok(());
        }
    };

    if models.is_empty() {
        println!("{} No models installed. Pull one with 'ollama pull llama2'.", "→".yellow());
        return Ok(());
    }

    println!("{} {} models at {}", "✓".green(), models.len(), client.base_url());
    for model in models {
        let size = model.size.map(format_size).unwrap_or_default();
        println!("  {} {} {}", "•".dimmed(), model.name.as_str().cyan(), size.dimmed());
    }

    Ok(())
}
