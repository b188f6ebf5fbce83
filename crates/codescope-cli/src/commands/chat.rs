//! Chat command implementation.

use anyhow::Result;
use codescope_core::{GenerateRequest, ModelClient};
use colored::Colorize;

use super::ollama_client;

/// Run the chat command.
pub async fn run(message: String, model: Option<String>, ollama_url: Option<String>) -> Result<()> {
    if message.trim().is_empty() {
        eprintln!("{} Message must not be empty", "✗".red());
        return Ok(());
    }

    let (client, config) = ollama_client(ollama_url)?;
    let request = GenerateRequest {
        model: model.unwrap_or(config.default_model),
        prompt: message,
    };

    println!(
        "{} Asking {} at {}",
        "→".blue(),
        request.model.as_str().cyan(),
        client.base_url().dimmed()
    );

    match client.generate(&request).await {
        Ok(response) => {
            println!();
            println!("{}", response.text.trim_end());
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            eprintln!("Is Ollama running? Start it with 'ollama serve'.");
        }
    }

    Ok(())
}
