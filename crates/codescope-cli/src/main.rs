//! Codescope CLI
//!
//! Command-line interface for the Codescope project analyzer and chat proxy.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "codescope")]
#[command(author, version, about = "Project analyzer and local model chat", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a project directory
    Analyze {
        /// Project root (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,

        /// Print the file tree
        #[arg(long)]
        tree: bool,

        /// Maximum number of script files scanned for imports
        #[arg(long, default_value = "50")]
        max_import_files: usize,

        /// Extra ignore patterns (gitignore syntax)
        #[arg(short, long)]
        ignore: Vec<String>,
    },

    /// Find files whose path or name matches a regex (case-insensitive)
    Search {
        /// Project root
        path: PathBuf,

        /// Regular expression
        pattern: String,
    },

    /// Print a project file
    Show {
        /// Project root
        path: PathBuf,

        /// File path relative to the project root
        file: String,
    },

    /// Send one message to the inference server
    Chat {
        /// Message text
        message: String,

        /// Model name (defaults to DEFAULT_MODEL)
        #[arg(short, long)]
        model: Option<String>,

        /// Ollama base URL (defaults to OLLAMA_URL)
        #[arg(long)]
        ollama_url: Option<String>,
    },

    /// List models available on the inference server
    Models {
        /// Ollama base URL (defaults to OLLAMA_URL)
        #[arg(long)]
        ollama_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "codescope_cli=debug,codescope_core=debug,codescope_parser=debug,codescope_ollama=debug"
    } else {
        "codescope_cli=info,codescope_core=warn,codescope_parser=warn,codescope_ollama=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            path,
            json,
            tree,
            max_import_files,
            ignore,
        } => {
            commands::analyze::run(path, json, tree, max_import_files, ignore).await?;
        }
        Commands::Search { path, pattern } => {
            commands::search::run(path, pattern).await?;
        }
        Commands::Show { path, file } => {
            commands::show::run(path, file).await?;
        }
        Commands::Chat {
            message,
            model,
            ollama_url,
        } => {
            commands::chat::run(message, model, ollama_url).await?;
        }
        Commands::Models { ollama_url } => {
            commands::models::run(ollama_url).await?;
        }
    }

    Ok(())
}
