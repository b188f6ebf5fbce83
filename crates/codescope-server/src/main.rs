use clap::Parser;
use anyhow::Result;
use codescope_core::Config;

#[derive(Parser)]
#[command(name = "codescope-server")]
#[command(author, version, about = "Codescope HTTP API Server", long_about = None)]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Ollama base URL (overrides OLLAMA_URL)
    #[arg(long)]
    ollama_url: Option<String>,

    /// Default model for chat requests (overrides DEFAULT_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Verbose output
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "codescope_server=debug,codescope_core=debug,codescope_ollama=debug,tower_http=debug"
    } else {
        "codescope_server=info,codescope_core=info,codescope_ollama=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = cli.ollama_url {
        config.ollama_url = url.trim_end_matches('/').to_string();
    }
    if let Some(model) = cli.model {
        config.default_model = model;
    }

    codescope_server::start(config).await
}
