//! maak-client command line tool.
//!
//! Thin operator wrapper over [`ResilientClient`]: check the API, inspect
//! the retry policy and session, and issue one-off JSON requests with the
//! same recovery behaviour the application uses.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use maak_client::config::loader::{default_config, load_config};
use maak_client::observability::logging::init_logging;
use maak_client::{ClientConfig, FileSessionStore, ResilientClient};

#[derive(Parser)]
#[command(name = "maak-client")]
#[command(about = "Resilient client for the MÄÄK Mood API", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(short, long)]
    base_url: Option<String>,

    /// Override the session file location.
    #[arg(short, long)]
    session_file: Option<PathBuf>,

    /// Disable automatic retries.
    #[arg(long)]
    no_retry: bool,

    /// Attempt cap (clamped to 1-10).
    #[arg(long)]
    max_retries: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call the API health endpoint (single attempt)
    Health,
    /// Show retry policy and session state
    Status,
    /// GET an endpoint
    Get { endpoint: String },
    /// POST a JSON body to an endpoint
    Post { endpoint: String, body: String },
    /// Create and store a demo session
    DemoSession,
    /// Remove the stored session
    Logout,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config.observability.log_level) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(path) = &cli.session_file {
        config.session.store_path = Some(path.display().to_string());
    }
    Ok(config)
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(FileSessionStore::from_config(&config.session)?);
    let client = ResilientClient::new(&config, store.clone());

    if cli.no_retry {
        client.set_auto_retry(false);
    }
    if let Some(max_retries) = cli.max_retries {
        client.set_max_retries(max_retries);
    }

    tracing::debug!(client = ?client, "Running command");

    match cli.command {
        Commands::Health => print_json(&client.health_check().await?)?,
        Commands::Status => print_json(&client.client_status().await)?,
        Commands::Get { endpoint } => print_json(&client.get(&endpoint).await?)?,
        Commands::Post { endpoint, body } => {
            let body: serde_json::Value = serde_json::from_str(&body)?;
            print_json(&client.post(&endpoint, body).await?)?
        }
        Commands::DemoSession => print_json(&store.create_demo_session()?)?,
        Commands::Logout => {
            store.clear()?;
            println!("Session cleared");
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
