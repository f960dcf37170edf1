// File: src/main.rs
// Purpose: linkshare binary: configuration, logging, registration, serving

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use linkshare_server::{build, logging, Config, Store};

#[derive(Parser)]
#[command(name = "linkshare")]
#[command(about = "Share local files over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: $LINKSHARE_CONFIG_PATH or ./linkshare.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the registered routes and exit
    #[arg(long)]
    routes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    let mut config = config.with_process_env();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    logging::init(&config.logging);

    let store = Store::open(&config.storage.data_path).await?;
    let app = build(&config, store).context("Failed to register endpoints")?;

    if cli.routes {
        for route in &app.routes {
            println!("{:<5} {:<45} {}", route.verb.as_str(), route.template, route.id);
        }
        return Ok(());
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, routes = app.routes.len(), "server running");

    axum::serve(listener, app.router)
        .await
        .context("Server error")?;
    Ok(())
}
