use std::sync::Arc;

use clap::Parser;
use parley_core::ParleyConfig;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use parley_server::http::{start_http_server, HttpState};
use parley_server::subsystems::dispatch::Dispatcher;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "parley.toml")]
    config: String,

    /// Load config and credentials, then exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience, production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match ParleyConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over [service] log_level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level));
    fmt().with_env_filter(filter).init();

    let dispatcher = match Dispatcher::from_config(&config) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            eprintln!("Failed to initialise providers: {:#}", e);
            std::process::exit(1);
        }
    };

    if args.check {
        println!(
            "✅ Config OK: {} speaking {}, webhook at {}",
            config.business.display_name,
            config.business.server_language.name(),
            config.http.webhook_path
        );
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for Ctrl+C: {}", e),
        }
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(HttpState { dispatcher, config });
    start_http_server(state, tx.subscribe()).await?;

    Ok(())
}
