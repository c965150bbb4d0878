mod cli;
mod commands;
mod manifest;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strmsync_core::{load_config_or_default, validate_config, LinkSynchronizer};

use cli::{Cli, Commands, LogFormat};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("strmsync v{}", VERSION);

    // Load configuration
    info!("Loading configuration from {:?}", cli.config);
    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    // Validate configuration
    validate_config(&config).context("Invalid configuration")?;
    info!("Output root: {:?}", config.output.root);
    info!("Proxy base URL: {}", config.proxy.base_url);
    if !config.resolver.enabled {
        info!("Metadata resolution disabled, using flat layout");
    }

    let sync = Arc::new(LinkSynchronizer::from_config(&config));

    match cli.command {
        Commands::Sync { manifest, dry_run } => commands::sync(sync, manifest, dry_run).await,
        Commands::Watch {
            manifest,
            interval,
            dry_run,
        } => {
            let interval = interval.unwrap_or(config.watch.interval_secs);
            commands::watch(sync, manifest, interval, dry_run).await
        }
        Commands::Scan { json } => commands::scan(sync, json).await,
        Commands::Delete { path } => commands::delete(sync, path).await,
        Commands::Prune { manifest, dry_run } => commands::prune(sync, manifest, dry_run).await,
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
