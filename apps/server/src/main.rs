//! SoundTouch Relay - Standalone relay server for SoundTouch speakers.
//!
//! Browsers cannot talk to a speaker's control port directly (no CORS, no
//! HTTPS). This binary runs on the local network and forwards requests to
//! speakers and to the public station directories on the client's behalf.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use soundtouch_core::{start_server, AppState, DirectoryProvider};
use tokio::signal;

use crate::config::ServerConfig;

/// SoundTouch Relay - CORS-friendly gateway to SoundTouch speakers.
#[derive(Parser, Debug)]
#[command(name = "soundtouch-relay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "SOUNDTOUCH_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Bind port (overrides config file).
    #[arg(short = 'p', long, env = "SOUNDTOUCH_BIND_PORT")]
    port: Option<u16>,

    /// Speaker control port (overrides config file).
    #[arg(long, env = "SOUNDTOUCH_DEVICE_PORT")]
    device_port: Option<u16>,

    /// Directory provider for /api/search: tunein or radio_browser.
    #[arg(long, env = "SOUNDTOUCH_DIRECTORY_PROVIDER")]
    provider: Option<DirectoryProvider>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("SoundTouch Relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(port) = args.port {
        config.bind_port = port;
    }
    if let Some(port) = args.device_port {
        config.device_port = port;
    }
    if let Some(provider) = args.provider {
        config.directory_provider = provider;
    }

    log::info!(
        "Configuration: bind_port={}, device_port={}, directory={}",
        config.bind_port,
        config.device_port,
        config.directory_provider
    );

    let app_state =
        AppState::new(config.to_core_config()).context("Failed to initialize relay state")?;

    // Serve until a shutdown signal arrives; in-flight requests are drained.
    start_server(app_state, shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
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
                log::error!("Failed to install SIGTERM handler: {}", e);
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

    log::info!("Shutdown signal received, draining connections...");
}
