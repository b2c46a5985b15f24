//! HTTP API layer of the relay.
//!
//! This module contains thin handlers that forward to the device and the
//! station directories. It provides the router construction and server
//! startup functionality.

use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::config::{Config, DirectoryProvider};
use crate::device::DeviceHttp;
use crate::directory::{build_directory, StationDirectory};

pub mod http;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to a TCP port.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),

    /// Outbound HTTP client could not be created.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Shared application state for the API layer.
///
/// This is a thin wrapper that holds the outbound clients.
#[derive(Clone)]
pub struct AppState {
    /// Forwards relayed requests to devices.
    pub device: DeviceHttp,
    /// Provider answering `/api/search`.
    pub directory: Arc<dyn StationDirectory>,
    /// Provider behind the legacy `/api/tunein` route.
    pub tunein: Arc<dyn StationDirectory>,
    /// Provider behind the legacy `/api/radio-browser` route.
    pub radio_browser: Arc<dyn StationDirectory>,
    /// Application configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates the state from configuration, validating it first.
    pub fn new(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::InvalidConfig)?;
        let client = Client::builder().build()?;

        let tunein = build_directory(DirectoryProvider::Tunein, client.clone(), &config);
        let radio_browser =
            build_directory(DirectoryProvider::RadioBrowser, client.clone(), &config);
        let directory = match config.directory_provider {
            DirectoryProvider::Tunein => Arc::clone(&tunein),
            DirectoryProvider::RadioBrowser => Arc::clone(&radio_browser),
        };

        Ok(Self {
            device: DeviceHttp::from_config(client, &config),
            directory,
            tunein,
            radio_browser,
            config: Arc::new(config),
        })
    }
}

/// Starts the HTTP server on the configured port and runs until `shutdown` resolves.
pub async fn start_server<F>(state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let port = state.config.bind_port;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!(
        "Server listening on http://0.0.0.0:{} (directory: {})",
        listener.local_addr().map(|a| a.port()).unwrap_or(port),
        state.directory.tag()
    );
    let app = http::create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
