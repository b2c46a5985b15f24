//! Station directory search.
//!
//! Two public directories are supported behind one contract,
//! [`StationDirectory`]:
//! - `tunein` - TuneIn OPML search (JSON render)
//! - `radio_browser` - Radio-Browser community database
//!
//! `relay` implements the same contract against a relay server's
//! `/api/search`, for clients that cannot call the providers directly.
//!
//! Searches fail soft: any provider failure is logged and reported as an
//! empty result list, indistinguishable from "no matches".

pub mod radio_browser;
pub mod relay;
pub mod tunein;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, DirectoryProvider};

pub use radio_browser::RadioBrowserDirectory;
pub use relay::RelayDirectory;
pub use tunein::TuneInDirectory;

/// A station returned by a directory search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationResult {
    /// Display name of the station.
    pub name: String,
    /// Directory URL or station identifier; normalised before selection.
    pub location: String,
    /// Content source tag to select the station with.
    pub source: String,
    /// Genre, description or other short label.
    pub category: String,
}

/// Errors that can occur while querying a directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// HTTP request failed (connection, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("HTTP error {0}")]
    HttpStatus(u16),

    /// Provider answered with an unexpected payload shape.
    #[error("Unexpected payload: {0}")]
    Payload(String),
}

/// Convenient Result alias for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// A searchable station directory.
#[async_trait]
pub trait StationDirectory: Send + Sync {
    /// Short tag identifying the provider (its content source).
    fn tag(&self) -> &str;

    /// Queries the provider, surfacing failures.
    async fn try_search(&self, query: &str) -> DirectoryResult<Vec<StationResult>>;

    /// Queries the provider; failures yield an empty list.
    async fn search(&self, query: &str) -> Vec<StationResult> {
        match self.try_search(query).await {
            Ok(results) => {
                log::debug!(
                    "[Directory] {} returned {} result(s) for {:?}",
                    self.tag(),
                    results.len(),
                    query
                );
                results
            }
            Err(e) => {
                log::warn!("[Directory] {} search failed for {:?}: {}", self.tag(), query, e);
                Vec::new()
            }
        }
    }
}

/// Builds the directory for `provider` with settings from `config`.
pub fn build_directory(
    provider: DirectoryProvider,
    client: Client,
    config: &Config,
) -> Arc<dyn StationDirectory> {
    match provider {
        DirectoryProvider::Tunein => Arc::new(TuneInDirectory::new(
            client,
            &config.tunein_base_url,
            config.directory_result_limit,
            config.directory_timeout(),
        )),
        DirectoryProvider::RadioBrowser => Arc::new(RadioBrowserDirectory::new(
            client,
            &config.radio_browser_base_url,
            config.directory_result_limit,
            config.directory_timeout(),
        )),
    }
}

/// Decodes a JSON payload, mapping shape errors to [`DirectoryError::Payload`].
pub(crate) fn decode_payload<T: serde::de::DeserializeOwned>(body: &str) -> DirectoryResult<T> {
    serde_json::from_str(body).map_err(|e| DirectoryError::Payload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol_constants::{INTERNET_RADIO_SOURCE, TUNEIN_SOURCE};

    struct FailingDirectory;

    #[async_trait]
    impl StationDirectory for FailingDirectory {
        fn tag(&self) -> &str {
            "FAILING"
        }

        async fn try_search(&self, _query: &str) -> DirectoryResult<Vec<StationResult>> {
            Err(DirectoryError::HttpStatus(503))
        }
    }

    #[tokio::test]
    async fn search_fails_soft() {
        assert!(FailingDirectory.search("jazz").await.is_empty());
    }

    #[test]
    fn factory_selects_provider() {
        let config = Config::default();
        let tunein = build_directory(DirectoryProvider::Tunein, Client::new(), &config);
        let radio = build_directory(DirectoryProvider::RadioBrowser, Client::new(), &config);
        assert_eq!(tunein.tag(), TUNEIN_SOURCE);
        assert_eq!(radio.tag(), INTERNET_RADIO_SOURCE);
    }

    #[test]
    fn xml_payload_is_a_shape_error() {
        let err = decode_payload::<Vec<StationResult>>("<opml/>").unwrap_err();
        assert!(matches!(err, DirectoryError::Payload(_)));
    }

    #[test]
    fn station_result_serializes_flat() {
        let json = serde_json::to_value(StationResult {
            name: "Jazz".into(),
            location: "s1".into(),
            source: "TUNEIN".into(),
            category: "Smooth".into(),
        })
        .unwrap();
        assert_eq!(json["location"], "s1");
        assert_eq!(json["category"], "Smooth");
    }
}
