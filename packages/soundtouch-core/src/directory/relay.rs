//! Directory search through a relay server's `/api/search`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{decode_payload, DirectoryError, DirectoryResult, StationDirectory, StationResult};

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    provider: Option<String>,
    results: Vec<StationResult>,
}

/// Searches whichever provider the relay is configured with.
pub struct RelayDirectory {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl RelayDirectory {
    /// Creates a directory for the relay at `relay_url` (e.g. `http://host:49400`).
    #[must_use]
    pub fn new(client: Client, relay_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/search", relay_url.trim_end_matches('/')),
            timeout,
        }
    }
}

#[async_trait]
impl StationDirectory for RelayDirectory {
    fn tag(&self) -> &str {
        "RELAY"
    }

    async fn try_search(&self, query: &str) -> DirectoryResult<Vec<StationResult>> {
        let res = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(DirectoryError::HttpStatus(res.status().as_u16()));
        }

        let envelope: SearchEnvelope = decode_payload(&res.text().await?)?;
        log::debug!(
            "[Directory] Relay answered with provider {:?}",
            envelope.provider
        );
        Ok(envelope.results)
    }
}
