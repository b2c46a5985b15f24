//! Radio-Browser directory.
//!
//! `GET {base}/json/stations/byname/<q>` answers a JSON array of stations.
//! The API asks clients to send a descriptive User-Agent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{decode_payload, DirectoryError, DirectoryResult, StationDirectory, StationResult};
use crate::protocol_constants::{DIRECTORY_USER_AGENT, INTERNET_RADIO_SOURCE};

const FALLBACK_CATEGORY: &str = "Internet Radio";

#[derive(Debug, Deserialize)]
struct Station {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    url_resolved: Option<String>,
    /// Comma-separated tag list.
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Station {
    fn into_result(self) -> Option<StationResult> {
        let name = non_empty(self.name)?;
        let location = non_empty(self.url_resolved).or_else(|| non_empty(self.url))?;
        let first_tag = self
            .tags
            .as_deref()
            .and_then(|t| t.split(',').map(str::trim).find(|t| !t.is_empty()))
            .map(str::to_string);
        let category = first_tag
            .or_else(|| non_empty(self.country))
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

        Some(StationResult {
            name,
            location,
            source: INTERNET_RADIO_SOURCE.to_string(),
            category,
        })
    }
}

/// Radio-Browser search client.
pub struct RadioBrowserDirectory {
    client: Client,
    base_url: String,
    limit: usize,
    timeout: Duration,
}

impl RadioBrowserDirectory {
    #[must_use]
    pub fn new(client: Client, base_url: &str, limit: usize, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            limit,
            timeout,
        }
    }

    /// Builds the by-name search URL; the query is percent-encoded as one path segment.
    fn search_url(&self, query: &str) -> DirectoryResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DirectoryError::Payload(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| DirectoryError::Payload("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["json", "stations", "byname", query]);
        Ok(url)
    }
}

fn map_stations(stations: Vec<Station>, limit: usize) -> Vec<StationResult> {
    stations
        .into_iter()
        .filter_map(Station::into_result)
        .take(limit)
        .collect()
}

#[async_trait]
impl StationDirectory for RadioBrowserDirectory {
    fn tag(&self) -> &str {
        INTERNET_RADIO_SOURCE
    }

    async fn try_search(&self, query: &str) -> DirectoryResult<Vec<StationResult>> {
        let url = self.search_url(query)?;
        log::info!("[Directory] Radio-Browser search: {:?}", query);

        let res = self
            .client
            .get(url)
            .header(USER_AGENT, DIRECTORY_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(DirectoryError::HttpStatus(res.status().as_u16()));
        }

        let body = res.text().await?;
        Ok(map_stations(decode_payload(&body)?, self.limit))
    }
}
