//! TuneIn OPML directory.
//!
//! `GET {base}/Search.ashx?query=<q>&render=json` answers
//! `{ "head": {..}, "body": [ { "type": "audio", "text": .., "URL": .. }, .. ] }`.
//! Only `audio` outlines are stations; links and topics are skipped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{decode_payload, DirectoryError, DirectoryResult, StationDirectory, StationResult};
use crate::protocol_constants::{DEFAULT_STATION_CATEGORY, TUNEIN_SOURCE};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    body: Vec<Outline>,
}

#[derive(Debug, Deserialize)]
struct Outline {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(default)]
    guide_id: Option<String>,
    #[serde(default)]
    subtext: Option<String>,
}

/// TuneIn search client.
pub struct TuneInDirectory {
    client: Client,
    base_url: String,
    limit: usize,
    timeout: Duration,
}

impl TuneInDirectory {
    #[must_use]
    pub fn new(client: Client, base_url: &str, limit: usize, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
            timeout,
        }
    }
}

fn map_outlines(response: SearchResponse, limit: usize) -> Vec<StationResult> {
    response
        .body
        .into_iter()
        .filter(|o| o.kind.as_deref() == Some("audio"))
        .take(limit)
        .map(|o| StationResult {
            name: o.text.unwrap_or_default(),
            location: o.url.or(o.guide_id).unwrap_or_default(),
            source: TUNEIN_SOURCE.to_string(),
            category: o
                .subtext
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_STATION_CATEGORY.to_string()),
        })
        .collect()
}

#[async_trait]
impl StationDirectory for TuneInDirectory {
    fn tag(&self) -> &str {
        TUNEIN_SOURCE
    }

    async fn try_search(&self, query: &str) -> DirectoryResult<Vec<StationResult>> {
        let url = format!("{}/Search.ashx", self.base_url);
        log::info!("[Directory] TuneIn search: {:?}", query);

        let res = self
            .client
            .get(&url)
            .query(&[("query", query), ("render", "json")])
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(DirectoryError::HttpStatus(res.status().as_u16()));
        }

        let body = res.text().await?;
        Ok(map_outlines(decode_payload(&body)?, self.limit))
    }
}
