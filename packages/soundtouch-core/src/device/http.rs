//! Low-level HTTP transport to a speaker's control port.
//!
//! Performs byte-transparent GET/POST requests against
//! `http://<address>:<port><path>`. Used both by the relay endpoints and by
//! the direct (relay-less) control transport. For logical device operations,
//! see `controller.rs`.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use thiserror::Error;

use crate::config::Config;
use crate::protocol_constants::XML_WRITE_CONTENT_TYPE;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while talking to a speaker.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// HTTP request to the speaker (or relay) failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Speaker returned a non-success HTTP status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Speaker answered a write with an `<errors>` document.
    #[error("Device rejected the request: {0}")]
    Rejected(String),

    /// The relay reported an error of its own (bad parameters, device unreachable).
    #[error("Relay error: {0}")]
    Relay(String),
}

/// Convenient Result alias for device operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

// ─────────────────────────────────────────────────────────────────────────────
// Upstream Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Raw upstream response: status code and body bytes, untouched.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP client bound to the device control port.
#[derive(Clone)]
pub struct DeviceHttp {
    client: Client,
    port: u16,
    timeout: Duration,
}

impl DeviceHttp {
    /// Creates a device client with the given HTTP client, port and timeout.
    #[must_use]
    pub fn new(client: Client, port: u16, timeout: Duration) -> Self {
        Self {
            client,
            port,
            timeout,
        }
    }

    /// Creates a device client from configuration.
    #[must_use]
    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, config.device_port, config.device_timeout())
    }

    /// Control port requests are sent to.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Builds the device URL for `path`.
    ///
    /// IPv6 literals are bracketed.
    #[must_use]
    pub fn device_url(&self, address: &str, path: &str) -> String {
        if address.contains(':') && !address.starts_with('[') {
            format!("http://[{}]:{}{}", address, self.port, path)
        } else {
            format!("http://{}:{}{}", address, self.port, path)
        }
    }

    /// Sends a GET to the device and returns status and body verbatim.
    pub async fn get(&self, address: &str, path: &str) -> DeviceResult<UpstreamResponse> {
        let url = self.device_url(address, path);
        log::debug!("[Device] GET {}", url);

        let res = self
            .client
            .get(&url)
            .header(ACCEPT, "*/*")
            .timeout(self.timeout)
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.bytes().await?;
        log::debug!("[Device] GET {} -> {} ({} bytes)", url, status, body.len());

        Ok(UpstreamResponse { status, body })
    }

    /// Sends a POST with an XML body to the device and returns status and body verbatim.
    pub async fn post(
        &self,
        address: &str,
        path: &str,
        body: impl Into<Bytes>,
    ) -> DeviceResult<UpstreamResponse> {
        let url = self.device_url(address, path);
        let body = body.into();
        log::info!("[Device] POST {} (body: {} bytes)", url, body.len());
        log::debug!("[Device] Request body: {}", String::from_utf8_lossy(&body));

        let start = std::time::Instant::now();
        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, XML_WRITE_CONTENT_TYPE)
            .body(body)
            .timeout(self.timeout)
            .send()
            .await;

        log::info!(
            "[Device] POST {} completed in {:?}: {:?}",
            path,
            start.elapsed(),
            res.as_ref().map(|r| r.status())
        );

        let res = res?;
        let status = res.status().as_u16();
        let body = res.bytes().await?;
        log::debug!("[Device] Response body: {}", String::from_utf8_lossy(&body));

        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device_http() -> DeviceHttp {
        DeviceHttp::new(Client::new(), 8090, Duration::from_secs(1))
    }

    #[test]
    fn builds_url_on_control_port() {
        assert_eq!(
            device_http().device_url("10.0.0.5", "/now_playing"),
            "http://10.0.0.5:8090/now_playing"
        );
    }

    #[test]
    fn brackets_ipv6_literals() {
        assert_eq!(
            device_http().device_url("fe80::1", "/info"),
            "http://[fe80::1]:8090/info"
        );
    }

    #[test]
    fn upstream_success_range() {
        let ok = UpstreamResponse {
            status: 204,
            body: Bytes::new(),
        };
        let bad = UpstreamResponse {
            status: 400,
            body: Bytes::from_static(b"<errors/>"),
        };
        assert!(ok.is_success());
        assert!(!bad.is_success());
        assert_eq!(bad.text(), "<errors/>");
    }

    #[tokio::test]
    async fn unreachable_device_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments
        let http = DeviceHttp::new(Client::new(), 9, Duration::from_millis(500));
        let err = http.get("127.0.0.1", "/info").await.unwrap_err();
        assert!(matches!(err, DeviceError::Http(_)));
    }
}
