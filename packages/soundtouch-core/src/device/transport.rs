//! Transports carrying device reads and writes.
//!
//! The controller talks to a [`DeviceTransport`] and never to HTTP directly:
//! - [`RelayTransport`] goes through a relay server's `/api/device` endpoint
//!   (the only option for clients that cannot reach the device themselves)
//! - [`DirectTransport`] sends the same requests straight to the device

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::device::http::{DeviceError, DeviceHttp, DeviceResult};
use crate::device::parser::parse_device_error;
use crate::device::types::DeviceAddress;

/// Response to a device write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResponse {
    pub status: u16,
    pub body: String,
}

impl WriteResponse {
    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fails unless the write succeeded and the body reports no device error.
    pub fn accepted(self) -> DeviceResult<String> {
        if let Some(name) = parse_device_error(&self.body) {
            return Err(DeviceError::Rejected(name));
        }
        if !self.is_success() {
            return Err(DeviceError::HttpStatus(self.status, self.body));
        }
        Ok(self.body)
    }
}

/// Carries raw XML between the controller and a device.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    /// GETs `path` from the device and returns the XML body.
    async fn read(&self, address: &DeviceAddress, path: &str) -> DeviceResult<String>;

    /// POSTs `body` to `path` and returns the device's answer unchecked.
    async fn write(
        &self,
        address: &DeviceAddress,
        path: &str,
        body: String,
    ) -> DeviceResult<WriteResponse>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Direct
// ─────────────────────────────────────────────────────────────────────────────

/// Talks to the device's control port directly.
#[derive(Clone)]
pub struct DirectTransport {
    http: DeviceHttp,
}

impl DirectTransport {
    #[must_use]
    pub fn new(http: DeviceHttp) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DeviceTransport for DirectTransport {
    async fn read(&self, address: &DeviceAddress, path: &str) -> DeviceResult<String> {
        let res = self.http.get(address.as_str(), path).await?;
        if !res.is_success() {
            return Err(DeviceError::HttpStatus(res.status, res.text()));
        }
        Ok(res.text())
    }

    async fn write(
        &self,
        address: &DeviceAddress,
        path: &str,
        body: String,
    ) -> DeviceResult<WriteResponse> {
        let res = self.http.post(address.as_str(), path, body).await?;
        Ok(WriteResponse {
            status: res.status,
            body: res.text(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Relay
// ─────────────────────────────────────────────────────────────────────────────

/// Error body produced by the relay itself.
#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// Returns the relay's own error message if `body` is a relay error document.
fn relay_error(body: &str) -> Option<String> {
    let parsed: RelayErrorBody = serde_json::from_str(body).ok()?;
    Some(parsed.message.unwrap_or(parsed.error))
}

/// Talks to the device through a relay server.
#[derive(Clone)]
pub struct RelayTransport {
    client: Client,
    endpoint: String,
}

impl RelayTransport {
    /// Creates a transport for the relay at `relay_url` (e.g. `http://host:49400`).
    #[must_use]
    pub fn new(client: Client, relay_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/device", relay_url.trim_end_matches('/')),
        }
    }

    /// Relay endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DeviceTransport for RelayTransport {
    async fn read(&self, address: &DeviceAddress, path: &str) -> DeviceResult<String> {
        log::debug!("[Relay] GET {} via {}", path, self.endpoint);

        let res = self
            .client
            .get(&self.endpoint)
            .query(&[("endpoint", path), ("ip", address.as_str())])
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;

        // Reads are normalised to 200 by the relay; anything else is the relay's own error
        if !(200..300).contains(&status) {
            return Err(match relay_error(&body) {
                Some(message) => DeviceError::Relay(message),
                None => DeviceError::HttpStatus(status, body),
            });
        }
        Ok(body)
    }

    async fn write(
        &self,
        address: &DeviceAddress,
        path: &str,
        body: String,
    ) -> DeviceResult<WriteResponse> {
        log::debug!("[Relay] POST {} via {}", path, self.endpoint);

        let res = self
            .client
            .post(&self.endpoint)
            .query(&[("endpoint", path), ("ip", address.as_str())])
            .body(body)
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.text().await?;

        // Upstream statuses pass through; only relay-generated failures are JSON
        if status >= 400 {
            if let Some(message) = relay_error(&body) {
                return Err(DeviceError::Relay(message));
            }
        }
        Ok(WriteResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::test_fixtures::{ERROR_RESPONSE, STATUS_OK};

    #[test]
    fn accepted_write_returns_body() {
        let res = WriteResponse {
            status: 200,
            body: STATUS_OK.to_string(),
        };
        assert_eq!(res.accepted().unwrap(), STATUS_OK);
    }

    #[test]
    fn device_error_body_is_rejected_even_with_200() {
        let res = WriteResponse {
            status: 200,
            body: ERROR_RESPONSE.to_string(),
        };
        assert!(matches!(
            res.accepted(),
            Err(DeviceError::Rejected(name)) if name == "CLIENT_XML_ERROR"
        ));
    }

    #[test]
    fn non_success_status_is_rejected() {
        let res = WriteResponse {
            status: 500,
            body: String::new(),
        };
        assert!(matches!(res.accepted(), Err(DeviceError::HttpStatus(500, _))));
    }

    #[test]
    fn relay_error_prefers_message() {
        assert_eq!(
            relay_error(r#"{"error":"device_unreachable","message":"Device unreachable: x","status":502}"#)
                .as_deref(),
            Some("Device unreachable: x")
        );
        assert_eq!(
            relay_error(r#"{"error":"Missing parameters"}"#).as_deref(),
            Some("Missing parameters")
        );
        assert_eq!(relay_error("<errors/>"), None);
    }

    #[test]
    fn relay_endpoint_strips_trailing_slash() {
        let transport = RelayTransport::new(Client::new(), "http://relay:49400/");
        assert_eq!(transport.endpoint(), "http://relay:49400/api/device");
    }
}
