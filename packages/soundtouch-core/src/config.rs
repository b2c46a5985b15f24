//! Core configuration shared by the relay server and the remote client.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::DEFAULT_DEVICE_PORT;

/// Which station directory backs the search relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryProvider {
    /// TuneIn OPML search.
    #[default]
    Tunein,
    /// Radio-Browser community database.
    RadioBrowser,
}

impl fmt::Display for DirectoryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tunein => f.write_str("tunein"),
            Self::RadioBrowser => f.write_str("radio_browser"),
        }
    }
}

impl FromStr for DirectoryProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tunein" => Ok(Self::Tunein),
            "radio_browser" | "radiobrowser" => Ok(Self::RadioBrowser),
            other => Err(format!("unknown directory provider: {other}")),
        }
    }
}

/// Configuration for the relay and the control client.
///
/// All fields have sensible defaults.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    // Server
    /// Port the relay HTTP server binds to.
    pub bind_port: u16,

    // Device
    /// Control port of the speaker.
    pub device_port: u16,

    /// Timeout applied to every outbound device request (seconds).
    pub device_timeout_secs: u64,

    // Directory
    /// Provider answering `/api/search`.
    pub directory_provider: DirectoryProvider,

    /// Base URL of the TuneIn OPML API.
    pub tunein_base_url: String,

    /// Base URL of a Radio-Browser API mirror.
    pub radio_browser_base_url: String,

    /// Timeout applied to directory searches (seconds).
    pub directory_timeout_secs: u64,

    /// Maximum number of search results returned.
    pub directory_result_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_port: 49400,
            device_port: DEFAULT_DEVICE_PORT,
            device_timeout_secs: 10,
            directory_provider: DirectoryProvider::Tunein,
            tunein_base_url: "https://opml.radiotime.com".to_string(),
            radio_browser_base_url: "https://de1.api.radio-browser.info".to_string(),
            directory_timeout_secs: 10,
            directory_result_limit: 20,
        }
    }
}

impl Config {
    /// Timeout for device requests.
    pub fn device_timeout(&self) -> Duration {
        Duration::from_secs(self.device_timeout_secs)
    }

    /// Timeout for directory searches.
    pub fn directory_timeout(&self) -> Duration {
        Duration::from_secs(self.directory_timeout_secs)
    }

    /// Validates the configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.device_port == 0 {
            return Err("device_port must be >= 1".to_string());
        }
        if self.device_timeout_secs == 0 {
            return Err("device_timeout_secs must be >= 1".to_string());
        }
        if self.directory_timeout_secs == 0 {
            return Err("directory_timeout_secs must be >= 1".to_string());
        }
        if self.directory_result_limit == 0 {
            return Err("directory_result_limit must be >= 1".to_string());
        }
        Ok(())
    }
}
