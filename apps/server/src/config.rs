//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use soundtouch_core::DirectoryProvider;

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind the HTTP server to.
    /// Override: `SOUNDTOUCH_BIND_PORT`
    pub bind_port: u16,

    /// Control port of the speakers being relayed to.
    /// Override: `SOUNDTOUCH_DEVICE_PORT`
    pub device_port: u16,

    /// Seconds before a relayed device request is abandoned.
    pub device_timeout_secs: u64,

    /// Directory answering `/api/search` (`tunein` or `radio_browser`).
    /// Override: `SOUNDTOUCH_DIRECTORY_PROVIDER`
    pub directory_provider: DirectoryProvider,

    /// TuneIn OPML base URL.
    pub tunein_base_url: String,

    /// Radio-Browser mirror base URL.
    pub radio_browser_base_url: String,

    /// Seconds before a directory search is abandoned.
    pub directory_timeout_secs: u64,

    /// Maximum number of stations returned per search.
    pub directory_result_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let core = soundtouch_core::Config::default();
        Self {
            bind_port: core.bind_port,
            device_port: core.device_port,
            device_timeout_secs: core.device_timeout_secs,
            directory_provider: core.directory_provider,
            tunein_base_url: core.tunein_base_url,
            radio_browser_base_url: core.radio_browser_base_url,
            directory_timeout_secs: core.directory_timeout_secs,
            directory_result_limit: core.directory_result_limit,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Unparseable values are ignored with a warning.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SOUNDTOUCH_BIND_PORT") {
            match val.parse() {
                Ok(port) => self.bind_port = port,
                Err(_) => log::warn!("Ignoring invalid SOUNDTOUCH_BIND_PORT: {}", val),
            }
        }

        if let Some(val) = var("SOUNDTOUCH_DEVICE_PORT") {
            match val.parse() {
                Ok(port) => self.device_port = port,
                Err(_) => log::warn!("Ignoring invalid SOUNDTOUCH_DEVICE_PORT: {}", val),
            }
        }

        if let Some(val) = var("SOUNDTOUCH_DIRECTORY_PROVIDER") {
            match val.parse() {
                Ok(provider) => self.directory_provider = provider,
                Err(e) => log::warn!("Ignoring SOUNDTOUCH_DIRECTORY_PROVIDER: {}", e),
            }
        }

        // Note: SOUNDTOUCH_LOG_LEVEL is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Converts to soundtouch-core's Config type.
    pub fn to_core_config(&self) -> soundtouch_core::Config {
        soundtouch_core::Config {
            bind_port: self.bind_port,
            device_port: self.device_port,
            device_timeout_secs: self.device_timeout_secs,
            directory_provider: self.directory_provider,
            tunein_base_url: self.tunein_base_url.clone(),
            radio_browser_base_url: self.radio_browser_base_url.clone(),
            directory_timeout_secs: self.directory_timeout_secs,
            directory_result_limit: self.directory_result_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port: 8080\ndirectory_provider: radio_browser").unwrap();

        let config: ServerConfig =
            serde_yaml::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();

        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.directory_provider, DirectoryProvider::RadioBrowser);
        assert_eq!(config.device_port, 8090);
        assert_eq!(config.directory_result_limit, 20);
    }

    #[test]
    fn load_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ServerConfig::load(Some(&dir.path().join("missing.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn load_reports_malformed_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port: [not a port").unwrap();

        let err = ServerConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = ServerConfig::default();
        config.apply_env_overrides(env(&[
            ("SOUNDTOUCH_BIND_PORT", "3001"),
            ("SOUNDTOUCH_DEVICE_PORT", "18090"),
            ("SOUNDTOUCH_DIRECTORY_PROVIDER", "radio_browser"),
        ]));

        assert_eq!(config.bind_port, 3001);
        assert_eq!(config.device_port, 18090);
        assert_eq!(config.directory_provider, DirectoryProvider::RadioBrowser);
    }

    #[test]
    fn invalid_env_overrides_are_ignored() {
        let mut config = ServerConfig::default();
        config.apply_env_overrides(env(&[
            ("SOUNDTOUCH_BIND_PORT", "not-a-port"),
            ("SOUNDTOUCH_DIRECTORY_PROVIDER", "spotify"),
        ]));

        assert_eq!(config.bind_port, 49400);
        assert_eq!(config.directory_provider, DirectoryProvider::Tunein);
    }

    #[test]
    fn core_config_mirrors_fields() {
        let config = ServerConfig {
            bind_port: 3001,
            directory_result_limit: 5,
            ..Default::default()
        };
        let core = config.to_core_config();
        assert_eq!(core.bind_port, 3001);
        assert_eq!(core.directory_result_limit, 5);
        assert!(core.validate().is_ok());
    }
}
