//! Configuration loading for the Graph mail client
//!
//! Supports loading settings from (in order of priority):
//! 1. JSON file in the config directory (`graph-mail.json`)
//! 2. Runtime environment variables (fallback)

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::graph::{GraphClient, Mailbox};
use crate::upload::{UPLOAD_CHUNK_SIZE, UploadOptions};

/// Settings filename in the graph-mail config directory
const SETTINGS_FILE: &str = "graph-mail.json";

const ENV_MAILBOX: &str = "GRAPH_MAILBOX";
const ENV_ACCESS_TOKEN: &str = "GRAPH_ACCESS_TOKEN";
const ENV_BASE_URL: &str = "GRAPH_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "GRAPH_TIMEOUT_SECS";

/// Connection settings for Microsoft Graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// User principal name to act on; `None` addresses `/me`
    pub mailbox: Option<String>,
    /// Pre-acquired OAuth2 bearer token
    pub access_token: Option<String>,
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Upload chunk size in bytes (at most 4 MiB)
    pub chunk_size: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            mailbox: None,
            access_token: None,
            base_url: GraphClient::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            chunk_size: UPLOAD_CHUNK_SIZE,
        }
    }
}

impl GraphSettings {
    /// Load settings using the following priority:
    /// 1. JSON file (~/.config/graph-mail/graph-mail.json)
    /// 2. Runtime environment variables
    pub fn load() -> Result<Self> {
        if graph_config::config_exists(SETTINGS_FILE) {
            let settings: Self = graph_config::load_json(SETTINGS_FILE)?;
            settings.validate()?;
            return Ok(settings);
        }

        Self::from_env()
    }

    /// Load settings from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings: Self = graph_config::load_json_file(path)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json).context("Failed to parse settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from environment variables
    ///
    /// `GRAPH_ACCESS_TOKEN` is required; `GRAPH_MAILBOX`, `GRAPH_BASE_URL`
    /// and `GRAPH_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var(ENV_ACCESS_TOKEN)
            .context("GRAPH_ACCESS_TOKEN environment variable not set")?;

        let mut settings = Self {
            access_token: Some(access_token),
            mailbox: std::env::var(ENV_MAILBOX).ok().filter(|m| !m.trim().is_empty()),
            ..Self::default()
        };

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            settings.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var(ENV_TIMEOUT_SECS) {
            settings.timeout_secs = timeout
                .parse()
                .with_context(|| format!("Invalid GRAPH_TIMEOUT_SECS: {}", timeout))?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Persist settings to the config directory
    pub fn save(&self) -> Result<()> {
        graph_config::save_json(SETTINGS_FILE, self)
    }

    /// Persist settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        graph_config::save_json_file(path, self)
    }

    /// Get the default settings file path (~/.config/graph-mail/graph-mail.json)
    pub fn default_settings_path() -> Option<PathBuf> {
        graph_config::config_path(SETTINGS_FILE)
    }

    /// Check if settings are available (file or env vars)
    pub fn is_available() -> bool {
        graph_config::config_exists(SETTINGS_FILE) || std::env::var(ENV_ACCESS_TOKEN).is_ok()
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base_url: {}", self.base_url))?;
        if self.chunk_size == 0 || self.chunk_size > UPLOAD_CHUNK_SIZE {
            bail!(
                "chunk_size must be between 1 and {} bytes, got {}",
                UPLOAD_CHUNK_SIZE,
                self.chunk_size
            );
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Mailbox requests are addressed to
    pub fn mailbox(&self) -> Mailbox {
        match &self.mailbox {
            Some(address) => Mailbox::User(address.clone()),
            None => Mailbox::Me,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Upload options with the configured chunk size
    pub fn upload_options(&self) -> UploadOptions {
        UploadOptions::default().with_chunk_size(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_settings() {
        let json = r#"{
            "mailbox": "ops@example.com",
            "access_token": "eyJ0eXAi",
            "base_url": "https://graph.microsoft.com/beta",
            "timeout_secs": 30,
            "chunk_size": 327680
        }"#;

        let settings = GraphSettings::from_json(json).unwrap();
        assert_eq!(settings.mailbox(), Mailbox::User("ops@example.com".to_string()));
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.upload_options().chunk_size(), 327_680);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings = GraphSettings::from_json(r#"{ "access_token": "t" }"#).unwrap();
        assert_eq!(settings.mailbox(), Mailbox::Me);
        assert_eq!(settings.base_url, "https://graph.microsoft.com/v1.0");
        assert_eq!(settings.chunk_size, UPLOAD_CHUNK_SIZE);
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let json = r#"{ "chunk_size": 8388608 }"#;
        assert!(GraphSettings::from_json(json).is_err());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(GraphSettings::from_json(r#"{ "base_url": "not a url" }"#).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph-mail.json");
        let settings = GraphSettings {
            mailbox: Some("ops@example.com".to_string()),
            access_token: Some("token".to_string()),
            ..Default::default()
        };

        settings.save_to(&path).unwrap();
        assert_eq!(GraphSettings::from_file(&path).unwrap(), settings);
    }

    #[test]
    fn test_client_requires_token() {
        let settings = GraphSettings::default();
        assert!(GraphClient::from_settings(&settings).is_err());
    }
}
