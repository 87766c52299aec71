//! Configuration loading for the reconciliation engine
//!
//! Resolution priority order:
//! 1. Environment variables (highest priority)
//! 2. TOML config file
//! 3. Compiled defaults (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const ENV_BASE_URL: &str = "EMPSYNC_BASE_URL";
const ENV_CONFIG_FILE: &str = "EMPSYNC_CONFIG";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8710";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TRANSFER_TIMEOUT_SECS: u64 = 120;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL of the employee directory service
    pub base_url: String,
    /// Timeout for JSON API calls (ticket, section persist, record fetch)
    pub request_timeout: Duration,
    /// Timeout for raw file transfers (larger payloads, longer budget)
    pub transfer_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            transfer_timeout: Duration::from_secs(DEFAULT_TRANSFER_TIMEOUT_SECS),
        }
    }
}

/// On-disk TOML schema
#[derive(Debug, Deserialize)]
struct TomlConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    transfer_timeout_secs: Option<u64>,
}

impl EngineConfig {
    /// Load configuration following the priority order above.
    ///
    /// A missing config file is not an error; a present but malformed one is.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_file_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                let parsed: TomlConfig = toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                config.apply_toml(parsed);
                tracing::info!(path = %path.display(), "Loaded engine config file");
            }
        }

        // Environment overrides the file
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a specific TOML file, applying environment overrides on top.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let mut config = Self::default();
        let content = std::fs::read_to_string(path)?;
        let parsed: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.apply_toml(parsed);

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_toml(&mut self, parsed: TomlConfig) {
        if let Some(url) = parsed.base_url {
            self.base_url = url;
        }
        if let Some(secs) = parsed.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parsed.transfer_timeout_secs {
            self.transfer_timeout = Duration::from_secs(secs);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Config file location: explicit env override, then platform config dir
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_FILE) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("empsync").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn load_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "base_url = \"https://hr.example.com\"").unwrap();
        writeln!(file, "request_timeout_secs = 5").unwrap();

        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://hr.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        // Not set in file, falls back to default
        assert_eq!(config.transfer_timeout, Duration::from_secs(120));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = [not toml").unwrap();

        let result = EngineConfig::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn non_http_base_url_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"ftp://hr.example.com\"").unwrap();

        let result = EngineConfig::load_from(&path);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
