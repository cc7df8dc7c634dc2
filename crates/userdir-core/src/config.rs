//! Application configuration management.
//!
//! Configuration is stored at `~/.config/userdir/config.json`. Every field is
//! optional; `USERDIR_BASE_URL` overrides the directory URL.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::cache::CacheOptions;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "userdir";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the directory URL
pub const BASE_URL_ENV: &str = "USERDIR_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub refetch_on_settle: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the log file
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Directory URL: environment, then config file, then the default.
    pub fn base_url(&self) -> String {
        self.resolve_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    fn resolve_base_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Config with the environment override and defaults filled in.
    pub fn effective(&self) -> Self {
        self.resolved(std::env::var(BASE_URL_ENV).ok())
    }

    fn resolved(&self, from_env: Option<String>) -> Self {
        Self {
            base_url: Some(self.resolve_base_url(from_env)),
            request_timeout_secs: Some(self.request_timeout().as_secs()),
            refetch_on_settle: self.refetch_on_settle,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            refetch_on_settle: self.refetch_on_settle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resolve_base_url(None), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(!config.cache_options().refetch_on_settle);
    }

    #[test]
    fn test_env_overrides_config_file() {
        let config = Config {
            base_url: Some("http://from-file/users".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_base_url(None), "http://from-file/users");
        assert_eq!(
            config.resolve_base_url(Some("http://from-env/users".to_string())),
            "http://from-env/users"
        );
        // Blank env values fall through
        assert_eq!(
            config.resolve_base_url(Some("  ".to_string())),
            "http://from-file/users"
        );
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = serde_json::from_str(r#"{"refetch_on_settle": true}"#).unwrap();
        assert!(config.refetch_on_settle);
        assert!(config.base_url.is_none());

        let empty: Config = serde_json::from_str("{}").unwrap();
        assert!(!empty.refetch_on_settle);
    }

    #[test]
    fn test_resolved_config_includes_env_override() {
        let config = Config {
            base_url: Some("http://from-file/users".to_string()),
            refetch_on_settle: true,
            ..Default::default()
        };

        let resolved = config.resolved(Some("http://from-env/users".to_string()));
        assert_eq!(resolved.base_url.as_deref(), Some("http://from-env/users"));
        assert_eq!(resolved.request_timeout_secs, Some(30));
        assert!(resolved.refetch_on_settle);

        let defaults = Config::default().resolved(None);
        assert_eq!(defaults.base_url.as_deref(), Some(DEFAULT_BASE_URL));
    }

    #[test]
    fn test_custom_timeout() {
        let config = Config {
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }
}
