//! # Console Configuration
//!
//! Configuration for talking to the remote store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKROOM_API_URL=https://api.example.com                          │
//! │     STOCKROOM_TIMEOUT_SECS=10                                          │
//! │     STOCKROOM_DEBOUNCE_MS=300                                          │
//! │     STOCKROOM_TOKEN_PATH=/tmp/session.token                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockroom/console.toml (Linux)                           │
//! │     ~/Library/Application Support/com.stockroom.console/console.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://127.0.0.1:8000, 30s timeout, 500ms debounce                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # console.toml
//! [api]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 30
//!
//! [search]
//! debounce_ms = 500
//! product_limit = 100
//! order_limit = 10
//!
//! [session]
//! token_path = "/var/lib/stockroom/session.token"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// Where the remote store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Search Settings
// =============================================================================

/// Lookup behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period before a typed query is sent (milliseconds).
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Upper bound on products listed, also for an empty query.
    #[serde(default = "default_product_limit")]
    pub product_limit: usize,

    /// Upper bound on shippable orders offered to the sale form.
    #[serde(default = "default_order_limit")]
    pub order_limit: usize,
}

fn default_debounce() -> u64 {
    500
}

fn default_product_limit() -> usize {
    100
}

fn default_order_limit() -> usize {
    10
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce(),
            product_limit: default_product_limit(),
            order_limit: default_order_limit(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// =============================================================================
// Session Settings
// =============================================================================

/// Where the bearer token is persisted between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Explicit token file. Defaults to the platform data directory.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

// =============================================================================
// Main Console Configuration
// =============================================================================

/// Complete console configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl ConsoleConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (console.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading console config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidConfig(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.search.product_limit == 0 || self.search.order_limit == 0 {
            return Err(ClientError::InvalidConfig(
                "search limits must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from a variable source (the process environment in
    /// production).
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("STOCKROOM_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = var("STOCKROOM_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring invalid STOCKROOM_TIMEOUT_SECS"),
            }
        }

        if let Some(debounce) = var("STOCKROOM_DEBOUNCE_MS") {
            match debounce.parse::<u64>() {
                Ok(ms) => self.search.debounce_ms = ms,
                Err(_) => warn!(value = %debounce, "Ignoring invalid STOCKROOM_DEBOUNCE_MS"),
            }
        }

        if let Some(path) = var("STOCKROOM_TOKEN_PATH") {
            self.session.token_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockroom", "console")
            .map(|dirs| dirs.config_dir().join("console.toml"))
    }

    /// The token file to use: the configured one, else the platform data
    /// directory. `None` keeps the session in memory only.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.session.token_path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "stockroom", "console")
                .map(|dirs| dirs.data_dir().join("session.token"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.search.debounce(), Duration::from_millis(500));
        assert_eq!(config.search.product_limit, 100);
        assert_eq!(config.search.order_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ConsoleConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://estoque.example.com"

            [search]
            order_limit = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://estoque.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.search.order_limit, 25);
        assert_eq!(config.search.debounce_ms, 500);
        assert!(config.session.token_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("STOCKROOM_API_URL", "https://api.example.com"),
            ("STOCKROOM_DEBOUNCE_MS", "250"),
            ("STOCKROOM_TIMEOUT_SECS", "not-a-number"),
            ("STOCKROOM_TOKEN_PATH", "/tmp/stockroom.token"),
        ]
        .into_iter()
        .collect();

        let mut config = ConsoleConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(
            config.token_path(),
            Some(PathBuf::from("/tmp/stockroom.token"))
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = ConsoleConfig::default();

        config.api.base_url = "ftp://files.example.com".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "https://api.example.com".to_string();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.api.timeout_secs = 5;
        config.search.product_limit = 0;
        assert!(config.validate().is_err());
    }
}
