//! CLI configuration.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rocket_commerce::Currency;
use rocket_data::{FetchPolicy, RetryPolicy, TimeoutConfig};
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storefront API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Cart persistence configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Display configuration.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render config")
    }
}

/// Storefront API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL serving `/products` and `/stock`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt timeout. Unset uses per-endpoint defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Connection timeout.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Retries after a failed attempt. Unset uses per-endpoint defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_connect_timeout_ms() -> u64 {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: None,
            connect_timeout_ms: default_connect_timeout_ms(),
            max_retries: None,
        }
    }
}

impl ApiConfig {
    /// Timeouts for the HTTP client.
    pub fn timeouts(&self) -> TimeoutConfig {
        let total = TimeoutConfig::default().total;
        TimeoutConfig::new(
            Duration::from_millis(self.connect_timeout_ms),
            self.timeout_ms.map(Duration::from_millis).unwrap_or(total),
        )
    }

    /// A policy overriding the per-endpoint defaults, if anything was set.
    pub fn fetch_policy(&self) -> Option<FetchPolicy> {
        if self.timeout_ms.is_none() && self.max_retries.is_none() {
            return None;
        }
        let max_retries = self
            .max_retries
            .unwrap_or_else(|| RetryPolicy::default().max_attempts);
        let retry = RetryPolicy::new(max_retries);
        Some(FetchPolicy::new(self.timeouts(), retry))
    }
}

/// Cart persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the key-value store, relative to the working
    /// directory unless absolute.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    ".rocketshoes/storage.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Currency code used to format prices.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "BRL".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

impl DisplayConfig {
    pub fn currency(&self) -> Result<Currency> {
        Currency::from_code(&self.currency)
            .ok_or_else(|| anyhow!("Unsupported currency: {}", self.currency))
    }
}

/// Generate a default rocket.toml config file.
pub fn generate_default_config() -> String {
    r#"# RocketShoes cart configuration

[api]
base_url = "http://localhost:3333"
connect_timeout_ms = 1000
# timeout_ms = 5000
# max_retries = 1

[storage]
path = ".rocketshoes/storage.json"

[display]
currency = "BRL"
"#
    .to_string()
}
