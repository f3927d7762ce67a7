//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use rocket_commerce::prelude::*;
use rocket_data::{FetchClient, StoreApi};

use crate::config::CliConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["rocket.toml", ".rocket.toml", "rocket.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Directory holding the config file, if one was found.
    pub config_dir: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_dir) = if let Some(path) = config_path {
            let dir = Path::new(path).parent().map(|p| cwd.join(p));
            (CliConfig::load(path)?, dir)
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, dir)) => (config, Some(dir)),
                None => (CliConfig::default(), None),
            }
        };

        Ok(Self {
            config,
            output,
            cwd,
            config_dir,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    match CliConfig::load(config_path.to_str()?) {
                        Ok(config) => return Some((config, current)),
                        Err(e) => {
                            tracing::warn!(path = %config_path.display(), error = %e, "skipping config");
                        }
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the config directory, or the working
    /// directory when no config file was found.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.config_dir.as_deref().unwrap_or(&self.cwd).join(path)
        }
    }

    /// Storefront API client built from the `[api]` section.
    pub fn store_api(&self) -> Result<StoreApi> {
        let api = &self.config.api;
        let mut client = FetchClient::with_connect_timeout(&api.base_url, api.timeouts())
            .with_context(|| format!("Failed to create HTTP client for {}", api.base_url))?;
        if let Some(policy) = api.fetch_policy() {
            client = client.with_default_policy(policy);
        }
        Ok(StoreApi::new(client))
    }

    /// Cart store backed by the configured API and storage file.
    ///
    /// Failures are reported through `output`, which acts as the toast.
    pub fn cart_store(&self) -> Result<CartStore> {
        let storage_path = self.resolve_path(&self.config.storage.path);
        self.output.debug(&format!("Storage: {}", storage_path.display()));

        let storage = Cache::open_file(&storage_path)
            .with_context(|| format!("Failed to open storage: {}", storage_path.display()))?;

        Ok(CartStore::load(
            Arc::new(self.store_api()?),
            storage,
            Arc::new(self.output.clone()),
        ))
    }

    /// Display currency from the `[display]` section.
    pub fn currency(&self) -> Result<Currency> {
        self.config.display.currency()
    }
}
