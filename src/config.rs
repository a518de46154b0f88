//! Configuration file handling.
//!
//! This module handles loading, validating and merging configuration from
//! `hoover.toml` files: the foundation registry plus the settings applied to
//! every outbound snapshot request.

use crate::aggregation::DEFAULT_CONCURRENCY;
use crate::gateway::DEFAULT_TIMEOUT;
use crate::models::Source;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hoover.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Outbound request settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Foundation name -> base address (no scheme).
    #[serde(default, alias = "butlers")]
    pub foundations: BTreeMap<String, String>,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Maximum foundations queried at once per aggregation.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            concurrency: default_concurrency(),
        }
    }
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

/// Settings for snapshot requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Skip TLS certificate validation.
    #[serde(default)]
    pub ssl_validation_skipped: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            ssl_validation_skipped: false,
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::load_from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from a string.
    pub fn load_from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// `./hoover.toml`, if it exists.
    pub fn default_path() -> Option<PathBuf> {
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Check invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.general.concurrency > 0,
            "general.concurrency must be > 0, got {}",
            self.general.concurrency
        );
        ensure!(
            self.client.timeout_seconds > 0,
            "client.timeout_seconds must be > 0, got {}",
            self.client.timeout_seconds
        );

        for (name, address) in &self.foundations {
            ensure!(!name.trim().is_empty(), "foundation names must be non-empty");
            ensure!(
                !address.trim().is_empty(),
                "foundations.{} must have a non-empty address",
                name
            );
            ensure!(
                !address.contains("://"),
                "foundations.{} address must not include a scheme, got {}",
                name,
                address
            );
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout {
            self.client.timeout_seconds = timeout;
        }

        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }

        if args.skip_ssl_validation {
            self.client.ssl_validation_skipped = true;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// The foundation registry, in name order.
    pub fn sources(&self) -> Vec<Source> {
        self.foundations
            .iter()
            .map(|(name, address)| Source::new(name.as_str(), address.as_str()))
            .collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_seconds)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut content = toml::to_string_pretty(&Config::default()).unwrap_or_default();
        content.push_str("# prod = \"butler.prod.example.com\"\n");
        content
    }
}
