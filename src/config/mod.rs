//! Configuration loading and management

use crate::core::query::DEFAULT_PAGE_SIZE;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the marketplace API (e.g., "https://api.pawmart.example")
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Browse page settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    /// Listings per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub api: ApiConfig,

    #[serde(default)]
    pub browse: BrowseConfig,
}

impl MarketConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        if self.browse.page_size == 0 {
            bail!("browse.page_size must be positive");
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be positive");
        }
        Ok(())
    }

    /// Configuration pointing at a local development API
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            browse: BrowseConfig::default(),
        }
    }
}
