use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Station short names to monitor, one coordinator each
    #[serde(default)]
    pub stations: Vec<String>,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Launches endpoint override; None means the official RNLI API
    #[serde(default)]
    pub api_url: Option<String>,
}

fn default_refresh_interval_secs() -> u64 {
    300
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            stations: Vec::new(),
            refresh_interval_secs: default_refresh_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            log_level: default_log_level(),
            api_url: None,
        }
    }
}

impl WatchConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: WatchConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Stations must be configured and non-empty; membership in the feed is
    /// the selection flow's responsibility, not ours.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.stations.is_empty() {
            anyhow::bail!("No stations configured");
        }
        if self.stations.iter().any(|s| s.trim().is_empty()) {
            anyhow::bail!("Station short names must be non-empty");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
