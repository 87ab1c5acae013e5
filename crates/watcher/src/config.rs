//! Watcher configuration

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filter::FilterConfig;

/// Top-level watcher configuration, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Debounce delay in milliseconds; also the sweep frequency (default: 250)
    #[serde(default = "default_quiet_interval_millis")]
    pub quiet_interval_millis: u64,

    /// Change filtering
    #[serde(default)]
    pub filter: FilterConfig,
}

impl WatcherConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn quiet_interval(&self) -> Duration {
        Duration::from_millis(self.quiet_interval_millis)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            quiet_interval_millis: default_quiet_interval_millis(),
            filter: FilterConfig::default(),
        }
    }
}

fn default_quiet_interval_millis() -> u64 {
    250
}
