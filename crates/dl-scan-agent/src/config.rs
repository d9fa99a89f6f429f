//! Scanner configuration, loadable from TOML.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration for the scanner.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Deadline for each response wait, in milliseconds.
    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    /// Only connect to adapters whose advertised name contains this
    /// fragment. None accepts any adapter speaking a known UART profile.
    #[serde(default)]
    pub device_name: Option<String>,
    /// How long to scan for a matching adapter before giving up, in seconds.
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
}

fn default_response_timeout_ms() -> u64 {
    15_000
}

fn default_discovery_timeout_secs() -> u64 {
    30
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: default_response_timeout_ms(),
            device_name: None,
            discovery_timeout_secs: default_discovery_timeout_secs(),
        }
    }
}

impl ScanConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}
