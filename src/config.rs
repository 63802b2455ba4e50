use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::constants::{
    get_supported_cities, get_supported_sources, DEFAULT_CITY, DEFAULT_REFRESH_INTERVAL_SECS,
};
use crate::error::{EventError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const CONFIG_PATH_ENV: &str = "PIXIE_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub refresh: RefreshConfig,
    pub discovery: DiscoveryConfig,
    pub mock: MockConfig,
}

/// Host-side scheduling; the event core itself only needs "now".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_secs: u64,
    pub auto_update: bool,
    /// Upper bound on a single source fetch
    pub fetch_timeout_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            auto_update: true,
            fetch_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub default_city: String,
    pub cities: Vec<String>,
    pub sources: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            cities: get_supported_cities().into_iter().map(String::from).collect(),
            sources: get_supported_sources().into_iter().map(String::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub events_per_source: usize,
    pub seed: Option<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            events_per_source: 8,
            seed: None,
        }
    }
}

impl Config {
    /// Load from `$PIXIE_CONFIG`, falling back to `config.toml`. A missing
    /// file at the default location yields the defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from(DEFAULT_CONFIG_PATH)
            }
            Err(_) => {
                debug!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EventError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh.interval_secs == 0 {
            return Err(EventError::Config(
                "refresh.interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.refresh.fetch_timeout_secs == 0 {
            return Err(EventError::Config(
                "refresh.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.discovery.default_city.trim().is_empty() {
            return Err(EventError::Config(
                "discovery.default_city must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
