//! Configuration management for the storefront.
//!
//! Loads configuration from environment variables with sensible defaults.

use marquee_runtime::StoreConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Catalog sink configuration
    pub catalog: CatalogConfig,
    /// Store runtime configuration
    pub store: StoreSettings,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error, or a full `EnvFilter` string)
    pub level: String,
}

/// Catalog sink configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Simulated submission latency in milliseconds
    pub submit_delay_ms: u64,
}

/// Store runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Capacity of each store's action broadcast channel
    pub broadcast_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            logging: LoggingConfig {
                level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            },
            catalog: CatalogConfig {
                submit_delay_ms: lookup("STOREFRONT_SUBMIT_DELAY_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(50),
            },
            store: StoreSettings {
                broadcast_capacity: lookup("STOREFRONT_BROADCAST_CAPACITY")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(16),
            },
        }
    }

    /// Simulated catalog latency
    #[must_use]
    pub const fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.catalog.submit_delay_ms)
    }

    /// Runtime settings for every store
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_broadcast_capacity(self.store.broadcast_capacity)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.submit_delay(), Duration::from_millis(50));
        assert_eq!(config.store.broadcast_capacity, 16);
        assert_eq!(config.store_config().broadcast_capacity, 16);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("RUST_LOG", "marquee_storefront=debug"),
            ("STOREFRONT_SUBMIT_DELAY_MS", "5"),
            ("STOREFRONT_BROADCAST_CAPACITY", "64"),
        ]);

        let config = Config::from_lookup(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.logging.level, "marquee_storefront=debug");
        assert_eq!(config.catalog.submit_delay_ms, 5);
        assert_eq!(config.store_config().broadcast_capacity, 64);
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let config = Config::from_lookup(|key| match key {
            "STOREFRONT_SUBMIT_DELAY_MS" => Some("soon".to_string()),
            _ => None,
        });

        assert_eq!(config.catalog.submit_delay_ms, 50);
    }
}
