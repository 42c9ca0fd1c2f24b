//! # Node Configuration
//!
//! Runtime parameters of the application. Every field has a default; the
//! binary overrides them from `DX_*` environment variables.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `DX_CHAIN_ID` | `chain_id` | `dex-chain` |
//! | `DX_INV_CHECK_PERIOD` | `inv_check_period` | `0` (disabled) |
//! | `DX_PUBLISH_ENABLED` | `publish.enabled` | `true` |
//! | `DX_PUBLISH_TOPICS` | `publish.topics` | module declarations |
//! | `DX_STORAGE` | `storage.backend` | `memory` |
//! | `DX_DATA_DIR` | `storage.data_dir` | `./data` |
//! | `DX_GENESIS` | `genesis_file` | none (default genesis) |
//! | `DX_EXPORT` | `export_file` | none |
//! | `DX_BLOCK_INTERVAL_MS` | `block_interval_ms` | `1000` |

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chain_id: String,
    /// Run every invariant each `inv_check_period` blocks. `0` disables.
    pub inv_check_period: u64,
    pub publish: PublishConfig,
    pub storage: StorageConfig,
    /// Genesis document loaded on first start.
    pub genesis_file: Option<PathBuf>,
    /// Where to write the exported genesis on shutdown.
    pub export_file: Option<PathBuf>,
    /// Interval of the development block loop.
    pub block_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chain_id: "dex-chain".to_string(),
            inv_check_period: 0,
            publish: PublishConfig::default(),
            storage: StorageConfig::default(),
            genesis_file: None,
            export_file: None,
            block_interval_ms: 1_000,
        }
    }
}

/// Event publication.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// `false` turns every event into a plain (non-publishable) event.
    pub enabled: bool,
    /// Replaces the event kinds declared by the modules.
    pub topics: Option<Vec<String>>,
    /// Per-subscriber buffer of the in-memory bus.
    pub channel_capacity: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            topics: None,
            channel_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl AppConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults overridden through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(chain_id) = lookup("DX_CHAIN_ID") {
            config.chain_id = chain_id;
        }
        if let Some(value) = lookup("DX_INV_CHECK_PERIOD") {
            config.inv_check_period = parse("DX_INV_CHECK_PERIOD", &value)?;
        }
        if let Some(value) = lookup("DX_PUBLISH_ENABLED") {
            config.publish.enabled = parse_bool("DX_PUBLISH_ENABLED", &value)?;
        }
        if let Some(value) = lookup("DX_PUBLISH_TOPICS") {
            config.publish.topics = Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        if let Some(value) = lookup("DX_STORAGE") {
            config.storage.backend = parse("DX_STORAGE", &value)?;
        }
        if let Some(dir) = lookup("DX_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        config.genesis_file = lookup("DX_GENESIS").map(PathBuf::from);
        config.export_file = lookup("DX_EXPORT").map(PathBuf::from);
        if let Some(value) = lookup("DX_BLOCK_INTERVAL_MS") {
            config.block_interval_ms = parse("DX_BLOCK_INTERVAL_MS", &value)?;
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.inv_check_period, 0);
        assert!(config.publish.enabled);
        assert!(config.publish.topics.is_none());
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DX_INV_CHECK_PERIOD", "5"),
            ("DX_PUBLISH_ENABLED", "false"),
            ("DX_PUBLISH_TOPICS", "send_coins, create_validator,"),
            ("DX_STORAGE", "RocksDB"),
        ]))
        .unwrap();

        assert_eq!(config.inv_check_period, 5);
        assert!(!config.publish.enabled);
        assert_eq!(
            config.publish.topics,
            Some(vec!["send_coins".to_string(), "create_validator".to_string()])
        );
        assert_eq!(config.storage.backend, StorageBackend::RocksDb);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = AppConfig::from_lookup(lookup(&[("DX_INV_CHECK_PERIOD", "often")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "DX_INV_CHECK_PERIOD", .. }));

        assert!(AppConfig::from_lookup(lookup(&[("DX_STORAGE", "tape")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("DX_PUBLISH_ENABLED", "maybe")])).is_err());
    }
}
