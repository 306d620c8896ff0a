//! # Basket Configuration
//!
//! Where the cart snapshot lives and how much the store logs.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BASKET_SNAPSHOT_KEY=@GoMarketplace:products                        │
//! │     BASKET_DB_PATH=/tmp/basket.db                                      │
//! │     BASKET_MAX_CONNECTIONS=4                                           │
//! │     BASKET_LOG=info,basket=trace                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/basket/basket.toml (Linux)                               │
//! │     ~/Library/Application Support/com.basket.basket/basket.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     snapshot_key = "@GoMarketplace:products", platform data dir        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # basket.toml
//! [storage]
//! snapshot_key = "@GoMarketplace:products"
//! database_path = "/var/lib/basket/basket.db"  # optional
//! max_connections = 2
//!
//! [logging]
//! filter = "info,basket=debug,sqlx=warn"  # used when RUST_LOG is unset
//! ```

use std::path::PathBuf;

use basket_core::CART_SNAPSHOT_KEY;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::pool::DbConfig;

/// Upper bound for `max_connections`. SQLite serializes writers anyway.
pub const MAX_POOL_CONNECTIONS: u32 = 32;

/// Default `EnvFilter` directive.
pub const DEFAULT_LOG_FILTER: &str = "info,basket=debug,sqlx=warn";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where and how the cart snapshot is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the snapshot is read from and written to.
    #[serde(default = "default_snapshot_key")]
    pub snapshot_key: String,

    /// SQLite file. `None` means the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// SQLite pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_snapshot_key() -> String {
    CART_SNAPSHOT_KEY.to_string()
}

fn default_max_connections() -> u32 {
    2
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            snapshot_key: default_snapshot_key(),
            database_path: None,
            max_connections: default_max_connections(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete basket configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl BasketConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (basket.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading basket config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load basket config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| StoreError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Basket config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        if self.storage.snapshot_key.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "storage.snapshot_key must not be empty".into(),
            ));
        }

        if self.storage.max_connections == 0 || self.storage.max_connections > MAX_POOL_CONNECTIONS
        {
            return Err(StoreError::InvalidConfig(format!(
                "storage.max_connections must be between 1 and {}, got {}",
                MAX_POOL_CONNECTIONS, self.storage.max_connections
            )));
        }

        if let Some(ref path) = self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(StoreError::InvalidConfig(
                    "storage.database_path must not be empty".into(),
                ));
            }
        }

        if self.logging.filter.trim().is_empty() {
            return Err(StoreError::InvalidConfig(
                "logging.filter must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies `BASKET_*` overrides read through `lookup`.
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("BASKET_SNAPSHOT_KEY") {
            debug!(key = %key, "Overriding snapshot key from environment");
            self.storage.snapshot_key = key;
        }

        if let Some(path) = lookup("BASKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(max) = lookup("BASKET_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.storage.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring non-numeric BASKET_MAX_CONNECTIONS"),
            }
        }

        if let Some(filter) = lookup("BASKET_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "basket", "basket")
            .map(|dirs| dirs.config_dir().join("basket.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn snapshot_key(&self) -> &str {
        &self.storage.snapshot_key
    }

    /// The SQLite file to use: the configured path, else `basket.db` in the
    /// platform data directory.
    ///
    /// ## Platform-Specific Paths
    /// - **macOS**: `~/Library/Application Support/com.basket.basket/basket.db`
    /// - **Windows**: `%APPDATA%\basket\basket\data\basket.db`
    /// - **Linux**: `~/.local/share/basket/basket.db`
    pub fn resolve_database_path(&self) -> StoreResult<PathBuf> {
        if let Some(ref path) = self.storage.database_path {
            return Ok(path.clone());
        }

        directories::ProjectDirs::from("com", "basket", "basket")
            .map(|dirs| dirs.data_dir().join("basket.db"))
            .ok_or_else(|| {
                StoreError::InvalidConfig("Could not determine app data directory".into())
            })
    }

    /// Pool settings for the SQLite backend.
    pub fn db_config(&self) -> StoreResult<DbConfig> {
        Ok(DbConfig::new(self.resolve_database_path()?)
            .max_connections(self.storage.max_connections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = BasketConfig::default();
        assert_eq!(config.snapshot_key(), "@GoMarketplace:products");
        assert_eq!(config.storage.max_connections, 2);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BasketConfig::default();

        config.storage.snapshot_key = "   ".to_string();
        assert!(matches!(config.validate(), Err(StoreError::InvalidConfig(_))));

        config.storage.snapshot_key = "cart".to_string();
        config.storage.max_connections = 0;
        assert!(config.validate().is_err());

        config.storage.max_connections = MAX_POOL_CONNECTIONS + 1;
        assert!(config.validate().is_err());

        config.storage.max_connections = 4;
        config.logging.filter = String::new();
        assert!(config.validate().is_err());

        config.logging.filter = "warn".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: BasketConfig = toml::from_str(
            r#"
            [storage]
            snapshot_key = "shop:cart"
            "#,
        )
        .unwrap();

        assert_eq!(config.snapshot_key(), "shop:cart");
        assert_eq!(config.storage.max_connections, 2);
        assert_eq!(config.storage.database_path, None);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("BASKET_SNAPSHOT_KEY", "env:cart"),
            ("BASKET_DB_PATH", "/tmp/env-basket.db"),
            ("BASKET_MAX_CONNECTIONS", "not-a-number"),
            ("BASKET_LOG", "trace"),
        ]
        .into_iter()
        .collect();

        let mut config = BasketConfig::default();
        config.apply_overrides_from(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.snapshot_key(), "env:cart");
        assert_eq!(
            config.resolve_database_path().unwrap(),
            PathBuf::from("/tmp/env-basket.db")
        );
        // Unparseable value is ignored.
        assert_eq!(config.storage.max_connections, 2);
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("basket.toml");

        let mut config = BasketConfig::default();
        config.storage.snapshot_key = "saved:cart".to_string();
        config.storage.database_path = Some(dir.path().join("basket.db"));
        config.save(Some(path.clone())).unwrap();

        let mut loaded: BasketConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        loaded.validate().unwrap();
        assert_eq!(loaded, config);

        loaded.storage.max_connections = 0;
        assert!(loaded.validate().is_err());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basket.toml");
        std::fs::write(&path, "[storage\nsnapshot_key = ").unwrap();

        assert!(matches!(
            BasketConfig::load(Some(path.clone())),
            Err(StoreError::ConfigLoadFailed(_))
        ));

        let config = BasketConfig::load_or_default(Some(path));
        assert_eq!(config.storage, StorageSettings::default());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&BasketConfig::default()).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[logging]"));
    }
}
