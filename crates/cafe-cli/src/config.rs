//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CAFE_GROUP_SEPARATOR=__                                            │
//! │     CAFE_UNKNOWN_KEYS=reject                                           │
//! │     CAFE_LOG=debug                                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/cafe-backoffice/customize.toml (Linux)                   │
//! │     ~/Library/Application Support/com.cafe.backoffice/customize.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     separator "-", unknown keys ignored, log "info,cafe=debug"         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [resolver]
//! group_separator = "-"
//! unknown_keys = "ignore"   # ignore | reject
//!
//! [logging]
//! filter = "info,cafe=debug"
//! ```

use std::path::{Path, PathBuf};

use cafe_core::{ResolverOptions, UnknownKeyPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, CliResult};

const CONFIG_FILE_NAME: &str = "customize.toml";

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

pub(crate) fn default_log_filter() -> String {
    "info,cafe=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// CLI Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub resolver: ResolverOptions,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl CliConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// file at the default location is not.
    pub fn load(config_path: Option<PathBuf>) -> CliResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> CliResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file, returning the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> CliResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CliError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml()?)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CliResult<()> {
        if self.resolver.group_separator.is_empty() {
            return Err(CliError::InvalidConfig(
                "resolver.group_separator must not be empty".into(),
            ));
        }

        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            CliError::InvalidConfig(format!(
                "logging.filter '{}' is not a valid filter: {}",
                self.logging.filter, e
            ))
        })?;

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a variable lookup (the environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(separator) = lookup("CAFE_GROUP_SEPARATOR") {
            debug!(separator = %separator, "Overriding group separator from environment");
            self.resolver.group_separator = separator;
        }

        if let Some(policy) = lookup("CAFE_UNKNOWN_KEYS") {
            match policy.parse::<UnknownKeyPolicy>() {
                Ok(parsed) => self.resolver.unknown_keys = parsed,
                Err(e) => warn!(value = %policy, error = %e, "Ignoring CAFE_UNKNOWN_KEYS"),
            }
        }

        if let Some(filter) = lookup("CAFE_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "cafe", "backoffice")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
