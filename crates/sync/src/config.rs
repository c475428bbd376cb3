// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Sync Configuration
//!
//! Timing and namespace settings for the refresh loop.
//!
//! ## Example
//!
//! ```rust,ignore
//! use graphmeta_sync::SyncConfig;
//! use std::time::Duration;
//!
//! let config = SyncConfig {
//!     refresh_interval: Duration::from_secs(5),
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```
//!
//! Config files use whole seconds:
//!
//! ```yaml
//! refresh_interval_secs: 20
//! query_timeout_secs: 10
//! settings_prefix: "browser."
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use graphmeta_catalog::query::BROWSER_SETTINGS_PREFIX;

/// Default time between refresh cycles
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20);

/// Default bound on a single round trip
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Refresh loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Time between refresh cycles
    #[serde(rename = "refresh_interval_secs", with = "duration_secs")]
    pub refresh_interval: Duration,

    /// Maximum time a single round trip may take
    #[serde(rename = "query_timeout_secs", with = "duration_secs")]
    pub query_timeout: Duration,

    /// Namespace of server settings to mirror
    pub settings_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            settings_prefix: BROWSER_SETTINGS_PREFIX.to_string(),
        }
    }
}

impl SyncConfig {
    /// Validate the configuration
    ///
    /// Checks that:
    /// - Both durations are non-zero
    /// - The settings prefix is not empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::InvalidDuration {
                field: "refresh_interval",
            });
        }

        if self.query_timeout.is_zero() {
            return Err(ConfigError::InvalidDuration {
                field: "query_timeout",
            });
        }

        if self.settings_prefix.is_empty() {
            return Err(ConfigError::EmptySettingsPrefix);
        }

        Ok(())
    }

    /// Load and validate a YAML or JSON config file
    ///
    /// The file is either a plain config document or a client settings
    /// payload carrying a `graphmeta` section (see [`Self::from_settings`]).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let document: Value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            Some("json") => {
                serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            _ => {
                return Err(ConfigError::Parse(format!(
                    "unsupported config format: {}",
                    path.display()
                )));
            }
        };

        Self::from_document(document)
    }

    fn from_document(document: Value) -> Result<Self, ConfigError> {
        let config = if document.get("graphmeta").is_some() {
            Self::from_settings(&document).ok_or_else(|| {
                ConfigError::Parse("invalid value in graphmeta settings".to_string())
            })?
        } else {
            serde_json::from_value(document).map_err(|e| ConfigError::Parse(e.to_string()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse config from a client settings payload.
    ///
    /// Expected shape:
    /// {
    ///   "graphmeta": {
    ///     "refreshIntervalSecs": 20,
    ///     "queryTimeoutSecs": 10,
    ///     "settingsPrefix": "browser."
    ///   }
    /// }
    ///
    /// Missing keys fall back to defaults. Returns `None` when the
    /// `graphmeta` section is absent or a present key has the wrong type.
    pub fn from_settings(settings: &Value) -> Option<Self> {
        let section = settings.get("graphmeta")?;
        let mut config = Self::default();

        if let Some(value) = section.get("refreshIntervalSecs") {
            config.refresh_interval = Duration::from_secs(value.as_u64()?);
        }
        if let Some(value) = section.get("queryTimeoutSecs") {
            config.query_timeout = Duration::from_secs(value.as_u64()?);
        }
        if let Some(value) = section.get("settingsPrefix") {
            config.settings_prefix = value.as_str()?.to_string();
        }

        Some(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A duration was zero
    #[error("{field} must be greater than zero")]
    InvalidDuration { field: &'static str },

    /// Settings prefix was empty
    #[error("settings_prefix must not be empty")]
    EmptySettingsPrefix,

    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(20));
        assert_eq!(config.query_timeout, Duration::from_secs(10));
        assert_eq!(config.settings_prefix, "browser.");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let config = SyncConfig {
            refresh_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { field: "refresh_interval" })
        ));

        let config = SyncConfig {
            query_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { field: "query_timeout" })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_prefix() {
        let config = SyncConfig {
            settings_prefix: String::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptySettingsPrefix)));
    }

    #[test]
    fn test_deserialize_partial_yaml() {
        let config: SyncConfig = serde_yaml::from_str("refresh_interval_secs: 5\n").unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.query_timeout, DEFAULT_QUERY_TIMEOUT);
    }

    #[test]
    fn test_serialize_uses_seconds() {
        let json = serde_json::to_value(SyncConfig::default()).unwrap();
        assert_eq!(
            json,
            json!({
                "refresh_interval_secs": 20,
                "query_timeout_secs": 10,
                "settings_prefix": "browser."
            })
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = json!({
            "graphmeta": {
                "refreshIntervalSecs": 60,
                "settingsPrefix": "console."
            }
        });
        let config = SyncConfig::from_settings(&settings).unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.query_timeout, DEFAULT_QUERY_TIMEOUT);
        assert_eq!(config.settings_prefix, "console.");
    }

    #[test]
    fn test_from_settings_missing_or_invalid() {
        assert!(SyncConfig::from_settings(&json!({})).is_none());
        assert!(
            SyncConfig::from_settings(&json!({"graphmeta": {"queryTimeoutSecs": "ten"}}))
                .is_none()
        );
        assert_eq!(
            SyncConfig::from_settings(&json!({"graphmeta": {}})),
            Some(SyncConfig::default())
        );
    }

    #[test]
    fn test_document_forms() {
        let plain = SyncConfig::from_document(json!({"query_timeout_secs": 3})).unwrap();
        assert_eq!(plain.query_timeout, Duration::from_secs(3));

        let payload = SyncConfig::from_document(json!({
            "graphmeta": {"refreshIntervalSecs": 45}
        }))
        .unwrap();
        assert_eq!(payload.refresh_interval, Duration::from_secs(45));

        assert!(matches!(
            SyncConfig::from_document(json!({"graphmeta": {"refreshIntervalSecs": -1}})),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SyncConfig::from_document(json!({"graphmeta": {"settingsPrefix": ""}})),
            Err(ConfigError::EmptySettingsPrefix)
        ));
    }

    #[test]
    fn test_from_path_fixtures() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

        let config = SyncConfig::from_path(dir.join("sync.yaml")).unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(30));
        assert_eq!(config.query_timeout, Duration::from_secs(5));

        let config = SyncConfig::from_path(dir.join("client_settings.json")).unwrap();
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.settings_prefix, "browser.");
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = SyncConfig::from_path("no/such/config.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
