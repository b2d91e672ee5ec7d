//! TOML-based application configuration.
//!
//! Holds host-level knobs that are not user wellness settings:
//! - Scheduler tick period
//! - Storage backend and namespace
//! - Which platform's defaults seed a fresh settings record
//! - Notification app name
//!
//! Configuration is stored at `<data_dir>/config.toml`. User-facing reminder
//! settings live in the store instead (see [`crate::settings`]).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use super::store::DEFAULT_NAMESPACE;
use crate::error::ConfigError;
use crate::settings::SettingsDefaults;

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between due-checks.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

/// Which storage implementation backs the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Json,
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

/// Defaults used when the stored settings are missing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// `desktop` (20 minute breaks) or `mobile` (30 minute breaks).
    #[serde(default = "default_variant")]
    pub variant: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

fn default_tick_secs() -> u64 {
    60
}
fn default_backend() -> BackendKind {
    BackendKind::Sqlite
}
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}
fn default_variant() -> String {
    "desktop".into()
}
fn default_app_name() -> String {
    "ErgoWellness".into()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            namespace: default_namespace(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            variant: default_variant(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            storage: StorageConfig::default(),
            defaults: DefaultsConfig::default(),
            notifications: NotificationsConfig::default(),
        }
    }
}

impl AppConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;
        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                serde_json::Value::Number(n.into())
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `path`, writing the defaults there when the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Load from the default location.
    ///
    /// # Errors
    /// See [`AppConfig::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// See [`AppConfig::save_to`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, validating the result.
    /// Does not persist; call [`AppConfig::save`] afterwards.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not fit.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: AppConfig = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.tick_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scheduler.tick_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if !matches!(self.defaults.variant.as_str(), "desktop" | "mobile") {
            return Err(ConfigError::InvalidValue {
                key: "defaults.variant".into(),
                message: format!("expected desktop or mobile, got '{}'", self.defaults.variant),
            });
        }
        Ok(())
    }

    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.scheduler.tick_secs.max(1))
    }

    /// Settings defaults for the configured platform variant.
    pub fn settings_defaults(&self) -> SettingsDefaults {
        match self.defaults.variant.as_str() {
            "mobile" => SettingsDefaults::mobile(),
            _ => SettingsDefaults::desktop(),
        }
    }
}
