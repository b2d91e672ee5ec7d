//! Reminder settings and their resolver.
//!
//! The stored `settings` record is written by several front ends over time,
//! so it is read leniently: each field is taken from the record when it is
//! present and well-formed and otherwise replaced by its default. The
//! resolver never fails.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::storage::{keys, Store};

/// User reminder configuration, persisted under the `settings` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Minutes between break reminders.
    pub break_interval: u32,
    /// Minutes between hydration reminders.
    pub hydration_interval: u32,
    /// System notifications on/off.
    pub notifications: bool,
    pub strict_mode: bool,
    pub camera_enabled: bool,
    pub sound_enabled: bool,
    pub auto_start: bool,
}

/// Defaults applied to missing or malformed fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsDefaults {
    pub break_interval: u32,
    pub hydration_interval: u32,
}

impl SettingsDefaults {
    /// Desktop and web builds remind every 20 minutes.
    pub fn desktop() -> Self {
        Self {
            break_interval: 20,
            hydration_interval: 120,
        }
    }

    /// The mobile build reminds every 30 minutes.
    pub fn mobile() -> Self {
        Self {
            break_interval: 30,
            ..Self::desktop()
        }
    }

    pub fn settings(&self) -> Settings {
        Settings {
            break_interval: self.break_interval,
            hydration_interval: self.hydration_interval,
            notifications: true,
            strict_mode: false,
            camera_enabled: false,
            sound_enabled: true,
            auto_start: true,
        }
    }
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self::desktop()
    }
}

impl Default for Settings {
    fn default() -> Self {
        SettingsDefaults::desktop().settings()
    }
}

/// Persisted field names with the aliases accepted on read.
const BREAK_INTERVAL: &[&str] = &["breakInterval", "breakIntervalMinutes"];
const HYDRATION_INTERVAL: &[&str] = &["hydrationInterval", "hydrationIntervalMinutes"];
const NOTIFICATIONS: &[&str] = &["notifications", "notificationsEnabled"];
const STRICT_MODE: &[&str] = &["strictMode"];
const CAMERA_ENABLED: &[&str] = &["cameraEnabled"];
const SOUND_ENABLED: &[&str] = &["soundEnabled"];
const AUTO_START: &[&str] = &["autoStart"];

const FIELDS: &[&[&str]] = &[
    BREAK_INTERVAL,
    HYDRATION_INTERVAL,
    NOTIFICATIONS,
    STRICT_MODE,
    CAMERA_ENABLED,
    SOUND_ENABLED,
    AUTO_START,
];

fn lookup<'a>(record: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| record.get(*name))
}

/// Positive whole minutes. Integral floats such as `20.0` are accepted.
fn interval_field(record: &Map<String, Value>, names: &[&str]) -> Option<u32> {
    let value = lookup(record, names)?;
    let minutes = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))?,
        _ => return None,
    };
    u32::try_from(minutes).ok().filter(|m| *m > 0)
}

fn bool_field(record: &Map<String, Value>, names: &[&str]) -> Option<bool> {
    lookup(record, names)?.as_bool()
}

impl Settings {
    /// Resolve a raw stored record, field by field.
    pub fn from_value(raw: &Value, defaults: SettingsDefaults) -> Self {
        let fallback = defaults.settings();
        let Some(record) = raw.as_object() else {
            return fallback;
        };
        Settings {
            break_interval: interval_field(record, BREAK_INTERVAL).unwrap_or(fallback.break_interval),
            hydration_interval: interval_field(record, HYDRATION_INTERVAL)
                .unwrap_or(fallback.hydration_interval),
            notifications: bool_field(record, NOTIFICATIONS).unwrap_or(fallback.notifications),
            strict_mode: bool_field(record, STRICT_MODE).unwrap_or(fallback.strict_mode),
            camera_enabled: bool_field(record, CAMERA_ENABLED).unwrap_or(fallback.camera_enabled),
            sound_enabled: bool_field(record, SOUND_ENABLED).unwrap_or(fallback.sound_enabled),
            auto_start: bool_field(record, AUTO_START).unwrap_or(fallback.auto_start),
        }
    }

    /// Reject intervals of zero minutes.
    ///
    /// # Errors
    /// Returns [`ValidationError::OutOfRange`] for the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("breakInterval", self.break_interval),
            ("hydrationInterval", self.hydration_interval),
        ] {
            if value == 0 {
                return Err(ValidationError::OutOfRange {
                    field: field.to_string(),
                    min: 1,
                    max: i64::from(u32::MAX),
                    value: 0,
                });
            }
        }
        Ok(())
    }

    /// Copy of these settings with one field replaced, addressed by its
    /// persisted name (or alias). `value` is parsed from text.
    ///
    /// # Errors
    /// Returns an error for unknown fields or unparseable values.
    pub fn with_field(&self, field: &str, value: &str) -> Result<Settings, ValidationError> {
        let names = FIELDS
            .iter()
            .find(|names| names.contains(&field))
            .ok_or_else(|| ValidationError::UnknownField(field.to_string()))?;
        let invalid = |message: String| ValidationError::InvalidValue {
            field: field.to_string(),
            message,
        };

        let mut updated = self.clone();
        if *names == BREAK_INTERVAL || *names == HYDRATION_INTERVAL {
            let minutes: u32 = value
                .parse()
                .map_err(|_| invalid(format!("expected whole minutes, got '{value}'")))?;
            if *names == BREAK_INTERVAL {
                updated.break_interval = minutes;
            } else {
                updated.hydration_interval = minutes;
            }
        } else {
            let flag: bool = value
                .parse()
                .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?;
            match names[0] {
                "notifications" => updated.notifications = flag,
                "strictMode" => updated.strict_mode = flag,
                "cameraEnabled" => updated.camera_enabled = flag,
                "soundEnabled" => updated.sound_enabled = flag,
                _ => updated.auto_start = flag,
            }
        }
        updated.validate()?;
        Ok(updated)
    }
}

/// Reads and writes [`Settings`] through the store.
#[derive(Debug, Clone)]
pub struct SettingsResolver {
    store: Store,
    defaults: SettingsDefaults,
}

impl SettingsResolver {
    pub fn new(store: Store, defaults: SettingsDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn defaults(&self) -> SettingsDefaults {
        self.defaults
    }

    /// Complete, valid settings. Never fails.
    pub async fn load_settings(&self) -> Settings {
        let raw = self.store.get(keys::SETTINGS, Value::Null).await;
        Settings::from_value(&raw, self.defaults)
    }

    /// Validate and persist. Returns whether the write landed.
    ///
    /// # Errors
    /// Returns a validation error without writing anything.
    pub async fn save_settings(&self, settings: &Settings) -> Result<bool, ValidationError> {
        settings.validate()?;
        Ok(self.store.set_as(keys::SETTINGS, settings).await)
    }

    /// Update one field by persisted name and save.
    ///
    /// # Errors
    /// Returns an error for unknown fields or invalid values.
    pub async fn update_field(&self, field: &str, value: &str) -> Result<Settings, ValidationError> {
        let updated = self.load_settings().await.with_field(field, value)?;
        self.save_settings(&updated).await?;
        Ok(updated)
    }

    /// Overwrite the stored record with defaults.
    pub async fn reset_settings(&self) -> Settings {
        let settings = self.defaults.settings();
        self.store.set_as(keys::SETTINGS, &settings).await;
        settings
    }
}
