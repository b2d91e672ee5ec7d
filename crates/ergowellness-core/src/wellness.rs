//! Wellness records kept alongside the reminder timers.
//!
//! Check-ins, assessments, badges and the dashboard counters. These are thin
//! typed accessors over the store; the reminder engine never reads them.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clock::Clock;
use crate::error::{CoreError, StoreError, ValidationError};
use crate::settings::{Settings, SettingsResolver};
use crate::storage::{keys, Store};

/// Highest pain or stiffness rating.
pub const MAX_RATING: u8 = 10;

/// One pain/stiffness check-in.
///
/// Entries written without a `date` take it from `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredEntry")]
pub struct TrackingEntry {
    pub date: DateTime<Utc>,
    /// Milliseconds since the epoch.
    pub timestamp: i64,
    pub pain_level: u8,
    pub stiffness: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
    timestamp: i64,
    pain_level: u8,
    stiffness: u8,
}

impl From<StoredEntry> for TrackingEntry {
    fn from(raw: StoredEntry) -> Self {
        let date = raw
            .date
            .or_else(|| DateTime::from_timestamp_millis(raw.timestamp))
            .unwrap_or_default();
        Self {
            date,
            timestamp: raw.timestamp,
            pain_level: raw.pain_level,
            stiffness: raw.stiffness,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub name: String,
    pub description: String,
    pub icon: String,
}

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub streak_days: u32,
    pub today_breaks: u32,
    pub weekly_breaks: u32,
    pub hydration_today: u32,
    pub current_pain_level: u8,
    pub badges: Vec<Badge>,
}

/// UI colour scheme stored under `theme`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl std::str::FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ValidationError::InvalidValue {
                field: "theme".into(),
                message: format!("expected light or dark, got '{other}'"),
            }),
        }
    }
}

fn rating(field: &str, value: u8) -> Result<u8, ValidationError> {
    if value > MAX_RATING {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(MAX_RATING),
            value: i64::from(value),
        });
    }
    Ok(value)
}

/// Decode list items one by one, skipping those that do not fit `T`.
fn decode_items<T: DeserializeOwned>(key: &str, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "skipping unreadable list item");
                None
            }
        })
        .collect()
}

pub struct WellnessLog<'a> {
    store: &'a Store,
    clock: &'a dyn Clock,
}

impl<'a> WellnessLog<'a> {
    pub fn new(store: &'a Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    fn now(&self) -> (i64, DateTime<Utc>) {
        let ms = self.clock.now_ms();
        (ms, DateTime::from_timestamp_millis(ms).unwrap_or_else(Utc::now))
    }

    async fn increment(&self, key: &str) -> Result<u32, CoreError> {
        let current = match self.store.try_get(key).await? {
            Some(value) => serde_json::from_value::<u32>(value).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "counter was not a number, restarting it");
                0
            }),
            None => 0,
        };
        let next = current.saturating_add(1);
        self.store.try_set(key, &Value::from(next)).await?;
        Ok(next)
    }

    /// The list stored under `key`. Fails rather than guessing when the
    /// value cannot be read or is not a list.
    async fn stored_list(&self, key: &str) -> Result<Vec<Value>, CoreError> {
        match self.store.try_get(key).await? {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(StoreError::Encoding {
                key: key.to_string(),
                message: "expected a list".into(),
            }
            .into()),
        }
    }

    /// Append to a stored list, leaving existing items untouched.
    async fn append(&self, key: &str, mut items: Vec<Value>, item: Value) -> Result<(), CoreError> {
        items.push(item);
        self.store.try_set(key, &Value::Array(items)).await?;
        Ok(())
    }

    async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get(key, Value::Null).await {
            Value::Array(items) => decode_items(key, items),
            Value::Null => Vec::new(),
            _ => {
                tracing::warn!(key, "stored value is not a list");
                Vec::new()
            }
        }
    }

    // ── Tracking ─────────────────────────────────────────────────────

    /// Append a check-in and update `currentPainLevel`.
    ///
    /// # Errors
    /// Returns an error if either rating is above 10, or if the stored
    /// history cannot be read or written. Nothing is written on error.
    pub async fn record_check_in(&self, pain_level: u8, stiffness: u8) -> Result<TrackingEntry, CoreError> {
        let (timestamp, date) = self.now();
        let entry = TrackingEntry {
            date,
            timestamp,
            pain_level: rating("painLevel", pain_level)?,
            stiffness: rating("stiffness", stiffness)?,
        };
        let history = self.stored_list(keys::TRACKING_DATA).await?;
        self.append(keys::TRACKING_DATA, history, serde_json::to_value(&entry)?)
            .await?;
        self.store.set_as(keys::CURRENT_PAIN_LEVEL, &pain_level).await;
        Ok(entry)
    }

    pub async fn tracking_history(&self) -> Vec<TrackingEntry> {
        self.read_list(keys::TRACKING_DATA).await
    }

    /// Last `count` entries, oldest first.
    pub async fn recent_entries(&self, count: usize) -> Vec<TrackingEntry> {
        let history = self.tracking_history().await;
        let skip = history.len().saturating_sub(count);
        history.into_iter().skip(skip).collect()
    }

    /// Record a body-area assessment.
    ///
    /// # Errors
    /// Returns an error if the pain level is above 10.
    pub async fn record_assessment(&self, pain_level: u8, areas: &[String]) -> Result<i64, ValidationError> {
        let pain_level = rating("painLevel", pain_level)?;
        let (now, _) = self.now();
        self.store.set_as(keys::CURRENT_PAIN_LEVEL, &pain_level).await;
        self.store.set_as(keys::PAIN_AREAS, areas).await;
        self.store.set_as(keys::LAST_ASSESSMENT, &now).await;
        Ok(now)
    }

    // ── Badges ───────────────────────────────────────────────────────

    pub async fn badges(&self) -> Vec<Badge> {
        self.read_list(keys::BADGES).await
    }

    /// Award a badge. Returns `false` when one with that name is already held.
    ///
    /// # Errors
    /// Returns an error if the stored badges cannot be read or written.
    pub async fn award_badge(&self, badge: Badge) -> Result<bool, CoreError> {
        let held = self.stored_list(keys::BADGES).await?;
        if held
            .iter()
            .any(|b| b.get("name").and_then(Value::as_str) == Some(badge.name.as_str()))
        {
            return Ok(false);
        }
        let item = serde_json::to_value(&badge)?;
        self.append(keys::BADGES, held, item).await?;
        tracing::info!(badge = %badge.name, "badge awarded");
        Ok(true)
    }

    // ── Counters ─────────────────────────────────────────────────────

    /// Count a completed break.
    ///
    /// # Errors
    /// Returns an error if a counter cannot be read or written.
    pub async fn log_break(&self) -> Result<Dashboard, CoreError> {
        self.increment(keys::TODAY_BREAKS).await?;
        self.increment(keys::WEEKLY_BREAKS).await?;
        Ok(self.dashboard().await)
    }

    /// Count a glass of water and restart the hydration timer.
    ///
    /// # Errors
    /// Returns an error if the counter cannot be read or written.
    pub async fn log_hydration(&self) -> Result<Dashboard, CoreError> {
        self.increment(keys::HYDRATION_TODAY).await?;
        let (now, _) = self.now();
        self.store.set_as(keys::LAST_HYDRATION_TIME, &now).await;
        Ok(self.dashboard().await)
    }

    pub async fn dashboard(&self) -> Dashboard {
        Dashboard {
            streak_days: self.store.get_as(keys::STREAK_DAYS, 0).await,
            today_breaks: self.store.get_as(keys::TODAY_BREAKS, 0).await,
            weekly_breaks: self.store.get_as(keys::WEEKLY_BREAKS, 0).await,
            hydration_today: self.store.get_as(keys::HYDRATION_TODAY, 0).await,
            current_pain_level: self.store.get_as(keys::CURRENT_PAIN_LEVEL, 0).await,
            badges: self.badges().await,
        }
    }

    pub async fn theme(&self) -> Theme {
        self.store.get_as(keys::THEME, Theme::default()).await
    }

    pub async fn set_theme(&self, theme: Theme) -> bool {
        self.store.set_as(keys::THEME, &theme).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Finish onboarding: store the profile and settings and start both
    /// timers from now.
    ///
    /// # Errors
    /// Returns an error if the settings are invalid.
    pub async fn complete_onboarding(
        &self,
        resolver: &SettingsResolver,
        settings: &Settings,
        user_data: Value,
    ) -> Result<(), CoreError> {
        resolver.save_settings(settings).await?;
        let (now, _) = self.now();
        self.store.set(keys::USER_DATA, user_data).await;
        self.store.set_as(keys::ONBOARDED, &true).await;
        self.store.set_as(keys::LAST_BREAK_TIME, &now).await;
        self.store.set_as(keys::LAST_HYDRATION_TIME, &now).await;
        tracing::info!("onboarding completed");
        Ok(())
    }

    /// Reset settings to defaults and wipe history, badges and counters.
    /// Timestamps and profile data are kept.
    pub async fn reset_all(&self, resolver: &SettingsResolver) -> Settings {
        let settings = resolver.reset_settings().await;
        self.store.set_as(keys::TRACKING_DATA, &Vec::<TrackingEntry>::new()).await;
        self.store.set_as(keys::BADGES, &Vec::<Badge>::new()).await;
        for key in [
            keys::STREAK_DAYS,
            keys::TODAY_BREAKS,
            keys::WEEKLY_BREAKS,
            keys::HYDRATION_TODAY,
        ] {
            self.store.set_as(key, &0u32).await;
        }
        tracing::info!("wellness data reset");
        settings
    }

    /// Everything in the namespace as a pretty JSON document.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub async fn export(&self) -> Result<String, CoreError> {
        let all = self.store.get_all().await;
        Ok(serde_json::to_string_pretty(&all)?)
    }
}
