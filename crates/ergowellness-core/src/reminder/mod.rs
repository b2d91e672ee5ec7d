//! Break and hydration reminders.
//!
//! Two timers share one periodic tick. Neither keeps a countdown in memory:
//! each tick re-reads the settings and the persisted `last*Time` stamps and
//! decides afresh, so a restarted process picks up exactly where the store
//! says it is.
//!
//! ```text
//! Waiting --(elapsed >= interval)--> Due --(dispatch, last = now)--> Waiting
//! ```

mod dispatcher;
mod engine;
mod notify;
mod scheduler;
mod service;
mod snooze;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use engine::{ReminderEngine, ReminderStatus, TickReport, TimerStatus};
pub use notify::{DesktopNotifier, MemoryNotifier, Notification, Notifier, NullNotifier};
pub use scheduler::ReminderScheduler;
pub use service::{Command, ReminderService};
pub use snooze::snoozed_last_break;

use serde::{Deserialize, Serialize};

use crate::clock::MS_PER_MINUTE;
use crate::events::ReminderType;
use crate::settings::Settings;
use crate::storage::keys;

/// The two independent timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Break,
    Hydration,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::Break, ReminderKind::Hydration];

    /// Store key of this timer's last event time.
    pub fn key(self) -> &'static str {
        match self {
            ReminderKind::Break => keys::LAST_BREAK_TIME,
            ReminderKind::Hydration => keys::LAST_HYDRATION_TIME,
        }
    }

    pub fn interval_minutes(self, settings: &Settings) -> u32 {
        match self {
            ReminderKind::Break => settings.break_interval,
            ReminderKind::Hydration => settings.hydration_interval,
        }
    }

    pub fn reminder_type(self) -> ReminderType {
        match self {
            ReminderKind::Break => ReminderType::Break,
            ReminderKind::Hydration => ReminderType::Hydration,
        }
    }

    /// Fixed notification copy.
    pub fn notification(self) -> Notification {
        match self {
            ReminderKind::Break => Notification::new("⏰ Break Time!", "Time to stretch and rest your shoulders."),
            ReminderKind::Hydration => Notification::new("💧 Hydration Reminder", "Time to drink some water!"),
        }
    }
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderKind::Break => f.write_str("break"),
            ReminderKind::Hydration => f.write_str("hydration"),
        }
    }
}

/// Per-timer state, derived on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Waiting,
    Due,
}

impl TimerPhase {
    /// Phase at `now_ms` for a timer last reset at `last_ms`.
    ///
    /// A `last_ms` in the future (after an over-long snooze) is `Waiting`.
    pub fn evaluate(now_ms: i64, last_ms: i64, interval_minutes: u32) -> Self {
        if now_ms.saturating_sub(last_ms) >= interval_ms(interval_minutes) {
            TimerPhase::Due
        } else {
            TimerPhase::Waiting
        }
    }
}

pub(crate) fn interval_ms(interval_minutes: u32) -> i64 {
    i64::from(interval_minutes) * MS_PER_MINUTE
}
