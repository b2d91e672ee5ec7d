use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::posture::PostureReading;

/// Which reminder a UI modal should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Break,
    Stretch,
    Hydration,
}

/// Outbound signal for the UI / host shell.
///
/// Every fired reminder produces exactly one `ShowReminder`. The remaining
/// variants report user actions and lifecycle changes so a front end can stay
/// in sync without polling the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Signal {
    ShowReminder {
        reminder: ReminderType,
        at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    ReminderSnoozed {
        minutes: i64,
        /// New `lastBreakTime`, possibly in the future.
        last_break_time: i64,
        at: DateTime<Utc>,
    },
    ReminderDismissed {
        at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    SchedulerStarted {
        tick_secs: u64,
        at: DateTime<Utc>,
    },
    SchedulerStopped {
        at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    PostureWarning {
        reading: PostureReading,
        consecutive_bad: u32,
        at: DateTime<Utc>,
    },
}

impl Signal {
    pub fn show(reminder: ReminderType) -> Self {
        Signal::ShowReminder {
            reminder,
            at: Utc::now(),
        }
    }
}
