//! Snooze and dismiss: user actions that move the break baseline.
//!
//! Both run outside the tick and write straight to the store. A tick that
//! read the old value just before will be corrected on the next tick.

use chrono::Utc;

use super::engine::ReminderEngine;
use super::interval_ms;
use crate::clock::MS_PER_MINUTE;
use crate::events::Signal;
use crate::storage::keys;

/// `lastBreakTime` that makes the break reminder due `minutes` from `now`.
///
/// When `minutes` exceeds the interval the result lies in the future; that
/// is kept as-is and simply reads as "not due yet".
pub fn snoozed_last_break(now_ms: i64, interval_minutes: u32, minutes: i64) -> i64 {
    let shift = interval_ms(interval_minutes).saturating_sub(minutes.saturating_mul(MS_PER_MINUTE));
    now_ms.saturating_sub(shift)
}

impl ReminderEngine {
    /// Defer the next break reminder to `minutes` from now.
    /// Returns the new `lastBreakTime`.
    pub async fn snooze(&self, minutes: i64) -> i64 {
        let now = self.clock.now_ms();
        let settings = self.settings.load_settings().await;
        let last = snoozed_last_break(now, settings.break_interval, minutes);
        if last > now {
            tracing::debug!(minutes, interval = settings.break_interval, "snooze longer than interval");
        }
        if !self.store.set_as(keys::LAST_BREAK_TIME, &last).await {
            tracing::warn!("could not persist snoozed break time");
        }
        tracing::info!(minutes, last_break_time = last, "break reminder snoozed");
        self.dispatcher.emit(Signal::ReminderSnoozed {
            minutes,
            last_break_time: last,
            at: Utc::now(),
        });
        last
    }

    /// Restart the break interval from now. Returns the new `lastBreakTime`.
    pub async fn dismiss(&self) -> i64 {
        let now = self.clock.now_ms();
        if !self.store.set_as(keys::LAST_BREAK_TIME, &now).await {
            tracing::warn!("could not persist dismissed break time");
        }
        tracing::info!("break reminder dismissed");
        self.dispatcher.emit(Signal::ReminderDismissed { at: Utc::now() });
        now
    }
}
