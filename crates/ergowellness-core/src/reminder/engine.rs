//! Tick logic for the reminder timers.
//!
//! [`ReminderEngine::tick`] is the whole scheduler body; the periodic driver
//! in [`super::ReminderScheduler`] just calls it. Nothing here caches state
//! between calls.

use std::sync::Arc;

use serde::Serialize;

use super::dispatcher::{DispatchOutcome, Dispatcher};
use super::{interval_ms, ReminderKind, TimerPhase};
use crate::clock::Clock;
use crate::settings::SettingsResolver;
use crate::storage::Store;

/// Result of one tick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub now_ms: i64,
    pub fired: Vec<DispatchOutcome>,
}

impl TickReport {
    pub fn is_noop(&self) -> bool {
        self.fired.is_empty()
    }
}

/// Read-only view of one timer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub kind: ReminderKind,
    /// `None` until the timer's baseline has been recorded.
    pub last_event_ms: Option<i64>,
    pub interval_minutes: u32,
    pub phase: TimerPhase,
    /// Zero when due.
    pub due_in_ms: i64,
}

/// Read-only view of both timers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderStatus {
    pub now_ms: i64,
    pub timers: Vec<TimerStatus>,
}

/// Stateless due-check over the store.
#[derive(Clone)]
pub struct ReminderEngine {
    pub(super) store: Store,
    pub(super) settings: SettingsResolver,
    pub(super) dispatcher: Dispatcher,
    pub(super) clock: Arc<dyn Clock>,
}

impl ReminderEngine {
    pub fn new(
        store: Store,
        settings: SettingsResolver,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            settings,
            dispatcher,
            clock,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn settings(&self) -> &SettingsResolver {
        &self.settings
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    async fn last_event(&self, kind: ReminderKind) -> Option<i64> {
        self.store.get_opt::<i64>(kind.key()).await
    }

    /// One due-check. Fires and re-stamps every due timer; a tick with
    /// nothing due neither writes nor dispatches.
    pub async fn tick(&self) -> TickReport {
        let now = self.clock.now_ms();
        let settings = self.settings.load_settings().await;
        let mut fired = Vec::new();

        for kind in ReminderKind::ALL {
            // No baseline yet means "just started": never due.
            let Some(last) = self.last_event(kind).await else {
                continue;
            };
            let interval = kind.interval_minutes(&settings);
            if TimerPhase::evaluate(now, last, interval) == TimerPhase::Waiting {
                continue;
            }

            tracing::debug!(reminder = %kind, elapsed_ms = now.saturating_sub(last), interval, "timer due");
            // Stamp before the notifier await so a cancelled tick cannot fire twice.
            if !self.store.set_as(kind.key(), &now).await {
                tracing::warn!(reminder = %kind, "could not persist reminder timestamp");
            }
            fired.push(self.dispatcher.dispatch(kind, &settings).await);
        }

        if fired.is_empty() {
            tracing::trace!(now_ms = now, "tick: nothing due");
        }
        TickReport { now_ms: now, fired }
    }

    /// Record `now` for every timer without a stored baseline. Returns the
    /// timers that were seeded.
    pub async fn ensure_baselines(&self) -> Vec<ReminderKind> {
        let now = self.clock.now_ms();
        let mut seeded = Vec::new();
        for kind in ReminderKind::ALL {
            if self.last_event(kind).await.is_none() && self.store.set_as(kind.key(), &now).await {
                seeded.push(kind);
            }
        }
        if !seeded.is_empty() {
            tracing::info!(?seeded, "seeded reminder baselines");
        }
        seeded
    }

    pub async fn status(&self) -> ReminderStatus {
        let now = self.clock.now_ms();
        let settings = self.settings.load_settings().await;
        let mut timers = Vec::with_capacity(ReminderKind::ALL.len());
        for kind in ReminderKind::ALL {
            let last_event_ms = self.last_event(kind).await;
            let interval_minutes = kind.interval_minutes(&settings);
            let (phase, due_in_ms) = match last_event_ms {
                Some(last) => {
                    let phase = TimerPhase::evaluate(now, last, interval_minutes);
                    let remaining = last
                        .saturating_add(interval_ms(interval_minutes))
                        .saturating_sub(now)
                        .max(0);
                    (phase, remaining)
                }
                None => (TimerPhase::Waiting, interval_ms(interval_minutes)),
            };
            timers.push(TimerStatus {
                kind,
                last_event_ms,
                interval_minutes,
                phase,
                due_in_ms,
            });
        }
        ReminderStatus { now_ms: now, timers }
    }

    /// Tray "Take a Break": notify and signal now, leaving the timer alone.
    pub async fn take_break_now(&self) -> DispatchOutcome {
        let settings = self.settings.load_settings().await;
        self.dispatcher.dispatch(ReminderKind::Break, &settings).await
    }

    /// Tray "Quick Stretch": signal only.
    pub fn quick_stretch(&self) -> DispatchOutcome {
        self.dispatcher.show_stretch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, MS_PER_MINUTE};
    use crate::reminder::notify::MemoryNotifier;
    use crate::settings::{Settings, SettingsDefaults};
    use crate::storage::keys;
    use proptest::prelude::*;

    const START: i64 = 1_700_000_000_000;

    fn engine() -> (ReminderEngine, ManualClock, MemoryNotifier) {
        let store = Store::memory();
        let clock = ManualClock::new(START);
        let notifier = MemoryNotifier::new();
        let engine = ReminderEngine::new(
            store.clone(),
            SettingsResolver::new(store, SettingsDefaults::desktop()),
            Dispatcher::new(Arc::new(notifier.clone())),
            Arc::new(clock.clone()),
        );
        (engine, clock, notifier)
    }

    #[tokio::test]
    async fn overdue_break_fires_once_and_restamps() {
        let (engine, clock, notifier) = engine();
        engine.store.set_as(keys::LAST_BREAK_TIME, &(START - 25 * MS_PER_MINUTE)).await;
        engine.store.set_as(keys::LAST_HYDRATION_TIME, &START).await;

        let report = engine.tick().await;
        assert_eq!(report.fired.len(), 1);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(engine.last_event(ReminderKind::Break).await, Some(START));

        clock.advance_minutes(1);
        assert!(engine.tick().await.is_noop());
    }

    #[tokio::test]
    async fn both_due_in_same_tick_both_fire() {
        let (engine, _clock, notifier) = engine();
        engine.store.set_as(keys::LAST_BREAK_TIME, &(START - 200 * MS_PER_MINUTE)).await;
        engine.store.set_as(keys::LAST_HYDRATION_TIME, &(START - 200 * MS_PER_MINUTE)).await;

        let report = engine.tick().await;
        assert_eq!(report.fired.len(), 2);
        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(engine.last_event(ReminderKind::Hydration).await, Some(START));
    }

    #[tokio::test]
    async fn missing_baseline_is_never_due() {
        let (engine, _clock, _notifier) = engine();
        assert!(engine.tick().await.is_noop());
        assert!(engine.store.get_all().await.is_empty());
    }

    #[tokio::test]
    async fn ensure_baselines_only_fills_gaps() {
        let (engine, _clock, _notifier) = engine();
        engine.store.set_as(keys::LAST_BREAK_TIME, &1_i64).await;
        assert_eq!(engine.ensure_baselines().await, vec![ReminderKind::Hydration]);
        assert_eq!(engine.last_event(ReminderKind::Break).await, Some(1));
        assert_eq!(engine.last_event(ReminderKind::Hydration).await, Some(START));
    }

    #[tokio::test]
    async fn settings_change_applies_on_next_tick() {
        let (engine, _clock, _notifier) = engine();
        engine.store.set_as(keys::LAST_BREAK_TIME, &(START - 15 * MS_PER_MINUTE)).await;
        engine.store.set_as(keys::LAST_HYDRATION_TIME, &START).await;
        assert!(engine.tick().await.is_noop());

        engine.settings.update_field("breakInterval", "10").await.unwrap();
        assert_eq!(engine.tick().await.fired.len(), 1);
    }

    #[tokio::test]
    async fn status_reports_time_until_due() {
        let (engine, _clock, _notifier) = engine();
        engine.store.set_as(keys::LAST_BREAK_TIME, &(START - 5 * MS_PER_MINUTE)).await;
        let status = engine.status().await;
        let brk = &status.timers[0];
        assert_eq!(brk.kind, ReminderKind::Break);
        assert_eq!(brk.phase, TimerPhase::Waiting);
        assert_eq!(brk.due_in_ms, 15 * MS_PER_MINUTE);
        assert_eq!(status.timers[1].last_event_ms, None);
    }

    #[tokio::test]
    async fn take_break_now_does_not_touch_timer() {
        let (engine, _clock, notifier) = engine();
        engine.store.set_as(keys::LAST_BREAK_TIME, &(START - MS_PER_MINUTE)).await;
        let outcome = engine.take_break_now().await;
        assert!(outcome.notified);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(engine.last_event(ReminderKind::Break).await, Some(START - MS_PER_MINUTE));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn not_yet_due_tick_is_pure_noop(interval in 1u32..=240, elapsed_ms in 0i64..MS_PER_MINUTE * 240) {
            prop_assume!(elapsed_ms < i64::from(interval) * MS_PER_MINUTE);
            let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
            rt.block_on(async {
                let (engine, _clock, notifier) = engine();
                let settings = Settings { break_interval: interval, hydration_interval: interval, ..Settings::default() };
                engine.settings.save_settings(&settings).await.unwrap();
                engine.store.set_as(keys::LAST_BREAK_TIME, &(START - elapsed_ms)).await;
                engine.store.set_as(keys::LAST_HYDRATION_TIME, &(START - elapsed_ms)).await;
                let before = engine.store.get_all().await;

                let report = engine.tick().await;
                assert!(report.is_noop());
                assert!(notifier.sent().is_empty());
                assert_eq!(engine.store.get_all().await, before);
            });
        }

        #[test]
        fn due_tick_fires_exactly_once(interval in 1u32..=240, extra_ms in 0i64..MS_PER_MINUTE * 600) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
            rt.block_on(async {
                let (engine, _clock, notifier) = engine();
                let settings = Settings { break_interval: interval, ..Settings::default() };
                engine.settings.save_settings(&settings).await.unwrap();
                engine.store.set_as(keys::LAST_BREAK_TIME, &(START - i64::from(interval) * MS_PER_MINUTE - extra_ms)).await;
                engine.store.set_as(keys::LAST_HYDRATION_TIME, &START).await;

                let report = engine.tick().await;
                assert_eq!(report.fired.len(), 1);
                assert_eq!(notifier.sent().len(), 1);
                assert_eq!(engine.last_event(ReminderKind::Break).await, Some(START));
            });
        }
    }
}
