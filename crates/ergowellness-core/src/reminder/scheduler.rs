//! Periodic driver for [`ReminderEngine::tick`].
//!
//! Owns at most one tick task. `start()` aborts the previous task and waits
//! for it to wind down before spawning, so re-installing the schedule can
//! never leave two timers racing each other.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::engine::ReminderEngine;
use crate::events::Signal;

pub struct ReminderScheduler {
    engine: ReminderEngine,
    period: Duration,
    handle: Option<JoinHandle<()>>,
    ticks_run: Arc<AtomicU64>,
}

impl ReminderScheduler {
    pub fn new(engine: ReminderEngine, period: Duration) -> Self {
        Self {
            engine,
            period,
            handle: None,
            ticks_run: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn engine(&self) -> &ReminderEngine {
        &self.engine
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ticks completed since construction, across restarts.
    pub fn ticks_run(&self) -> u64 {
        self.ticks_run.load(Ordering::SeqCst)
    }

    /// Install the tick task, replacing any running one.
    ///
    /// Seeds missing baselines first. The first tick runs one full period
    /// after this call; ticks missed while the process was suspended are
    /// skipped, not replayed.
    pub async fn start(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            // Cancelled is the expected outcome.
            let _ = handle.await;
        }
        self.engine.ensure_baselines().await;

        let engine = self.engine.clone();
        let period = self.period;
        let ticks_run = Arc::clone(&self.ticks_run);
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let report = engine.tick().await;
                ticks_run.fetch_add(1, Ordering::SeqCst);
                if !report.is_noop() {
                    tracing::debug!(fired = report.fired.len(), "tick fired reminders");
                }
            }
        }));

        tracing::info!(tick_secs = self.period.as_secs(), "reminder scheduler started");
        self.engine.dispatcher().emit(Signal::SchedulerStarted {
            tick_secs: self.period.as_secs(),
            at: Utc::now(),
        });
    }

    /// Re-read settings and reinstall the tick (`updateReminderSchedule`).
    pub async fn restart(&mut self) {
        self.start().await;
    }

    /// Abort the tick task. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.abort_task();
        if was_running {
            tracing::info!("reminder scheduler stopped");
            self.engine
                .dispatcher()
                .emit(Signal::SchedulerStopped { at: Utc::now() });
        }
        was_running
    }

    fn abort_task(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, MS_PER_MINUTE};
    use crate::events::ReminderType;
    use crate::error::NotifyError;
    use crate::reminder::{Dispatcher, MemoryNotifier, Notification, Notifier};
    use crate::settings::{SettingsDefaults, SettingsResolver};
    use crate::storage::{keys, Store};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Takes ten seconds to show each notification.
    #[derive(Clone, Default)]
    struct SlowNotifier {
        attempts: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Notifier for SlowNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(())
        }
    }

    const START: i64 = 1_700_000_000_000;
    const PERIOD: Duration = Duration::from_secs(60);

    fn scheduler() -> (ReminderScheduler, ManualClock, Store) {
        let store = Store::memory();
        let clock = ManualClock::new(START);
        let engine = ReminderEngine::new(
            store.clone(),
            SettingsResolver::new(store.clone(), SettingsDefaults::desktop()),
            Dispatcher::new(Arc::new(MemoryNotifier::new())),
            Arc::new(clock.clone()),
        );
        (ReminderScheduler::new(engine, PERIOD), clock, store)
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let (mut scheduler, _clock, store) = scheduler();
        store.set_as(keys::LAST_BREAK_TIME, &(START - 30 * MS_PER_MINUTE)).await;
        let mut rx = scheduler.engine().dispatcher().subscribe();

        scheduler.start().await;
        assert!(matches!(rx.recv().await.unwrap(), Signal::SchedulerStarted { .. }));
        assert_eq!(scheduler.ticks_run(), 0);

        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(scheduler.ticks_run(), 1);
        assert!(matches!(
            rx.recv().await.unwrap(),
            Signal::ShowReminder { reminder: ReminderType::Break, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_never_runs_two_tick_tasks() {
        let (mut scheduler, _clock, _store) = scheduler();
        scheduler.start().await;
        scheduler.restart().await;
        scheduler.restart().await;

        tokio::time::sleep(PERIOD * 3 + Duration::from_secs(30)).await;
        assert_eq!(scheduler.ticks_run(), 3);
        assert!(scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticking() {
        let (mut scheduler, _clock, _store) = scheduler();
        scheduler.start().await;
        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert!(scheduler.stop());
        assert!(!scheduler.stop());

        tokio::time::sleep(PERIOD * 5).await;
        assert_eq!(scheduler.ticks_run(), 1);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn start_seeds_baselines() {
        let (mut scheduler, clock, store) = scheduler();
        scheduler.start().await;
        assert_eq!(store.get_opt::<i64>(keys::LAST_BREAK_TIME).await, Some(START));
        assert_eq!(store.get_opt::<i64>(keys::LAST_HYDRATION_TIME).await, Some(START));

        clock.advance_minutes(20);
        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(store.get_opt::<i64>(keys::LAST_BREAK_TIME).await, Some(START + 20 * MS_PER_MINUTE));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_during_notification_does_not_fire_twice() {
        let store = Store::memory();
        let notifier = SlowNotifier::default();
        let engine = ReminderEngine::new(
            store.clone(),
            SettingsResolver::new(store.clone(), SettingsDefaults::desktop()),
            Dispatcher::new(Arc::new(notifier.clone())),
            Arc::new(ManualClock::new(START)),
        );
        store.set_as(keys::LAST_BREAK_TIME, &(START - 30 * MS_PER_MINUTE)).await;
        let mut scheduler = ReminderScheduler::new(engine, PERIOD);

        scheduler.start().await;
        // The first tick is now waiting on the notifier.
        tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);

        scheduler.restart().await;
        assert_eq!(store.get_opt::<i64>(keys::LAST_BREAK_TIME).await, Some(START));

        tokio::time::sleep(PERIOD * 3).await;
        assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
        assert!(scheduler.is_running());
    }
}
