//! Reminder delivery: system notification plus in-process signal.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use super::notify::Notifier;
use super::ReminderKind;
use crate::events::{ReminderType, Signal};
use crate::settings::Settings;

const SIGNAL_CAPACITY: usize = 64;

/// What happened when a reminder was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub reminder: ReminderType,
    /// A system notification was delivered.
    pub notified: bool,
    /// Delivery error, if one was attempted and failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_error: Option<String>,
    /// Number of signal subscribers reached.
    pub receivers: usize,
}

/// Fans reminders out to the notifier and to signal subscribers.
///
/// Never writes to the store; persisting timestamps is the engine's job.
#[derive(Clone)]
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    signals: broadcast::Sender<Signal>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { notifier, signals }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.signals.subscribe()
    }

    /// Broadcast a signal. Having no subscribers is fine.
    pub fn emit(&self, signal: Signal) -> usize {
        self.signals.send(signal).unwrap_or(0)
    }

    /// Notify (when enabled) and always signal the UI.
    pub async fn dispatch(&self, kind: ReminderKind, settings: &Settings) -> DispatchOutcome {
        let (notified, notify_error) = if settings.notifications {
            match self.notifier.notify(&kind.notification()).await {
                Ok(()) => (true, None),
                Err(e) => {
                    tracing::warn!(reminder = %kind, error = %e, "notification not delivered");
                    (false, Some(e.to_string()))
                }
            }
        } else {
            (false, None)
        };

        let receivers = self.emit(Signal::show(kind.reminder_type()));
        tracing::info!(reminder = %kind, notified, receivers, "reminder dispatched");
        DispatchOutcome {
            reminder: kind.reminder_type(),
            notified,
            notify_error,
            receivers,
        }
    }

    /// Signal-only stretch prompt.
    pub fn show_stretch(&self) -> DispatchOutcome {
        let receivers = self.emit(Signal::show(ReminderType::Stretch));
        DispatchOutcome {
            reminder: ReminderType::Stretch,
            notified: false,
            notify_error: None,
            receivers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::notify::MemoryNotifier;

    #[tokio::test]
    async fn dispatch_notifies_and_signals() {
        let notifier = MemoryNotifier::new();
        let dispatcher = Dispatcher::new(Arc::new(notifier.clone()));
        let mut rx = dispatcher.subscribe();

        let outcome = dispatcher.dispatch(ReminderKind::Hydration, &Settings::default()).await;
        assert!(outcome.notified);
        assert_eq!(outcome.receivers, 1);
        assert_eq!(notifier.sent()[0].title, "💧 Hydration Reminder");
        assert!(matches!(
            rx.recv().await.unwrap(),
            Signal::ShowReminder { reminder: ReminderType::Hydration, .. }
        ));
    }

    #[tokio::test]
    async fn disabled_notifications_still_signal() {
        let notifier = MemoryNotifier::new();
        let dispatcher = Dispatcher::new(Arc::new(notifier.clone()));
        let mut rx = dispatcher.subscribe();
        let settings = Settings {
            notifications: false,
            ..Settings::default()
        };

        let outcome = dispatcher.dispatch(ReminderKind::Break, &settings).await;
        assert!(!outcome.notified);
        assert!(notifier.sent().is_empty());
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn denied_notification_is_reported_not_fatal() {
        let dispatcher = Dispatcher::new(Arc::new(MemoryNotifier::failing()));
        let mut rx = dispatcher.subscribe();
        let outcome = dispatcher.dispatch(ReminderKind::Break, &Settings::default()).await;
        assert!(!outcome.notified);
        assert!(outcome.notify_error.is_some());
        assert!(rx.recv().await.is_ok());
    }

    #[test]
    fn emit_without_subscribers_is_zero() {
        let dispatcher = Dispatcher::new(Arc::new(crate::reminder::notify::NullNotifier));
        assert_eq!(dispatcher.show_stretch().receivers, 0);
    }
}
