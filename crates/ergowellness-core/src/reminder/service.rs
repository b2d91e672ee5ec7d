//! Command loop connecting a host shell to the scheduler.

use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::scheduler::ReminderScheduler;

/// Inbound control signals from the UI / host shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Settings changed; reinstall the tick.
    UpdateReminderSchedule,
    SnoozeReminder { minutes: i64 },
    DismissReminder,
    /// Tray "Take a Break".
    TakeBreak,
    /// Tray "Quick Stretch".
    QuickStretch,
    Shutdown,
}

/// Owns the scheduler for the lifetime of a host process.
pub struct ReminderService {
    scheduler: ReminderScheduler,
}

impl ReminderService {
    pub fn new(scheduler: ReminderScheduler) -> Self {
        Self { scheduler }
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// Apply one command.
    pub async fn handle(&mut self, command: Command) -> ControlFlow<()> {
        tracing::debug!(?command, "handling command");
        match command {
            Command::UpdateReminderSchedule => self.scheduler.restart().await,
            Command::SnoozeReminder { minutes } => {
                self.scheduler.engine().snooze(minutes).await;
            }
            Command::DismissReminder => {
                self.scheduler.engine().dismiss().await;
            }
            Command::TakeBreak => {
                self.scheduler.engine().take_break_now().await;
            }
            Command::QuickStretch => {
                self.scheduler.engine().quick_stretch();
            }
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Start the scheduler and serve commands until `Shutdown` or until every
    /// sender is dropped, then stop the scheduler.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> ReminderScheduler {
        self.scheduler.start().await;
        while let Some(command) = commands.recv().await {
            if self.handle(command).await.is_break() {
                break;
            }
        }
        self.scheduler.stop();
        self.scheduler
    }
}
