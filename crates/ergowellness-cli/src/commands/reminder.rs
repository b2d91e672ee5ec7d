use clap::Subcommand;
use serde_json::json;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Run one due-check now and print what fired. Timers without a
    /// baseline are started from now first.
    Tick,
    /// Print both timers as JSON
    Status,
    /// Defer the next break reminder
    Snooze {
        /// Minutes from now until the reminder fires again
        minutes: i64,
    },
    /// Restart the break interval from now
    Dismiss,
    /// Show a break reminder immediately
    Break,
    /// Show a stretch prompt immediately
    Stretch,
}

pub async fn run(action: ReminderAction) -> CliResult {
    let ctx = Context::open()?;
    let engine = ctx.engine();

    match action {
        ReminderAction::Tick => {
            engine.ensure_baselines().await;
            let report = engine.tick().await;
            print_json(&report)?;
        }
        ReminderAction::Status => {
            let status = engine.status().await;
            print_json(&status)?;
        }
        ReminderAction::Snooze { minutes } => {
            let last = engine.snooze(minutes).await;
            print_json(&json!({ "type": "reminderSnoozed", "minutes": minutes, "lastBreakTime": last }))?;
        }
        ReminderAction::Dismiss => {
            let last = engine.dismiss().await;
            print_json(&json!({ "type": "reminderDismissed", "lastBreakTime": last }))?;
        }
        ReminderAction::Break => {
            let outcome = engine.take_break_now().await;
            print_json(&outcome)?;
        }
        ReminderAction::Stretch => {
            let outcome = engine.quick_stretch();
            print_json(&outcome)?;
        }
    }
    Ok(())
}
