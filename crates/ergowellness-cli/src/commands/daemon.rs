//! Foreground scheduler host.
//!
//! Prints every outbound signal as one JSON line on stdout and reads
//! commands as JSON lines on stdin, e.g. `{"type":"snoozeReminder","minutes":5}`.
//! Ctrl-C or a `{"type":"shutdown"}` line stops the scheduler. Closing stdin
//! only stops command input.
//!
//! `type` on an output line names the signal, not the reminder. The
//! mobile `showReminder({ type: 'break' })` payload maps to
//! `{"type":"showReminder","reminder":"break","at":...}`, so a host reads the
//! reminder kind from `reminder`.

use std::io::BufRead;
use std::time::Duration;

use clap::Args;
use ergowellness_core::{Command, ReminderScheduler, ReminderService};
use tokio::sync::{broadcast, mpsc};

use super::{CliResult, Context};

#[derive(Args)]
pub struct DaemonArgs {
    /// Override the configured tick period in seconds
    #[arg(long)]
    tick_secs: Option<u64>,
}

pub async fn run(args: DaemonArgs) -> CliResult {
    let ctx = Context::open()?;
    let period = match args.tick_secs {
        Some(secs) if secs > 0 => Duration::from_secs(secs),
        Some(_) => return Err("tick period must be at least 1 second".into()),
        None => ctx.config.tick_period(),
    };

    let engine = ctx.engine();
    let mut signals = engine.dispatcher().subscribe();
    let service = ReminderService::new(ReminderScheduler::new(engine, period));
    let (tx, rx) = mpsc::channel::<Command>(16);

    let printer = tokio::spawn(async move {
        loop {
            match signals.recv().await {
                Ok(signal) => match serde_json::to_string(&signal) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "could not encode signal"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "signal printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // A blocking read on tokio's stdin would hold up runtime shutdown.
    let stdin_tx = tx.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Command>(line) {
                Ok(command) => {
                    if stdin_tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(error = %e, line, "ignoring malformed command"),
            }
        }
    });

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(Command::Shutdown).await;
        }
    });

    tracing::info!(tick_secs = period.as_secs(), "daemon running");
    let scheduler = service.run(rx).await;
    // Dropping the scheduler drops the last dispatcher handle, closing the printer.
    drop(scheduler);
    let _ = tokio::time::timeout(Duration::from_secs(1), printer).await;
    Ok(())
}
