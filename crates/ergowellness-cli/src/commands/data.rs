use clap::Subcommand;
use ergowellness_core::{Theme, WellnessLog};
use serde_json::{json, Value};

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum DataAction {
    /// Dump every stored value as JSON
    Export,
    /// Restore default settings and wipe history, badges and counters
    Reset,
    /// Delete everything stored under the app namespace
    Clear,
    /// Show or change the UI theme
    Theme {
        /// `light` or `dark`
        value: Option<String>,
    },
    /// Finish first-run setup and start both timers from now
    Onboard {
        /// Break interval in minutes (platform default if omitted)
        #[arg(long)]
        break_interval: Option<u32>,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        camera: bool,
        /// Profile data as a JSON object
        #[arg(long)]
        user_data: Option<String>,
    },
}

pub async fn run(action: DataAction) -> CliResult {
    let ctx = Context::open()?;
    let log = WellnessLog::new(&ctx.store, ctx.clock.as_ref());

    match action {
        DataAction::Export => println!("{}", log.export().await?),
        DataAction::Reset => print_json(&log.reset_all(&ctx.resolver).await)?,
        DataAction::Clear => {
            let cleared = ctx.store.clear().await;
            print_json(&json!({ "cleared": cleared }))?;
        }
        DataAction::Theme { value } => {
            if let Some(value) = value {
                let theme: Theme = value.parse()?;
                log.set_theme(theme).await;
            }
            print_json(&json!({ "theme": log.theme().await }))?;
        }
        DataAction::Onboard {
            break_interval,
            strict,
            camera,
            user_data,
        } => {
            let user_data: Value = match user_data {
                Some(raw) => serde_json::from_str(&raw)?,
                None => json!({}),
            };
            let mut settings = ctx.resolver.defaults().settings();
            if let Some(minutes) = break_interval {
                settings.break_interval = minutes;
            }
            settings.strict_mode = strict;
            settings.camera_enabled = camera;
            log.complete_onboarding(&ctx.resolver, &settings, user_data).await?;
            print_json(&settings)?;
        }
    }
    Ok(())
}
