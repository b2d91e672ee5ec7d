use clap::Subcommand;
use ergowellness_core::{Badge, WellnessLog};
use serde_json::json;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum TrackAction {
    /// Record how you feel (both ratings 0-10)
    CheckIn {
        #[arg(long)]
        pain: u8,
        #[arg(long)]
        stiffness: u8,
    },
    /// Show tracked check-ins, oldest first
    History {
        /// Only the most recent N entries
        #[arg(long)]
        last: Option<usize>,
    },
    /// Record a body-area assessment
    Assess {
        #[arg(long)]
        pain: u8,
        /// Affected areas, comma separated
        #[arg(long, value_delimiter = ',')]
        areas: Vec<String>,
    },
    /// Award a badge (ignored if already earned)
    Badge {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "🏅")]
        icon: String,
    },
    /// List earned badges
    Badges,
    /// Count a completed break
    LogBreak,
    /// Count a glass of water and restart the hydration timer
    LogHydration,
    /// Counters, pain level and badges
    Dashboard,
}

pub async fn run(action: TrackAction) -> CliResult {
    let ctx = Context::open()?;
    let log = WellnessLog::new(&ctx.store, ctx.clock.as_ref());

    match action {
        TrackAction::CheckIn { pain, stiffness } => {
            let entry = log.record_check_in(pain, stiffness).await?;
            print_json(&entry)?;
        }
        TrackAction::History { last } => {
            let entries = match last {
                Some(n) => log.recent_entries(n).await,
                None => log.tracking_history().await,
            };
            print_json(&entries)?;
        }
        TrackAction::Assess { pain, areas } => {
            let at = log.record_assessment(pain, &areas).await?;
            print_json(&json!({ "painLevel": pain, "areas": areas, "lastAssessment": at }))?;
        }
        TrackAction::Badge {
            name,
            description,
            icon,
        } => {
            let awarded = log
                .award_badge(Badge {
                    name,
                    description,
                    icon,
                })
                .await?;
            print_json(&json!({ "awarded": awarded }))?;
        }
        TrackAction::Badges => print_json(&log.badges().await)?,
        TrackAction::LogBreak => print_json(&log.log_break().await?)?,
        TrackAction::LogHydration => print_json(&log.log_hydration().await?)?,
        TrackAction::Dashboard => print_json(&log.dashboard().await)?,
    }
    Ok(())
}
