use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ergowellness-cli", version, about = "ErgoWellness CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Break and hydration reminders
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// Run the reminder scheduler in the foreground
    Daemon(commands::daemon::DaemonArgs),
    /// Reminder settings stored with user data
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Host configuration file
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Pain tracking, badges and counters
    Track {
        #[command(subcommand)]
        action: commands::track::TrackAction,
    },
    /// Export, reset and onboarding
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ERGOWELLNESS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Reminder { action } => commands::reminder::run(action).await,
        Commands::Daemon(args) => commands::daemon::run(args).await,
        Commands::Settings { action } => commands::settings::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Track { action } => commands::track::run(action).await,
        Commands::Data { action } => commands::data::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
