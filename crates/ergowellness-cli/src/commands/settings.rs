use clap::Subcommand;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print one field by its stored name (e.g. "breakInterval")
    Get { field: String },
    /// Update one field and save
    Set { field: String, value: String },
    /// Print the full settings record
    List,
    /// Restore platform defaults
    Reset,
}

pub async fn run(action: SettingsAction) -> CliResult {
    let ctx = Context::open()?;

    match action {
        SettingsAction::Get { field } => {
            let settings = serde_json::to_value(ctx.resolver.load_settings().await)?;
            let canonical = match field.as_str() {
                "breakIntervalMinutes" => "breakInterval",
                "hydrationIntervalMinutes" => "hydrationInterval",
                "notificationsEnabled" => "notifications",
                other => other,
            };
            match settings.get(canonical) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown setting: {field}").into()),
            }
        }
        SettingsAction::Set { field, value } => {
            let updated = ctx.resolver.update_field(&field, &value).await?;
            print_json(&updated)?;
        }
        SettingsAction::List => {
            print_json(&ctx.resolver.load_settings().await)?;
        }
        SettingsAction::Reset => {
            print_json(&ctx.resolver.reset_settings().await)?;
        }
    }
    Ok(())
}
