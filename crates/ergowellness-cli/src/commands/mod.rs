pub mod config;
pub mod daemon;
pub mod data;
pub mod reminder;
pub mod settings;
pub mod track;

use std::sync::Arc;

use ergowellness_core::storage::{data_dir, open_store};
use ergowellness_core::{
    AppConfig, Clock, DesktopNotifier, Dispatcher, Notifier, NullNotifier, ReminderEngine,
    SettingsResolver, Store, SystemClock,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs, built from the config file.
pub struct Context {
    pub config: AppConfig,
    pub store: Store,
    pub resolver: SettingsResolver,
    pub clock: Arc<dyn Clock>,
}

impl Context {
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = AppConfig::load()?;
        let store = open_store(&config, &data_dir()?)?;
        let resolver = SettingsResolver::new(store.clone(), config.settings_defaults());
        Ok(Self {
            config,
            store,
            resolver,
            clock: Arc::new(SystemClock),
        })
    }

    /// Engine for one-shot commands. `ERGOWELLNESS_NO_NOTIFY` swaps in a
    /// notifier that shows nothing.
    pub fn engine(&self) -> ReminderEngine {
        let notifier: Arc<dyn Notifier> = if std::env::var_os("ERGOWELLNESS_NO_NOTIFY").is_some() {
            Arc::new(NullNotifier)
        } else {
            Arc::new(DesktopNotifier::new(self.config.notifications.app_name.clone()))
        };
        ReminderEngine::new(
            self.store.clone(),
            self.resolver.clone(),
            Dispatcher::new(notifier),
            Arc::clone(&self.clock),
        )
    }
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
