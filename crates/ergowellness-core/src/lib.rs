//! # ErgoWellness Core Library
//!
//! Business logic behind the ErgoWellness break and hydration reminders.
//! Every front end (desktop shell, CLI, mobile bridge) drives the same core;
//! they differ only in which storage backend and notifier they plug in.
//!
//! ## Architecture
//!
//! - **Store**: namespaced key-value contract over interchangeable backends
//!   (SQLite, JSON file, memory). Failures degrade to defaults, never errors.
//! - **Settings**: lenient resolver filling missing fields with defaults
//! - **Reminders**: a stateless tick over persisted timestamps, a periodic
//!   scheduler owning one tick task, snooze/dismiss, and a dispatcher that
//!   notifies and signals
//! - **Wellness**: check-ins, assessments, badges, dashboard counters
//! - **Posture**: output contract of the external pose estimator
//!
//! ## Key Components
//!
//! - [`ReminderEngine`]: due-check logic
//! - [`ReminderScheduler`]: periodic driver
//! - [`Store`]: persistence contract
//! - [`AppConfig`]: host configuration

pub mod clock;
pub mod error;
pub mod events;
pub mod posture;
pub mod reminder;
pub mod settings;
pub mod storage;
pub mod wellness;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, NotifyError, StoreError, ValidationError};
pub use events::{ReminderType, Signal};
pub use posture::{PostureEstimator, PostureMonitor, PostureReading, PostureStatus};
pub use reminder::{
    Command, DesktopNotifier, Dispatcher, MemoryNotifier, Notifier, NullNotifier, ReminderEngine,
    ReminderKind, ReminderScheduler, ReminderService, TimerPhase,
};
pub use settings::{Settings, SettingsDefaults, SettingsResolver};
pub use storage::{AppConfig, Store};
pub use wellness::{Badge, Dashboard, Theme, TrackingEntry, WellnessLog};
