//! Simple Timer - a countdown timer plugin for a handheld overlay host
//!
//! This library provides a single cancellable countdown, a JSON settings store
//! holding recent timers and the subtle notification preference, and the
//! notification bridge that pushes state changes to the UI.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::PluginError;
pub use state::{SettingsStore, TimerEngine, TimerState};
pub use services::{BroadcastSink, EventSink, NotificationBridge, PluginEvent};
pub use api::{create_router, ApiState};
pub use utils::signals::shutdown_signal;
