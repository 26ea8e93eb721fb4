//! State management module
//!
//! This module contains the settings store, the timer state and the engine
//! that ties them together.

pub mod settings_store;
pub mod timer_engine;
pub mod timer_state;

// Re-export main types
pub use settings_store::{SettingsStore, KEY_RECENT_TIMERS, KEY_SUBTLE_MODE, SETTINGS_FILE_NAME};
pub use timer_engine::{TimerEngine, MAX_RECENT_TIMERS};
pub use timer_state::TimerState;
