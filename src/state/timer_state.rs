//! Timer state structure

use serde::{Deserialize, Serialize};

/// State of the single countdown timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerState {
    pub seconds_remaining: u64,
    pub running: bool,
}

impl TimerState {
    /// Create a running timer state with remaining seconds
    pub fn running(seconds_remaining: u64) -> Self {
        Self {
            seconds_remaining,
            running: true,
        }
    }

    /// Create an idle timer state
    pub fn idle() -> Self {
        Self {
            seconds_remaining: 0,
            running: false,
        }
    }
}
