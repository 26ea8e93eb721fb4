//! Background tasks module
//!
//! This module contains the countdown task spawned for each started timer.

pub mod countdown;

// Re-export main functions
pub use countdown::{countdown_task, TICK_SECONDS};
