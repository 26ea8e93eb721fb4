//! Outbound services module
//!
//! This module contains the notification bridge that carries timer and
//! settings changes to the UI collaborator.

pub mod notifications;

// Re-export main types
pub use notifications::*;
