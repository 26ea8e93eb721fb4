//! Translation of timer and settings changes into outbound UI events

use std::sync::Arc;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::debug;

/// Message carried by the completion event
pub const COMPLETION_MESSAGE: &str = "Your session has ended!";

/// Events pushed to the UI collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginEvent {
    RecentsChanged { recents: Vec<u64> },
    RemainingSecondsChanged { seconds: u64 },
    SubtleModeChanged { subtle: bool },
    TimerCompleted { message: String, subtle: bool },
}

impl PluginEvent {
    /// Event name as delivered to the UI
    pub fn name(&self) -> &'static str {
        match self {
            PluginEvent::RecentsChanged { .. } => "recents-changed",
            PluginEvent::RemainingSecondsChanged { .. } => "remaining-seconds-changed",
            PluginEvent::SubtleModeChanged { .. } => "subtle-mode-changed",
            PluginEvent::TimerCompleted { .. } => "timer-completed",
        }
    }

    /// Positional arguments, in the order `emit(name, ...args)` passes them
    pub fn args(&self) -> Vec<Value> {
        match self {
            PluginEvent::RecentsChanged { recents } => vec![json!(recents)],
            PluginEvent::RemainingSecondsChanged { seconds } => vec![json!(seconds)],
            PluginEvent::SubtleModeChanged { subtle } => vec![json!(subtle)],
            PluginEvent::TimerCompleted { message, subtle } => vec![json!(message), json!(subtle)],
        }
    }
}

/// Outbound channel provided by the host environment
pub trait EventSink: Send + Sync {
    /// Deliver an event. Delivery is best effort.
    fn emit(&self, event: PluginEvent);
}

/// Sink fanning events out to any number of subscribers
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<PluginEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PluginEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EventSink for BroadcastSink {
    fn emit(&self, event: PluginEvent) {
        let name = event.name();
        if self.tx.send(event).is_err() {
            debug!("No listeners for {}, event dropped", name);
        }
    }
}

/// Emits exactly one named event per state transition
#[derive(Clone)]
pub struct NotificationBridge {
    sink: Arc<dyn EventSink>,
}

impl NotificationBridge {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub fn recents_changed(&self, recents: &[u64]) {
        self.sink.emit(PluginEvent::RecentsChanged {
            recents: recents.to_vec(),
        });
    }

    pub fn remaining_seconds_changed(&self, seconds: u64) {
        self.sink.emit(PluginEvent::RemainingSecondsChanged { seconds });
    }

    pub fn subtle_mode_changed(&self, subtle: bool) {
        self.sink.emit(PluginEvent::SubtleModeChanged { subtle });
    }

    pub fn timer_completed(&self, subtle: bool) {
        self.sink.emit(PluginEvent::TimerCompleted {
            message: COMPLETION_MESSAGE.to_string(),
            subtle,
        });
    }
}

impl std::fmt::Debug for NotificationBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBridge").finish_non_exhaustive()
    }
}
