//! Timer engine: the single context object owning settings, timer and notifications

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Instant,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    error::{PluginError, Result},
    services::{EventSink, NotificationBridge},
    tasks::countdown_task,
};
use super::{SettingsStore, TimerState, KEY_RECENT_TIMERS, KEY_SUBTLE_MODE};

/// Maximum number of remembered timer durations
pub const MAX_RECENT_TIMERS: usize = 5;

/// Timer state together with the token of the countdown driving it
#[derive(Debug, Default)]
struct TimerSlot {
    state: TimerState,
    cancel: Option<CancellationToken>,
}

/// Owns the settings store, the single timer and the notification bridge.
///
/// Every operation exposed to the UI goes through this type. Locks are only
/// held for short synchronous sections and never across an await point.
#[derive(Debug)]
pub struct TimerEngine {
    settings: Mutex<SettingsStore>,
    timer: Mutex<TimerSlot>,
    notifier: NotificationBridge,
    start_time: Instant,
}

impl TimerEngine {
    /// Create an engine with an idle timer
    pub fn new(settings: SettingsStore, sink: Arc<dyn EventSink>) -> Self {
        Self {
            settings: Mutex::new(settings),
            timer: Mutex::new(TimerSlot::default()),
            notifier: NotificationBridge::new(sink),
            start_time: Instant::now(),
        }
    }

    fn lock_settings(&self) -> Result<MutexGuard<'_, SettingsStore>> {
        self.settings.lock().map_err(|_| PluginError::Lock("settings"))
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, TimerSlot>> {
        self.timer.lock().map_err(|_| PluginError::Lock("timer state"))
    }

    /// Start a countdown, replacing any countdown already running.
    ///
    /// The timer lock is held across the recents update so the head of the
    /// recents list always matches the running countdown. Lock order is
    /// timer, then settings.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_timer(self: &Arc<Self>, seconds: u64) -> Result<()> {
        info!("Starting timer for {} seconds, saving recent timers", seconds);

        let cancel = CancellationToken::new();
        {
            let mut slot = self.lock_timer()?;

            let recents = {
                let mut settings = self.lock_settings()?;
                let mut recents: Vec<u64> = settings.get(KEY_RECENT_TIMERS, Vec::new());
                push_recent(&mut recents, seconds);
                settings.set(KEY_RECENT_TIMERS, &recents)?;
                settings.commit()?;
                recents
            };
            self.notifier.recents_changed(&recents);

            if let Some(previous) = slot.cancel.replace(cancel.clone()) {
                debug!("Cancelling previous countdown before restart");
                previous.cancel();
            }
            slot.state = TimerState::running(seconds);
            self.notifier.remaining_seconds_changed(seconds);
        }

        tokio::spawn(countdown_task(Arc::clone(self), seconds, cancel));
        Ok(())
    }

    /// Stop the running countdown, if any, and report zero remaining
    pub fn cancel_timer(&self) -> Result<()> {
        let mut slot = self.lock_timer()?;
        match slot.cancel.take() {
            Some(cancel) => {
                info!("Cancelling timer with {} seconds remaining", slot.state.seconds_remaining);
                cancel.cancel();
            }
            None => debug!("Cancel requested with no running timer"),
        }
        slot.state = TimerState::idle();
        self.notifier.remaining_seconds_changed(0);
        Ok(())
    }

    /// Apply one countdown tick. Returns `false` when the countdown was cancelled.
    pub(crate) fn record_tick(&self, cancel: &CancellationToken, remaining: u64) -> Result<bool> {
        let mut slot = self.lock_timer()?;
        if cancel.is_cancelled() {
            return Ok(false);
        }
        slot.state.seconds_remaining = remaining;
        self.notifier.remaining_seconds_changed(remaining);
        Ok(true)
    }

    /// Finish the countdown and emit the completion notification.
    /// Returns `false` when the countdown was cancelled.
    pub(crate) fn complete(&self, cancel: &CancellationToken) -> Result<bool> {
        let mut slot = self.lock_timer()?;
        if cancel.is_cancelled() {
            return Ok(false);
        }
        slot.state = TimerState::idle();
        slot.cancel = None;
        self.notifier.remaining_seconds_changed(0);

        let subtle = self.lock_settings()?.get(KEY_SUBTLE_MODE, false);
        info!("Timer finished (subtle={})", subtle);
        self.notifier.timer_completed(subtle);
        Ok(true)
    }

    /// Persist the subtle mode preference and re-emit it
    pub fn set_subtle_mode(&self, subtle: bool) -> Result<()> {
        {
            let mut settings = self.lock_settings()?;
            settings.set(KEY_SUBTLE_MODE, subtle)?;
            settings.commit()?;
        }
        self.load_subtle_mode()
    }

    /// Emit the current recent timers list
    pub fn load_recents(&self) -> Result<()> {
        let recents = self.recents()?;
        if recents.is_empty() {
            info!("No recent timers found");
        }
        self.notifier.recents_changed(&recents);
        Ok(())
    }

    /// Emit the current subtle mode preference
    pub fn load_subtle_mode(&self) -> Result<()> {
        let subtle = self.subtle_mode()?;
        self.notifier.subtle_mode_changed(subtle);
        Ok(())
    }

    /// Emit the current remaining seconds
    pub fn load_remaining_seconds(&self) -> Result<()> {
        let remaining = self.lock_timer()?.state.seconds_remaining;
        self.notifier.remaining_seconds_changed(remaining);
        Ok(())
    }

    /// Get current timer state
    pub fn timer_state(&self) -> Result<TimerState> {
        Ok(self.lock_timer()?.state)
    }

    /// Get the recent timers, newest first
    pub fn recents(&self) -> Result<Vec<u64>> {
        Ok(self.lock_settings()?.get(KEY_RECENT_TIMERS, Vec::new()))
    }

    /// Get the subtle mode preference
    pub fn subtle_mode(&self) -> Result<bool> {
        Ok(self.lock_settings()?.get(KEY_SUBTLE_MODE, false))
    }

    /// Reload the working copy from disk
    pub fn settings_read(&self) -> Result<()> {
        self.lock_settings()?.read()
    }

    /// Persist the working copy
    pub fn settings_commit(&self) -> Result<()> {
        self.lock_settings()?.commit()
    }

    /// Get a raw settings value, `default` when absent
    pub fn settings_get(&self, key: &str, default: Value) -> Result<Value> {
        let settings = self.lock_settings()?;
        Ok(settings.get_raw(key).cloned().unwrap_or(default))
    }

    /// Set a raw settings value in the working copy
    pub fn settings_set(&self, key: &str, value: Value) -> Result<()> {
        self.lock_settings()?.set(key, value)
    }

    /// Host hook: load settings and publish initial state
    pub fn on_init(&self) -> Result<()> {
        self.settings_read()?;
        {
            let mut slot = self.lock_timer()?;
            if let Some(cancel) = slot.cancel.take() {
                cancel.cancel();
            }
            slot.state = TimerState::idle();
        }
        self.load_recents()?;
        self.load_subtle_mode()?;
        info!("Simple Timer has been initialised");
        Ok(())
    }

    /// Host hook: stop any running timer
    pub fn on_unload(&self) -> Result<()> {
        self.cancel_timer()?;
        info!("Simple Timer has been unloaded");
        Ok(())
    }

    /// Host hook: nothing to clean up beyond logging
    pub fn on_uninstall(&self) -> Result<()> {
        info!("Simple Timer has been uninstalled");
        Ok(())
    }

    /// Host hook: file migration is performed by the host itself
    pub fn on_migrate(&self) -> Result<()> {
        info!("Simple Timer is being migrated");
        Ok(())
    }

    /// Calculate uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

/// Prepend a duration, evicting the oldest entries beyond the cap
fn push_recent(recents: &mut Vec<u64>, seconds: u64) {
    recents.truncate(MAX_RECENT_TIMERS - 1);
    recents.insert(0, seconds);
}
