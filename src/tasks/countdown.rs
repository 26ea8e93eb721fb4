//! Countdown background task

use std::{sync::Arc, time::Duration};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::state::TimerEngine;

/// Seconds between two countdown ticks
pub const TICK_SECONDS: u64 = 5;

/// Count down `seconds` in ticks, then report completion.
///
/// Cancellation interrupts the tick sleep. The engine re-checks the token
/// under its lock, so a cancelled countdown emits nothing further.
pub async fn countdown_task(engine: Arc<TimerEngine>, seconds: u64, cancel: CancellationToken) {
    info!("Starting countdown for {} seconds", seconds);

    let tick = Duration::from_secs(TICK_SECONDS);
    let mut seconds_elapsed = 0;

    while seconds_elapsed < seconds {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Countdown cancelled after {} seconds", seconds_elapsed);
                return;
            }
            _ = sleep(tick) => {}
        }

        seconds_elapsed += TICK_SECONDS;
        let remaining = seconds.saturating_sub(seconds_elapsed);
        if remaining == 0 {
            // The completion step reports the final zero
            break;
        }

        match engine.record_tick(&cancel, remaining) {
            Ok(true) => debug!("Countdown tick, {} seconds remaining", remaining),
            Ok(false) => {
                debug!("Countdown cancelled before tick could be reported");
                return;
            }
            Err(e) => {
                error!("Failed to record countdown tick: {}", e);
                return;
            }
        }
    }

    match engine.complete(&cancel) {
        Ok(true) => {}
        Ok(false) => debug!("Countdown cancelled before completion"),
        Err(e) => error!("Failed to complete countdown: {}", e),
    }
}
