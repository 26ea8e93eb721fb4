//! Simple Timer - standalone host bridge
//!
//! Runs the timer engine behind a local HTTP bridge so a UI can call the
//! plugin methods and subscribe to its events.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use simple_timer::{
    api::{create_router, ApiState},
    config::Config,
    services::BroadcastSink,
    state::{SettingsStore, TimerEngine},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!("simple_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting simple-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Settings path = {}", config.settings_path().display());

    let events = BroadcastSink::default();
    let engine = Arc::new(TimerEngine::new(
        SettingsStore::at_path(config.settings_path()),
        Arc::new(events.clone()),
    ));
    engine.on_init()?;

    let app = create_router(ApiState::new(Arc::clone(&engine), events));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Host bridge running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start             - Start a timer ({{\"seconds\": n}})");
    info!("  POST /timer/cancel            - Cancel the running timer");
    info!("  POST /subtle-mode             - Save subtle mode ({{\"subtle\": b}})");
    info!("  POST /load/recents            - Re-emit recent timers");
    info!("  POST /load/subtle-mode        - Re-emit subtle mode");
    info!("  POST /load/remaining-seconds  - Re-emit remaining seconds");
    info!("  GET  /events                  - Plugin event stream (SSE)");
    info!("  GET  /status                  - Current timer and settings");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to install signal handler: {}", e),
            }
        }
    }

    engine.on_unload()?;
    info!("Shutdown complete");
    Ok(())
}
