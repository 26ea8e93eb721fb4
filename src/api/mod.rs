//! HTTP host bridge module
//!
//! Exposes the plugin's callable methods and its event stream to the UI.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{services::BroadcastSink, state::TimerEngine};
use handlers::*;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct ApiState {
    pub engine: Arc<TimerEngine>,
    pub events: BroadcastSink,
}

impl ApiState {
    pub fn new(engine: Arc<TimerEngine>, events: BroadcastSink) -> Self {
        Self { engine, events }
    }
}

/// Create the HTTP router with all endpoints
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/timer/start", post(start_timer_handler))
        .route("/timer/cancel", post(cancel_timer_handler))
        .route("/subtle-mode", post(subtle_mode_handler))
        .route("/load/recents", post(load_recents_handler))
        .route("/load/subtle-mode", post(load_subtle_mode_handler))
        .route("/load/remaining-seconds", post(load_remaining_seconds_handler))
        .route("/settings/read", post(settings_read_handler))
        .route("/settings/commit", post(settings_commit_handler))
        .route("/settings/values/:key", get(settings_get_handler).put(settings_set_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
