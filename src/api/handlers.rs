//! HTTP endpoint handlers

use std::convert::Infallible;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use chrono::Utc;
use futures::stream::{self, Stream};
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{error::PluginError, state::TimerEngine};
use super::{
    responses::{
        ApiResponse, HealthResponse, SettingResponse, StartTimerRequest, StatusResponse,
        SubtleModeRequest,
    },
    ApiState,
};

type HandlerResult<T> = Result<Json<T>, StatusCode>;

fn internal_error(operation: &str, e: PluginError) -> StatusCode {
    error!("Failed to {}: {}", operation, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Build an ok response carrying the current timer state
fn respond(state: &ApiState, message: &str) -> HandlerResult<ApiResponse> {
    let timer = state
        .engine
        .timer_state()
        .map_err(|e| internal_error("read timer state", e))?;
    Ok(Json(ApiResponse::ok(message, timer)))
}

/// Handle POST /timer/start - negative durations start a zero-length timer
pub async fn start_timer_handler(
    State(state): State<ApiState>,
    Json(request): Json<StartTimerRequest>,
) -> HandlerResult<ApiResponse> {
    state
        .engine
        .start_timer(request.duration_seconds())
        .map_err(|e| internal_error("start timer", e))?;
    respond(&state, "Timer started")
}

/// Handle POST /timer/cancel
pub async fn cancel_timer_handler(State(state): State<ApiState>) -> HandlerResult<ApiResponse> {
    state
        .engine
        .cancel_timer()
        .map_err(|e| internal_error("cancel timer", e))?;
    respond(&state, "Timer cancelled")
}

/// Handle POST /subtle-mode
pub async fn subtle_mode_handler(
    State(state): State<ApiState>,
    Json(request): Json<SubtleModeRequest>,
) -> HandlerResult<ApiResponse> {
    info!("Setting subtle mode to: {}", request.subtle);
    state
        .engine
        .set_subtle_mode(request.subtle)
        .map_err(|e| internal_error("set subtle mode", e))?;
    respond(&state, "Subtle mode saved")
}

/// Handle POST /load/recents
pub async fn load_recents_handler(State(state): State<ApiState>) -> HandlerResult<ApiResponse> {
    state
        .engine
        .load_recents()
        .map_err(|e| internal_error("load recents", e))?;
    respond(&state, "Recent timers emitted")
}

/// Handle POST /load/subtle-mode
pub async fn load_subtle_mode_handler(State(state): State<ApiState>) -> HandlerResult<ApiResponse> {
    state
        .engine
        .load_subtle_mode()
        .map_err(|e| internal_error("load subtle mode", e))?;
    respond(&state, "Subtle mode emitted")
}

/// Handle POST /load/remaining-seconds
pub async fn load_remaining_seconds_handler(
    State(state): State<ApiState>,
) -> HandlerResult<ApiResponse> {
    state
        .engine
        .load_remaining_seconds()
        .map_err(|e| internal_error("load remaining seconds", e))?;
    respond(&state, "Remaining seconds emitted")
}

/// Handle POST /settings/read
pub async fn settings_read_handler(State(state): State<ApiState>) -> HandlerResult<ApiResponse> {
    state
        .engine
        .settings_read()
        .map_err(|e| internal_error("read settings", e))?;
    respond(&state, "Settings read")
}

/// Handle POST /settings/commit
pub async fn settings_commit_handler(State(state): State<ApiState>) -> HandlerResult<ApiResponse> {
    state
        .engine
        .settings_commit()
        .map_err(|e| internal_error("commit settings", e))?;
    respond(&state, "Settings saved")
}

/// Handle GET /settings/values/:key - null when the key is absent
pub async fn settings_get_handler(
    State(state): State<ApiState>,
    Path(key): Path<String>,
) -> HandlerResult<SettingResponse> {
    let value = state
        .engine
        .settings_get(&key, Value::Null)
        .map_err(|e| internal_error("get setting", e))?;
    Ok(Json(SettingResponse { key, value }))
}

/// Handle PUT /settings/values/:key - working copy only, commit separately
pub async fn settings_set_handler(
    State(state): State<ApiState>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> HandlerResult<SettingResponse> {
    state
        .engine
        .settings_set(&key, value.clone())
        .map_err(|e| internal_error("set setting", e))?;
    Ok(Json(SettingResponse { key, value }))
}

fn build_status(engine: &TimerEngine) -> Result<StatusResponse, PluginError> {
    Ok(StatusResponse {
        timer: engine.timer_state()?,
        recent_timers_seconds: engine.recents()?,
        subtle_mode: engine.subtle_mode()?,
        uptime: engine.get_uptime(),
        timestamp: Utc::now(),
    })
}

/// Handle GET /status
pub async fn status_handler(State(state): State<ApiState>) -> HandlerResult<StatusResponse> {
    build_status(&state.engine)
        .map(Json)
        .map_err(|e| internal_error("build status", e))
}

/// Handle GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handle GET /events - plugin events as server-sent events
pub async fn events_handler(
    State(state): State<ApiState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.events.subscribe();
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let sse = match Event::default().event(event.name()).json_data(event.args()) {
                        Ok(sse) => sse,
                        Err(e) => {
                            warn!("Failed to encode {} event: {}", event.name(), e);
                            continue;
                        }
                    };
                    return Some((Ok(sse), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
