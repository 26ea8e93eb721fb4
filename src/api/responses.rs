//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::TimerState;

/// Body of POST /timer/start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartTimerRequest {
    pub seconds: i64,
}

impl StartTimerRequest {
    /// Requested duration; non-positive values become a zero-length timer
    pub fn duration_seconds(&self) -> u64 {
        u64::try_from(self.seconds).unwrap_or(0)
    }
}

/// Body of POST /subtle-mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtleModeRequest {
    pub subtle: bool,
}

/// API response structure for operation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
}

impl ApiResponse {
    /// Create an ok response
    pub fn ok(message: impl Into<String>, timer: TimerState) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Response of GET /settings/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: Value,
}

/// Status response with timer and preference information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub recent_timers_seconds: Vec<u64>,
    pub subtle_mode: bool,
    pub uptime: String,
    pub timestamp: DateTime<Utc>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
