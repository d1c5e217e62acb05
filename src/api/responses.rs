//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{engine::TimerPhase, error::SessionError, state::SessionSnapshot};

/// API response structure for session actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionSnapshot,
}

impl ApiResponse {
    /// Create a response whose status is the session phase
    pub fn new(message: String, session: SessionSnapshot) -> Self {
        Self {
            status: session.phase.as_str().to_string(),
            message,
            timestamp: Utc::now(),
            session,
        }
    }
}

/// Error body returned for rejected actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let code = match self {
            SessionError::NotIdle => StatusCode::CONFLICT,
            SessionError::InvalidInterval(_) => StatusCode::BAD_REQUEST,
            SessionError::SessionClosed => StatusCode::SERVICE_UNAVAILABLE,
        };
        (code, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Body of PUT /interval
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntervalRequest {
    pub minutes: u64,
}

/// Body of POST /visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub visible: bool,
}

/// Status response with server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: SessionSnapshot,
    pub interval_choices: Vec<u64>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub phase: TimerPhase,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(phase: TimerPhase) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            phase,
        }
    }
}
