//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    engine::INTERVAL_CHOICES_MINUTES,
    error::SessionError,
    state::AppState,
    tasks::SessionAction,
};
use super::responses::{
    ApiResponse, HealthResponse, IntervalRequest, StatusResponse, VisibilityRequest,
};

type ApiResult = Result<Json<ApiResponse>, SessionError>;

/// Forward an action to the session task and wrap the outcome
async fn run_action(state: &AppState, action: SessionAction, message: &str) -> ApiResult {
    match state.dispatch(action).await {
        Ok(session) => {
            info!("{} endpoint called - {}", action.name(), message);
            Ok(Json(ApiResponse::new(message.to_string(), session)))
        }
        Err(SessionError::SessionClosed) => {
            error!("Session task unavailable for {}", action.name());
            Err(SessionError::SessionClosed)
        }
        Err(e) => {
            warn!("{} rejected: {}", action.name(), e);
            Err(e)
        }
    }
}

/// Handle POST /start - Start or resume the timer
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_action(&state, SessionAction::Start, "Timer running").await
}

/// Handle POST /pause - Pause the timer
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_action(&state, SessionAction::Pause, "Timer paused").await
}

/// Handle POST /toggle - The big button: pause when running, otherwise start
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_action(&state, SessionAction::Toggle, "Timer toggled").await
}

/// Handle POST /reset - Stop and clear the session
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_action(&state, SessionAction::Reset, "Timer reset").await
}

/// Handle PUT /interval - Change the bell interval before the session starts
pub async fn interval_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IntervalRequest>,
) -> ApiResult {
    let message = format!("Bell interval set to {} minutes", request.minutes);
    run_action(
        &state,
        SessionAction::SetInterval { minutes: request.minutes },
        &message,
    )
    .await
}

/// Handle POST /mute - Silence chimes and ambience
pub async fn mute_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_action(&state, SessionAction::SetMuted(true), "Audio muted").await
}

/// Handle POST /unmute - Restore chimes and ambience
pub async fn unmute_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_action(&state, SessionAction::SetMuted(false), "Audio unmuted").await
}

/// Handle POST /toggle-mute - Flip the mute flag
pub async fn toggle_mute_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run_action(&state, SessionAction::ToggleMute, "Mute toggled").await
}

/// Handle POST /visibility - Report whether the timer is on screen
pub async fn visibility_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VisibilityRequest>,
) -> ApiResult {
    let message = if request.visible { "Timer visible" } else { "Timer hidden" };
    run_action(&state, SessionAction::SetVisibility(request.visible), message).await
}

/// Handle GET /status - Return the current session and server info
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, SessionError> {
    let session = state.dispatch(SessionAction::Snapshot).await.map_err(|e| {
        error!("Failed to get session snapshot: {}", e);
        e
    })?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        session,
        interval_choices: INTERVAL_CHOICES_MINUTES.to_vec(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.latest_snapshot().phase))
}
