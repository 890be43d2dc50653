use super::state::AppState;
use crate::error::SessionError;
use crate::session::{SessionStatus, StartOutcome};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StartRecordingResponse {
    /// "recording" for a new episode, "already_recording" otherwise
    pub status: String,
    pub session: SessionStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, err: &SessionError) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn status_code_for(err: &SessionError) -> StatusCode {
    match err {
        SessionError::NotRecording => StatusCode::CONFLICT,
        SessionError::Prepare(_) | SessionError::HostShutDown => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recording/start
/// Start recording, or report the episode already running
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    let session = match state.host.bind() {
        Ok(session) => session,
        Err(e) => return error_response(status_code_for(&e), &e),
    };

    let status = match session.start().await {
        Ok(StartOutcome::Started { episode_id, .. }) => {
            info!("Recording started via HTTP: {}", episode_id);
            "recording"
        }
        Ok(StartOutcome::AlreadyRecording) => "already_recording",
        Err(e) => {
            error!("Failed to start recording: {}", e);
            return error_response(status_code_for(&e), &e);
        }
    };

    (
        StatusCode::OK,
        Json(StartRecordingResponse {
            status: status.to_string(),
            session: session.status().await,
        }),
    )
        .into_response()
}

/// POST /recording/stop
/// Stop recording and return the cataloged artifact
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    let session = match state.host.bind() {
        Ok(session) => session,
        Err(e) => return error_response(status_code_for(&e), &e),
    };

    match session.stop().await {
        Ok(record) => {
            info!("Recording stopped via HTTP: {}", record.path.display());
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(e) => {
            if !e.is_noop() {
                error!("Failed to stop recording: {}", e);
            }
            error_response(status_code_for(&e), &e)
        }
    }
}

/// GET /recording/status
/// Current session state, for UIs rebuilding their display
pub async fn get_recording_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.host.bind() {
        Ok(session) => (StatusCode::OK, Json(session.status().await)).into_response(),
        Err(e) => error_response(status_code_for(&e), &e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
