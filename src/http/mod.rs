//! HTTP API for controlling the recording session
//!
//! Each request is a short-lived attachment to the session host:
//! - POST /recording/start - Start recording
//! - POST /recording/stop - Stop and catalog the recording
//! - GET /recording/status - Query session status
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, StartRecordingResponse};
pub use routes::create_router;
pub use state::AppState;
