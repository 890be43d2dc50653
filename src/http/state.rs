use crate::host::SessionHost;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Owner of the recording session; each request binds for its duration
    pub host: SessionHost,
}

impl AppState {
    pub fn new(host: SessionHost) -> Self {
        Self { host }
    }
}
