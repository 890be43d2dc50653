use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Snapshot a reattaching UI uses to rebuild its display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Whether recording is currently active
    pub is_recording: bool,

    /// ID of the running episode
    pub episode_id: Option<Uuid>,

    /// File name of the running episode
    pub output_name: Option<String>,

    pub output_path: Option<PathBuf>,

    /// Time since the episode's start mark
    pub elapsed_ms: Option<u64>,
}

impl SessionStatus {
    pub fn idle() -> Self {
        Self {
            is_recording: false,
            episode_id: None,
            output_name: None,
            output_path: None,
            elapsed_ms: None,
        }
    }
}

/// Result of a `start()` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new episode began writing to `path`
    Started { episode_id: Uuid, path: PathBuf },
    /// An episode was already running; nothing changed
    AlreadyRecording,
}
