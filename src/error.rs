//! Error types for the recording core.

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::ArtifactRecord;

/// Failure reported by a capture device
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device busy: {0}")]
    Busy(String),

    #[error("unsupported capture configuration: {0}")]
    Unsupported(String),

    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("device failure: {0}")]
    Failed(String),
}

/// Failure writing to the artifact catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// configure/prepare/start failed; the device was released and the session is Idle
    #[error("failed to prepare capture device: {0}")]
    Prepare(#[source] DeviceError),

    #[error("no recording in progress")]
    NotRecording,

    /// The device failed while recording; the episode is over
    #[error("capture device failed during recording: {0}")]
    DeviceFailed(#[source] DeviceError),

    #[error("failed to reserve output path: {0}")]
    Naming(#[source] std::io::Error),

    #[error("failed to read finalized artifact {path:?}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact was finalized but could not be cataloged
    #[error("failed to catalog {}: {source}", .record.title)]
    Catalog {
        record: Box<ArtifactRecord>,
        #[source]
        source: CatalogError,
    },

    #[error("session host has been shut down")]
    HostShutDown,
}

impl SessionError {
    /// A stop with nothing to stop: logged and ignored, never escalated
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NotRecording)
    }
}
