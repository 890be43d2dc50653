use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::device::CaptureConfig;

/// Configuration for the recording session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Directory artifacts are written to
    pub storage_dir: PathBuf,

    /// Base of generated file names (`<base_name>-<n>.<ext>`)
    pub base_name: String,

    /// Artist tag written to the catalog
    pub app_name: String,

    /// Title of the progress surface while recording
    pub notification_title: String,

    /// Capture profile handed to the device
    pub capture: CaptureConfig,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("SoundRecorder"),
            base_name: "My Recording".to_string(),
            app_name: "Sound Recorder".to_string(),
            notification_title: "Recording".to_string(),
            capture: CaptureConfig::default(), // mono HE-AAC in MPEG-4, 96kbps, 44.1kHz
        }
    }
}
