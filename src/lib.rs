pub mod config;
pub mod device;
pub mod error;
pub mod host;
pub mod http;
pub mod session;
pub mod storage;
pub mod surface;

pub use config::Config;
pub use device::{
    AudioEncoder, AudioSource, CaptureConfig, CaptureDevice, CaptureDeviceFactory, OutputFormat,
    WavCaptureDevice, WavDeviceFactory,
};
pub use error::{CatalogError, DeviceError, SessionError};
pub use host::{SessionBinding, SessionHost};
pub use http::{create_router, AppState};
pub use session::{
    ProgressObserver, RecordingSession, SessionClock, SessionParts, SessionSettings, SessionStatus,
    StartOutcome,
};
pub use storage::{
    ArtifactCatalog, ArtifactNamer, ArtifactRecord, JsonLinesCatalog, MemoryCatalog,
    ReservedArtifact,
};
pub use surface::{format_elapsed, LogSurface, NoopSurface, ProgressSurface};
