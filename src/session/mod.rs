//! Recording session management
//!
//! This module provides the `RecordingSession` state machine and the pieces it
//! coordinates:
//! - Monotonic start mark (`SessionClock`)
//! - 1 Hz progress ticks to an optional observer and the progress surface
//! - Device bring-up and teardown ordering
//! - Status snapshots for reattaching UIs

mod clock;
mod config;
mod observer;
mod session;
mod status;
mod ticker;

pub use clock::SessionClock;
pub use config::SessionSettings;
pub use observer::{ObserverSlot, ProgressObserver};
pub use session::{RecordingSession, SessionParts};
pub use status::{SessionStatus, StartOutcome};
pub use ticker::{ProgressTicker, PROGRESS_INTERVAL};
