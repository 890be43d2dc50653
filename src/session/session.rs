use super::clock::SessionClock;
use super::config::SessionSettings;
use super::observer::{ObserverSlot, ProgressObserver};
use super::status::{SessionStatus, StartOutcome};
use super::ticker::ProgressTicker;
use crate::device::{CaptureConfig, CaptureDevice, CaptureDeviceFactory};
use crate::error::{DeviceError, SessionError};
use crate::storage::{ArtifactCatalog, ArtifactNamer, ArtifactRecord, ReservedArtifact};
use crate::surface::{format_elapsed, ProgressSurface};
use chrono::Utc;
use std::future::Future;
use std::mem;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Collaborators a session is built from
#[derive(Clone)]
pub struct SessionParts {
    pub settings: SessionSettings,
    pub devices: Arc<dyn CaptureDeviceFactory>,
    pub catalog: Arc<dyn ArtifactCatalog>,
    pub surface: Arc<dyn ProgressSurface>,
}

/// The single recording session of a process
///
/// Idle or Recording; a device handle exists only while Recording. Every
/// transition runs under `state`, so concurrent `start`/`stop` calls
/// serialize and the loser observes the winner's state.
///
/// Transitions run on a spawned task. A caller that stops waiting (a dropped
/// HTTP request, a timeout) does not interrupt a half-finished stop.
pub struct RecordingSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    settings: SessionSettings,
    namer: ArtifactNamer,
    devices: Arc<dyn CaptureDeviceFactory>,
    catalog: Arc<dyn ArtifactCatalog>,
    surface: Arc<dyn ProgressSurface>,
    observer: Arc<ObserverSlot>,
    state: Mutex<SessionState>,
}

enum SessionState {
    Idle,
    Recording(ActiveEpisode),
    /// The owning host shut down; no further episodes
    Closed,
}

struct ActiveEpisode {
    episode_id: Uuid,
    device: Box<dyn CaptureDevice>,
    clock: SessionClock,
    output: ReservedArtifact,
    ticker: ProgressTicker,
    watcher: Option<JoinHandle<()>>,
}

impl RecordingSession {
    pub fn new(parts: SessionParts) -> Self {
        let namer = ArtifactNamer::new(
            parts.settings.storage_dir.clone(),
            parts.settings.capture.format.extension(),
        );

        Self {
            inner: Arc::new(SessionInner {
                settings: parts.settings,
                namer,
                devices: parts.devices,
                catalog: parts.catalog,
                surface: parts.surface,
                observer: Arc::new(ObserverSlot::new()),
                state: Mutex::new(SessionState::Idle),
            }),
        }
    }

    /// Start a new episode
    ///
    /// A no-op (logged) when already recording. On device failure the handle
    /// is released and the session stays Idle.
    pub async fn start(&self) -> Result<StartOutcome, SessionError> {
        let inner = Arc::clone(&self.inner);
        run_detached(async move { inner.start().await }).await
    }

    /// Stop the episode, finalize the file and catalog it
    ///
    /// Order: ticker drained, device stopped, elapsed read, device released,
    /// file size read, catalog written. Returns `NotRecording` (logged) when
    /// Idle, touching neither device nor catalog. Once called, the stop runs
    /// to completion even if the returned future is dropped.
    pub async fn stop(&self) -> Result<ArtifactRecord, SessionError> {
        let inner = Arc::clone(&self.inner);
        run_detached(async move {
            let mut state = inner.state.lock().await;
            inner.finish(&mut state).await
        })
        .await
    }

    /// Force-stop any running episode and refuse further starts
    ///
    /// Returns the outcome of the forced stop, if one was needed.
    pub(crate) async fn close(&self) -> Option<Result<ArtifactRecord, SessionError>> {
        let inner = Arc::clone(&self.inner);
        run_detached(async move {
            let mut state = inner.state.lock().await;

            let forced = if matches!(*state, SessionState::Recording(_)) {
                warn!("Session closing while recording, forcing stop");
                Some(inner.finish(&mut state).await)
            } else {
                None
            };

            *state = SessionState::Closed;
            forced
        })
        .await
    }

    /// Tear down after the device failed mid-recording
    ///
    /// The episode is not salvaged and nothing is cataloged. Returns the
    /// error to surface: `DeviceFailed(cause)`, or `NotRecording` when Idle.
    /// Devices that report failures on their own trigger this automatically.
    pub async fn abort(&self, cause: DeviceError) -> SessionError {
        let inner = Arc::clone(&self.inner);
        run_detached(async move { inner.fail(None, cause).await }).await
    }

    pub async fn is_recording(&self) -> bool {
        matches!(*self.inner.state.lock().await, SessionState::Recording(_))
    }

    /// Time since the episode's start mark; `None` when Idle
    pub async fn elapsed(&self) -> Option<Duration> {
        match &*self.inner.state.lock().await {
            SessionState::Recording(active) => Some(active.clock.elapsed()),
            SessionState::Idle | SessionState::Closed => None,
        }
    }

    pub async fn status(&self) -> SessionStatus {
        match &*self.inner.state.lock().await {
            SessionState::Recording(active) => SessionStatus {
                is_recording: true,
                episode_id: Some(active.episode_id),
                output_name: Some(active.output.name.clone()),
                output_path: Some(active.output.path.clone()),
                elapsed_ms: Some(active.clock.elapsed().as_millis() as u64),
            },
            SessionState::Idle | SessionState::Closed => SessionStatus::idle(),
        }
    }

    /// Replace the progress observer; `None` detaches it
    ///
    /// Only a weak reference is kept. Safe at any time, including mid-tick.
    pub fn set_progress_observer(&self, observer: Option<&Arc<dyn ProgressObserver>>) {
        self.inner.observer.set(observer);
    }
}

impl SessionInner {
    async fn start(self: Arc<Self>) -> Result<StartOutcome, SessionError> {
        let mut state = self.state.lock().await;

        match &*state {
            SessionState::Recording(active) => {
                warn!(
                    "Recording already started: {} ({})",
                    active.output.name, active.episode_id
                );
                return Ok(StartOutcome::AlreadyRecording);
            }
            SessionState::Closed => return Err(SessionError::HostShutDown),
            SessionState::Idle => {}
        }

        let output = self
            .namer
            .reserve(&self.settings.base_name)
            .map_err(SessionError::Naming)?;
        let episode_id = Uuid::new_v4();

        info!(
            "Starting recording {}: {}",
            episode_id,
            output.path.display()
        );

        let mut device = self.devices.create().map_err(|e| {
            error!("Failed to create capture device: {}", e);
            SessionError::Prepare(e)
        })?;

        if let Err(e) = bring_up(device.as_mut(), &self.settings.capture, &output.path).await {
            error!("prepare() failed on {}: {}", device.name(), e);
            device.release().await;
            return Err(SessionError::Prepare(e));
        }

        let watcher = device
            .take_failure_signal()
            .map(|failures| watch_failures(Arc::downgrade(&self), episode_id, failures));

        let clock = SessionClock::start();
        self.surface.show(
            &self.settings.notification_title,
            &format_elapsed(Duration::ZERO),
        );
        let ticker = ProgressTicker::start(
            clock,
            Arc::clone(&self.observer),
            Arc::clone(&self.surface),
        );

        let path = output.path.clone();
        *state = SessionState::Recording(ActiveEpisode {
            episode_id,
            device,
            clock,
            output,
            ticker,
            watcher,
        });

        info!("Recording {} started", episode_id);

        Ok(StartOutcome::Started { episode_id, path })
    }

    async fn finish(&self, state: &mut SessionState) -> Result<ArtifactRecord, SessionError> {
        let active = match mem::replace(state, SessionState::Idle) {
            SessionState::Recording(active) => active,
            other => {
                *state = other;
                warn!("stop() called while not recording");
                return Err(SessionError::NotRecording);
            }
        };

        let ActiveEpisode {
            episode_id,
            mut device,
            clock,
            output,
            ticker,
            watcher,
        } = active;

        info!("Stopping recording {}", episode_id);

        if let Some(watcher) = watcher {
            watcher.abort();
        }
        ticker.cancel().await;

        let stopped = device.stop().await;
        let elapsed = clock.elapsed();
        device.release().await;
        self.surface.dismiss();

        if let Err(e) = stopped {
            error!("Capture device failed to finalize {}: {}", output.name, e);
            return Err(SessionError::DeviceFailed(e));
        }

        let size_bytes = tokio::fs::metadata(&output.path)
            .await
            .map_err(|source| SessionError::Artifact {
                path: output.path.clone(),
                source,
            })?
            .len();

        let record = ArtifactRecord {
            path: output.path,
            title: output.name,
            size_bytes,
            mime_type: self.settings.capture.format.mime_type().to_string(),
            created_at_epoch_secs: Utc::now().timestamp(),
            artist: self.settings.app_name.clone(),
            duration_ms: elapsed.as_millis() as u64,
            is_podcast: true,
        };

        if let Err(source) = self.catalog.insert(&record).await {
            error!("Failed to catalog {}: {}", record.title, source);
            return Err(SessionError::Catalog {
                record: Box::new(record),
                source,
            });
        }

        info!(
            "Recording {} saved: {} ({:.1}s, {} bytes)",
            episode_id,
            record.path.display(),
            elapsed.as_secs_f64(),
            record.size_bytes
        );

        Ok(record)
    }

    /// Abandon the running episode, or only `episode` when given
    async fn fail(&self, episode: Option<Uuid>, cause: DeviceError) -> SessionError {
        let mut state = self.state.lock().await;

        let active = match mem::replace(&mut *state, SessionState::Idle) {
            SessionState::Recording(active)
                if episode.map_or(true, |id| id == active.episode_id) =>
            {
                active
            }
            other => {
                *state = other;
                warn!("Device failure reported while not recording: {}", cause);
                return SessionError::NotRecording;
            }
        };

        error!(
            "Capture device failed during recording {}: {}",
            active.episode_id, cause
        );

        let ActiveEpisode {
            mut device,
            ticker,
            watcher,
            ..
        } = active;

        if let Some(watcher) = watcher {
            watcher.abort();
        }
        ticker.cancel().await;
        device.release().await;
        self.surface.dismiss();

        SessionError::DeviceFailed(cause)
    }
}

/// Await a device's failure report for one episode and tear it down
fn watch_failures(
    session: Weak<SessionInner>,
    episode_id: Uuid,
    failures: oneshot::Receiver<DeviceError>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // A dropped sender means the device was stopped or released
        let Ok(cause) = failures.await else {
            return;
        };
        let Some(session) = session.upgrade() else {
            return;
        };

        warn!("Capture device reported a failure: {}", cause);
        tokio::spawn(async move {
            session.fail(Some(episode_id), cause).await;
        });
    })
}

/// Run a state transition to completion independently of the caller
async fn run_detached<T>(transition: impl Future<Output = T> + Send + 'static) -> T
where
    T: Send + 'static,
{
    match tokio::spawn(transition).await {
        Ok(outcome) => outcome,
        Err(e) => panic::resume_unwind(e.into_panic()),
    }
}

async fn bring_up(
    device: &mut dyn CaptureDevice,
    config: &CaptureConfig,
    sink: &Path,
) -> Result<(), DeviceError> {
    device.configure(config, sink).await?;
    device.prepare().await?;
    device.start().await
}
