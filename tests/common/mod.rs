// Shared fakes for integration tests
//
// Every fake writes into one ordered event log so tests can assert on the
// interleaving of device calls, progress ticks and surface updates.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use soundrecorder::{
    ArtifactCatalog, CaptureConfig, CaptureDevice, CaptureDeviceFactory, DeviceError,
    MemoryCatalog, ProgressObserver, ProgressSurface, RecordingSession, SessionParts,
    SessionSettings,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::oneshot;

pub const BASE_NAME: &str = "defaultName";
pub const PAYLOAD_BYTES: usize = 4096;

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.all()
            .into_iter()
            .filter(|e| e.starts_with(prefix))
            .collect()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.all().iter().position(|e| e == event)
    }
}

/// What the next fake devices should do
#[derive(Debug, Clone, Default)]
pub struct DeviceScript {
    pub busy_on_prepare: bool,
    pub fail_on_stop: bool,
    /// How long `stop()` takes to finalize
    pub stop_delay: Option<Duration>,
}

pub struct FakeDeviceFactory {
    log: EventLog,
    script: Mutex<DeviceScript>,
    created: AtomicUsize,
    live: Arc<AtomicUsize>,
    failure: Mutex<Option<oneshot::Sender<DeviceError>>>,
}

impl FakeDeviceFactory {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            script: Mutex::new(DeviceScript::default()),
            created: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            failure: Mutex::new(None),
        }
    }

    pub fn set_script(&self, script: DeviceScript) {
        *self.script.lock() = script;
    }

    /// Device handles created so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Device handles created and not yet released
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Make the most recent device report a failure on its own
    ///
    /// Returns false when nobody is listening any more.
    pub fn report_failure(&self, cause: DeviceError) -> bool {
        match self.failure.lock().take() {
            Some(tx) => tx.send(cause).is_ok(),
            None => false,
        }
    }
}

impl CaptureDeviceFactory for FakeDeviceFactory {
    fn create(&self) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        let (tx, failures) = oneshot::channel();
        *self.failure.lock() = Some(tx);
        Ok(Box::new(FakeDevice {
            log: self.log.clone(),
            script: self.script.lock().clone(),
            live: Arc::clone(&self.live),
            sink: None,
            released: false,
            failures: Some(failures),
        }))
    }
}

struct FakeDevice {
    log: EventLog,
    script: DeviceScript,
    live: Arc<AtomicUsize>,
    sink: Option<PathBuf>,
    released: bool,
    failures: Option<oneshot::Receiver<DeviceError>>,
}

#[async_trait]
impl CaptureDevice for FakeDevice {
    async fn configure(&mut self, _config: &CaptureConfig, sink: &Path) -> Result<(), DeviceError> {
        self.log.push("configure");
        self.sink = Some(sink.to_path_buf());
        Ok(())
    }

    async fn prepare(&mut self) -> Result<(), DeviceError> {
        self.log.push("prepare");
        // Give a racing caller the chance to interleave
        tokio::task::yield_now().await;
        if self.script.busy_on_prepare {
            return Err(DeviceError::Busy("microphone in use".to_string()));
        }
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeviceError> {
        self.log.push("start");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), DeviceError> {
        self.log.push("stop");
        if let Some(delay) = self.script.stop_delay {
            tokio::time::sleep(delay).await;
        }
        if self.script.fail_on_stop {
            return Err(DeviceError::Failed("no audio captured".to_string()));
        }
        let sink = self
            .sink
            .as_ref()
            .ok_or_else(|| DeviceError::Failed("not configured".to_string()))?;
        std::fs::write(sink, vec![0u8; PAYLOAD_BYTES])?;
        Ok(())
    }

    async fn release(&mut self) {
        self.log.push("release");
        if !self.released {
            self.released = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn take_failure_signal(&mut self) -> Option<oneshot::Receiver<DeviceError>> {
        self.failures.take()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Progress surface recording every call
pub struct RecordingSurface {
    log: EventLog,
}

impl RecordingSurface {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl ProgressSurface for RecordingSurface {
    fn show(&self, title: &str, body: &str) {
        self.log.push(format!("surface.show:{}:{}", title, body));
    }

    fn update(&self, body: &str) {
        self.log.push(format!("surface.update:{}", body));
    }

    fn dismiss(&self) {
        self.log.push("surface.dismiss");
    }
}

/// Observer logging `tick:<whole seconds>`
pub fn tick_observer(log: &EventLog) -> Arc<dyn ProgressObserver> {
    let log = log.clone();
    Arc::new(move |elapsed: Duration| log.push(format!("tick:{}", elapsed.as_secs())))
}

pub struct Fixture {
    pub dir: TempDir,
    pub log: EventLog,
    pub devices: Arc<FakeDeviceFactory>,
    pub catalog: Arc<MemoryCatalog>,
    pub parts: SessionParts,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let log = EventLog::default();
        let devices = Arc::new(FakeDeviceFactory::new(log.clone()));
        let catalog = Arc::new(MemoryCatalog::new());

        let settings = SessionSettings {
            storage_dir: dir.path().join("SoundRecorder"),
            base_name: BASE_NAME.to_string(),
            ..SessionSettings::default()
        };

        let parts = SessionParts {
            settings,
            devices: devices.clone() as Arc<dyn CaptureDeviceFactory>,
            catalog: catalog.clone() as Arc<dyn ArtifactCatalog>,
            surface: Arc::new(RecordingSurface::new(log.clone())),
        };

        Self {
            dir,
            log,
            devices,
            catalog,
            parts,
        }
    }

    pub fn session(&self) -> Arc<RecordingSession> {
        Arc::new(RecordingSession::new(self.parts.clone()))
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.parts.settings.storage_dir.clone()
    }
}
