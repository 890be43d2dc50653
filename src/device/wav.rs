// Reference capture device writing PCM into a WAV container

use async_trait::async_trait;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};
use tracing::{debug, error, info, warn};

use super::backend::{
    AudioEncoder, AudioFrame, CaptureConfig, CaptureDevice, CaptureDeviceFactory, OutputFormat,
};
use crate::error::DeviceError;

type WavFileWriter = hound::WavWriter<BufWriter<File>>;

/// Capture device that records silence at the configured rate
///
/// Frames are produced every `buffer_duration_ms` by a writer task, so the
/// finalized file length tracks wall time the same way a live input would.
/// Only `OutputFormat::Wav` with `AudioEncoder::Pcm16` is accepted.
pub struct WavCaptureDevice {
    buffer_duration_ms: u64,
    spec: Option<hound::WavSpec>,
    sink: Option<PathBuf>,
    writer: Option<WavFileWriter>,
    task: Option<WriterTask>,
    failures: Option<oneshot::Receiver<DeviceError>>,
}

struct WriterTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Result<u64, DeviceError>>,
}

impl WavCaptureDevice {
    pub fn new(buffer_duration_ms: u64) -> Self {
        Self {
            buffer_duration_ms: buffer_duration_ms.max(1),
            spec: None,
            sink: None,
            writer: None,
            task: None,
            failures: None,
        }
    }
}

#[async_trait]
impl CaptureDevice for WavCaptureDevice {
    async fn configure(&mut self, config: &CaptureConfig, sink: &Path) -> Result<(), DeviceError> {
        if config.format != OutputFormat::Wav || config.encoder != AudioEncoder::Pcm16 {
            return Err(DeviceError::Unsupported(format!(
                "{:?}/{:?} (only wav/pcm16 is supported)",
                config.format, config.encoder
            )));
        }
        if config.channels == 0 || config.sample_rate_hz == 0 {
            return Err(DeviceError::Unsupported(format!(
                "{} channels at {}Hz",
                config.channels, config.sample_rate_hz
            )));
        }

        self.spec = Some(hound::WavSpec {
            channels: config.channels,
            sample_rate: config.sample_rate_hz,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        });
        self.sink = Some(sink.to_path_buf());

        debug!(
            "WAV device configured: {}Hz, {} channels -> {}",
            config.sample_rate_hz,
            config.channels,
            sink.display()
        );

        Ok(())
    }

    async fn prepare(&mut self) -> Result<(), DeviceError> {
        let (Some(spec), Some(sink)) = (self.spec, self.sink.as_ref()) else {
            return Err(DeviceError::Failed("prepare() before configure()".to_string()));
        };

        let writer = hound::WavWriter::create(sink, spec).map_err(from_hound)?;
        self.writer = Some(writer);

        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeviceError> {
        if self.task.is_some() {
            return Err(DeviceError::Busy("capture already running".to_string()));
        }
        let (Some(spec), Some(writer)) = (self.spec, self.writer.take()) else {
            return Err(DeviceError::Failed("start() before prepare()".to_string()));
        };

        let buffer = Duration::from_millis(self.buffer_duration_ms);
        let samples_per_buffer = (spec.sample_rate as u64 * self.buffer_duration_ms / 1000) as usize
            * spec.channels as usize;
        let (shutdown, shutdown_rx) = oneshot::channel();
        let (failed, failures) = oneshot::channel();

        let handle = tokio::spawn(async move {
            match write_silence(writer, spec, buffer, samples_per_buffer, shutdown_rx).await {
                Ok(written) => Ok(written),
                Err(e) => {
                    error!("WAV capture failed: {}", e);
                    let summary = e.to_string();
                    let _ = failed.send(e);
                    Err(DeviceError::Failed(summary))
                }
            }
        });

        self.task = Some(WriterTask { shutdown, handle });
        self.failures = Some(failures);
        info!("WAV capture started");

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), DeviceError> {
        let Some(task) = self.task.take() else {
            return Err(DeviceError::Failed("stop() while not capturing".to_string()));
        };

        // The writer task may already have exited on a write error
        let _ = task.shutdown.send(());

        let written = task
            .handle
            .await
            .map_err(|e| DeviceError::Failed(format!("capture task panicked: {}", e)))??;

        info!("WAV capture finalized ({} samples)", written);

        Ok(())
    }

    async fn release(&mut self) {
        if let Some(task) = self.task.take() {
            warn!("Releasing WAV device while capture is running");
            task.handle.abort();
        }
        self.writer = None;
        self.failures = None;
        self.spec = None;
        self.sink = None;
    }

    fn take_failure_signal(&mut self) -> Option<oneshot::Receiver<DeviceError>> {
        self.failures.take()
    }

    fn name(&self) -> &str {
        "WAV file"
    }
}

async fn write_silence(
    mut writer: WavFileWriter,
    spec: hound::WavSpec,
    buffer: Duration,
    samples_per_buffer: usize,
    mut shutdown: oneshot::Receiver<()>,
) -> Result<u64, DeviceError> {
    let started = Instant::now();
    let mut pacing = interval(buffer);
    let mut written = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = pacing.tick() => {
                let frame = AudioFrame {
                    samples: vec![0i16; samples_per_buffer],
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                    timestamp_ms: started.elapsed().as_millis() as u64,
                };
                write_frame(&mut writer, &frame)?;
                written += frame.samples.len() as u64;
            }
        }
    }

    writer.finalize().map_err(from_hound)?;
    Ok(written)
}

fn write_frame(writer: &mut WavFileWriter, frame: &AudioFrame) -> Result<(), DeviceError> {
    for &sample in &frame.samples {
        writer.write_sample(sample).map_err(from_hound)?;
    }
    Ok(())
}

fn from_hound(err: hound::Error) -> DeviceError {
    match err {
        hound::Error::IoError(e) => DeviceError::Io(e),
        other => DeviceError::Failed(other.to_string()),
    }
}

/// Produces `WavCaptureDevice` handles
#[derive(Debug, Clone)]
pub struct WavDeviceFactory {
    /// Pacing of the writer task in milliseconds
    pub buffer_duration_ms: u64,
}

impl Default for WavDeviceFactory {
    fn default() -> Self {
        Self {
            buffer_duration_ms: 100,
        }
    }
}

impl CaptureDeviceFactory for WavDeviceFactory {
    fn create(&self) -> Result<Box<dyn CaptureDevice>, DeviceError> {
        Ok(Box::new(WavCaptureDevice::new(self.buffer_duration_ms)))
    }
}
