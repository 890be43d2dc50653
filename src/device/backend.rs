use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::oneshot;

use crate::error::DeviceError;

/// Audio input routed into the capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// Device microphone
    Microphone,
    /// Microphone tuned for voice communication
    VoiceCommunication,
}

/// Container written to the sink path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// MPEG-4 audio container
    Mpeg4,
    /// RIFF WAVE
    Wav,
}

impl OutputFormat {
    /// File extension used when naming artifacts of this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mpeg4 => "mp4",
            Self::Wav => "wav",
        }
    }

    /// Mime type recorded in the catalog
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mpeg4 => "audio/mp4",
            Self::Wav => "audio/wav",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoder {
    /// High-efficiency AAC
    HeAac,
    /// AAC low complexity
    AacLc,
    /// Uncompressed 16-bit PCM
    Pcm16,
}

/// Parameters handed to `CaptureDevice::configure`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: AudioSource,
    pub format: OutputFormat,
    pub encoder: AudioEncoder,
    /// Number of channels (1 = mono)
    pub channels: u16,
    /// Encoder bitrate in bits per second
    pub bitrate_bps: u32,
    /// Sample rate in Hz
    pub sample_rate_hz: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: AudioSource::Microphone,
            format: OutputFormat::Mpeg4,
            encoder: AudioEncoder::HeAac,
            channels: 1,
            bitrate_bps: 96_000,
            sample_rate_hz: 44_100,
        }
    }
}

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Platform audio capture/encoder capability
///
/// One handle covers one recording episode: `configure`, `prepare`, `start`,
/// `stop`, then `release`. Implementations:
/// - `WavCaptureDevice`: silent PCM written to a WAV container (headless hosts)
/// - platform recorders are provided by the embedding application
#[async_trait]
pub trait CaptureDevice: Send {
    /// Set capture parameters and the output sink
    async fn configure(&mut self, config: &CaptureConfig, sink: &Path) -> Result<(), DeviceError>;

    /// Acquire the input and open the sink
    async fn prepare(&mut self) -> Result<(), DeviceError>;

    /// Begin capturing
    async fn start(&mut self) -> Result<(), DeviceError>;

    /// Stop capturing and finalize the container at the sink path
    async fn stop(&mut self) -> Result<(), DeviceError>;

    /// Free the underlying resources; the handle is unusable afterwards
    async fn release(&mut self);

    /// Channel on which the device reports a failure while capturing
    ///
    /// Taken once, right after a successful `start`. Devices that only fail
    /// synchronously return `None`.
    fn take_failure_signal(&mut self) -> Option<oneshot::Receiver<DeviceError>> {
        None
    }

    /// Get device name for logging
    fn name(&self) -> &str;
}

/// Creates a fresh device handle for each recording episode
pub trait CaptureDeviceFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn CaptureDevice>, DeviceError>;
}
