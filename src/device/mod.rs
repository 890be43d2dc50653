pub mod backend;
pub mod wav;

pub use backend::{
    AudioEncoder, AudioFrame, AudioSource, CaptureConfig, CaptureDevice, CaptureDeviceFactory,
    OutputFormat,
};
pub use wav::{WavCaptureDevice, WavDeviceFactory};
