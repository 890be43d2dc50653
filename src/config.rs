use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::device::CaptureConfig;
use crate::session::SessionSettings;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recorder: RecorderConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct RecorderConfig {
    pub storage_dir: String,
    pub base_name: String,
    pub app_name: String,
    pub notification_title: String,
    /// Pacing of the WAV device's writer task
    pub buffer_duration_ms: u64,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    pub path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    pub fn session_settings(&self) -> Result<SessionSettings> {
        Ok(SessionSettings {
            storage_dir: expand_path(&self.recorder.storage_dir)?,
            base_name: self.recorder.base_name.clone(),
            app_name: self.recorder.app_name.clone(),
            notification_title: self.recorder.notification_title.clone(),
            capture: self.recorder.capture.clone(),
        })
    }

    pub fn catalog_path(&self) -> Result<PathBuf> {
        expand_path(&self.catalog.path)
    }
}

/// Expand `~` and environment variables in a configured path
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(raw).with_context(|| format!("Failed to expand path {}", raw))?;
    Ok(PathBuf::from(expanded.into_owned()))
}
