//! Visible-progress surface (the OS notification on mobile hosts)

use std::time::Duration;
use tracing::info;

/// Where the running timer is shown outside the UI
///
/// Calls are made from the session and its ticker and must not block.
pub trait ProgressSurface: Send + Sync {
    fn show(&self, title: &str, body: &str);

    fn update(&self, body: &str);

    fn dismiss(&self);
}

/// Format elapsed time as `mm:ss`
///
/// Minutes keep counting past 59 (`61:05`) rather than wrapping.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Surface that writes progress to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSurface;

impl ProgressSurface for LogSurface {
    fn show(&self, title: &str, body: &str) {
        info!("[{}] {}", title, body);
    }

    fn update(&self, body: &str) {
        info!("Recording {}", body);
    }

    fn dismiss(&self) {
        info!("Recording notification dismissed");
    }
}

/// Surface that shows nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSurface;

impl ProgressSurface for NoopSurface {
    fn show(&self, _title: &str, _body: &str) {}

    fn update(&self, _body: &str) {}

    fn dismiss(&self) {}
}
