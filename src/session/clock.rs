use std::time::Duration;
use tokio::time::Instant;

/// Monotonic start mark for one recording episode
///
/// Built on `tokio::time::Instant`, so elapsed time ignores wall-clock
/// adjustments and follows the runtime's (pausable) clock in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    mark: Instant,
}

impl SessionClock {
    /// Mark now as the start of the episode
    pub fn start() -> Self {
        Self {
            mark: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.mark)
    }
}
