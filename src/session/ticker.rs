use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error};

use super::clock::SessionClock;
use super::observer::ObserverSlot;
use crate::surface::{format_elapsed, ProgressSurface};

/// Tick period of the progress ticker
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Repeating 1 Hz progress task bound to one recording episode
///
/// The first tick fires one period after `start`. Each tick notifies the
/// current observer and refreshes the progress surface. `cancel` waits for the
/// task to exit, so no tick runs once it returns.
pub struct ProgressTicker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<u64>,
}

impl ProgressTicker {
    pub fn start(
        clock: SessionClock,
        observer: Arc<ObserverSlot>,
        surface: Arc<dyn ProgressSurface>,
    ) -> Self {
        Self::start_with_period(clock, observer, surface, PROGRESS_INTERVAL)
    }

    pub fn start_with_period(
        clock: SessionClock,
        observer: Arc<ObserverSlot>,
        surface: Arc<dyn ProgressSurface>,
        period: Duration,
    ) -> Self {
        let (shutdown, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            let mut fired = 0u64;

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = ticks.tick() => {
                        let elapsed = clock.elapsed();
                        observer.notify(elapsed);
                        surface.update(&format_elapsed(elapsed));
                        fired += 1;
                    }
                }
            }

            fired
        });

        Self { shutdown, handle }
    }

    /// Stop ticking and wait until any in-flight tick has finished
    pub async fn cancel(self) {
        let _ = self.shutdown.send(());

        match self.handle.await {
            Ok(fired) => debug!("Progress ticker drained after {} ticks", fired),
            Err(e) => error!("Progress ticker panicked: {}", e),
        }
    }
}
