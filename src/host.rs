//! Process-wide owner of the recording session
//!
//! Transient UIs `bind()` to obtain the session and drop their binding when
//! they go away. The session outlives any binding; it is created on the first
//! bind and destroyed only by `shutdown()`.

use parking_lot::Mutex;
use std::future::Future;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::SessionError;
use crate::session::{RecordingSession, SessionParts};
use crate::storage::ArtifactRecord;

/// Long-lived container for the single `RecordingSession`
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionHost {
    inner: Arc<HostInner>,
}

struct HostInner {
    parts: SessionParts,
    slot: Mutex<HostSlot>,
    bindings: AtomicUsize,
}

#[derive(Default)]
struct HostSlot {
    session: Option<Arc<RecordingSession>>,
    shut_down: bool,
}

impl SessionHost {
    pub fn new(parts: SessionParts) -> Self {
        Self {
            inner: Arc::new(HostInner {
                parts,
                slot: Mutex::new(HostSlot::default()),
                bindings: AtomicUsize::new(0),
            }),
        }
    }

    /// Attach to the session, creating it on first use
    ///
    /// Idempotent and safe to call concurrently; every caller gets the same
    /// session, including one that is already recording.
    pub fn bind(&self) -> Result<SessionBinding, SessionError> {
        let session = {
            let mut slot = self.inner.slot.lock();
            if slot.shut_down {
                return Err(SessionError::HostShutDown);
            }

            let session = slot.session.get_or_insert_with(|| {
                info!("Creating recording session");
                Arc::new(RecordingSession::new(self.inner.parts.clone()))
            });
            Arc::clone(session)
        };

        let count = self.inner.bindings.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Session bound ({} bindings)", count);

        Ok(SessionBinding {
            session,
            host: Arc::clone(&self.inner),
        })
    }

    /// Number of live bindings
    pub fn binding_count(&self) -> usize {
        self.inner.bindings.load(Ordering::SeqCst)
    }

    /// Whether the session has been created
    pub fn has_session(&self) -> bool {
        self.inner.slot.lock().session.is_some()
    }

    /// Destroy the session, force-stopping a running episode first
    ///
    /// Returns the artifact of the forced stop, if any. Later binds fail with
    /// `HostShutDown`; outstanding bindings can no longer start recordings.
    pub async fn shutdown(&self) -> Result<Option<ArtifactRecord>, SessionError> {
        let session = {
            let mut slot = self.inner.slot.lock();
            slot.shut_down = true;
            slot.session.take()
        };

        let Some(session) = session else {
            info!("Session host shut down (no session)");
            return Ok(None);
        };

        let forced = session.close().await.transpose();
        match &forced {
            Ok(Some(record)) => info!(
                "Session host shut down, saved in-progress recording {}",
                record.path.display()
            ),
            Ok(None) => info!("Session host shut down"),
            Err(e) => error!("Forced stop during shutdown failed: {}", e),
        }

        forced
    }

    /// Run `work` to completion, then shut down whatever its outcome
    ///
    /// An error from `work` takes precedence over the shutdown's outcome.
    pub async fn run_then_shutdown<E>(
        &self,
        work: impl Future<Output = Result<(), E>>,
    ) -> anyhow::Result<Option<ArtifactRecord>>
    where
        E: Into<anyhow::Error>,
    {
        let outcome = work.await;
        let saved = self.shutdown().await;

        outcome.map_err(Into::into)?;
        Ok(saved?)
    }
}

/// A UI's handle on the session; dropping it unbinds
pub struct SessionBinding {
    session: Arc<RecordingSession>,
    host: Arc<HostInner>,
}

impl SessionBinding {
    pub fn session(&self) -> &Arc<RecordingSession> {
        &self.session
    }

    /// Release this binding; the session keeps running
    pub fn unbind(self) {}
}

impl Deref for SessionBinding {
    type Target = RecordingSession;

    fn deref(&self) -> &RecordingSession {
        &self.session
    }
}

impl Drop for SessionBinding {
    fn drop(&mut self) {
        let remaining = self.host.bindings.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("Session unbound ({} bindings)", remaining);
    }
}
