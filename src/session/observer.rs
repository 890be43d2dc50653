use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Receives the elapsed time once per progress tick
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, elapsed: Duration);
}

impl<F> ProgressObserver for F
where
    F: Fn(Duration) + Send + Sync,
{
    fn on_progress(&self, elapsed: Duration) {
        self(elapsed)
    }
}

/// Holds at most one observer without owning it
///
/// Setting replaces the previous observer. The slot keeps a `Weak`, so an
/// observer dropped by its UI simply stops being called.
#[derive(Default)]
pub struct ObserverSlot {
    current: RwLock<Option<Weak<dyn ProgressObserver>>>,
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, observer: Option<&Arc<dyn ProgressObserver>>) {
        *self.current.write() = observer.map(Arc::downgrade);
    }

    /// The attached observer, if it is still alive
    pub fn current(&self) -> Option<Arc<dyn ProgressObserver>> {
        self.current.read().as_ref().and_then(Weak::upgrade)
    }

    /// Call the observer outside the lock so it may clear or replace itself
    pub fn notify(&self, elapsed: Duration) {
        if let Some(observer) = self.current() {
            observer.on_progress(elapsed);
        }
    }
}
