use std::sync::Arc;

use domain::core::Tracker;

/// Lightweight handle to the tracker that can be cheaply cloned across
/// request handlers. The tracker is stateless beyond its store handle, so
/// no locking is needed.
#[derive(Clone)]
pub struct TrackerHandle {
    inner: Arc<Tracker>,
}

impl TrackerHandle {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            inner: Arc::new(tracker),
        }
    }

    pub fn tracker(&self) -> &Tracker {
        &self.inner
    }
}
