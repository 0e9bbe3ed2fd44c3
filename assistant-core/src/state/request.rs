//! Request ids used to discard out-of-order resolutions

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one dispatched async operation within a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    #[cfg(test)]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Per-store monotonic id source
#[derive(Debug, Default)]
pub struct RequestSequence {
    last: AtomicU64,
}

impl RequestSequence {
    pub fn next(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Latest request issued on one track of a store.
///
/// Only the latest request may write its result; anything older resolved
/// too late and is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Track {
    latest: Option<RequestId>,
}

impl Track {
    pub fn begin(&mut self, id: RequestId) {
        // Pending actions may be reduced slightly out of issue order.
        self.latest = self.latest.max(Some(id));
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.latest == Some(id)
    }

    /// A newer request has begun on this track
    pub fn is_superseded(&self, id: RequestId) -> bool {
        self.latest > Some(id)
    }

    /// Orphan every in-flight request on this track
    pub fn invalidate(&mut self) {
        self.latest = None;
    }
}
