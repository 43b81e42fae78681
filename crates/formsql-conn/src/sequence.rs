//! Last-request-wins sequencing for overlapping async operations.
//!
//! There is no hard cancellation path: an in-flight validation or fetch
//! runs to completion, but its completion only takes effect if no newer
//! request started in the meantime. Each operation takes a ticket; a
//! ticket that is no longer current means the result must be discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hands out monotonically increasing request tickets.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    counter: Arc<AtomicU64>,
}

impl RequestSequencer {
    /// Creates a sequencer with no requests issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding all earlier ones.
    #[must_use]
    pub fn begin(&self) -> RequestTicket {
        let seq = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            seq,
            counter: Arc::clone(&self.counter),
        }
    }
}

/// A ticket identifying one outstanding request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    seq: u64,
    counter: Arc<AtomicU64>,
}

impl RequestTicket {
    /// Returns whether this is still the newest request.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.seq
    }
}
