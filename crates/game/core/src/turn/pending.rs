use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Per-floor count of visual effects that must finish before the turn may
/// advance.
///
/// Cloning shares the counter. Increments happen only through
/// [`ResolutionGuard`], so the count can never underflow.
#[derive(Clone, Debug, Default)]
pub struct PendingResolutions {
    count: Arc<AtomicUsize>,
}

impl PendingResolutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub fn is_clear(&self) -> bool {
        self.count() == 0
    }

    /// Registers one outstanding resolution, released when the guard drops.
    pub fn guard(&self) -> ResolutionGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        ResolutionGuard {
            count: Arc::clone(&self.count),
        }
    }
}

/// Scoped hold on the turn. Hand it to whatever plays the effect and drop it
/// when the effect is done.
#[derive(Debug)]
#[must_use = "dropping the guard immediately releases the hold"]
pub struct ResolutionGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}
