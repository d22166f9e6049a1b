use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Advisory tally of files removed during one deletion run.
///
/// Cloning shares the same counter. Exactly one deletion worker writes to it
/// at a time; the UI reads it on its own render tick. Values are absolute
/// (the writer stores its running total rather than incrementing), so a
/// reader may see a slightly stale number but never a torn one.
#[derive(Debug, Clone, Default)]
pub struct ProgressCounter {
    removed: Arc<AtomicU64>,
}

impl ProgressCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the counter before starting a new run
    pub fn reset(&self) {
        self.removed.store(0, Ordering::Relaxed);
    }

    /// Publish the writer's current absolute tally
    pub fn publish(&self, value: u64) {
        self.removed.store(value, Ordering::Relaxed);
    }

    /// Current value, for display only
    pub fn get(&self) -> u64 {
        self.removed.load(Ordering::Relaxed)
    }
}
