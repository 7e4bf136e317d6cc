use core::sync::atomic::{AtomicU32, Ordering};

/// Number of qualifying edges seen since boot. Wraps at the word width.
pub type PulseCount = u32;

/// Edge counter shared between the GPIO interrupt and the reporting loop.
///
/// The interrupt is the only writer. Everything else takes snapshots.
#[derive(Debug, Default)]
pub struct EdgeCounter {
    ticks: AtomicU32,
}

impl EdgeCounter {
    pub const fn new() -> Self {
        Self { ticks: AtomicU32::new(0) }
    }

    /// Runs in interrupt context: no logging, no allocation, no blocking.
    pub fn on_edge(&self) {
        // NOTE: `fetch_add` wraps on overflow, which is what we want here.
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// Snapshot of the current count. Does not reset it.
    pub fn read(&self) -> PulseCount {
        self.ticks.load(Ordering::Acquire)
    }
}
