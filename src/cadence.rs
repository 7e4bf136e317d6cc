use core::time::Duration;

/// A periodic action driven by an externally supplied millisecond tick.
///
/// The cadence is due once at least `period` has elapsed since it last fired
/// (or since tick zero). Elapsed time is computed with wrapping arithmetic so
/// that a wrapping tick source keeps working.
#[derive(Clone, Debug)]
pub struct Cadence {
    period: u64,
    last: u64,
}

impl Cadence {
    pub const fn new(period: Duration) -> Self {
        Self { period: period.as_millis() as u64, last: 0 }
    }

    pub fn is_due(&self, now: u64) -> bool {
        now.wrapping_sub(self.last) >= self.period
    }

    /// Fires the cadence if it is due, restarting the interval at `now`.
    pub fn fire(&mut self, now: u64) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last = now;
        true
    }
}
