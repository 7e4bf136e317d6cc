//! Wall-clock and monotonic time.

use core::{convert::Infallible, time::Duration};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::link::await_link;

/// 2017-01-01T00:00:00Z. Anything earlier means SNTP has not synced yet.
pub const MIN_VALID_EPOCH: u64 = 1_483_228_800;

/// Source of wall-clock time for timestamping uploads.
pub trait TimeSource {
    /// Current epoch seconds, or `None` while network time is unavailable.
    fn now(&self) -> Option<u64>;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Option<u64> {
        (**self).now()
    }
}

/// Reads the system clock, which SNTP adjusts in the background.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now(&self) -> Option<u64> {
        epoch_seconds(SystemTime::now())
    }
}

pub fn epoch_seconds(at: SystemTime) -> Option<u64> {
    let secs = at.duration_since(UNIX_EPOCH).ok()?.as_secs();
    (secs >= MIN_VALID_EPOCH).then_some(secs)
}

/// Waits up to `timeout` for `source` to report a synchronised clock.
pub fn await_time<T: TimeSource>(
    source: &T,
    timeout: Duration,
    poll_interval: Duration,
    pause: impl FnMut(Duration),
) -> Option<u64> {
    let mut epoch = None;
    let synced = await_link(
        timeout,
        poll_interval,
        || {
            epoch = source.now();
            Ok::<_, Infallible>(epoch.is_some())
        },
        pause,
    );
    match synced {
        Ok(true) => epoch,
        Ok(false) => None,
        Err(never) => match never {},
    }
}

/// Offsets applied when rendering local time for humans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UtcOffsets {
    pub gmt_secs: i64,
    pub dst_secs: i64,
}

impl UtcOffsets {
    pub const fn total(&self) -> i64 {
        self.gmt_secs + self.dst_secs
    }
}

/// Renders `epoch` shifted into local time, e.g. `2023-11-14T14:13:20 UTC-08:00`.
pub fn local_time(epoch: u64, offsets: UtcOffsets) -> Option<String> {
    let offset = offsets.total();
    let local = epoch.checked_add_signed(offset)?;
    let stamp = humantime::format_rfc3339_seconds(UNIX_EPOCH + Duration::from_secs(local)).to_string();
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.unsigned_abs() / 60;
    Some(format!("{} UTC{sign}{:02}:{:02}", stamp.trim_end_matches('Z'), minutes / 60, minutes % 60))
}

/// Monotonic milliseconds since boot.
pub struct Uptime {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn millis(&self) -> u64 {
        // SAFETY: the high-resolution timer is started by ESP-IDF before `main`.
        let micros = unsafe { esp_idf_sys::esp_timer_get_time() };
        micros as u64 / 1_000
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{await_time, epoch_seconds, local_time, TimeSource, UtcOffsets, MIN_VALID_EPOCH};
    use core::{cell::Cell, time::Duration};

    /// Reports no time until it has been asked `syncs_after` times.
    struct SyncingClock {
        polls: Cell<u32>,
        syncs_after: u32,
    }

    impl TimeSource for SyncingClock {
        fn now(&self) -> Option<u64> {
            let polls = self.polls.get() + 1;
            self.polls.set(polls);
            (polls > self.syncs_after).then_some(1_700_000_000)
        }
    }

    #[test]
    fn startup_waits_for_first_sync() {
        let clock = SyncingClock { polls: Cell::new(0), syncs_after: 3 };
        let mut pauses = 0;
        let epoch = await_time(&clock, Duration::from_secs(5), Duration::from_millis(100), |_| pauses += 1);
        assert_eq!(epoch, Some(1_700_000_000));
        assert_eq!(clock.polls.get(), 4);
        assert_eq!(pauses, 3);
    }

    #[test]
    fn startup_gives_up_when_sync_never_arrives() {
        let clock = SyncingClock { polls: Cell::new(0), syncs_after: u32::MAX };
        let epoch = await_time(&clock, Duration::from_millis(20), Duration::from_millis(5), std::thread::sleep);
        assert_eq!(epoch, None);
        assert!(clock.polls.get() > 1);
    }
    use std::time::UNIX_EPOCH;

    #[test]
    fn unsynced_clock_is_unavailable() {
        // Fresh boot: the RTC starts counting from the epoch.
        assert_eq!(epoch_seconds(UNIX_EPOCH + Duration::from_secs(42)), None);
        assert_eq!(epoch_seconds(UNIX_EPOCH + Duration::from_secs(MIN_VALID_EPOCH - 1)), None);
        assert_eq!(epoch_seconds(UNIX_EPOCH - Duration::from_secs(1)), None);
    }

    #[test]
    fn synced_clock_yields_epoch_seconds() {
        let at = UNIX_EPOCH + Duration::from_millis(1_700_000_000_999);
        assert_eq!(epoch_seconds(at), Some(1_700_000_000));
    }

    #[test]
    fn local_time_applies_both_offsets() {
        let pst = UtcOffsets { gmt_secs: -8 * 60 * 60, dst_secs: 0 };
        assert_eq!(local_time(1_700_000_000, pst).unwrap(), "2023-11-14T14:13:20 UTC-08:00");

        let summer = UtcOffsets { gmt_secs: 5 * 60 * 60 + 30 * 60, dst_secs: 60 * 60 };
        assert_eq!(local_time(1_700_000_000, summer).unwrap(), "2023-11-15T04:43:20 UTC+06:30");
    }

    #[test]
    fn local_time_before_epoch_is_rejected() {
        let offsets = UtcOffsets { gmt_secs: -3_600, dst_secs: 0 };
        assert_eq!(local_time(10, offsets), None);
    }
}
