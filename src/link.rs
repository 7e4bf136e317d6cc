use core::time::Duration;
use std::time::Instant;

/// Polls `is_up` until it reports an established link or `timeout` runs out.
///
/// Returns `Ok(false)` on timeout. `pause` is invoked with `poll_interval`
/// between attempts so the caller decides how to sleep.
pub fn await_link<E>(
    timeout: Duration,
    poll_interval: Duration,
    mut is_up: impl FnMut() -> Result<bool, E>,
    mut pause: impl FnMut(Duration),
) -> Result<bool, E> {
    let start = Instant::now();
    loop {
        if is_up()? {
            return Ok(true);
        }
        if start.elapsed() >= timeout {
            return Ok(false);
        }
        pause(poll_interval);
    }
}
