//! Build-time configuration. There is no runtime reconfiguration.
//!
//! Credentials and the collector URL may be overridden through the
//! `WIFI_SSID`, `WIFI_PASSWORD` and `UPLOAD_URL` environment variables at
//! build time.

use core::time::Duration;

use crate::clock::UtcOffsets;

macro_rules! env_or {
    ($name:literal, $default:literal) => {
        match option_env!($name) {
            Some(value) => value,
            None => $default,
        }
    };
}

pub const WIFI_SSID: &str = env_or!("WIFI_SSID", "bae area control");
pub const WIFI_PASSWORD: &str = env_or!("WIFI_PASSWORD", "");
pub const WIFI_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
pub const WIFI_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub const NTP_SERVER: &str = "pool.ntp.org";
pub const UTC_OFFSETS: UtcOffsets = UtcOffsets { gmt_secs: -8 * 60 * 60, dst_secs: 0 };

pub const UPLOAD_URL: &str = env_or!("UPLOAD_URL", "http://192.168.1.123:8080");

/// Disables server certificate validation for `https:` collectors.
pub const INSECURE_TRANSPORT: bool = true;

/// GPIO the pulse source is wired to. `main` takes the matching peripheral
/// and refuses to build if the two disagree.
pub const PULSE_PIN: u8 = 22;
pub const PULSE_EDGE: Edge = Edge::Rising;

pub const LOG_EVERY: Duration = Duration::from_secs(5);
pub const UPLOAD_EVERY: Duration = Duration::from_secs(10);
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long startup waits for the first SNTP sync before logging the time.
pub const TIME_SYNC_TIMEOUT: Duration = Duration::from_secs(5);
pub const TIME_SYNC_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lets a serial monitor attach before the first log lines.
pub const STARTUP_DELAY: Duration = Duration::from_millis(2_500);

/// Which transitions of the pulse input count as a pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
    Any,
}

#[derive(Clone, Copy, Debug)]
pub struct Reporting {
    pub url: &'static str,
    pub log_every: Duration,
    pub upload_every: Duration,
}

pub const REPORTING: Reporting = Reporting { url: UPLOAD_URL, log_every: LOG_EVERY, upload_every: UPLOAD_EVERY };

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::TlsPolicy;

    #[test]
    fn insecure_transport_is_enabled() {
        // Certificate validation is deliberately off for HTTPS collectors.
        assert!(INSECURE_TRANSPORT);
        assert_eq!(TlsPolicy::for_url("https://collector.example", INSECURE_TRANSPORT), TlsPolicy::Unverified);
    }

    #[test]
    fn upload_cadence_is_slower_than_log_cadence() {
        assert_eq!(REPORTING.log_every, Duration::from_secs(5));
        assert_eq!(REPORTING.upload_every, Duration::from_secs(10));
        assert!(POLL_INTERVAL < LOG_EVERY);
    }

    #[test]
    fn counts_rising_edges_on_gpio22() {
        assert_eq!(PULSE_EDGE, Edge::Rising);
        assert_eq!(PULSE_PIN, 22);
    }

    #[test]
    fn startup_time_wait_is_bounded() {
        assert_eq!(TIME_SYNC_TIMEOUT, Duration::from_secs(5));
        assert!(TIME_SYNC_POLL_INTERVAL < TIME_SYNC_TIMEOUT);
    }
}
