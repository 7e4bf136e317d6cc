use esp_idf_svc::sntp::{EspSntp, SntpConf};
use esp_idf_sys::EspError;
use pulse_telemetry::clock::{TimeSource, WallClock};

/// Wall-clock time kept in sync by the ESP-IDF SNTP service.
pub struct NetworkTime {
    _sntp: EspSntp,
}

impl NetworkTime {
    pub fn start(server: &'static str) -> Result<Self, EspError> {
        let mut conf = SntpConf::default();
        conf.servers[0] = server;
        let sntp = EspSntp::new(&conf)?;
        log::info!("SNTP started against {server}");
        Ok(Self { _sntp: sntp })
    }
}

impl TimeSource for NetworkTime {
    fn now(&self) -> Option<u64> {
        WallClock.now()
    }
}
