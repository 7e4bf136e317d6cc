#[cfg(target_os = "espidf")]
mod http;
#[cfg(target_os = "espidf")]
mod net;
#[cfg(target_os = "espidf")]
mod sntp;

#[cfg(target_os = "espidf")]
fn main() -> Result<(), esp_idf_sys::EspError> {
    use esp_idf_hal::{
        delay::FreeRtos,
        gpio::{InterruptType, PinDriver, Pins, Pull},
        peripherals::Peripherals,
        reset::restart,
    };
    use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition, wifi::EspWifi};
    use esp_idf_sys::EspError;
    use pulse_telemetry::{
        clock::{await_time, local_time, Uptime},
        config::{self, Edge},
        upload::TlsPolicy,
        EdgeCounter, Reporter,
    };
    use std::sync::Arc;

    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_sys::link_patches();

    esp_idf_svc::log::EspLogger::initialize_default();

    const _: () = assert!(config::PULSE_PIN == 22, "PULSE_PIN must match the GPIO taken below");
    let Peripherals { modem, pins: Pins { gpio22: pulse_pin, .. }, .. } =
        Peripherals::take().ok_or_else(EspError::from_infallible::<-1>)?;

    // Set up the pulse input and its interrupt
    let counter = Arc::new(EdgeCounter::new());
    let mut pulse = PinDriver::input(pulse_pin)?;
    pulse.set_pull(Pull::Up)?;
    pulse.set_interrupt_type(match config::PULSE_EDGE {
        Edge::Rising => InterruptType::PosEdge,
        Edge::Falling => InterruptType::NegEdge,
        Edge::Any => InterruptType::AnyEdge,
    })?;
    let isr_counter = counter.clone();
    // SAFETY: the callback only performs an atomic increment, which is ISR-safe.
    unsafe { pulse.subscribe(move || isr_counter.on_edge())? };
    pulse.enable_interrupt()?;
    log::info!("counting {:?} edges on GPIO{}", config::PULSE_EDGE, config::PULSE_PIN);

    FreeRtos::delay_ms(config::STARTUP_DELAY.as_millis() as u32);

    // Bring up Wi-Fi; without it there is nothing useful to do
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = EspWifi::new(modem, sysloop, Some(nvs))?;
    match net::connect(
        &mut wifi,
        config::WIFI_SSID,
        config::WIFI_PASSWORD,
        config::WIFI_CONNECT_TIMEOUT,
        config::WIFI_POLL_INTERVAL,
    ) {
        Ok(true) => log::info!("Wi-Fi connected"),
        Ok(false) => {
            log::error!("could not join {}, restarting", config::WIFI_SSID);
            restart();
        }
        Err(err) => {
            log::error!("Wi-Fi bring-up failed ({err}), restarting");
            restart();
        }
    }

    let time = sntp::NetworkTime::start(config::NTP_SERVER)?;
    let synced = await_time(&time, config::TIME_SYNC_TIMEOUT, config::TIME_SYNC_POLL_INTERVAL, |interval| {
        FreeRtos::delay_ms(interval.as_millis() as u32)
    });
    match synced.and_then(|epoch| local_time(epoch, config::UTC_OFFSETS)) {
        Some(now) => log::info!("current time: {now}"),
        None => log::warn!("failed to obtain time"),
    }

    let tls = TlsPolicy::for_url(config::UPLOAD_URL, config::INSECURE_TRANSPORT);
    if tls == TlsPolicy::Unverified {
        log::warn!("certificate validation is disabled for {}", config::UPLOAD_URL);
    }
    let uploader = http::HttpUploader::new(&wifi, tls);

    let uptime = Uptime::new();
    let mut reporter = Reporter::new(&counter, time, uploader, &config::REPORTING);
    loop {
        reporter.tick(uptime.millis());
        FreeRtos::delay_ms(config::POLL_INTERVAL.as_millis() as u32);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("this firmware only runs on ESP-IDF targets; use `cargo test` for the host-side logic");
}
