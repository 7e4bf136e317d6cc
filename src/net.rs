use core::time::Duration;
use embedded_svc::{ipv4, wifi};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_svc::wifi::EspWifi;
use esp_idf_sys::EspError;
use pulse_telemetry::link::await_link;

/// Associates with the access point and waits for an IP address.
///
/// Returns `Ok(false)` when the link did not come up within `timeout`.
pub fn connect(
    wifi: &mut EspWifi<'_>,
    ssid: &str,
    password: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<bool, EspError> {
    let auth_method = if password.is_empty() { wifi::AuthMethod::None } else { wifi::AuthMethod::WPA2Personal };
    wifi.set_configuration(&wifi::Configuration::Client(wifi::ClientConfiguration {
        ssid: ssid.into(),
        password: password.into(),
        auth_method,
        ..Default::default()
    }))?;

    wifi.start()?;
    log::info!("Wi-Fi started, connecting to {ssid}");
    wifi.connect()?;

    let up = await_link(
        timeout,
        poll_interval,
        || Ok::<_, EspError>(wifi.is_connected()? && wifi.sta_netif().is_up()?),
        |interval| FreeRtos::delay_ms(interval.as_millis() as u32),
    )?;
    if !up {
        log::error!("Wi-Fi connection timed out after {timeout:?}");
        return Ok(false);
    }

    let ipv4::IpInfo { ip, subnet, dns, secondary_dns } = wifi.sta_netif().get_ip_info()?;
    match (dns, secondary_dns) {
        (Some(a), Some(b)) => log::info!("{ip} connected to {subnet} with DNS providers {a} and {b}"),
        (Some(dns), None) | (None, Some(dns)) => log::info!("{ip} connected to {subnet} with DNS provider {dns}"),
        _ => log::info!("{ip} connected to {subnet} without DNS providers"),
    }
    Ok(true)
}
