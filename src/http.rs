use embedded_svc::{
    http::{client::Client, Headers as _, Status as _},
    io::Write as _,
    utils::io::try_read_full,
};
use esp_idf_svc::{
    errors::EspIOError,
    http::client::{Configuration, EspHttpConnection, FollowRedirectsPolicy},
    wifi::EspWifi,
};
use pulse_telemetry::upload::{Response, TlsPolicy, UploadError, Uploader};

/// Response headers worth echoing to the log.
const LOGGED_HEADERS: [&str; 5] = ["Content-Type", "Content-Length", "Date", "Server", "Location"];

/// Opens a fresh connection for every upload, so a request that failed
/// halfway never leaves the next one with a half-used client.
pub struct HttpUploader<'w> {
    wifi: &'w EspWifi<'static>,
    config: Configuration,
}

impl<'w> HttpUploader<'w> {
    pub fn new(wifi: &'w EspWifi<'static>, tls: TlsPolicy) -> Self {
        let config = Configuration {
            follow_redirects_policy: FollowRedirectsPolicy::FollowGetHead,
            crt_bundle_attach: match tls {
                TlsPolicy::Verified => Some(esp_idf_sys::esp_crt_bundle_attach),
                TlsPolicy::Plain | TlsPolicy::Unverified => None,
            },
            ..Default::default()
        };
        Self { wifi, config }
    }

    fn send(&self, url: &str, data: &[u8]) -> Result<Response, EspIOError> {
        let conn = EspHttpConnection::new(&self.config).map_err(EspIOError)?;
        let mut http = Client::wrap(conn);

        let len = data.len().to_string();
        let headers = [("Content-Type", "application/json"), ("Content-Length", len.as_str())];
        let mut req = http.post(url, &headers)?;
        req.write_all(data)?;
        req.flush()?;

        let mut res = req.submit()?;
        let status = res.status();
        let headers = LOGGED_HEADERS
            .iter()
            .filter_map(|&name| res.header(name).map(|value| (name.to_owned(), value.to_owned())))
            .collect();

        let mut buf = [0; 1024];
        let count = try_read_full(&mut res, &mut buf).map_err(|(err, _)| err)?;
        Ok(Response::new(status, headers, &buf, count))
    }
}

impl Uploader for HttpUploader<'_> {
    type Error = EspIOError;

    fn post(&mut self, url: &str, body: &[u8]) -> Result<Response, UploadError<Self::Error>> {
        if !self.wifi.is_connected().unwrap_or(false) {
            return Err(UploadError::Disconnected);
        }
        self.send(url, body).map_err(UploadError::Transport)
    }
}
