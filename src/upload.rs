use core::fmt;

/// What came back from the collector. Only ever logged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// The body filled the read buffer, so the collector may have sent more.
    pub truncated: bool,
}

impl Response {
    /// Builds a response from the first `filled` bytes of a read buffer.
    pub fn new(status: u16, headers: Vec<(String, String)>, buf: &[u8], filled: usize) -> Self {
        let body = String::from_utf8_lossy(&buf[..filled]).into_owned();
        Self { status, headers, body, truncated: filled == buf.len() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError<E: fmt::Debug + fmt::Display> {
    /// The network link is down; nothing was sent.
    #[error("network link is down")]
    Disconnected,
    #[error("transport failure: {0}")]
    Transport(E),
}

/// Sends one JSON body to the collector.
pub trait Uploader {
    type Error: fmt::Debug + fmt::Display;

    /// Performs a single `POST` with `Content-Type: application/json`.
    ///
    /// Implementations must return [`UploadError::Disconnected`] without
    /// touching the network when the link is down.
    fn post(&mut self, url: &str, body: &[u8]) -> Result<Response, UploadError<Self::Error>>;
}

pub fn is_secure(url: &str) -> bool {
    url.starts_with("https:")
}

/// How the transport treats server certificates for a given URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Plain HTTP, no TLS at all.
    Plain,
    /// TLS with certificates checked against the bundled CA store.
    Verified,
    /// TLS without certificate validation.
    Unverified,
}

impl TlsPolicy {
    pub fn for_url(url: &str, insecure_transport: bool) -> Self {
        match (is_secure(url), insecure_transport) {
            (false, _) => Self::Plain,
            (true, false) => Self::Verified,
            (true, true) => Self::Unverified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_secure, Response, TlsPolicy, UploadError};

    #[test]
    fn partially_filled_buffer_is_complete() {
        let mut buf = [0; 16];
        buf[..15].copy_from_slice(b"POST received\r\n");
        let res = Response::new(200, Vec::new(), &buf, 15);
        assert_eq!(res.body, "POST received\r\n");
        assert!(!res.truncated);
    }

    #[test]
    fn full_buffer_is_flagged_as_truncated() {
        let buf = [b'x'; 8];
        let res = Response::new(200, Vec::new(), &buf, buf.len());
        assert_eq!(res.body, "xxxxxxxx");
        assert!(res.truncated);
    }

    #[test]
    fn plain_http_ignores_the_insecure_flag() {
        assert_eq!(TlsPolicy::for_url("http://192.168.1.123:8080", true), TlsPolicy::Plain);
        assert_eq!(TlsPolicy::for_url("http://192.168.1.123:8080", false), TlsPolicy::Plain);
    }

    #[test]
    fn https_with_insecure_flag_skips_verification() {
        assert_eq!(TlsPolicy::for_url("https://collector.example", true), TlsPolicy::Unverified);
        assert_eq!(TlsPolicy::for_url("https://collector.example", false), TlsPolicy::Verified);
    }

    #[test]
    fn scheme_detection_is_prefix_based() {
        assert!(is_secure("https://example.com"));
        assert!(!is_secure("http://example.com/https:"));
    }

    #[test]
    fn errors_render_for_logs() {
        let down: UploadError<&str> = UploadError::Disconnected;
        assert_eq!(down.to_string(), "network link is down");
        let refused: UploadError<&str> = UploadError::Transport("connection refused");
        assert_eq!(refused.to_string(), "transport failure: connection refused");
    }
}
