use crate::{
    cadence::Cadence,
    clock::TimeSource,
    config::Reporting,
    counter::{EdgeCounter, PulseCount},
    payload::Telemetry,
    upload::{is_secure, Response, UploadError, Uploader},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The collector answered, whatever the status code.
    Delivered { status: u16 },
    /// The link was down so nothing was sent.
    Skipped,
    /// The request could not be completed.
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Upload {
    pub telemetry: Telemetry,
    pub outcome: UploadOutcome,
}

/// What a single [`Reporter::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    pub logged: Option<PulseCount>,
    pub uploaded: Option<Upload>,
}

/// Periodically logs and uploads the pulse count.
///
/// Both cadences are checked on every tick and fire independently of each
/// other. An upload blocks the caller for as long as the transport takes.
pub struct Reporter<'c, T, U> {
    counter: &'c EdgeCounter,
    time: T,
    uploader: U,
    url: &'static str,
    log: Cadence,
    upload: Cadence,
    last_logged: PulseCount,
}

impl<'c, T: TimeSource, U: Uploader> Reporter<'c, T, U> {
    pub fn new(counter: &'c EdgeCounter, time: T, uploader: U, config: &Reporting) -> Self {
        Self {
            counter,
            time,
            uploader,
            url: config.url,
            log: Cadence::new(config.log_every),
            upload: Cadence::new(config.upload_every),
            last_logged: 0,
        }
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Runs whichever actions are due at `now` (milliseconds of uptime).
    pub fn tick(&mut self, now: u64) -> Tick {
        let logged = self.log.fire(now).then(|| self.log_count());
        let uploaded = self.upload.fire(now).then(|| self.upload_count());
        Tick { logged, uploaded }
    }

    fn log_count(&mut self) -> PulseCount {
        let count = self.counter.read();
        let delta = count.wrapping_sub(self.last_logged);
        log::info!("pulse count: {count} (+{delta} since last report)");
        self.last_logged = count;
        count
    }

    fn upload_count(&mut self) -> Upload {
        let count = self.counter.read();
        let timestamp = self.time.now();
        if timestamp.is_none() {
            log::warn!("failed to obtain time, uploading with a zero timestamp");
        }

        let telemetry = Telemetry::new(timestamp, count);
        let body = match telemetry.to_json() {
            Ok(body) => body,
            Err(err) => {
                log::error!("failed to encode telemetry: {err}");
                return Upload { telemetry, outcome: UploadOutcome::Failed };
            }
        };

        let outcome = match self.uploader.post(self.url, &body) {
            Ok(res) => {
                log_response(&res);
                UploadOutcome::Delivered { status: res.status }
            }
            Err(UploadError::Disconnected) => {
                log::warn!("Wi-Fi disconnected, skipping upload of {count} pulses");
                UploadOutcome::Skipped
            }
            Err(UploadError::Transport(err)) => {
                log::error!("upload to {} failed: {err}", self.url);
                if is_secure(self.url) {
                    log::error!("TLS session with {} failed: {err:?}", self.url);
                }
                UploadOutcome::Failed
            }
        };
        Upload { telemetry, outcome }
    }
}

fn log_response(res: &Response) {
    log::info!("HTTP response code: {}", res.status);
    for (name, value) in &res.headers {
        log::info!("{name} : {value}");
    }
    log::info!("response: {}", res.body);
    if res.truncated {
        log::warn!("response body truncated to {} bytes", res.body.len());
    }
}
