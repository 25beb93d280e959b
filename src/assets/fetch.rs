use std::{
    io::Read,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::{Duration, Instant},
};

use url::Url;

use crate::config::FetchConfig;

/// Failure retrieving source image bytes. The pipeline treats every variant as "no photo".
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Deadline passed before the body was fully read.
    #[error("deadline exceeded")]
    Timeout,

    /// Caller cancelled the render.
    #[error("cancelled")]
    Cancelled,

    /// Server answered with a non-success status.
    #[error("unexpected http status {0}")]
    Status(u16),

    /// Body exceeded the configured size cap.
    #[error("body larger than {limit} bytes")]
    TooLarge { limit: u64 },

    /// No fetcher handles this URL scheme.
    #[error("unsupported url scheme '{0}'")]
    UnsupportedScheme(String),

    /// Connection, DNS or protocol failure.
    #[error("transport: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared cancellation flag. Cloning shares the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Time bound for a fetch: an absolute instant plus an optional cancellation token.
#[derive(Clone, Debug)]
pub struct Deadline {
    at: Instant,
    cancel: Option<CancelToken>,
}

impl Deadline {
    pub fn at(at: Instant) -> Self {
        Self { at, cancel: None }
    }

    pub fn after(budget: Duration) -> Self {
        Self::at(Instant::now() + budget)
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// `Err` if the fetch must stop now.
    pub fn check(&self) -> Result<(), FetchError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(FetchError::Cancelled);
        }
        if self.remaining().is_zero() {
            return Err(FetchError::Timeout);
        }
        Ok(())
    }
}

/// Retrieves raw bytes for a source image URI.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, uri: &Url, deadline: &Deadline) -> Result<Vec<u8>, FetchError>;
}

/// `http`/`https` fetcher backed by a blocking reqwest client.
///
/// The request runs on a worker thread so that cancellation is observed while connecting and
/// waiting for headers, not only between body chunks.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self {
            client,
            max_bytes: cfg.max_bytes,
        })
    }

    fn fetch_blocking(&self, uri: Url, deadline: &Deadline) -> Result<Vec<u8>, FetchError> {
        let resp = self
            .client
            .get(uri)
            .timeout(deadline.remaining())
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Transport(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        if resp.content_length().is_some_and(|n| n > self.max_bytes) {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        read_capped(resp, self.max_bytes, deadline)
    }
}

impl AssetFetcher for HttpFetcher {
    #[tracing::instrument(skip(self, deadline), fields(uri = %uri))]
    fn fetch(&self, uri: &Url, deadline: &Deadline) -> Result<Vec<u8>, FetchError> {
        let this = self.clone();
        let uri = uri.clone();
        run_until(deadline, move |d| this.fetch_blocking(uri, &d))
    }
}

/// `file://` fetcher. Reads happen on a worker thread, so a path that never yields data
/// (a FIFO, a stalled mount) still returns at the deadline.
#[derive(Clone, Debug)]
pub struct FileFetcher {
    max_bytes: u64,
}

impl FileFetcher {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

impl AssetFetcher for FileFetcher {
    fn fetch(&self, uri: &Url, deadline: &Deadline) -> Result<Vec<u8>, FetchError> {
        let path = uri
            .to_file_path()
            .map_err(|()| FetchError::UnsupportedScheme(uri.scheme().to_string()))?;
        let max_bytes = self.max_bytes;
        run_until(deadline, move |d| {
            let file = std::fs::File::open(&path)?;
            read_capped(file, max_bytes, &d)
        })
    }
}

/// Default fetcher: dispatches on the URL scheme. `file://` is served only when
/// [`FetchConfig::allow_file_urls`] is set.
#[derive(Clone, Debug)]
pub struct SchemeFetcher {
    http: HttpFetcher,
    file: Option<FileFetcher>,
}

impl SchemeFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            http: HttpFetcher::new(cfg)?,
            file: cfg
                .allow_file_urls
                .then(|| FileFetcher::new(cfg.max_bytes)),
        })
    }
}

impl AssetFetcher for SchemeFetcher {
    fn fetch(&self, uri: &Url, deadline: &Deadline) -> Result<Vec<u8>, FetchError> {
        match (uri.scheme(), &self.file) {
            ("http" | "https", _) => self.http.fetch(uri, deadline),
            ("file", Some(file)) => file.fetch(uri, deadline),
            (other, _) => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `work` on a worker thread and wait for it while polling `deadline`.
///
/// Returns `Cancelled`/`Timeout` as soon as the deadline says so; the worker gets the same
/// deadline and winds down on its own.
fn run_until<T, F>(deadline: &Deadline, work: F) -> Result<T, FetchError>
where
    T: Send + 'static,
    F: FnOnce(Deadline) -> Result<T, FetchError> + Send + 'static,
{
    deadline.check()?;

    let (tx, rx) = mpsc::sync_channel(1);
    let worker_deadline = deadline.clone();
    std::thread::Builder::new()
        .name("ogcard-fetch".to_string())
        .spawn(move || {
            let _ = tx.send(work(worker_deadline));
        })?;

    loop {
        deadline.check()?;
        let wait = deadline.remaining().min(POLL_INTERVAL);
        match rx.recv_timeout(wait) {
            Ok(res) => return res,
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(FetchError::Io(std::io::Error::other(
                    "fetch worker exited without a result",
                )));
            }
        }
    }
}

fn read_capped(
    mut src: impl Read,
    max_bytes: u64,
    deadline: &Deadline,
) -> Result<Vec<u8>, FetchError> {
    const CHUNK: usize = 16 * 1024;

    let mut out = Vec::new();
    let mut buf = [0u8; CHUNK];
    loop {
        deadline.check()?;
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => return Err(FetchError::Timeout),
            Err(e) => return Err(FetchError::Io(e)),
        };
        if (out.len() + n) as u64 > max_bytes {
            return Err(FetchError::TooLarge { limit: max_bytes });
        }
        out.extend_from_slice(&buf[..n]);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
