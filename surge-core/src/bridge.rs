use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

pub type FetchResult = std::result::Result<FetchResponse, FetchError>;

/// Timing capability bridged into the script environment as `sleep(ms)`.
///
/// Pluggable so tests can substitute a no-op sleeper.
pub trait Sleep: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<()>;
}

/// HTTP GET capability bridged into the script environment as `get(url)`.
///
/// Transport failures are returned as errors, not swallowed; the iteration
/// runner converts them into `Error` results at its fault boundary.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> BoxFuture<FetchResult>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn body_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("only http:// URLs are supported: {0}")]
    OnlyHttpSupported(String),

    #[error("http request build failed: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("http request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    BodyRead(#[from] hyper::Error),

    /// Generic transport failure, used by fetch implementations that are not
    /// backed by the built-in hyper client (test stubs included).
    #[error("transport error: {0}")]
    Transport(String),
}

/// `sleep` backed by the tokio timer; suspends only the calling VU.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    fn sleep(&self, duration: Duration) -> BoxFuture<()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// The host capabilities seeded into every baseline environment.
///
/// `log` is deliberately absent: it closes over a per-iteration channel and
/// is rebound by the iteration runner before every run.
#[derive(Clone)]
pub struct HostBridge {
    pub sleep: Arc<dyn Sleep>,
    pub fetch: Arc<dyn Fetch>,
}

impl HostBridge {
    pub fn new(sleep: Arc<dyn Sleep>, fetch: Arc<dyn Fetch>) -> Self {
        Self { sleep, fetch }
    }
}

impl Default for HostBridge {
    fn default() -> Self {
        Self {
            sleep: Arc::new(TokioSleep),
            fetch: Arc::new(crate::HttpClient::default()),
        }
    }
}

impl std::fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBridge").finish_non_exhaustive()
    }
}
