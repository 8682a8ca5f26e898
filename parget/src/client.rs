//! HTTP client abstraction for testability.
//!
//! The engine talks to the network through the [`HttpClient`] trait so that
//! the probe, fetcher and orchestrator can all be exercised against mock
//! clients in tests. [`ReqwestClient`] is the production implementation.

use std::io::Read;
use std::time::Duration;

use crate::error::{DownloadError, DownloadResult};
use crate::partition::Interval;

/// Default timeout for the HEAD probe (30 seconds).
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for a single transfer request (10 minutes).
///
/// Ranged transfers move large bodies, so this bounds one worker's request
/// rather than the whole download.
pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(600);

/// Idle connection cap per host for the transfer client.
const POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Idle connection timeout for the transfer client (90 seconds).
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Raw result of a HEAD request, before interpretation by the probe.
#[derive(Debug, Clone, Default)]
pub struct HeadResponse {
    /// Verbatim value of the `Accept-Ranges` header, if present.
    pub accept_ranges: Option<String>,
    /// Parsed `Content-Length`, if present and numeric.
    pub content_length: Option<u64>,
}

/// Descriptive request headers sent with every request.
///
/// Some origin servers reject clients that do not look like a browser, so
/// the defaults mimic a desktop Chrome profile. These values are
/// configuration, not protocol logic.
#[derive(Debug, Clone)]
pub struct RequestProfile {
    /// `User-Agent` header value.
    pub user_agent: String,
    /// `Accept` header value.
    pub accept: String,
    /// `Accept-Language` header value.
    pub accept_language: String,
    /// Optional `Referer` header value.
    pub referer: Option<String>,
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "video/mp4,video/*;q=0.9,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: None,
        }
    }
}

/// Trait for the HTTP operations the engine needs.
///
/// Implementations handle their own timeout configuration and error
/// mapping. The GET side checks the response status itself so callers only
/// see a body reader or an error.
pub trait HttpClient: Send + Sync {
    /// Perform a HEAD request and report the headers the probe cares about.
    ///
    /// # Errors
    ///
    /// Any transport failure (DNS, connect, TLS, timeout) maps to
    /// [`DownloadError::ProbeFailed`].
    fn head(&self, url: &str) -> DownloadResult<HeadResponse>;

    /// Perform a GET request, optionally bounded to a byte interval, and
    /// return the response body as a streaming reader.
    ///
    /// When `range` is given, a `Range: bytes=<start>-<end>` header is
    /// sent. Statuses 200 (OK) and 206 (Partial Content) are success; any
    /// other status is [`DownloadError::UnexpectedStatus`].
    fn get(&self, url: &str, range: Option<Interval>) -> DownloadResult<Box<dyn Read + Send>>;
}

/// Production HTTP client implementation using blocking reqwest.
///
/// Holds two inner clients: a short-timeout one for the metadata probe and
/// a long-timeout one for transfers, tuned for large bodies (idle
/// connection reuse, compression disabled since the payload is typically
/// already-compressed media).
pub struct ReqwestClient {
    probe_client: reqwest::blocking::Client,
    transfer_client: reqwest::blocking::Client,
    profile: RequestProfile,
}

impl ReqwestClient {
    /// Create a client with default timeouts and request profile.
    pub fn new() -> DownloadResult<Self> {
        Self::with_config(
            DEFAULT_PROBE_TIMEOUT,
            DEFAULT_TRANSFER_TIMEOUT,
            RequestProfile::default(),
        )
    }

    /// Create a client with custom timeouts and request profile.
    ///
    /// # Arguments
    ///
    /// * `probe_timeout` - Timeout for the HEAD probe
    /// * `transfer_timeout` - Timeout for each GET transfer
    /// * `profile` - Descriptive headers to send with every request
    pub fn with_config(
        probe_timeout: Duration,
        transfer_timeout: Duration,
        profile: RequestProfile,
    ) -> DownloadResult<Self> {
        let probe_client = reqwest::blocking::Client::builder()
            .timeout(probe_timeout)
            .no_gzip()
            .build()
            .map_err(|e| DownloadError::RequestFailed {
                url: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        let transfer_client = reqwest::blocking::Client::builder()
            .timeout(transfer_timeout)
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .no_gzip()
            .build()
            .map_err(|e| DownloadError::RequestFailed {
                url: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            probe_client,
            transfer_client,
            profile,
        })
    }

    fn apply_profile(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        let mut req = req
            .header("User-Agent", &self.profile.user_agent)
            .header("Accept", &self.profile.accept)
            .header("Accept-Language", &self.profile.accept_language);
        if let Some(ref referer) = self.profile.referer {
            req = req.header("Referer", referer);
        }
        req
    }
}

impl HttpClient for ReqwestClient {
    fn head(&self, url: &str) -> DownloadResult<HeadResponse> {
        let response = self
            .apply_profile(self.probe_client.head(url))
            .send()
            .map_err(|e| DownloadError::ProbeFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let accept_ranges = response
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let content_length = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        Ok(HeadResponse {
            accept_ranges,
            content_length,
        })
    }

    fn get(&self, url: &str, range: Option<Interval>) -> DownloadResult<Box<dyn Read + Send>> {
        let mut request = self.apply_profile(self.transfer_client.get(url));
        if let Some(interval) = range {
            request = request.header("Range", format!("bytes={}-{}", interval.start, interval.end));
        }

        let response = request.send().map_err(|e| DownloadError::RequestFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::PARTIAL_CONTENT {
            return Err(DownloadError::UnexpectedStatus {
                url: url.to_string(),
                status: status.to_string(),
            });
        }

        Ok(Box::new(response))
    }
}
