//! Capability probing via a metadata-only HEAD request.

use tracing::debug;

use crate::client::HttpClient;
use crate::error::DownloadResult;

/// What the probe learned about the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Whether the server honors byte-range requests.
    pub accepts_ranges: bool,
    /// Resource size from `Content-Length`, when the server reported one.
    pub content_length: Option<u64>,
}

/// Probe `url` for range support and total size.
///
/// Range support is recognized iff the `Accept-Ranges` header value is
/// exactly the token `bytes`. A missing header, or any other value
/// (including `none`), means ranged fetching must not be attempted.
///
/// # Errors
///
/// Any transport failure of the HEAD request is fatal to the whole
/// download; there is no fallback probe strategy.
pub fn probe<C: HttpClient + ?Sized>(client: &C, url: &str) -> DownloadResult<ResourceInfo> {
    let head = client.head(url)?;

    let accepts_ranges = head.accept_ranges.as_deref() == Some("bytes");
    debug!(
        url,
        accepts_ranges,
        content_length = ?head.content_length,
        "probed resource"
    );

    Ok(ResourceInfo {
        accepts_ranges,
        content_length: head.content_length,
    })
}
