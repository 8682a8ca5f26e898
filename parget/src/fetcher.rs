//! Single range and whole-resource fetches.
//!
//! A fetch streams one HTTP response body into a [`SectionWriter`] view
//! scoped to the bytes the request asked for. Ranged fetches are intended
//! to run in parallel for disjoint intervals of the same target.

use std::io;
use std::path::Path;

use tracing::debug;

use crate::client::HttpClient;
use crate::error::{DownloadError, DownloadResult};
use crate::partition::Interval;
use crate::section::{SectionWriter, SinkError, WriteAt};

/// Fetch one byte interval of `url` and write it at its final offset.
///
/// Issues a GET with `Range: bytes=<start>-<end>` and streams the body
/// into a section view over `[interval.start, interval.end]`. Returns the
/// number of bytes written.
///
/// # Errors
///
/// Transport failures, unexpected statuses and copy failures (network
/// interruption, sink write error) all fail this interval only; siblings
/// fetching other intervals are unaffected.
pub fn fetch_range<C, W>(
    client: &C,
    url: &str,
    interval: Interval,
    target: &W,
    dest: &Path,
) -> DownloadResult<u64>
where
    C: HttpClient + ?Sized,
    W: WriteAt + ?Sized,
{
    let mut body = client.get(url, Some(interval))?;
    let mut section = SectionWriter::new(target, interval.start, interval.len());

    let written = io::copy(&mut body, &mut section).map_err(|e| copy_error(url, dest, e))?;
    if written != interval.len() {
        return Err(DownloadError::ShortBody {
            url: url.to_string(),
            expected: interval.len(),
            actual: written,
        });
    }
    debug!(url, %interval, written, "range fetch complete");

    Ok(written)
}

/// Fetch the entire resource with one unranged GET, writing from offset 0.
///
/// Used when the server does not support range requests. Returns the
/// number of bytes written.
pub fn fetch_whole<C, W>(
    client: &C,
    url: &str,
    total_size: u64,
    target: &W,
    dest: &Path,
) -> DownloadResult<u64>
where
    C: HttpClient + ?Sized,
    W: WriteAt + ?Sized,
{
    let mut body = client.get(url, None)?;
    let mut section = SectionWriter::new(target, 0, total_size);

    let written = io::copy(&mut body, &mut section).map_err(|e| copy_error(url, dest, e))?;
    if written != total_size {
        return Err(DownloadError::ShortBody {
            url: url.to_string(),
            expected: total_size,
            actual: written,
        });
    }
    debug!(url, written, "whole fetch complete");

    Ok(written)
}

/// Map an `io::copy` failure to the right error variant.
///
/// `io::copy` surfaces both read-side (network) and write-side (sink)
/// failures through one `io::Error`. The sink tags its own errors with
/// [`SinkError`], so write-side failures carry the destination path and
/// everything else is a request failure.
fn copy_error(url: &str, dest: &Path, e: io::Error) -> DownloadError {
    if e.get_ref().is_some_and(|inner| inner.is::<SinkError>()) {
        DownloadError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        }
    } else {
        DownloadError::RequestFailed {
            url: url.to_string(),
            reason: format!("transfer interrupted: {}", e),
        }
    }
}
