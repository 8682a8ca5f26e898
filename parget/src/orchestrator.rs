//! Download orchestration: probe, allocate, fetch, verify.
//!
//! The orchestrator drives one download end to end:
//!
//! ```text
//! Probing ──► Allocating ──► RangedFetch ──► Verifying ──► report
//!                      │          (8 workers, join barrier)
//!                      └────► WholeFetch ─┘
//!                             (no range support)
//! ```
//!
//! In ranged mode one worker thread is spawned per interval. The join
//! barrier always waits for every worker; there is no cross-worker
//! cancellation, a failing worker does not abort its siblings. Each
//! worker's outcome is collected in interval order and inspected after
//! the join, so a failed chunk fails the whole download loudly instead of
//! leaving a silent hole in the output file.

use std::fs::File;
use std::path::Path;
use std::thread;
use std::time::Instant;

use tracing::{info, warn};

use crate::client::{HttpClient, ReqwestClient};
use crate::error::{ChunkFailure, DownloadError, DownloadResult};
use crate::fetcher::{fetch_range, fetch_whole};
use crate::partition::{partition, Interval};
use crate::probe::probe;
use crate::report::{DownloadReport, TransferMode};

/// Default number of parallel connections in ranged mode.
pub const DEFAULT_CONNECTIONS: usize = 8;

/// Tunable options for a [`Downloader`].
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Number of parallel connections when the server supports ranges.
    /// Clamped to a minimum of 1.
    pub connections: usize,
    /// Fallback resource size, used only when the probe response carries
    /// no `Content-Length`.
    pub expected_size: Option<u64>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            connections: DEFAULT_CONNECTIONS,
            expected_size: None,
        }
    }
}

/// Drives a complete download against an [`HttpClient`].
pub struct Downloader<C: HttpClient> {
    client: C,
    options: DownloadOptions,
}

impl Downloader<ReqwestClient> {
    /// Create a downloader with the production HTTP client and default
    /// options.
    pub fn new() -> DownloadResult<Self> {
        Ok(Self::with_client(ReqwestClient::new()?, DownloadOptions::default()))
    }
}

impl<C: HttpClient> Downloader<C> {
    /// Create a downloader over a specific client and options.
    pub fn with_client(client: C, options: DownloadOptions) -> Self {
        Self { client, options }
    }

    /// Download `url` into the file at `dest`.
    ///
    /// Probes for range support, pre-sizes the output file, then either
    /// fetches all intervals in parallel or falls back to one sequential
    /// whole-resource fetch. The final size is verified against the
    /// expected size; a mismatch is logged and recorded in the report but
    /// does not fail the operation.
    ///
    /// # Errors
    ///
    /// Probe, allocation and whole-fetch failures abort immediately. In
    /// ranged mode, failures of individual chunks are collected at the
    /// join barrier and returned as [`DownloadError::ChunksFailed`].
    pub fn download(&self, url: &str, dest: &Path) -> DownloadResult<DownloadReport> {
        let info = probe(&self.client, url)?;

        let total_size = info
            .content_length
            .or(self.options.expected_size)
            .ok_or_else(|| DownloadError::UnknownSize {
                url: url.to_string(),
            })?;

        let file = File::create(dest).map_err(|e| DownloadError::CreateFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;
        file.set_len(total_size)
            .map_err(|e| DownloadError::AllocateFailed {
                path: dest.to_path_buf(),
                size: total_size,
                source: e,
            })?;

        let started = Instant::now();

        let (bytes_written, mode) = if info.accepts_ranges {
            let intervals = partition(total_size, self.options.connections.max(1))?;
            info!(url, total_size, connections = intervals.len(), "starting ranged download");
            let written = self.fetch_ranged(url, &intervals, &file, dest)?;
            (written, TransferMode::Ranged { connections: intervals.len() })
        } else {
            info!(url, total_size, "server does not support ranges, downloading sequentially");
            let written = fetch_whole(&self.client, url, total_size, &file, dest)?;
            (written, TransferMode::Whole)
        };

        let elapsed = started.elapsed();

        let final_size = file
            .metadata()
            .map(|m| m.len())
            .unwrap_or(bytes_written);
        if final_size != total_size {
            warn!(
                expected = total_size,
                actual = final_size,
                "downloaded size does not match expected size"
            );
        }

        Ok(DownloadReport {
            expected_size: total_size,
            final_size,
            bytes_written,
            elapsed,
            mode,
        })
    }

    /// Fetch all intervals in parallel and join on every worker.
    ///
    /// Outcomes come back indexed by interval. Workers never write
    /// overlapping ranges because the partition is disjoint, so the file
    /// handle is shared without synchronization.
    fn fetch_ranged(
        &self,
        url: &str,
        intervals: &[Interval],
        file: &File,
        dest: &Path,
    ) -> DownloadResult<u64> {
        let outcomes: Vec<DownloadResult<u64>> = thread::scope(|s| {
            let handles: Vec<_> = intervals
                .iter()
                .map(|&interval| {
                    s.spawn(move || fetch_range(&self.client, url, interval, file, dest))
                })
                .collect();

            // Full join barrier: every worker finishes, success or not.
            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(outcome) => outcome,
                    Err(_) => Err(DownloadError::RequestFailed {
                        url: url.to_string(),
                        reason: "worker thread panicked".to_string(),
                    }),
                })
                .collect()
        });

        let mut bytes_written = 0u64;
        let mut failures = Vec::new();
        for (index, (interval, outcome)) in intervals.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(written) => bytes_written += written,
                Err(e) => {
                    warn!(chunk = index, %interval, error = %e, "chunk failed");
                    failures.push(ChunkFailure {
                        index,
                        start: interval.start,
                        end: interval.end,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(DownloadError::ChunksFailed {
                total: intervals.len(),
                failures,
            });
        }

        Ok(bytes_written)
    }
}
