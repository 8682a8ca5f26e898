//! Error types for the download engine.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// A single failed chunk, kept for the aggregate `ChunksFailed` error.
#[derive(Debug)]
pub struct ChunkFailure {
    /// Index of the chunk within the partition (0-based).
    pub index: usize,
    /// Inclusive byte range the chunk covered.
    pub start: u64,
    /// Inclusive end offset of the chunk.
    pub end: u64,
    /// Why the chunk failed.
    pub reason: String,
}

impl std::fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chunk {} (bytes {}-{}): {}",
            self.index, self.start, self.end, self.reason
        )
    }
}

/// Errors that can occur while downloading a resource.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HEAD probe could not be completed. Fatal to the whole operation.
    #[error("failed to probe {url}: {reason}")]
    ProbeFailed { url: String, reason: String },

    /// An HTTP request could not be sent or its body could not be read.
    #[error("request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The server answered with a status other than 200 or 206.
    #[error("unexpected status from {url}: {status}")]
    UnexpectedStatus { url: String, status: String },

    /// Failed to create the output file.
    #[error("failed to create {}: {source}", .path.display())]
    CreateFailed { path: PathBuf, source: io::Error },

    /// Failed to pre-size the output file to the expected length.
    #[error("failed to allocate {size} bytes for {}: {source}", .path.display())]
    AllocateFailed {
        path: PathBuf,
        size: u64,
        source: io::Error,
    },

    /// Failed to write response bytes into the output file.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// The response body ended before all requested bytes were delivered.
    ///
    /// A clean EOF short of the requested length would otherwise leave a
    /// zero-filled hole in the pre-sized output file.
    #[error("short body from {url}: expected {expected} bytes, got {actual}")]
    ShortBody {
        url: String,
        expected: u64,
        actual: u64,
    },

    /// The resource size is known neither from the server nor the caller.
    #[error("size of {url} is unknown: no Content-Length and no expected size given")]
    UnknownSize { url: String },

    /// Partitioning was asked for zero chunks.
    #[error("chunk count must be greater than zero")]
    InvalidChunkCount,

    /// Partitioning was asked to split an empty resource.
    #[error("cannot partition an empty resource")]
    EmptyResource,

    /// One or more ranged chunks failed after the join barrier.
    #[error("{} of {total} chunks failed: {}", .failures.len(), format_failures(.failures))]
    ChunksFailed {
        total: usize,
        failures: Vec<ChunkFailure>,
    },
}

fn format_failures(failures: &[ChunkFailure]) -> String {
    failures
        .iter()
        .map(ChunkFailure::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
