//! parget - parallel ranged HTTP downloads
//!
//! This library downloads one large remote resource by splitting it into
//! contiguous byte ranges, fetching the ranges concurrently, and writing
//! each range at its final offset in a pre-sized local file.
//!
//! # Architecture
//!
//! ```text
//! Downloader (orchestrator)
//!       │
//!       ├── probe ──────── HEAD: range support + Content-Length
//!       ├── partition ──── N disjoint inclusive intervals
//!       ├── fetch_range ── ranged GET ──► SectionWriter ──► File
//!       │   (one worker thread per interval, full join barrier)
//!       └── fetch_whole ── fallback when ranges are unsupported
//! ```
//!
//! The output file is the only shared mutable resource. Sharing it is
//! safe because every worker writes through a [`SectionWriter`] view over
//! a disjoint window, addressed absolutely via the [`WriteAt`] capability.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use parget::Downloader;
//!
//! # fn main() -> Result<(), parget::DownloadError> {
//! let downloader = Downloader::new()?;
//! let report = downloader.download(
//!     "https://example.com/video.mp4",
//!     Path::new("video.mp4"),
//! )?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod fetcher;
mod orchestrator;
mod partition;
mod probe;
mod report;
mod section;

pub use client::{
    HeadResponse, HttpClient, RequestProfile, ReqwestClient, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_TRANSFER_TIMEOUT,
};
pub use error::{ChunkFailure, DownloadError, DownloadResult};
pub use fetcher::{fetch_range, fetch_whole};
pub use orchestrator::{DownloadOptions, Downloader, DEFAULT_CONNECTIONS};
pub use partition::{partition, Interval};
pub use probe::{probe, ResourceInfo};
pub use report::{DownloadReport, TransferMode};
pub use section::{SectionWriter, SinkError, WriteAt};
