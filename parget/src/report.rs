//! Point-in-time summary of a finished download.
//!
//! The engine records what happened; presentation (units, wording, exit
//! codes) is left to the caller.

use std::time::Duration;

/// How the resource body was transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Parallel range requests over the given number of connections.
    Ranged { connections: usize },
    /// One unranged GET, written sequentially from offset 0.
    Whole,
}

/// Summary of a completed download.
#[derive(Debug, Clone)]
pub struct DownloadReport {
    /// Size the download was expected to produce.
    pub expected_size: u64,
    /// Size of the output file after the transfer.
    pub final_size: u64,
    /// Total bytes written by the fetchers.
    pub bytes_written: u64,
    /// Wall-clock duration of the transfer (excluding the probe).
    pub elapsed: Duration,
    /// How the body was transferred.
    pub mode: TransferMode,
}

impl DownloadReport {
    /// Whether the output file ended up at exactly the expected size.
    ///
    /// A mismatch is reported, not fatal; the transfer itself already
    /// succeeded.
    pub fn size_matches(&self) -> bool {
        self.final_size == self.expected_size
    }

    /// Average throughput in MiB per second.
    pub fn throughput_mib(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.final_size as f64 / secs / 1024.0 / 1024.0
    }
}

impl std::fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.mode {
            TransferMode::Ranged { connections } => format!("{} connections", connections),
            TransferMode::Whole => "single connection".to_string(),
        };
        write!(
            f,
            "{} bytes in {:.1?} over {} ({:.2} MiB/s)",
            self.final_size,
            self.elapsed,
            mode,
            self.throughput_mib()
        )
    }
}
