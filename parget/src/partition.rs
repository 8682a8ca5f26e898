//! Byte-range partitioning for parallel downloads.

use crate::error::{DownloadError, DownloadResult};

/// An inclusive `[start, end]` byte range of the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    /// First byte offset covered by this interval.
    pub start: u64,
    /// Last byte offset covered by this interval (inclusive).
    pub end: u64,
}

impl Interval {
    /// Create an interval from inclusive start and end offsets.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes the interval covers. Intervals are inclusive, so
    /// this is always at least one.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bytes {}-{}", self.start, self.end)
    }
}

/// Split `total_size` bytes into `chunk_count` contiguous intervals.
///
/// Each interval is `total_size / chunk_count` bytes (floor division); the
/// final interval is extended to `total_size - 1` so it absorbs the whole
/// remainder. The produced intervals are pairwise disjoint, ordered, and
/// their union is exactly `[0, total_size - 1]`.
///
/// A `chunk_count` larger than `total_size` is clamped to `total_size` so
/// no interval is empty.
///
/// # Errors
///
/// Returns [`DownloadError::InvalidChunkCount`] when `chunk_count` is zero
/// and [`DownloadError::EmptyResource`] when `total_size` is zero.
pub fn partition(total_size: u64, chunk_count: usize) -> DownloadResult<Vec<Interval>> {
    if chunk_count == 0 {
        return Err(DownloadError::InvalidChunkCount);
    }
    if total_size == 0 {
        return Err(DownloadError::EmptyResource);
    }

    let chunk_count = (chunk_count as u64).min(total_size);
    let chunk_size = total_size / chunk_count;

    let mut intervals = Vec::with_capacity(chunk_count as usize);
    for i in 0..chunk_count {
        let start = i * chunk_size;
        let end = if i == chunk_count - 1 {
            total_size - 1
        } else {
            start + chunk_size - 1
        };
        intervals.push(Interval::new(start, end));
    }

    Ok(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_partition_remainder_goes_to_last_interval() {
        let intervals = partition(100, 8).unwrap();

        let expected = [
            (0, 11),
            (12, 23),
            (24, 35),
            (36, 47),
            (48, 59),
            (60, 71),
            (72, 83),
            (84, 99),
        ];
        assert_eq!(intervals.len(), 8);
        for (interval, (start, end)) in intervals.iter().zip(expected) {
            assert_eq!((interval.start, interval.end), (start, end));
        }
    }

    #[test]
    fn test_partition_exact_division() {
        let intervals = partition(80, 8).unwrap();
        assert!(intervals.iter().all(|i| i.len() == 10));
        assert_eq!(intervals.last().unwrap().end, 79);
    }

    #[test]
    fn test_partition_single_chunk() {
        let intervals = partition(1000, 1).unwrap();
        assert_eq!(intervals, vec![Interval::new(0, 999)]);
    }

    #[test]
    fn test_partition_clamps_oversized_chunk_count() {
        let intervals = partition(3, 8).unwrap();
        assert_eq!(
            intervals,
            vec![
                Interval::new(0, 0),
                Interval::new(1, 1),
                Interval::new(2, 2)
            ]
        );
    }

    #[test]
    fn test_partition_rejects_zero_chunks() {
        assert!(matches!(
            partition(100, 0),
            Err(DownloadError::InvalidChunkCount)
        ));
    }

    #[test]
    fn test_partition_rejects_empty_resource() {
        assert!(matches!(partition(0, 8), Err(DownloadError::EmptyResource)));
    }

    #[test]
    fn test_partition_end_to_end_size() {
        // The sizes from the 631 MB reference transfer.
        let intervals = partition(631_207_581, 8).unwrap();
        assert_eq!(intervals.len(), 8);
        assert_eq!(intervals[0].start, 0);
        assert_eq!(intervals[7].end, 631_207_580);
        assert_eq!(intervals.iter().map(Interval::len).sum::<u64>(), 631_207_581);
    }

    proptest! {
        /// Intervals are ordered, contiguous, disjoint, and cover exactly
        /// [0, total_size - 1].
        #[test]
        fn prop_partition_covers_everything(total_size in 1u64..10_000_000, chunk_count in 1usize..64) {
            let intervals = partition(total_size, chunk_count).unwrap();

            prop_assert_eq!(intervals[0].start, 0);
            prop_assert_eq!(intervals.last().unwrap().end, total_size - 1);
            for pair in intervals.windows(2) {
                prop_assert_eq!(pair[1].start, pair[0].end + 1);
            }
            prop_assert_eq!(intervals.iter().map(Interval::len).sum::<u64>(), total_size);
        }
    }
}
