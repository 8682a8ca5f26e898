//! Bounded, offset-addressed writing into a shared output target.
//!
//! Concurrent workers each hold a [`SectionWriter`] view over one shared
//! file. Views cover disjoint byte windows, and every write is addressed
//! absolutely at `base + cursor`, so no synchronization is needed between
//! workers beyond the disjointness of their windows.

use std::fs::File;
use std::io::{self, Write};

/// Error message used when a section's window is fully consumed.
const SECTION_EXHAUSTED: &str = "section exhausted";

/// Wrapper marking an `io::Error` as originating on the write side.
///
/// `io::copy` reports read-side and write-side failures through the same
/// error value; every error a [`SectionWriter`] produces is wrapped in
/// this type so callers can tell sink failures apart from network
/// failures.
#[derive(Debug)]
pub struct SinkError(io::Error);

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for SinkError {}

fn sink_error(e: io::Error) -> io::Error {
    io::Error::new(e.kind(), SinkError(e))
}

/// Capability trait for targets that support positional writes.
///
/// Writing at an absolute offset must not disturb bytes outside the
/// written range and must not depend on any ambient cursor, which is what
/// makes one target safe to share between concurrent [`SectionWriter`]s
/// over disjoint windows.
pub trait WriteAt: Send + Sync {
    /// Write `buf` at absolute `offset`, returning the number of bytes
    /// written.
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize>;
}

impl WriteAt for File {
    #[cfg(unix)]
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::write_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_write(self, buf, offset)
    }
}

/// A write view over one window of a shared target.
///
/// The view is a `(base, size, cursor)` triple: writes land at
/// `base + cursor`, the cursor advances by the bytes written, and nothing
/// outside `[base, base + size)` is ever touched.
#[derive(Debug)]
pub struct SectionWriter<'a, W: WriteAt + ?Sized> {
    target: &'a W,
    base: u64,
    size: u64,
    cursor: u64,
}

impl<'a, W: WriteAt + ?Sized> SectionWriter<'a, W> {
    /// Create a view over `target` covering `size` bytes starting at
    /// absolute offset `base`.
    pub fn new(target: &'a W, base: u64, size: u64) -> Self {
        Self {
            target,
            base,
            size,
            cursor: 0,
        }
    }

    /// Bytes written through this view so far.
    pub fn written(&self) -> u64 {
        self.cursor
    }

    /// Bytes still available in the window.
    pub fn remaining(&self) -> u64 {
        self.size - self.cursor
    }
}

impl<W: WriteAt + ?Sized> Write for SectionWriter<'_, W> {
    /// Write into the window at the current cursor.
    ///
    /// Input longer than the remaining window is silently clipped to fit;
    /// the clipped tail is not an error. Writing to a fully consumed
    /// window fails with a "section exhausted" error and writes nothing.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.cursor >= self.size {
            return Err(sink_error(io::Error::new(
                io::ErrorKind::WriteZero,
                SECTION_EXHAUSTED,
            )));
        }

        let remaining = self.size - self.cursor;
        let clipped = if buf.len() as u64 > remaining {
            &buf[..remaining as usize]
        } else {
            buf
        };

        let n = self
            .target
            .write_at(clipped, self.base + self.cursor)
            .map_err(sink_error)?;
        self.cursor += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;
    use tempfile::tempfile;

    /// In-memory positional target for tests.
    pub struct SharedBuffer(pub Mutex<Vec<u8>>);

    impl SharedBuffer {
        pub fn zeroed(len: usize) -> Self {
            Self(Mutex::new(vec![0u8; len]))
        }
    }

    impl WriteAt for SharedBuffer {
        fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<usize> {
            let mut data = self.0.lock().unwrap();
            let offset = offset as usize;
            data[offset..offset + buf.len()].copy_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[test]
    fn test_write_lands_at_base_plus_cursor() {
        let target = SharedBuffer::zeroed(10);
        let mut section = SectionWriter::new(&target, 4, 4);

        section.write_all(&[1, 2]).unwrap();
        section.write_all(&[3, 4]).unwrap();

        assert_eq!(*target.0.lock().unwrap(), vec![0, 0, 0, 0, 1, 2, 3, 4, 0, 0]);
        assert_eq!(section.written(), 4);
        assert_eq!(section.remaining(), 0);
    }

    #[test]
    fn test_oversized_write_is_clipped_without_error() {
        let target = SharedBuffer::zeroed(10);
        let mut section = SectionWriter::new(&target, 0, 10);

        let n = section.write(&[7u8; 15]).unwrap();

        assert_eq!(n, 10);
        assert_eq!(section.written(), 10);
        assert_eq!(*target.0.lock().unwrap(), vec![7u8; 10]);
    }

    #[test]
    fn test_exhausted_section_rejects_writes() {
        let target = SharedBuffer::zeroed(10);
        let mut section = SectionWriter::new(&target, 0, 10);
        section.write(&[7u8; 15]).unwrap();

        let err = section.write(&[1]).unwrap_err();
        assert_eq!(err.to_string(), "section exhausted");
        assert_eq!(section.written(), 10);
    }

    #[test]
    fn test_write_failures_are_tagged_as_sink_errors() {
        struct BrokenTarget;

        impl WriteAt for BrokenTarget {
            fn write_at(&self, _buf: &[u8], _offset: u64) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
        }

        let mut section = SectionWriter::new(&BrokenTarget, 0, 10);
        let err = section.write(&[1, 2, 3]).unwrap_err();
        assert!(err.get_ref().unwrap().is::<SinkError>());
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);

        let mut section = SectionWriter::new(&BrokenTarget, 0, 0);
        let err = section.write(&[1]).unwrap_err();
        assert!(err.get_ref().unwrap().is::<SinkError>());
    }

    #[test]
    fn test_file_write_at_does_not_move_neighbors() {
        let file = tempfile().unwrap();
        file.set_len(8).unwrap();

        let mut left = SectionWriter::new(&file, 0, 4);
        let mut right = SectionWriter::new(&file, 4, 4);

        right.write_all(b"wxyz").unwrap();
        left.write_all(b"abcd").unwrap();

        let mut contents = Vec::new();
        use std::io::{Read, Seek, SeekFrom};
        let mut file = file;
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"abcdwxyz");
    }

    #[test]
    fn test_disjoint_concurrent_writers_reconstruct_in_offset_order() {
        let file = tempfile().unwrap();
        let n_writers = 8u64;
        let window = 1000u64;
        file.set_len(n_writers * window).unwrap();

        // Each writer fills its own window with a distinct byte pattern,
        // in several small writes, racing with its siblings.
        thread::scope(|s| {
            for i in 0..n_writers {
                let file = &file;
                s.spawn(move || {
                    let mut section = SectionWriter::new(file, i * window, window);
                    let pattern = vec![i as u8 + 1; window as usize];
                    for piece in pattern.chunks(173) {
                        section.write_all(piece).unwrap();
                    }
                });
            }
        });

        let mut contents = Vec::new();
        use std::io::{Read, Seek, SeekFrom};
        let mut file = file;
        file.seek(SeekFrom::Start(0)).unwrap();
        file.read_to_end(&mut contents).unwrap();

        let mut expected = Vec::new();
        for i in 0..n_writers {
            expected.extend(std::iter::repeat(i as u8 + 1).take(window as usize));
        }
        assert_eq!(contents, expected);
    }
}
