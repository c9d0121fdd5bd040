//! File copy with a reusable buffer and a per-file size cap.
//!
//! One [`CopyBuffer`] lives for a whole extraction or compression run so
//! that copying many entries does not allocate per entry.

use std::io;
use std::io::Read;
use std::io::Write;

/// Buffer size for I/O operations (64KB).
const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable copy buffer.
///
/// # Examples
///
/// ```
/// use intake_core::copy::CopyBuffer;
/// use intake_core::copy::copy_with_buffer;
/// use std::io::Cursor;
///
/// let mut buffer = CopyBuffer::new();
/// let mut output = Vec::new();
/// let n = copy_with_buffer(&mut Cursor::new(b"hello"), &mut output, &mut buffer).unwrap();
/// assert_eq!(n, 5);
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Creates a new zeroed copy buffer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of [`copy_capped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CappedCopy {
    /// Bytes written to the destination.
    pub written: u64,
    /// `true` if the source had more data than the cap allowed.
    pub truncated: bool,
}

/// Copies from `reader` to `writer` until EOF, returning the byte count.
///
/// Interrupted reads are retried.
///
/// # Errors
///
/// Returns the first read or write error.
#[inline]
pub fn copy_with_buffer<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut CopyBuffer,
) -> io::Result<u64> {
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total = total.saturating_add(bytes_read as u64);
    }

    Ok(total)
}

/// Copies at most `limit` bytes; anything past the limit is left unread.
///
/// When exactly `limit` bytes were copied, one extra byte is read from the
/// source to tell a file that is exactly `limit` bytes long from one that
/// was clipped. That byte is discarded.
///
/// # Errors
///
/// Returns the first read or write error.
pub fn copy_capped<R: Read + ?Sized, W: Write + ?Sized>(
    reader: &mut R,
    writer: &mut W,
    limit: u64,
    buffer: &mut CopyBuffer,
) -> io::Result<CappedCopy> {
    let mut limited = (&mut *reader).take(limit);
    let written = copy_with_buffer(&mut limited, writer, buffer)?;

    let truncated = if written == limit {
        let mut extra = [0u8; 1];
        loop {
            match reader.read(&mut extra) {
                Ok(n) => break n > 0,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    } else {
        false
    };

    Ok(CappedCopy { written, truncated })
}
