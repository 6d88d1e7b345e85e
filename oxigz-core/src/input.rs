//! Refillable input buffer for container parsers.
//!
//! Container parsers alternate between pulling single bytes (header and
//! footer fields) and handing whole runs of bytes to a codec (the compressed
//! payload). `InputBuffer` serves both from one window over the underlying
//! reader.
//!
//! A codec may look at more bytes than it ends up using: the bytes returned by
//! [`InputBuffer::fill`] are only removed from the window once the caller
//! [`consume`](InputBuffer::consume)s them, so anything the codec did not
//! consume stays available for the next field.
//!
//! # Example
//!
//! ```
//! use oxigz_core::input::InputBuffer;
//! use std::io::Cursor;
//!
//! let mut input = InputBuffer::new(Cursor::new(b"abcdef".to_vec()));
//!
//! let window = input.fill().unwrap();
//! assert_eq!(window, b"abcdef");
//!
//! // Only two bytes were used, the rest stay available
//! input.consume(2);
//! assert_eq!(input.available(), 4);
//! assert_eq!(input.read_byte().unwrap(), Some(b'c'));
//! ```

use std::io::{self, Read};

/// Default window size (32 KiB, the DEFLATE history size).
pub const DEFAULT_CAPACITY: usize = 32 * 1024;

/// A byte window over any `Read` implementation.
#[derive(Debug)]
pub struct InputBuffer<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Window storage.
    buf: Box<[u8]>,
    /// Start of the unconsumed bytes.
    pos: usize,
    /// End of the valid bytes.
    end: usize,
    /// Total bytes consumed (for error reporting).
    total_consumed: u64,
}

impl<R: Read> InputBuffer<R> {
    /// Create a new `InputBuffer` with the default capacity.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, reader)
    }

    /// Create a new `InputBuffer` with the given window size.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            reader,
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pos: 0,
            end: 0,
            total_consumed: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    ///
    /// Reading from it directly skips any bytes still buffered here.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `InputBuffer` and return the underlying reader.
    ///
    /// Bytes still buffered are lost.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Number of bytes buffered but not yet consumed.
    #[inline]
    pub fn available(&self) -> usize {
        self.end - self.pos
    }

    /// Total number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.total_consumed
    }

    /// Return the unconsumed window, refilling it from the reader first if it
    /// is empty. An empty slice means the reader is exhausted.
    pub fn fill(&mut self) -> io::Result<&[u8]> {
        if self.pos == self.end {
            self.pos = 0;
            self.end = 0;
            loop {
                match self.reader.read(&mut self.buf) {
                    Ok(n) => {
                        self.end = n;
                        break;
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(&self.buf[self.pos..self.end])
    }

    /// Mark `amount` bytes of the window as used.
    #[inline]
    pub fn consume(&mut self, amount: usize) {
        debug_assert!(amount <= self.available(), "consumed past the window");
        let amount = amount.min(self.available());
        self.pos += amount;
        self.total_consumed += amount as u64;
    }

    /// Read a single byte, or `None` at end of input.
    #[inline]
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos == self.end && self.fill()?.is_empty() {
            return Ok(None);
        }
        let byte = self.buf[self.pos];
        self.consume(1);
        Ok(Some(byte))
    }
}
