//! Streaming GZIP encoder.

use crate::header::{GzipFooter, GzipHeader};
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::{CompressStatus, CompressionLevel, Compressor, FlushMode};
use oxigz_core::Crc32;
use oxigz_deflate::RawDeflater;
use std::io::{self, Write};

/// Size of the scratch buffer compressed output passes through.
const OUTPUT_CHUNK: usize = 32 * 1024;

/// Progress of a [`GzipWriter`] through its single member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    /// Nothing written yet; the header is emitted on the first write.
    AwaitingHeader,
    /// Header written; payload is being compressed.
    AwaitingFooter,
    /// Footer written; no more data is accepted.
    Finished,
    /// The writer was closed.
    Closed,
}

/// GZIP writer that compresses data.
///
/// Produces exactly one member with a minimal 10-byte header (no name,
/// comment, extra field or header CRC). The header goes out with the first
/// write; [`finish`](Self::finish) flushes the DEFLATE stream and appends
/// the CRC-32/ISIZE footer.
///
/// # Example
///
/// ```rust
/// use oxigz_gzip::GzipWriter;
/// use std::io::Write;
///
/// let mut writer = GzipWriter::new(Vec::new());
/// writer.write_all(b"Hello, World!").unwrap();
/// let gz = writer.into_inner().unwrap();
/// assert_eq!(&gz[..3], &[0x1F, 0x8B, 0x08]);
/// ```
pub struct GzipWriter<W: Write, C: Compressor = RawDeflater> {
    /// Output sink; `None` once released by `close`.
    inner: Option<W>,
    /// DEFLATE engine.
    deflater: C,
    /// CRC-32 of the uncompressed input the engine has consumed.
    crc: Crc32,
    /// Current state.
    state: OutputState,
    /// Set once writing to the sink or the engine failed mid-member.
    failed: bool,
    /// Fixed modification time; wall-clock time if unset.
    mtime: Option<u32>,
    /// Whether `close` releases the sink.
    owns_sink: bool,
    /// Scratch buffer for compressed output.
    buffer: Vec<u8>,
}

impl<W: Write> GzipWriter<W, RawDeflater> {
    /// Create a new GZIP writer with the default compression level.
    pub fn new(writer: W) -> Self {
        Self::with_engine(writer, RawDeflater::default())
    }

    /// Create a new GZIP writer with the given compression level.
    pub fn with_level(writer: W, level: CompressionLevel) -> Self {
        Self::with_engine(writer, RawDeflater::new(level))
    }
}

impl<W: Write, C: Compressor> GzipWriter<W, C> {
    /// Create a new GZIP writer driving the given DEFLATE engine.
    pub fn with_engine(writer: W, deflater: C) -> Self {
        Self {
            inner: Some(writer),
            deflater,
            crc: Crc32::new(),
            state: OutputState::AwaitingHeader,
            failed: false,
            mtime: None,
            owns_sink: true,
            buffer: vec![0u8; OUTPUT_CHUNK],
        }
    }

    /// Use a fixed modification time instead of the current time.
    pub fn mtime(mut self, mtime: u32) -> Self {
        self.mtime = Some(mtime);
        self
    }

    /// Whether [`close`](Self::close) releases the sink (default `true`).
    /// A sink that is not owned is only flushed and stays reachable through
    /// [`get_ref`](Self::get_ref).
    pub fn owns_sink(mut self, owns: bool) -> Self {
        self.owns_sink = owns;
        self
    }

    /// Current state.
    pub fn state(&self) -> OutputState {
        self.state
    }

    /// Current compression level.
    pub fn level(&self) -> CompressionLevel {
        self.deflater.level()
    }

    /// Change the compression level.
    ///
    /// Levels below 0 are rejected, levels above 9 are clamped.
    pub fn set_level(&mut self, level: i32) -> Result<()> {
        self.deflater.set_level(CompressionLevel::try_new(level)?)
    }

    /// Uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.deflater.total_in()
    }

    /// Get a reference to the underlying writer, unless it was released.
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// Get a mutable reference to the underlying writer, unless it was
    /// released.
    ///
    /// Writing to it directly corrupts the GZIP stream.
    pub fn get_mut(&mut self) -> Option<&mut W> {
        self.inner.as_mut()
    }

    /// Finish the member and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.finish()?;
        self.inner
            .take()
            .ok_or_else(|| OxiGzError::invalid_state("the sink was released on close"))
    }

    /// Compress `buf`, writing the header first if this is the first call.
    ///
    /// Once a write fails the member is incomplete, and every later
    /// `write_data`, `flush` or `finish` is rejected.
    pub fn write_data(&mut self, buf: &[u8]) -> Result<()> {
        self.check_intact()?;
        if matches!(self.state, OutputState::Finished | OutputState::Closed) {
            return Err(OxiGzError::invalid_state("write after finish"));
        }
        let result = self.compress_data(buf);
        self.poison_on_error(result)
    }

    fn compress_data(&mut self, buf: &[u8]) -> Result<()> {
        if self.state == OutputState::AwaitingHeader {
            self.write_header()?;
        }
        self.pump(buf, FlushMode::None)
    }

    /// Complete the member: flush the DEFLATE stream and write the footer.
    ///
    /// Writes the header first if nothing was written. Does nothing once the
    /// member is finished.
    pub fn finish(&mut self) -> Result<()> {
        self.check_intact()?;
        if matches!(self.state, OutputState::Finished | OutputState::Closed) {
            return Ok(());
        }
        let result = self.write_trailer();
        self.poison_on_error(result)
    }

    fn write_trailer(&mut self) -> Result<()> {
        if self.state == OutputState::AwaitingHeader {
            self.write_header()?;
        }

        self.pump(&[], FlushMode::Finish)?;

        let footer = GzipFooter {
            crc: self.crc.value(),
            size: self.deflater.total_in() as u32,
        };
        footer.write(self.sink()?)?;

        self.state = OutputState::Finished;
        Ok(())
    }

    /// Finish the member, then flush and release the sink.
    ///
    /// The sink is flushed (and dropped, if owned) even when finishing fails;
    /// the finish error is the one reported.
    pub fn close(&mut self) -> Result<()> {
        if self.state == OutputState::Closed {
            return Ok(());
        }

        let finished = self.finish();
        self.state = OutputState::Closed;
        let released = self.release();

        finished.and(released)
    }

    fn check_intact(&self) -> Result<()> {
        if self.failed {
            return Err(OxiGzError::invalid_state(
                "an earlier write failed; the GZIP member is incomplete",
            ));
        }
        Ok(())
    }

    fn poison_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn release(&mut self) -> Result<()> {
        let flushed = match self.inner.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        };
        if self.owns_sink {
            self.inner = None;
        }
        Ok(flushed?)
    }

    fn sink(&mut self) -> Result<&mut W> {
        self.inner
            .as_mut()
            .ok_or_else(|| OxiGzError::invalid_state("the sink was released on close"))
    }

    fn write_header(&mut self) -> Result<()> {
        let header = match self.mtime {
            Some(mtime) => GzipHeader::new().with_mtime(mtime),
            None => GzipHeader::new().with_mtime_now(),
        };
        header.write(self.sink()?)?;
        self.state = OutputState::AwaitingFooter;
        Ok(())
    }

    /// Feed `input` to the engine and copy everything it emits to the sink.
    /// Only input the engine consumed is folded into the CRC.
    fn pump(&mut self, mut input: &[u8], flush: FlushMode) -> Result<()> {
        let sink = self
            .inner
            .as_mut()
            .ok_or_else(|| OxiGzError::invalid_state("the sink was released on close"))?;

        loop {
            let (consumed, produced, status) =
                self.deflater.compress(input, &mut self.buffer, flush)?;
            self.crc.update(&input[..consumed]);
            input = &input[consumed..];
            sink.write_all(&self.buffer[..produced])?;

            let drained = match flush {
                FlushMode::Finish => status == CompressStatus::Done,
                FlushMode::None | FlushMode::Sync => {
                    input.is_empty() && status != CompressStatus::NeedsOutput
                }
            };
            if drained {
                return Ok(());
            }
        }
    }
}

impl<W: Write, C: Compressor> Write for GzipWriter<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_data(buf)?;
        Ok(buf.len())
    }

    /// Sync-flush the DEFLATE stream so everything written so far can be
    /// decoded, then flush the sink.
    fn flush(&mut self) -> io::Result<()> {
        self.check_intact()?;
        if self.state == OutputState::AwaitingFooter {
            let result = self.pump(&[], FlushMode::Sync);
            self.poison_on_error(result)?;
        }
        if let Some(writer) = self.inner.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl<W: Write, C: Compressor> Drop for GzipWriter<W, C> {
    fn drop(&mut self) {
        if self.inner.is_some()
            && !self.failed
            && matches!(
                self.state,
                OutputState::AwaitingHeader | OutputState::AwaitingFooter
            )
        {
            let _ = self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::GzipReader;
    use oxigz_core::ErrorKind;
    use std::cell::RefCell;
    use std::io::Read;
    use std::rc::Rc;

    /// Sink that records writes, flushes and drops.
    #[derive(Clone, Default)]
    struct Recorder {
        data: Rc<RefCell<Vec<u8>>>,
        flushes: Rc<RefCell<usize>>,
        dropped: Rc<RefCell<bool>>,
        fail_writes: bool,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_writes {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is gone"));
            }
            self.data.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            *self.flushes.borrow_mut() += 1;
            Ok(())
        }
    }

    impl Drop for Recorder {
        fn drop(&mut self) {
            *self.dropped.borrow_mut() = true;
        }
    }

    /// Sink whose first write longer than `limit` bytes fails.
    struct FailOnce {
        data: Vec<u8>,
        limit: usize,
        tripped: bool,
    }

    impl Write for FailOnce {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.tripped && buf.len() > self.limit {
                self.tripped = true;
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "try again"));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn decode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzipReader::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_header_written_on_first_write() {
        let mut writer = GzipWriter::new(Vec::new()).mtime(0x11223344);
        assert_eq!(writer.state(), OutputState::AwaitingHeader);
        assert!(writer.get_ref().unwrap().is_empty());

        writer.write_data(b"x").unwrap();
        assert_eq!(writer.state(), OutputState::AwaitingFooter);
        assert_eq!(
            &writer.get_ref().unwrap()[..10],
            &[0x1F, 0x8B, 0x08, 0x00, 0x44, 0x33, 0x22, 0x11, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_empty_member_is_twenty_bytes() {
        let mut writer = GzipWriter::new(Vec::new()).mtime(0);
        writer.finish().unwrap();
        let gz = writer.into_inner().unwrap();

        assert_eq!(gz.len(), 20);
        assert_eq!(&gz[10..12], &[0x03, 0x00]);
        assert_eq!(&gz[12..], &[0u8; 8]);
        assert!(decode(&gz).is_empty());
    }

    #[test]
    fn test_footer_fields() {
        let data = b"123456789";
        let mut writer = GzipWriter::new(Vec::new());
        writer.write_data(data).unwrap();
        let gz = writer.into_inner().unwrap();

        let footer = &gz[gz.len() - 8..];
        assert_eq!(&footer[..4], &0xCBF43926u32.to_le_bytes());
        assert_eq!(&footer[4..], &9u32.to_le_bytes());
    }

    #[test]
    fn test_write_after_finish_rejected() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.write_data(b"abc").unwrap();
        writer.finish().unwrap();

        let err = writer.write_data(b"more").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(writer.state(), OutputState::Finished);
    }

    #[test]
    fn test_finish_twice_is_noop() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.write_data(b"abc").unwrap();
        writer.finish().unwrap();
        let len = writer.get_ref().unwrap().len();

        writer.finish().unwrap();
        assert_eq!(writer.get_ref().unwrap().len(), len);
    }

    #[test]
    fn test_close_releases_owned_sink() {
        let recorder = Recorder::default();
        let mut writer = GzipWriter::new(recorder.clone());
        writer.write_data(b"hello").unwrap();
        writer.close().unwrap();

        assert_eq!(writer.state(), OutputState::Closed);
        assert!(writer.get_ref().is_none());
        assert!(*recorder.dropped.borrow());
        assert_eq!(*recorder.flushes.borrow(), 1);
        assert_eq!(decode(&recorder.data.borrow()), b"hello");

        // Closing again does nothing
        writer.close().unwrap();
        let err = writer.write_data(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_close_keeps_borrowed_sink() {
        let recorder = Recorder::default();
        let mut writer = GzipWriter::new(recorder.clone()).owns_sink(false);
        writer.close().unwrap();

        assert!(!*recorder.dropped.borrow());
        assert_eq!(*recorder.flushes.borrow(), 1);
        assert_eq!(writer.get_ref().unwrap().data.borrow().len(), 20);
    }

    #[test]
    fn test_close_releases_sink_when_finish_fails() {
        let mut recorder = Recorder::default();
        recorder.fail_writes = true;
        let mut writer = GzipWriter::new(recorder.clone());

        let err = writer.close().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(writer.state(), OutputState::Closed);
        assert!(*recorder.dropped.borrow());
        assert_eq!(*recorder.flushes.borrow(), 1);
    }

    #[test]
    fn test_set_level() {
        let mut writer = GzipWriter::new(Vec::new());
        assert_eq!(writer.level(), CompressionLevel::DEFAULT);

        writer.set_level(9).unwrap();
        assert_eq!(writer.level(), CompressionLevel::BEST);

        let err = writer.set_level(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(writer.level(), CompressionLevel::BEST);

        writer.write_data(b"payload").unwrap();
        let err = writer.set_level(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_flush_makes_prefix_decodable() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.write_all(b"first line\n").unwrap();
        writer.flush().unwrap();

        // The bytes so far hold a complete sync-flushed prefix
        let partial = writer.get_ref().unwrap().clone();
        let mut inflater = oxigz_deflate::RawInflater::new();
        let mut out = [0u8; 64];
        let (_, produced, _) =
            oxigz_core::Decompressor::decompress(&mut inflater, &partial[10..], &mut out).unwrap();
        assert_eq!(&out[..produced], b"first line\n");
    }

    #[test]
    fn test_drop_finishes_member() {
        let recorder = Recorder::default();
        {
            let mut writer = GzipWriter::new(recorder.clone());
            writer.write_data(b"dropped without finish").unwrap();
        }
        assert_eq!(decode(&recorder.data.borrow()), b"dropped without finish");
    }

    #[test]
    fn test_failed_write_poisons_writer() {
        let sink = FailOnce {
            data: Vec::new(),
            limit: 1000,
            tripped: false,
        };
        let mut writer = GzipWriter::with_level(sink, CompressionLevel::NONE);
        writer.write_data(b"abc").unwrap();

        // Stored blocks are larger than the limit, so the sink rejects one
        assert!(writer.write_data(&[0u8; 100_000]).is_err());
        assert!(writer.get_ref().unwrap().tripped);

        // The sink would now accept data, but the member already lost bytes
        let err = writer.write_data(b"more").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = writer.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(writer.flush().is_err());
        assert_eq!(writer.state(), OutputState::AwaitingFooter);
    }

    #[test]
    fn test_rejected_write_after_finish_does_not_poison() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.write_data(b"abc").unwrap();
        writer.finish().unwrap();
        assert!(writer.write_data(b"late").is_err());

        // finish stays a no-op and the member is intact
        writer.finish().unwrap();
        assert_eq!(decode(&writer.into_inner().unwrap()), b"abc");
    }
}
