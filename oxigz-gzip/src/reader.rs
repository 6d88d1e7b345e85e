//! Streaming GZIP decoder.

use crate::header::{GzipFooter, GzipHeader};
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::{DecompressStatus, Decompressor};
use oxigz_core::{Crc32, InputBuffer};
use oxigz_deflate::RawInflater;
use std::io::{self, Read};

/// Where the reader is within the member sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Between members: the next byte starts a header (or the input ends).
    Header,
    /// Inside a member's compressed payload.
    Payload,
    /// A format or truncation error was reported, or a header or footer
    /// was cut short by an I/O error.
    Failed,
}

/// GZIP reader that decompresses data.
///
/// Concatenated members are decoded back to back as one stream; `read`
/// returns 0 only once the input is exhausted at a member boundary. Every
/// member's footer is checked against the CRC-32 and size of the data it
/// actually produced.
///
/// # Example
///
/// ```rust
/// use oxigz_gzip::{GzipReader, compress};
/// use std::io::Read;
///
/// let mut data = compress(b"first, ", 6).unwrap();
/// data.extend(compress(b"second", 6).unwrap());
///
/// let mut text = String::new();
/// GzipReader::new(&data[..]).read_to_string(&mut text).unwrap();
/// assert_eq!(text, "first, second");
/// ```
pub struct GzipReader<R: Read, D: Decompressor = RawInflater> {
    /// Compressed input.
    input: InputBuffer<R>,
    /// DEFLATE engine.
    inflater: D,
    /// CRC-32 of the current member's decompressed data.
    crc: Crc32,
    /// Current state.
    state: ReadState,
    /// Header of the current (or last) member.
    header: Option<GzipHeader>,
    /// Number of member headers parsed.
    members: u64,
}

impl<R: Read> GzipReader<R, RawInflater> {
    /// Create a new GZIP reader.
    pub fn new(reader: R) -> Self {
        Self::with_engine(reader, RawInflater::new())
    }

    /// Create a new GZIP reader with the given input window size.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self::from_input(InputBuffer::with_capacity(capacity, reader), RawInflater::new())
    }
}

impl<R: Read, D: Decompressor> GzipReader<R, D> {
    /// Create a new GZIP reader driving the given DEFLATE engine.
    pub fn with_engine(reader: R, inflater: D) -> Self {
        Self::from_input(InputBuffer::new(reader), inflater)
    }

    fn from_input(input: InputBuffer<R>, inflater: D) -> Self {
        Self {
            input,
            inflater,
            crc: Crc32::new(),
            state: ReadState::Header,
            header: None,
            members: 0,
        }
    }

    /// Header of the member being decoded, or of the last one decoded.
    pub fn header(&self) -> Option<&GzipHeader> {
        self.header.as_ref()
    }

    /// Number of member headers parsed so far.
    pub fn member_count(&self) -> u64 {
        self.members
    }

    /// Compressed bytes consumed so far, headers and footers included.
    pub fn total_in(&self) -> u64 {
        self.input.position()
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.input.get_ref()
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        self.input.get_mut()
    }

    /// Consume this reader and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    /// Decompress into `buf`, returning the number of bytes written.
    ///
    /// Returns 0 only at the end of the last member (or if `buf` is empty).
    /// After a format or truncation error every further call fails. An I/O
    /// error from the source can be retried, unless it interrupted a header
    /// or footer after some of its bytes were read.
    pub fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        let result = self.read_members(buf);
        self.poison_on_fatal(result)
    }

    /// Parse the next member header if the reader sits between members, and
    /// return the header of the member now being decoded.
    ///
    /// Returns `Ok(None)` at the end of the input. No payload is decoded, so
    /// this sees the first member's header even if that member is empty.
    pub fn read_header(&mut self) -> Result<Option<&GzipHeader>> {
        self.check_usable()?;
        if self.state == ReadState::Header {
            let result = self.next_member();
            if !self.poison_on_fatal(result)? {
                return Ok(None);
            }
        }
        Ok(self.header.as_ref())
    }

    fn check_usable(&self) -> Result<()> {
        if self.state == ReadState::Failed {
            return Err(OxiGzError::invalid_state(
                "GZIP stream cannot be read after an earlier error",
            ));
        }
        Ok(())
    }

    fn poison_on_fatal<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_fatal() {
                self.state = ReadState::Failed;
            }
        }
        result
    }

    fn read_members(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_usable()?;
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if self.state == ReadState::Header && !self.next_member()? {
                return Ok(0);
            }

            let produced = self.inflate_into(buf)?;
            if self.inflater.is_finished() {
                self.end_member()?;
            }

            // Nothing produced means the member ended exactly here; look for
            // the next one instead of reporting end of stream.
            if produced > 0 {
                return Ok(produced);
            }
        }
    }

    /// Parse a member header; `false` at a clean end of input.
    fn next_member(&mut self) -> Result<bool> {
        match self.parse_field(GzipHeader::read_from)? {
            Some(header) => {
                self.begin_member(header);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run a header or footer parse. Bytes it consumed cannot be pushed
    /// back, so a failure after the first byte leaves the stream unreadable.
    fn parse_field<T>(
        &mut self,
        parse: impl FnOnce(&mut InputBuffer<R>) -> Result<T>,
    ) -> Result<T> {
        let start = self.input.position();
        let result = parse(&mut self.input);
        if result.is_err() && self.input.position() != start {
            self.state = ReadState::Failed;
        }
        result
    }

    fn begin_member(&mut self, header: GzipHeader) {
        self.header = Some(header);
        self.members += 1;
        self.inflater.reset();
        self.crc.reset();
        self.state = ReadState::Payload;
    }

    /// Run the engine until it produces output or reaches the end of the
    /// DEFLATE stream.
    fn inflate_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            let input = self.input.fill()?;
            let exhausted = input.is_empty();

            let (consumed, produced, status) = self.inflater.decompress(input, buf)?;

            // Bytes the engine did not take stay in the window for the footer
            self.input.consume(consumed);
            self.crc.update(&buf[..produced]);

            if produced > 0 || status == DecompressStatus::Done {
                return Ok(produced);
            }
            if exhausted {
                return Err(OxiGzError::unexpected_eof("compressed payload"));
            }
        }
    }

    fn end_member(&mut self) -> Result<()> {
        let footer = self.parse_field(GzipFooter::read_from)?;
        footer.verify(self.crc.value(), self.inflater.total_out() as u32)?;
        self.state = ReadState::Header;
        Ok(())
    }
}

impl<R: Read, D: Decompressor> Read for GzipReader<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_data(buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::flags;
    use crate::writer::GzipWriter;
    use oxigz_core::ErrorKind;

    /// Source that fails once with `WouldBlock` when it reaches `fail_at`.
    struct Hiccup<'a> {
        data: &'a [u8],
        pos: usize,
        fail_at: usize,
        failed: bool,
    }

    impl<'a> Hiccup<'a> {
        fn new(data: &'a [u8], fail_at: usize) -> Self {
            Self {
                data,
                pos: 0,
                fail_at,
                failed: false,
            }
        }
    }

    impl Read for Hiccup<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let mut end = self.data.len();
            if !self.failed {
                if self.pos == self.fail_at {
                    self.failed = true;
                    return Err(io::Error::new(io::ErrorKind::WouldBlock, "not ready"));
                }
                end = end.min(self.fail_at);
            }
            let n = buf.len().min(end - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Read to the end, retrying once after an I/O error.
    fn read_with_retry<R: Read>(reader: &mut GzipReader<R>) -> Result<Vec<u8>> {
        match read_all(reader, 64) {
            Err(OxiGzError::Io(_)) => read_all(reader, 64),
            other => other,
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut writer = GzipWriter::new(Vec::new()).mtime(0);
        writer.write_data(data).unwrap();
        writer.into_inner().unwrap()
    }

    fn read_all<R: Read>(reader: &mut GzipReader<R>, chunk: usize) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut buf = vec![0u8; chunk];
        loop {
            let n = reader.read_data(&mut buf)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&buf[..n]);
        }
    }

    #[test]
    fn test_gzip_roundtrip() {
        let original = b"Hello, GZIP World! This is a test of compression.";
        let compressed = gzip(original);
        let mut reader = GzipReader::new(&compressed[..]);
        assert_eq!(read_all(&mut reader, 4096).unwrap(), original);
        assert_eq!(reader.member_count(), 1);
        assert_eq!(reader.header().unwrap().mtime, 0);
    }

    #[test]
    fn test_one_byte_reads() {
        let original: Vec<u8> = (0..3000u32).map(|i| (i % 17) as u8).collect();
        let compressed = gzip(&original);
        let mut reader = GzipReader::with_capacity(3, &compressed[..]);
        assert_eq!(read_all(&mut reader, 1).unwrap(), original);
        assert_eq!(reader.total_in(), compressed.len() as u64);
    }

    #[test]
    fn test_empty_member_between_others() {
        let mut data = gzip(b"abc");
        data.extend(gzip(b""));
        data.extend(gzip(b"def"));

        let mut reader = GzipReader::new(&data[..]);
        assert_eq!(read_all(&mut reader, 64).unwrap(), b"abcdef");
        assert_eq!(reader.member_count(), 3);
    }

    #[test]
    fn test_header_fields_exposed() {
        let mut data = GzipHeader::new()
            .with_mtime(42)
            .with_filename("notes.txt")
            .unwrap()
            .to_bytes()
            .unwrap();
        // Payload and footer of an empty member
        data.extend_from_slice(&[0x03, 0x00, 0, 0, 0, 0, 0, 0, 0, 0]);

        let mut reader = GzipReader::new(&data[..]);
        assert_eq!(read_all(&mut reader, 16).unwrap(), b"");
        let header = reader.header().unwrap();
        assert_eq!(header.mtime, 42);
        assert_eq!(header.filename_str().unwrap(), "notes.txt");
        assert_eq!(header.flags(), flags::FNAME);
    }

    #[test]
    fn test_empty_buffer_reads_nothing() {
        let compressed = gzip(b"data");
        let mut reader = GzipReader::new(&compressed[..]);
        assert_eq!(reader.read_data(&mut []).unwrap(), 0);
        assert_eq!(reader.member_count(), 0);
    }

    #[test]
    fn test_truncated_payload() {
        let compressed = gzip(b"some data that will be cut off in the middle");
        let cut = &compressed[..compressed.len() - 12];
        let err = read_all(&mut GzipReader::new(cut), 64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn test_missing_footer() {
        let compressed = gzip(b"abc");
        let cut = &compressed[..compressed.len() - 3];
        let err = read_all(&mut GzipReader::new(cut), 64).unwrap_err();
        assert!(matches!(err, OxiGzError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_reader_poisoned_after_format_error() {
        let mut compressed = gzip(b"abc");
        let len = compressed.len();
        compressed[len - 8] ^= 0xFF;

        let mut reader = GzipReader::new(&compressed[..]);
        let err = read_all(&mut reader, 64).unwrap_err();
        assert!(matches!(err, OxiGzError::CrcMismatch { .. }));

        let err = reader.read_data(&mut [0u8; 64]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_io_read_reports_invalid_data() {
        let mut compressed = gzip(b"abc");
        compressed[0] = 0x1E;
        let mut out = Vec::new();
        let err = GzipReader::new(&compressed[..])
            .read_to_end(&mut out)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(matches!(
            OxiGzError::from_io(&err),
            Some(OxiGzError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn test_io_error_between_fields_is_retryable() {
        let compressed = gzip(b"hello world");
        // Before the header, inside the payload, and right before the footer
        for fail_at in [0, 12, compressed.len() - 8] {
            let mut reader = GzipReader::new(Hiccup::new(&compressed, fail_at));
            let out = read_with_retry(&mut reader).unwrap();
            assert_eq!(out, b"hello world", "fail_at {}", fail_at);
        }
    }

    #[test]
    fn test_io_error_inside_header_poisons() {
        let compressed = gzip(b"hello world");
        let mut reader = GzipReader::new(Hiccup::new(&compressed, 5));

        let err = reader.read_data(&mut [0u8; 64]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = reader.read_data(&mut [0u8; 64]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_io_error_inside_footer_poisons() {
        let compressed = gzip(b"hello world");
        let mut reader = GzipReader::new(Hiccup::new(&compressed, compressed.len() - 4));

        let err = read_all(&mut reader, 64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = reader.read_data(&mut [0u8; 64]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_read_header_sees_empty_first_member() {
        let first = {
            let mut writer = GzipWriter::new(Vec::new()).mtime(111);
            writer.finish().unwrap();
            writer.into_inner().unwrap()
        };
        let second = {
            let mut writer = GzipWriter::new(Vec::new()).mtime(222);
            writer.write_data(b"payload").unwrap();
            writer.into_inner().unwrap()
        };
        let mut data = first;
        data.extend(second);

        let mut reader = GzipReader::new(&data[..]);
        assert_eq!(reader.read_header().unwrap().unwrap().mtime, 111);
        // Already inside a member: no further header is parsed
        assert_eq!(reader.read_header().unwrap().unwrap().mtime, 111);
        assert_eq!(reader.member_count(), 1);

        assert_eq!(read_all(&mut reader, 64).unwrap(), b"payload");
        assert_eq!(reader.header().unwrap().mtime, 222);
        assert!(reader.read_header().unwrap().is_none());
    }

    #[test]
    fn test_read_header_on_corrupt_input_poisons() {
        let mut compressed = gzip(b"abc");
        compressed[2] = 9;
        let mut reader = GzipReader::new(&compressed[..]);
        assert!(reader.read_header().is_err());
        let err = reader.read_header().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}
