//! GZIP member header and footer.

use crate::format::{
    CM_DEFLATE, FOOTER_LEN, GZIP_MAGIC, HEADER_LEN, MAX_FIELD_LEN, OS_UNKNOWN, flags,
};
use encoding_rs::mem::{decode_latin1, encode_latin1_lossy, is_str_latin1};
use oxigz_core::Crc32;
use oxigz_core::InputBuffer;
use oxigz_core::error::{OxiGzError, Result};
use std::borrow::Cow;
use std::io::{Read, Write};
use std::time::{SystemTime, UNIX_EPOCH};

/// GZIP member header.
///
/// Name and comment are kept as raw bytes; RFC 1952 specifies ISO 8859-1 for
/// both, see [`GzipHeader::filename_str`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// FTEXT: the payload is probably text.
    pub text: bool,
    /// Modification time (Unix timestamp, 0 if unknown).
    pub mtime: u32,
    /// Extra flags.
    pub xfl: u8,
    /// Operating system.
    pub os: u8,
    /// Extra field (if FEXTRA flag set).
    pub extra: Option<Vec<u8>>,
    /// Original filename (if FNAME flag set).
    pub filename: Option<Vec<u8>>,
    /// Comment (if FCOMMENT flag set).
    pub comment: Option<Vec<u8>>,
    /// FHCRC: the header carries a CRC16 of itself.
    pub header_crc: bool,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            text: false,
            mtime: 0,
            xfl: 0,
            os: OS_UNKNOWN,
            extra: None,
            filename: None,
            comment: None,
            header_crc: false,
        }
    }
}

impl GzipHeader {
    /// Create a new GZIP header with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the modification time.
    pub fn with_mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    /// Set the modification time to now.
    pub fn with_mtime_now(mut self) -> Self {
        self.mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        self
    }

    /// Set the original filename (stored as ISO 8859-1).
    ///
    /// Fails if the name has characters outside U+0000..=U+00FF.
    pub fn with_filename(mut self, filename: &str) -> Result<Self> {
        self.filename = Some(latin1("filename", filename)?);
        Ok(self)
    }

    /// Set the comment (stored as ISO 8859-1).
    ///
    /// Fails if the comment has characters outside U+0000..=U+00FF.
    pub fn with_comment(mut self, comment: &str) -> Result<Self> {
        self.comment = Some(latin1("comment", comment)?);
        Ok(self)
    }

    /// Set the extra field.
    pub fn with_extra(mut self, extra: impl Into<Vec<u8>>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Set the FTEXT flag.
    pub fn with_text(mut self, text: bool) -> Self {
        self.text = text;
        self
    }

    /// Protect the header with a CRC16.
    pub fn with_header_crc(mut self, header_crc: bool) -> Self {
        self.header_crc = header_crc;
        self
    }

    /// Flag byte describing which optional fields are present.
    pub fn flags(&self) -> u8 {
        let mut flg = 0;
        if self.text {
            flg |= flags::FTEXT;
        }
        if self.header_crc {
            flg |= flags::FHCRC;
        }
        if self.extra.is_some() {
            flg |= flags::FEXTRA;
        }
        if self.filename.is_some() {
            flg |= flags::FNAME;
        }
        if self.comment.is_some() {
            flg |= flags::FCOMMENT;
        }
        flg
    }

    /// Original filename decoded from ISO 8859-1.
    pub fn filename_str(&self) -> Option<Cow<'_, str>> {
        self.filename.as_deref().map(decode_latin1)
    }

    /// Comment decoded from ISO 8859-1.
    pub fn comment_str(&self) -> Option<Cow<'_, str>> {
        self.comment.as_deref().map(decode_latin1)
    }

    /// Serialize the header.
    ///
    /// Name and comment are cut at their first NUL byte, if any.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(HEADER_LEN);

        // Magic, method, flags
        out.extend_from_slice(&GZIP_MAGIC);
        out.push(CM_DEFLATE);
        out.push(self.flags());

        // Modification time
        out.extend_from_slice(&self.mtime.to_le_bytes());

        // XFL and OS
        out.push(self.xfl);
        out.push(self.os);

        if let Some(ref extra) = self.extra {
            let xlen = u16::try_from(extra.len()).map_err(|_| {
                OxiGzError::invalid_state(format!(
                    "extra field is {} bytes, at most {} fit in a header",
                    extra.len(),
                    u16::MAX
                ))
            })?;
            out.extend_from_slice(&xlen.to_le_bytes());
            out.extend_from_slice(extra);
        }

        for field in [&self.filename, &self.comment].into_iter().flatten() {
            let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
            out.extend_from_slice(&field[..end]);
            out.push(0);
        }

        if self.header_crc {
            let crc16 = Crc32::compute(&out) as u16;
            out.extend_from_slice(&crc16.to_le_bytes());
        }

        Ok(out)
    }

    /// Write the header to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    /// Read the next member header.
    ///
    /// Returns `Ok(None)` if the input ends cleanly before the first byte.
    /// Running out of input anywhere after that is an error.
    pub fn read_from<R: Read>(input: &mut InputBuffer<R>) -> Result<Option<Self>> {
        let Some(id1) = input.read_byte()? else {
            return Ok(None);
        };

        let mut bytes = HeaderBytes {
            input,
            crc: Crc32::new(),
        };
        bytes.crc.update_byte(id1);

        // Check magic
        if id1 != GZIP_MAGIC[0] {
            return Err(OxiGzError::invalid_magic(GZIP_MAGIC, [id1]));
        }
        let id2 = bytes.byte()?;
        if id2 != GZIP_MAGIC[1] {
            return Err(OxiGzError::invalid_magic(GZIP_MAGIC, [id1, id2]));
        }

        let method = bytes.byte()?;
        if method != CM_DEFLATE {
            return Err(OxiGzError::unsupported_method(method));
        }

        let flg = bytes.byte()?;
        if flg & flags::RESERVED != 0 {
            return Err(OxiGzError::reserved_flags(flg));
        }

        let mtime = bytes.le_u32()?;
        let xfl = bytes.byte()?;
        let os = bytes.byte()?;

        let extra = if flg & flags::FEXTRA != 0 {
            let xlen = bytes.le_u16()? as usize;
            Some(bytes.take(xlen)?)
        } else {
            None
        };

        let filename = if flg & flags::FNAME != 0 {
            Some(bytes.until_nul()?)
        } else {
            None
        };

        let comment = if flg & flags::FCOMMENT != 0 {
            Some(bytes.until_nul()?)
        } else {
            None
        };

        // Header CRC
        if flg & flags::FHCRC != 0 {
            let computed = bytes.crc.value() as u16;
            let stored = bytes.le_u16()?;
            if stored != computed {
                return Err(OxiGzError::header_crc_mismatch(stored, computed));
            }
        }

        Ok(Some(Self {
            text: flg & flags::FTEXT != 0,
            mtime,
            xfl,
            os,
            extra,
            filename,
            comment,
            header_crc: flg & flags::FHCRC != 0,
        }))
    }
}

/// Header bytes pulled from the input, each one folded into the header CRC.
struct HeaderBytes<'a, R: Read> {
    input: &'a mut InputBuffer<R>,
    crc: Crc32,
}

impl<R: Read> HeaderBytes<'_, R> {
    fn byte(&mut self) -> Result<u8> {
        let byte = self
            .input
            .read_byte()?
            .ok_or_else(|| OxiGzError::unexpected_eof("GZIP header"))?;
        self.crc.update_byte(byte);
        Ok(byte)
    }

    fn le_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes([self.byte()?, self.byte()?]))
    }

    fn le_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes([
            self.byte()?,
            self.byte()?,
            self.byte()?,
            self.byte()?,
        ]))
    }

    fn take(&mut self, len: usize) -> Result<Vec<u8>> {
        (0..len).map(|_| self.byte()).collect()
    }

    /// Read a NUL-terminated field, dropping the terminator.
    ///
    /// Only the first [`MAX_FIELD_LEN`] bytes are kept; the rest still feed
    /// the header CRC.
    fn until_nul(&mut self) -> Result<Vec<u8>> {
        let mut field = Vec::new();
        loop {
            match self.byte()? {
                0 => return Ok(field),
                b if field.len() < MAX_FIELD_LEN => field.push(b),
                _ => {}
            }
        }
    }
}

fn latin1(what: &str, s: &str) -> Result<Vec<u8>> {
    if !is_str_latin1(s) {
        return Err(OxiGzError::invalid_state(format!(
            "{} {:?} is not representable in ISO 8859-1",
            what, s
        )));
    }
    Ok(encode_latin1_lossy(s).into_owned())
}

/// GZIP member footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipFooter {
    /// CRC-32 of the uncompressed payload.
    pub crc: u32,
    /// Size of the uncompressed payload modulo 2^32 (ISIZE).
    pub size: u32,
}

impl GzipFooter {
    /// Serialize the footer.
    pub fn to_bytes(&self) -> [u8; FOOTER_LEN] {
        let mut out = [0u8; FOOTER_LEN];
        out[..4].copy_from_slice(&self.crc.to_le_bytes());
        out[4..].copy_from_slice(&self.size.to_le_bytes());
        out
    }

    /// Write the footer to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a footer; all eight bytes must be present.
    pub fn read_from<R: Read>(input: &mut InputBuffer<R>) -> Result<Self> {
        let mut buf = [0u8; FOOTER_LEN];
        for slot in buf.iter_mut() {
            *slot = input
                .read_byte()?
                .ok_or_else(|| OxiGzError::unexpected_eof("GZIP footer"))?;
        }
        Ok(Self {
            crc: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            size: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    /// Check the footer against the CRC and size of the data actually
    /// decompressed.
    pub fn verify(&self, crc: u32, size: u32) -> Result<()> {
        if self.crc != crc {
            return Err(OxiGzError::crc_mismatch(self.crc, crc));
        }
        if self.size != size {
            return Err(OxiGzError::size_mismatch(self.size, size));
        }
        Ok(())
    }
}
