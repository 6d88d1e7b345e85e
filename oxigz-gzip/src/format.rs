//! GZIP format constants (RFC 1952).

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Size of the fixed part of a member header.
pub const HEADER_LEN: usize = 10;

/// Size of a member footer (CRC32 + ISIZE).
pub const FOOTER_LEN: usize = 8;

/// Longest filename or comment kept when parsing a header.
pub const MAX_FIELD_LEN: usize = 64 * 1024;

/// Operating system byte for "unknown".
pub const OS_UNKNOWN: u8 = 255;

/// GZIP header flags.
pub mod flags {
    /// Text file.
    pub const FTEXT: u8 = 0x01;
    /// Header CRC present.
    pub const FHCRC: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Bits that must be zero.
    pub const RESERVED: u8 = 0xE0;
}
