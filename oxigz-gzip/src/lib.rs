//! # OxiGz GZIP
//!
//! Streaming GZIP (RFC 1952) framing over a raw DEFLATE engine.
//!
//! - [`GzipReader`]: decodes one or more concatenated members from any
//!   [`std::io::Read`], verifying every footer
//! - [`GzipWriter`]: encodes a single member to any [`std::io::Write`]
//! - [`GzipHeader`] / [`GzipFooter`]: member framing records
//!
//! ## Example
//!
//! ```rust
//! use oxigz_gzip::{compress, decompress};
//!
//! // Compress data
//! let data = b"Hello, World!";
//! let compressed = compress(data, 6).unwrap();
//!
//! // Decompress data
//! let decompressed = decompress(&compressed[..]).unwrap();
//! assert_eq!(decompressed, data);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod header;
pub mod reader;
pub mod writer;

pub use format::{
    CM_DEFLATE, FOOTER_LEN, GZIP_MAGIC, HEADER_LEN, MAX_FIELD_LEN, OS_UNKNOWN, flags,
};
pub use header::{GzipFooter, GzipHeader};
pub use reader::GzipReader;
pub use writer::{GzipWriter, OutputState};

use oxigz_core::error::Result;
use oxigz_core::traits::CompressionLevel;
use std::io::Read;

/// Compress data into a single GZIP member.
pub fn compress(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut writer = GzipWriter::with_level(Vec::new(), CompressionLevel::new(level));
    writer.write_data(data)?;
    writer.into_inner()
}

/// Decompress every member of a GZIP stream.
pub fn decompress<R: Read>(reader: R) -> Result<Vec<u8>> {
    let mut reader = GzipReader::new(reader);
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];

    loop {
        let n = reader.read_data(&mut buffer)?;
        if n == 0 {
            return Ok(output);
        }
        output.extend_from_slice(&buffer[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress() {
        let data = b"Hello, World! Hello, World! Hello, World!";
        let compressed = compress(data, 6).unwrap();
        assert_eq!(&compressed[..2], &GZIP_MAGIC);
        assert_eq!(decompress(&compressed[..]).unwrap(), data);
    }

    #[test]
    fn test_compress_store_level() {
        let data: Vec<u8> = (0..=255u8).collect();
        let compressed = compress(&data, 0).unwrap();
        // Stored blocks add framing but never shrink
        assert!(compressed.len() > data.len());
        assert_eq!(decompress(&compressed[..]).unwrap(), data);
    }
}
