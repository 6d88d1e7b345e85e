//! Error types for OxiGz operations.
//!
//! Every failure is classified by [`ErrorKind`] so callers can tell a
//! malformed stream apart from a truncated one, a misuse of the API, or a
//! transient I/O failure of the underlying source/sink.

use std::io;
use thiserror::Error;

/// Broad classification of an [`OxiGzError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The stream violates the GZIP/DEFLATE format. Not retryable.
    Format,
    /// The stream ended in the middle of a header, payload or footer.
    TruncatedInput,
    /// The caller broke an API contract (e.g. wrote after finishing).
    InvalidState,
    /// The underlying reader/writer failed.
    Io,
}

/// The main error type for OxiGz operations.
#[derive(Debug, Error)]
pub enum OxiGzError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic number in member header.
    #[error("Invalid magic number: expected {expected:02x?}, found {found:02x?}")]
    InvalidMagic {
        /// Expected magic bytes.
        expected: Vec<u8>,
        /// Actual magic bytes found.
        found: Vec<u8>,
    },

    /// Unsupported compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method byte.
        method: u8,
    },

    /// Reserved flag bits are set in the member header.
    #[error("Reserved flag bits set: {flags:#04x}")]
    ReservedFlags {
        /// The full flag byte.
        flags: u8,
    },

    /// Header CRC16 mismatch.
    #[error("Header CRC mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    HeaderCrcMismatch {
        /// Header CRC stored in the stream.
        expected: u16,
        /// Low 16 bits of the CRC-32 over the header bytes.
        computed: u16,
    },

    /// CRC checksum mismatch.
    #[error("CRC mismatch: expected {expected:#x}, computed {computed:#x}")]
    CrcMismatch {
        /// Expected CRC value from the footer.
        expected: u32,
        /// Computed CRC value from the decompressed data.
        computed: u32,
    },

    /// Uncompressed size (mod 2^32) mismatch.
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Size stored in the footer.
        expected: u32,
        /// Size of the decompressed data, modulo 2^32.
        actual: u32,
    },

    /// Corrupted compressed data.
    #[error("Corrupted data at offset {offset}: {message}")]
    CorruptedData {
        /// Byte offset (into the compressed payload) where corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Unexpected end of file.
    #[error("Unexpected end of stream while reading {context}")]
    UnexpectedEof {
        /// What was being read when the stream ended.
        context: &'static str,
    },

    /// Operation not allowed in the current state.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the violated contract.
        message: String,
    },
}

/// Result type alias for OxiGz operations.
pub type Result<T> = std::result::Result<T, OxiGzError>;

impl OxiGzError {
    /// Create an invalid magic error.
    pub fn invalid_magic(expected: impl Into<Vec<u8>>, found: impl Into<Vec<u8>>) -> Self {
        Self::InvalidMagic {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unsupported method error.
    pub fn unsupported_method(method: u8) -> Self {
        Self::UnsupportedMethod { method }
    }

    /// Create a reserved flags error.
    pub fn reserved_flags(flags: u8) -> Self {
        Self::ReservedFlags { flags }
    }

    /// Create a header CRC mismatch error.
    pub fn header_crc_mismatch(expected: u16, computed: u16) -> Self {
        Self::HeaderCrcMismatch { expected, computed }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a size mismatch error.
    pub fn size_mismatch(expected: u32, actual: u32) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof(context: &'static str) -> Self {
        Self::UnexpectedEof { context }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::UnexpectedEof { .. } => ErrorKind::TruncatedInput,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InvalidMagic { .. }
            | Self::UnsupportedMethod { .. }
            | Self::ReservedFlags { .. }
            | Self::HeaderCrcMismatch { .. }
            | Self::CrcMismatch { .. }
            | Self::SizeMismatch { .. }
            | Self::CorruptedData { .. } => ErrorKind::Format,
        }
    }

    /// Whether the stream can no longer be decoded after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Format | ErrorKind::TruncatedInput)
    }

    /// Recover the OxiGz error carried by an [`io::Error`] produced by the
    /// `Read`/`Write` adapters, if any.
    pub fn from_io(err: &io::Error) -> Option<&OxiGzError> {
        err.get_ref()?.downcast_ref::<OxiGzError>()
    }
}

impl From<OxiGzError> for io::Error {
    fn from(err: OxiGzError) -> Self {
        match err {
            OxiGzError::Io(inner) => inner,
            other => {
                let kind = match other.kind() {
                    ErrorKind::Format => io::ErrorKind::InvalidData,
                    ErrorKind::TruncatedInput => io::ErrorKind::UnexpectedEof,
                    ErrorKind::InvalidState | ErrorKind::Io => io::ErrorKind::Other,
                };
                io::Error::new(kind, other)
            }
        }
    }
}
