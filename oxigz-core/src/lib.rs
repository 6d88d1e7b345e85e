//! # OxiGz Core
//!
//! Core components for the OxiGz streaming GZIP library.
//!
//! This crate provides the collaborators the GZIP framing layer is built on:
//!
//! - [`crc`]: CRC-32 accumulator (ISO 3309)
//! - [`input`]: Refillable byte source over any [`std::io::Read`]
//! - [`traits`]: Streaming compressor/decompressor traits
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiGz is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Tools                                               │
//! │     oxigz CLI                                           │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Container                                           │
//! │     GZIP header/footer framing, reader/writer           │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Codec                                               │
//! │     Raw DEFLATE engine adapters                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L0: Core (this crate)                                   │
//! │     InputBuffer, CRC-32, codec traits, errors           │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxigz_core::crc::Crc32;
//! use oxigz_core::input::InputBuffer;
//! use std::io::Cursor;
//!
//! // Pull single bytes from a source
//! let mut input = InputBuffer::new(Cursor::new(vec![0x1F, 0x8B]));
//! assert_eq!(input.read_byte().unwrap(), Some(0x1F));
//!
//! // Compute CRC-32
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crc;
pub mod error;
pub mod input;
pub mod traits;

// Re-exports for convenience
pub use crc::Crc32;
pub use error::{ErrorKind, OxiGzError, Result};
pub use input::InputBuffer;
pub use traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::crc::Crc32;
    pub use crate::error::{ErrorKind, OxiGzError, Result};
    pub use crate::input::InputBuffer;
    pub use crate::traits::{CompressionLevel, Compressor, Decompressor, FlushMode};
}
