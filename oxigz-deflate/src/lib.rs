//! # OxiGz Deflate
//!
//! Raw DEFLATE (RFC 1951) engines for the OxiGz container layer.
//!
//! The GZIP container supplies its own framing, so both engines run in *raw*
//! mode: no zlib header, no Adler-32 trailer. They are driven through the
//! streaming [`Compressor`](oxigz_core::Compressor) and
//! [`Decompressor`](oxigz_core::Decompressor) traits and report exact byte
//! counters, which is what the container needs to find the footer that
//! follows the compressed payload.
//!
//! The entropy coding itself is done by `flate2` (pure-Rust `miniz_oxide`
//! backend).
//!
//! ## Example
//!
//! ```rust
//! use oxigz_deflate::{deflate, inflate};
//!
//! // Compress data
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, 6).unwrap();
//!
//! // Decompress data
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast compression
//! - Level 4-6: Balanced (default is 6)
//! - Level 7-9: Best compression (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod inflate;

// Re-exports
pub use deflate::{RawDeflater, deflate};
pub use inflate::{RawInflater, inflate};
