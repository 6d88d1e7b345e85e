//! Core traits for streaming compression.
//!
//! The GZIP container never looks inside the compressed payload; it drives a
//! codec through these traits and only relies on the byte counters and the
//! completion flag they report.

use crate::error::{OxiGzError, Result};

/// Status of a streaming decompression operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// More input is needed to continue decompression.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// The end of the compressed stream was reached.
    Done,
}

/// Status of a streaming compression operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStatus {
    /// More input data can be accepted.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// Compression is complete.
    Done,
}

/// Flush mode for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// No flush - buffer data for best compression.
    #[default]
    None,
    /// Sync flush - emit all pending output on a byte boundary.
    Sync,
    /// Finish - complete the stream.
    Finish,
}

/// A streaming decompressor (decoder).
pub trait Decompressor {
    /// Decompress data from input to output.
    ///
    /// # Arguments
    ///
    /// * `input` - Input compressed data
    /// * `output` - Output buffer for decompressed data
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status).
    /// Bytes of `input` beyond the consumed count were not used and must be
    /// offered again.
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// Reset the decompressor to its initial state.
    fn reset(&mut self);

    /// Check if the end of the compressed stream was reached.
    fn is_finished(&self) -> bool;

    /// Total compressed bytes consumed since the last reset.
    fn total_in(&self) -> u64;

    /// Total decompressed bytes produced since the last reset.
    fn total_out(&self) -> u64;
}

/// A streaming compressor (encoder).
pub trait Compressor {
    /// Compress data from input to output.
    ///
    /// # Arguments
    ///
    /// * `input` - Input data to compress
    /// * `output` - Output buffer for compressed data
    /// * `flush` - Flush mode
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status)
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)>;

    /// Reset the compressor to its initial state.
    fn reset(&mut self);

    /// Check if the compressor has finished.
    fn is_finished(&self) -> bool;

    /// Total uncompressed bytes consumed since the last reset.
    fn total_in(&self) -> u64;

    /// Total compressed bytes produced since the last reset.
    fn total_out(&self) -> u64;

    /// Current compression level.
    fn level(&self) -> CompressionLevel;

    /// Change the compression level.
    fn set_level(&mut self, level: CompressionLevel) -> Result<()>;
}

/// Compression level for algorithms that support it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (store only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Lowest valid level.
    pub const MIN: u8 = 0;
    /// Highest valid level.
    pub const MAX: u8 = 9;

    /// Create a custom compression level (0-9).
    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX))
    }

    /// Create a level from a signed value, rejecting anything below
    /// [`CompressionLevel::MIN`]. Values above the maximum are clamped.
    pub fn try_new(level: i32) -> Result<Self> {
        if level < i32::from(Self::MIN) {
            return Err(OxiGzError::invalid_state(format!(
                "compression level {} is below the minimum {}",
                level,
                Self::MIN
            )));
        }
        Ok(Self::new(level.min(i32::from(Self::MAX)) as u8))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}
