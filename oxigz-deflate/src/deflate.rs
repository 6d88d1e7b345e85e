//! Raw DEFLATE compression.

use flate2::{Compress, Compression, FlushCompress, Status};
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::{CompressStatus, CompressionLevel, Compressor, FlushMode};

/// Streaming raw DEFLATE compressor.
#[derive(Debug)]
pub struct RawDeflater {
    /// Underlying engine (raw mode).
    inner: Compress,
    /// Compression level.
    level: CompressionLevel,
    /// Whether the final block has been written.
    finished: bool,
}

impl RawDeflater {
    /// Create a new raw DEFLATE compressor with the specified level.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            inner: Self::engine(level),
            level,
            finished: false,
        }
    }

    fn engine(level: CompressionLevel) -> Compress {
        Compress::new(Compression::new(u32::from(level.level())), false)
    }
}

impl Default for RawDeflater {
    fn default() -> Self {
        Self::new(CompressionLevel::DEFAULT)
    }
}

impl Compressor for RawDeflater {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        if self.finished {
            return Ok((0, 0, CompressStatus::Done));
        }

        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();

        let flush = match flush {
            FlushMode::None => FlushCompress::None,
            FlushMode::Sync => FlushCompress::Sync,
            FlushMode::Finish => FlushCompress::Finish,
        };

        let status = self
            .inner
            .compress(input, output, flush)
            .map_err(|e| OxiGzError::corrupted(before_out, e.to_string()))?;

        let consumed = (self.inner.total_in() - before_in) as usize;
        let produced = (self.inner.total_out() - before_out) as usize;

        let status = match status {
            Status::StreamEnd => {
                self.finished = true;
                CompressStatus::Done
            }
            Status::Ok | Status::BufError => {
                if !output.is_empty() && produced == output.len() {
                    CompressStatus::NeedsOutput
                } else {
                    CompressStatus::NeedsInput
                }
            }
        };

        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.finished = false;
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn total_in(&self) -> u64 {
        self.inner.total_in()
    }

    fn total_out(&self) -> u64 {
        self.inner.total_out()
    }

    fn level(&self) -> CompressionLevel {
        self.level
    }

    /// The engine cannot be retuned once it holds stream state, so the level
    /// may only change before the first byte is compressed.
    fn set_level(&mut self, level: CompressionLevel) -> Result<()> {
        if level == self.level {
            return Ok(());
        }
        if self.inner.total_in() != 0 || self.inner.total_out() != 0 {
            return Err(OxiGzError::invalid_state(
                "compression level cannot change after data has been compressed",
            ));
        }
        self.inner = Self::engine(level);
        self.level = level;
        Ok(())
    }
}

/// Compress data into a complete raw DEFLATE stream.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = RawDeflater::new(CompressionLevel::new(level));
    let mut output = Vec::with_capacity(data.len() / 2 + 64);
    let mut buffer = vec![0u8; 32768];
    let mut input = data;

    loop {
        let (consumed, produced, status) =
            deflater.compress(input, &mut buffer, FlushMode::Finish)?;
        input = &input[consumed..];
        output.extend_from_slice(&buffer[..produced]);

        if status == CompressStatus::Done {
            return Ok(output);
        }
    }
}
