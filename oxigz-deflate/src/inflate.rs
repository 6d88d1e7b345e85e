//! Raw DEFLATE decompression (inflate).

use flate2::{Decompress, FlushDecompress, Status};
use oxigz_core::error::{OxiGzError, Result};
use oxigz_core::traits::{DecompressStatus, Decompressor};

/// Streaming raw DEFLATE decompressor.
///
/// Consumes only the bytes that belong to the DEFLATE stream: once the final
/// block has been decoded, `decompress` reports [`DecompressStatus::Done`]
/// and whatever follows in the input (a GZIP footer, for instance) is left
/// unconsumed.
#[derive(Debug)]
pub struct RawInflater {
    /// Underlying engine (raw mode).
    inner: Decompress,
    /// Whether the end of the stream was reached.
    finished: bool,
}

impl RawInflater {
    /// Create a new raw DEFLATE decompressor.
    pub fn new() -> Self {
        Self {
            inner: Decompress::new(false),
            finished: false,
        }
    }
}

impl Default for RawInflater {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for RawInflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        if self.finished {
            return Ok((0, 0, DecompressStatus::Done));
        }

        let before_in = self.inner.total_in();
        let before_out = self.inner.total_out();

        let status = self
            .inner
            .decompress(input, output, FlushDecompress::None)
            .map_err(|e| OxiGzError::corrupted(before_in, e.to_string()))?;

        let consumed = (self.inner.total_in() - before_in) as usize;
        let produced = (self.inner.total_out() - before_out) as usize;

        let status = match status {
            Status::StreamEnd => {
                self.finished = true;
                DecompressStatus::Done
            }
            Status::Ok | Status::BufError => {
                if !output.is_empty() && produced == output.len() {
                    DecompressStatus::NeedsOutput
                } else {
                    DecompressStatus::NeedsInput
                }
            }
        };

        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        self.inner.reset(false);
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
}

/// Decompress a complete raw DEFLATE stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = RawInflater::new();
    let mut output = Vec::new();
    let mut buffer = vec![0u8; 32768];
    let mut input = data;

    loop {
        let (consumed, produced, status) = inflater.decompress(input, &mut buffer)?;
        input = &input[consumed..];
        output.extend_from_slice(&buffer[..produced]);

        match status {
            DecompressStatus::Done => return Ok(output),
            DecompressStatus::NeedsInput if input.is_empty() => {
                return Err(OxiGzError::unexpected_eof("DEFLATE stream"));
            }
            DecompressStatus::NeedsInput | DecompressStatus::NeedsOutput => continue,
        }
    }
}
