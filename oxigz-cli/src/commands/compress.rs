//! Compress command implementation.

use crate::utils::{compressed_path, create_progress_bar, has_gz_suffix, space_savings};
use clap::ValueEnum;
use oxigz_gzip::GzipWriter;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Compression level preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum CompressionLevel {
    /// Store without compression
    Store,
    /// Fast compression
    Fast,
    /// Normal compression (default)
    #[default]
    Normal,
    /// Best compression
    Best,
}

impl CompressionLevel {
    fn to_level(self) -> oxigz_core::CompressionLevel {
        match self {
            CompressionLevel::Store => oxigz_core::CompressionLevel::NONE,
            CompressionLevel::Fast => oxigz_core::CompressionLevel::FAST,
            CompressionLevel::Normal => oxigz_core::CompressionLevel::DEFAULT,
            CompressionLevel::Best => oxigz_core::CompressionLevel::BEST,
        }
    }
}

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    compression: CompressionLevel,
    keep: bool,
    verbose: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if output.is_none() && has_gz_suffix(input) {
        return Err(format!("{} already has .gz suffix", input.display()).into());
    }
    let output = output.map_or_else(|| compressed_path(input), Path::to_path_buf);

    let metadata = fs::metadata(input)?;
    if metadata.is_dir() {
        return Err(format!("{} is a directory", input.display()).into());
    }

    // Record the input's modification time in the header
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| u32::try_from(d.as_secs()).unwrap_or(0));

    let pb = create_progress_bar(metadata.len(), progress);
    let mut source = pb.wrap_read(BufReader::new(File::open(input)?));

    let sink = BufWriter::new(File::create(&output)?);
    let mut writer = GzipWriter::with_level(sink, compression.to_level()).mtime(mtime);

    let copied = io::copy(&mut source, &mut writer);
    let closed = writer.close();
    pb.finish_and_clear();

    if let Err(e) = copied.map_err(Into::into).and(closed) {
        let _ = fs::remove_file(&output);
        return Err(e.into());
    }

    let compressed_size = fs::metadata(&output)?.len();
    if verbose {
        println!(
            "{}: {:.1}% -- {} -> {} ({} -> {} bytes)",
            input.display(),
            space_savings(metadata.len(), compressed_size),
            input.display(),
            output.display(),
            metadata.len(),
            compressed_size
        );
    }

    if !keep {
        fs::remove_file(input)?;
    }

    Ok(())
}
