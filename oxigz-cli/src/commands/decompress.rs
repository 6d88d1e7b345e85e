//! Decompress command implementation.

use crate::utils::{create_progress_bar, decompressed_path, space_savings};
use filetime::FileTime;
use oxigz_gzip::GzipReader;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub fn cmd_decompress(
    input: &Path,
    output: Option<&Path>,
    keep: bool,
    verbose: bool,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => decompressed_path(input)?,
    };

    let compressed_size = fs::metadata(input)?.len();
    let pb = create_progress_bar(compressed_size, progress);
    let source = pb.wrap_read(BufReader::new(File::open(input)?));
    let mut reader = GzipReader::new(source);

    let mut sink = BufWriter::new(File::create(&output)?);
    let result = copy_members(&mut reader, &mut sink);
    pb.finish_and_clear();

    let (size, mtime) = match result {
        Ok(done) => done,
        Err(e) => {
            drop(sink);
            let _ = fs::remove_file(&output);
            return Err(e);
        }
    };
    drop(sink);

    if mtime != 0 {
        let time = FileTime::from_unix_time(i64::from(mtime), 0);
        if let Err(e) = filetime::set_file_mtime(&output, time) {
            eprintln!("Warning: {}: cannot restore modification time: {}", output.display(), e);
        }
    }

    if verbose {
        println!(
            "{}: {:.1}% -- {} -> {} ({} members, {} -> {} bytes)",
            input.display(),
            space_savings(size, compressed_size),
            input.display(),
            output.display(),
            reader.member_count(),
            compressed_size,
            size
        );
    }

    if !keep {
        fs::remove_file(input)?;
    }

    Ok(())
}

/// Decode every member into `sink`, returning the decompressed size and the
/// first member's modification time.
fn copy_members<R: Read, W: Write>(
    reader: &mut GzipReader<R>,
    sink: &mut W,
) -> Result<(u64, u32), Box<dyn std::error::Error>> {
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    let mtime = reader.read_header()?.map_or(0, |h| h.mtime);

    loop {
        let n = reader.read_data(&mut buf)?;
        if n == 0 {
            break;
        }
        sink.write_all(&buf[..n])?;
        total += n as u64;
    }
    sink.flush()?;

    Ok((total, mtime))
}
