//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to compressed files.
pub const GZ_SUFFIX: &str = ".gz";

/// Create a byte-count progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Whether the path already carries the `.gz` suffix.
pub fn has_gz_suffix(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Default output path for compression: `FILE` -> `FILE.gz`.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(GZ_SUFFIX);
    PathBuf::from(name)
}

/// Default output path for decompression: `FILE.gz` -> `FILE`.
pub fn decompressed_path(input: &Path) -> Result<PathBuf, String> {
    if !has_gz_suffix(input) {
        return Err(format!(
            "{}: unknown suffix, use -o to name the output",
            input.display()
        ));
    }
    Ok(input.with_extension(""))
}

/// Space saved by compression, in percent.
pub fn space_savings(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}
