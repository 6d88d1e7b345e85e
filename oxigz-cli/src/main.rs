//! OxiGz CLI - The Oxidized Gzip
//!
//! A Pure Rust streaming GZIP (RFC 1952) compressor and decompressor.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{CompressionLevel, cmd_compress, cmd_decompress, cmd_info, cmd_test};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxigz")]
#[command(author, version, about = "The Oxidized Gzip - Pure Rust GZIP utility")]
#[command(long_about = "
OxiGz compresses and decompresses GZIP (RFC 1952) files as a stream.
Multi-member files are decoded as one continuous stream.

Examples:
  oxigz compress notes.txt
  oxigz compress -l best -k notes.txt
  oxigz decompress notes.txt.gz
  oxigz decompress -o out.txt notes.txt.gz
  oxigz test notes.txt.gz
  oxigz info --json notes.txt.gz
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file to FILE.gz
    #[command(alias = "c")]
    Compress {
        /// File to compress
        file: PathBuf,

        /// Output file (default: FILE.gz)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression level
        #[arg(short = 'l', long, value_enum, default_value = "normal")]
        compression: CompressionLevel,

        /// Keep the input file
        #[arg(short, long)]
        keep: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress a .gz file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        file: PathBuf,

        /// Output file (default: FILE without .gz)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the input file
        #[arg(short, long)]
        keep: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Test file integrity
    #[command(alias = "t")]
    Test {
        /// File to test
        file: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show member headers and sizes
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            file,
            output,
            compression,
            keep,
            verbose,
            progress,
        } => cmd_compress(
            &file,
            output.as_deref(),
            compression,
            keep,
            verbose,
            progress,
        ),
        Commands::Decompress {
            file,
            output,
            keep,
            verbose,
            progress,
        } => cmd_decompress(&file, output.as_deref(), keep, verbose, progress),
        Commands::Test { file, verbose } => cmd_test(&file, verbose),
        Commands::Info { file, json } => cmd_info(&file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
