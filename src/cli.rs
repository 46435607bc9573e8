use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Compression format for data files
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Gzip compression (.gz) - Most common, good balance of speed and compression
    Gzip,
    /// Zstandard compression (.zst) - Modern, fast compression with good ratios
    Zstd,
    /// Bzip2 compression (.bz2) - Good compression ratio, slower than gzip
    Bzip2,
    /// XZ compression (.xz) - Excellent compression ratio, slower than bzip2
    Xz,
}

/// Command-line arguments for datadash
#[derive(Parser, Debug)]
#[command(version, about = "datadash - data dashboard in the terminal")]
pub struct Args {
    /// Delimited file to open (csv, tsv, psv). Without it the dashboard
    /// starts with the open-file prompt.
    pub path: Option<PathBuf>,

    /// Skip this many rows when reading a file
    #[arg(long = "skip-rows")]
    pub skip_rows: Option<usize>,

    /// Specify that the file has no header
    #[arg(long = "no-header", action)]
    pub no_header: bool,

    /// Specify the delimiter to use when reading a file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify the compression format explicitly (gzip, zstd, bzip2, xz)
    /// If not specified, compression is auto-detected from file extension.
    #[arg(long = "compression", value_enum)]
    pub compression: Option<CompressionFormat>,

    /// Initial number of rows shown in the dataset preview (default: 5)
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,

    /// Initial number of leading rows used for charts (default: 10)
    #[arg(long = "viz-rows")]
    pub viz_rows: Option<usize>,

    /// Enable debug mode: debug bar and log file
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write logs to this file instead of the cache directory
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Overwrite an existing configuration file with --generate-config
    #[arg(long = "force", action, requires = "generate_config")]
    pub force: bool,
}
