//! CLI argument parsing and configuration

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// mixmap - musical key and energy-structure analysis for DJs
///
/// Estimates the key (with Camelot code) and a coarse drop/breakdown map with
/// mix points for audio files. Outputs JSON and Rekordbox-compatible XML, or
/// serves the same analysis over HTTP.
#[derive(Parser, Debug)]
#[command(name = "mixmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only, no progress bars)
    #[arg(short, long, default_value = "false", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a file or directory and write JSON / Rekordbox XML
    Analyze(AnalyzeArgs),
    /// Serve the analysis over HTTP
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Input path (file or directory)
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Output directory for XML/JSON files
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Number of worker threads (defaults to CPU count - 1)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Scan subdirectories recursively
    #[arg(short, long, default_value = "true")]
    pub recursive: bool,

    /// Overwrite existing analysis (by default, skips already-analyzed files)
    #[arg(long, default_value = "false")]
    pub force: bool,

    /// Output JSON in addition to Rekordbox XML
    #[arg(long, default_value = "true")]
    pub json: bool,

    /// Dry run - show files that would be analyzed without processing
    #[arg(long, default_value = "false")]
    pub dry_run: bool,

    /// Abort a single track's analysis after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub structure: StructureArgs,
}

/// Structure-analysis knobs shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct StructureArgs {
    /// Seconds between segment samples
    #[arg(long, default_value = "5.0", value_name = "SECS")]
    pub segment_interval: f64,

    /// Minimum normalized bass jump for a mix point
    #[arg(long, default_value = "0.3", value_name = "LEVEL")]
    pub jump_threshold: f64,

    /// Minimum seconds between reported mix points
    #[arg(long, default_value = "10.0", value_name = "SECS")]
    pub debounce: f64,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1:8000", value_name = "ADDR")]
    pub bind: SocketAddr,

    /// Maximum analyses running at once (defaults to CPU count)
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Per-request analysis timeout in seconds
    #[arg(long, default_value = "120", value_name = "SECS")]
    pub timeout: u64,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "256", value_name = "MB")]
    pub max_upload_mb: usize,

    #[command(flatten)]
    pub structure: StructureArgs,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
