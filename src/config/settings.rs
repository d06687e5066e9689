//! Runtime configuration settings

use super::analysis::AnalysisConfig;
use super::cli::{AnalyzeArgs, ServeArgs, StructureArgs};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings for the batch analysis pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Input path (file or directory)
    pub input: PathBuf,
    /// Output directory
    pub output: PathBuf,
    /// Number of analysis worker threads
    pub analysis_threads: usize,
    /// Scan recursively
    pub recursive: bool,
    /// Overwrite existing analysis
    pub force: bool,
    /// Output JSON
    pub output_json: bool,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show files without processing
    pub dry_run: bool,
    /// Per-track analysis deadline
    pub track_timeout: Option<Duration>,
    /// Feature and structure parameters
    pub analysis: AnalysisConfig,
}

impl Settings {
    /// Create settings from the `analyze` subcommand arguments
    pub fn from_args(args: &AnalyzeArgs, quiet: bool) -> Self {
        let default_threads = num_cpus::get().saturating_sub(1).max(1);

        Self {
            input: args.input.clone(),
            output: args.output.clone(),
            analysis_threads: args.threads.unwrap_or(default_threads),
            recursive: args.recursive,
            force: args.force,
            output_json: args.json,
            show_progress: !quiet,
            dry_run: args.dry_run,
            track_timeout: args.timeout.map(Duration::from_secs),
            analysis: analysis_config_from(&args.structure),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("./output"),
            analysis_threads: num_cpus::get().saturating_sub(1).max(1),
            recursive: true,
            force: false,
            output_json: true,
            show_progress: true,
            dry_run: false,
            track_timeout: None,
            analysis: AnalysisConfig::default(),
        }
    }
}

/// Runtime settings for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bind: SocketAddr,
    /// Upper bound on analyses running at once
    pub max_concurrent: usize,
    /// Deadline for decode + analysis of one upload
    pub request_timeout: Duration,
    /// Maximum accepted request body in bytes
    pub max_upload_bytes: usize,
    pub analysis: AnalysisConfig,
}

impl ServerSettings {
    pub fn from_args(args: &ServeArgs) -> Self {
        Self {
            bind: args.bind,
            max_concurrent: args.max_concurrent.unwrap_or_else(num_cpus::get).max(1),
            request_timeout: Duration::from_secs(args.timeout),
            max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
            analysis: analysis_config_from(&args.structure),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            max_concurrent: num_cpus::get().max(1),
            request_timeout: Duration::from_secs(120),
            max_upload_bytes: 256 * 1024 * 1024,
            analysis: AnalysisConfig::default(),
        }
    }
}

fn analysis_config_from(args: &StructureArgs) -> AnalysisConfig {
    AnalysisConfig {
        segment_interval_secs: args.segment_interval,
        jump_threshold: args.jump_threshold,
        debounce_secs: args.debounce,
        ..AnalysisConfig::default()
    }
}
