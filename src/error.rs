//! Unified error types for mixmap
//!
//! Error strategy:
//! - Analysis errors (insufficient data, degenerate signal, decode): per-track,
//!   skip the file and continue the batch
//! - System errors (output, configuration, server bind): fatal, abort
//!
//! A Camelot lookup miss is not an error; it yields the `"Unknown"` sentinel.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, AIFF";

/// Top-level error type for mixmap operations
#[derive(Debug, Error)]
pub enum MixmapError {
    // =========================================================================
    // Core analysis errors
    // =========================================================================
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate signal: all 24 key correlations are undefined (chroma has zero variance)\n  Tip: The track may be silent or contain no tonal content")]
    DegenerateSignal,

    #[error("Invalid feature input: {0}")]
    InvalidFeatures(String),

    // =========================================================================
    // Recoverable per-file errors - skip file, continue batch
    // =========================================================================
    #[error("Failed to decode audio '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("Analysis failed for '{path}': {reason}")]
    AnalysisError { path: PathBuf, reason: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    #[error("Analysis cancelled: {reason}")]
    Cancelled { reason: String },

    // =========================================================================
    // Fatal errors - abort
    // =========================================================================
    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    OutputError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for mixmap operations
pub type Result<T> = std::result::Result<T, MixmapError>;

impl MixmapError {
    /// Returns true if this error is recoverable (should skip file, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MixmapError::InsufficientData(_)
                | MixmapError::DegenerateSignal
                | MixmapError::InvalidFeatures(_)
                | MixmapError::DecodeError { .. }
                | MixmapError::UnsupportedFormat { .. }
                | MixmapError::AnalysisError { .. }
                | MixmapError::FileNotFound(_)
                | MixmapError::Cancelled { .. }
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        MixmapError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                let parent = path
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                format!("Directory does not exist: {}", parent)
            }
            _ => err.to_string(),
        };
        MixmapError::OutputError { path, reason }
    }

    /// Create a cancellation error for the given pipeline stage
    pub fn cancelled(stage: impl Into<String>) -> Self {
        MixmapError::Cancelled {
            reason: stage.into(),
        }
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error about which file was being processed
    fn with_file_context(self, path: &std::path::Path) -> Result<T>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn with_file_context(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| match e {
            // Errors that already carry a path, or are not about the file, pass through
            MixmapError::DecodeError { .. }
            | MixmapError::UnsupportedFormat { .. }
            | MixmapError::AnalysisError { .. }
            | MixmapError::FileNotFound(_)
            | MixmapError::Cancelled { .. }
            | MixmapError::OutputError { .. } => e,
            other => MixmapError::AnalysisError {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_core_errors_are_recoverable() {
        assert!(MixmapError::InsufficientData("empty chroma".into()).is_recoverable());
        assert!(MixmapError::DegenerateSignal.is_recoverable());
        assert!(MixmapError::cancelled("decode").is_recoverable());
        assert!(!MixmapError::ConfigError("bad".into()).is_recoverable());
    }

    #[test]
    fn test_file_context_keeps_original_message() {
        let result: Result<()> = Err(MixmapError::DegenerateSignal);
        let err = result.with_file_context(Path::new("/music/a.wav")).unwrap_err();
        match err {
            MixmapError::AnalysisError { path, reason } => {
                assert_eq!(path, Path::new("/music/a.wav"));
                assert!(reason.starts_with("Degenerate signal"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_file_context_passes_decode_errors_through() {
        let result: Result<()> = Err(MixmapError::decode_error("/x.mp3", "bad header"));
        let err = result.with_file_context(Path::new("/other.mp3")).unwrap_err();
        assert!(matches!(
            err,
            MixmapError::DecodeError { ref path, .. } if path == Path::new("/x.mp3")
        ));
    }
}
