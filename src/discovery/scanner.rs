//! Input scanning
//!
//! Accepts a single file or a directory. Directory walks skip hidden entries
//! (including macOS `._` resource forks, which carry audio extensions but no
//! audio) and return files in a stable path order.

use crate::error::{MixmapError, Result};
use crate::types::AudioFormat;
use hash32::{FnvHasher, Hasher as _};
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Audio file found on disk
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub format: AudioFormat,
    pub size_bytes: u64,
}

/// Scan a path (file or directory) for audio files
pub fn scan(input: &Path, recursive: bool) -> Result<Vec<DiscoveredFile>> {
    if !input.exists() {
        return Err(MixmapError::FileNotFound(input.to_path_buf()));
    }

    if input.is_file() {
        return match discover_file(input) {
            Some(file) => Ok(vec![file]),
            None => Err(MixmapError::UnsupportedFormat {
                path: input.to_path_buf(),
                format: input
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            }),
        };
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<DiscoveredFile> = WalkDir::new(input)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| discover_file(e.path()))
        .inspect(|f| debug!("Discovered: {}", f.path.display()))
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    info!("Discovered {} audio files", files.len());

    if files.is_empty() {
        warn!("No supported audio files found in {}", input.display());
    }

    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn discover_file(path: &Path) -> Option<DiscoveredFile> {
    let ext = path.extension()?.to_str()?;
    let format = AudioFormat::from_extension(ext)?;
    let size_bytes = std::fs::metadata(path).ok()?.len();

    Some(DiscoveredFile {
        path: path.to_path_buf(),
        format,
        size_bytes,
    })
}

/// Deterministic, positive track ID derived from a file path
///
/// FNV-1a over the normalized path, masked to the positive `i32` range that
/// Rekordbox accepts for `TrackID`.
pub fn generate_track_id(path: &Path) -> i32 {
    let mut hasher = FnvHasher::default();
    Hasher::write(&mut hasher, normalize_path_for_hash(path).as_bytes());
    (hasher.finish32() & 0x7FFF_FFFF) as i32
}

/// Forward slashes and lowercase, so the same file hashes alike everywhere
fn normalize_path_for_hash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}
