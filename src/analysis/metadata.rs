//! Track tags for the export formats
//!
//! Reads ID3v2 (MP3), Vorbis comments (FLAC) and AIFF chunks through lofty.
//! Tags are best-effort: a track with broken or missing tags is still
//! analyzed and exported under its file name.

use crate::types::TrackMetadata;
use lofty::{Accessor, Probe, Tag, TaggedFileExt};
use std::path::Path;
use tracing::{debug, warn};

/// Read tags from an audio file, falling back to the file stem for the title
pub fn extract_metadata(path: &Path) -> TrackMetadata {
    let mut metadata = match read_tags(path) {
        Ok(Some(tag)) => from_tag(&tag),
        Ok(None) => {
            debug!("No tags found in {}", path.display());
            TrackMetadata::default()
        }
        Err(e) => {
            warn!("Failed to read tags from {}: {}", path.display(), e);
            TrackMetadata::default()
        }
    };

    if metadata.title.is_none() {
        metadata.title = title_from_path(path);
    }
    metadata
}

fn read_tags(path: &Path) -> Result<Option<Tag>, lofty::error::LoftyError> {
    let tagged_file = Probe::open(path)?.read()?;
    let tag = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
        .cloned();
    Ok(tag)
}

fn from_tag(tag: &Tag) -> TrackMetadata {
    let text = |value: Option<std::borrow::Cow<'_, str>>| {
        value
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    TrackMetadata {
        title: text(tag.title()),
        artist: text(tag.artist()),
        album: text(tag.album()),
        genre: text(tag.genre()),
        year: tag.year().map(|y| y as i32),
    }
}

fn title_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}
