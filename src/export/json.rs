//! JSON export for interoperability with other tools
//!
//! `mixmap.json` doubles as the resume index: paths listed there are skipped
//! on the next run unless `--force` is given, and their entries are carried
//! over when the file is rewritten.

use crate::analysis::key::camelot;
use crate::audio::TARGET_SAMPLE_RATE;
use crate::error::{MixmapError, Result};
use crate::types::{
    AnalyzedTrack, KeyResult, Mode, PitchClass, Segment, StructureResult, TrackMetadata,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct MixmapJson {
    /// Schema version for forward compatibility
    pub version: String,
    pub metadata: ExportMetadata,
    pub tracks: Vec<TrackJson>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// mixmap version that generated this file
    pub generator_version: String,
    /// RFC 3339 export timestamp
    pub exported_at: String,
    pub track_count: usize,
}

/// JSON representation of an analyzed track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackJson {
    /// Same as the Rekordbox TrackID
    pub track_id: i32,
    pub path: String,
    pub metadata: TrackMetadataJson,
    pub key: KeyJson,
    pub structure: StructureJson,
    pub analyzed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackMetadataJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyJson {
    /// Canonical label, e.g. "A Minor"
    pub label: String,
    /// Short notation, e.g. "Am"
    pub standard: String,
    pub camelot: String,
    pub open_key: String,
    pub correlation: f64,
    pub confidence: f64,
    /// Camelot codes that mix cleanly with this one
    #[serde(default)]
    pub compatible: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureJson {
    pub duration_sec: f64,
    pub mix_points: Vec<f64>,
    pub segments: Vec<Segment>,
}

/// Write analyzed tracks to a JSON file
///
/// Entries already in the file for paths not present in `tracks` are kept.
/// Uses a temp file plus rename so an interrupted write never leaves a
/// truncated file behind.
pub fn write_json(tracks: &[AnalyzedTrack], output_path: &Path) -> Result<()> {
    let mut entries: Vec<TrackJson> = tracks.iter().map(track_to_json).collect();

    let carried = carried_entries(output_path, tracks);
    if !carried.is_empty() {
        debug!("Keeping {} previously analyzed tracks", carried.len());
        entries.extend(carried);
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    let output = MixmapJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ExportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            track_count: entries.len(),
        },
        tracks: entries,
    };

    // Same directory keeps the rename on one filesystem
    let temp_path = output_path.with_extension("json.tmp");
    let file = File::create(&temp_path).map_err(|e| MixmapError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    serde_json::to_writer_pretty(BufWriter::new(file), &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        MixmapError::OutputError {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        MixmapError::OutputError {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!(
        "Wrote {} tracks to {}",
        output.metadata.track_count,
        output_path.display()
    );
    Ok(())
}

/// Entries of an existing analysis file whose paths are not in `fresh`
fn carried_entries(json_path: &Path, fresh: &[AnalyzedTrack]) -> Vec<TrackJson> {
    let fresh: HashSet<String> = fresh
        .iter()
        .map(|t| t.path.to_string_lossy().into_owned())
        .collect();
    read_existing_tracks(json_path)
        .into_iter()
        .filter(|t| !fresh.contains(&t.path))
        .collect()
}

/// Previously exported tracks that `fresh` does not replace
///
/// Lets the Rekordbox collection keep tracks analyzed by earlier runs.
/// Entries whose key label or timestamp no longer parse are dropped.
pub fn read_carried_tracks(json_path: &Path, fresh: &[AnalyzedTrack]) -> Vec<AnalyzedTrack> {
    carried_entries(json_path, fresh)
        .iter()
        .filter_map(|entry| {
            let track = entry.to_track();
            if track.is_none() {
                warn!("Dropping unreadable analysis entry for {}", entry.path);
            }
            track
        })
        .collect()
}

impl TrackJson {
    /// Rebuild the analysis result this entry was exported from
    pub fn to_track(&self) -> Option<AnalyzedTrack> {
        let (pitch, mode) = self.key.label.split_once(' ')?;
        let pitch_class = PitchClass::from_spelling(pitch)?;
        let mode = Mode::from_name(mode)?;
        let analyzed_at = chrono::DateTime::parse_from_rfc3339(&self.analyzed_at)
            .ok()?
            .with_timezone(&chrono::Utc);

        Some(AnalyzedTrack {
            track_id: self.track_id,
            path: PathBuf::from(&self.path),
            metadata: TrackMetadata {
                title: self.metadata.title.clone(),
                artist: self.metadata.artist.clone(),
                album: self.metadata.album.clone(),
                genre: self.metadata.genre.clone(),
                year: self.metadata.year,
            },
            key: KeyResult {
                pitch_class,
                mode,
                label: self.key.label.clone(),
                camelot: self.key.camelot.clone(),
                open_key: self.key.open_key.clone(),
                correlation: self.key.correlation,
                confidence: self.key.confidence,
            },
            structure: StructureResult {
                duration_sec: self.structure.duration_sec,
                mix_points: self.structure.mix_points.clone(),
                segments: self.structure.segments.clone(),
            },
            duration_seconds: self.structure.duration_sec,
            sample_rate: TARGET_SAMPLE_RATE,
            analyzed_at,
        })
    }
}

fn track_to_json(track: &AnalyzedTrack) -> TrackJson {
    let key = &track.key;
    let standard = format!(
        "{}{}",
        key.pitch_class.to_standard_notation(),
        match key.mode {
            Mode::Major => "",
            Mode::Minor => "m",
        }
    );

    TrackJson {
        track_id: track.track_id,
        path: track.path.to_string_lossy().to_string(),
        metadata: TrackMetadataJson {
            title: track.metadata.title.clone(),
            artist: track.metadata.artist.clone(),
            album: track.metadata.album.clone(),
            genre: track.metadata.genre.clone(),
            year: track.metadata.year,
        },
        key: KeyJson {
            label: key.label.clone(),
            standard,
            camelot: key.camelot.clone(),
            open_key: key.open_key.clone(),
            correlation: key.correlation,
            confidence: key.confidence,
            compatible: camelot::compatible_keys(&key.camelot)
                .into_iter()
                .map(str::to_string)
                .collect(),
        },
        structure: StructureJson {
            duration_sec: track.structure.duration_sec,
            mix_points: track.structure.mix_points.clone(),
            segments: track.structure.segments.clone(),
        },
        analyzed_at: track.analyzed_at.to_rfc3339(),
    }
}

/// Paths already present in an existing analysis file
///
/// A missing or unparseable file yields an empty set.
pub fn read_existing_analysis(json_path: &Path) -> HashSet<String> {
    let paths: HashSet<String> = read_existing_tracks(json_path)
        .into_iter()
        .map(|t| t.path)
        .collect();
    if !paths.is_empty() {
        debug!(
            "Loaded {} previously analyzed tracks from {}",
            paths.len(),
            json_path.display()
        );
    }
    paths
}

/// Track entries of an existing analysis file, empty when absent or invalid
pub fn read_existing_tracks(json_path: &Path) -> Vec<TrackJson> {
    if !json_path.exists() {
        debug!("No existing analysis file at {}", json_path.display());
        return Vec::new();
    }

    let file = match File::open(json_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Could not open existing analysis {}: {}", json_path.display(), e);
            return Vec::new();
        }
    };

    match serde_json::from_reader::<_, MixmapJson>(BufReader::new(file)) {
        Ok(json) => json.tracks,
        Err(e) => {
            warn!("Ignoring unreadable analysis file {}: {}", json_path.display(), e);
            Vec::new()
        }
    }
}
