//! Rekordbox XML writer
//!
//! Streams the collection through quick-xml so large libraries never sit in
//! memory as a document tree. Each mix point becomes a memory cue named
//! after the section that is playing when it fires.

use crate::error::{MixmapError, Result};
use crate::types::AnalyzedTrack;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::schema::{self, attrs, marks, node_types};
use super::uri::path_to_rekordbox_uri;

/// Cue name when no segment was sampled at or before the mix point
const FALLBACK_CUE_NAME: &str = "Mix Point";

/// Write analyzed tracks to a Rekordbox XML file
///
/// Written to a sibling temp file first and renamed into place.
pub fn write_rekordbox_xml(tracks: &[AnalyzedTrack], output_path: &Path) -> Result<()> {
    let temp_path = output_path.with_extension("xml.tmp");
    let fail = |reason: String| {
        let _ = std::fs::remove_file(&temp_path);
        MixmapError::OutputError {
            path: output_path.to_path_buf(),
            reason,
        }
    };

    let file = File::create(&temp_path).map_err(|e| MixmapError::OutputError {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let playlist_name = format!(
        "{}{}",
        schema::IMPORT_PLAYLIST_PREFIX,
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );

    let mut writer = BufWriter::new(file);
    render_collection(tracks, &playlist_name, &mut writer)
        .and_then(|()| writer.flush())
        .map_err(|e| fail(format!("XML write error: {}", e)))?;
    drop(writer);

    std::fs::rename(&temp_path, output_path)
        .map_err(|e| fail(format!("Failed to finalize file: {}", e)))?;

    info!("Wrote {} tracks to {}", tracks.len(), output_path.display());
    Ok(())
}

/// Render the full DJ_PLAYLISTS document into `out`
pub fn render_collection<W: Write>(
    tracks: &[AnalyzedTrack],
    playlist_name: &str,
    out: W,
) -> io::Result<()> {
    let mut xml = Writer::new_with_indent(out, b' ', 2);

    xml.write_event(Event::Decl(BytesDecl::new(
        schema::XML_VERSION,
        Some(schema::XML_ENCODING),
        None,
    )))?;

    let mut root = BytesStart::new("DJ_PLAYLISTS");
    root.push_attribute(("Version", schema::PLAYLISTS_VERSION));
    xml.write_event(Event::Start(root))?;

    let mut product = BytesStart::new("PRODUCT");
    product.push_attribute(("Name", schema::PRODUCT_NAME));
    product.push_attribute(("Version", schema::PRODUCT_VERSION));
    xml.write_event(Event::Empty(product))?;

    let mut collection = BytesStart::new("COLLECTION");
    collection.push_attribute(("Entries", tracks.len().to_string().as_str()));
    xml.write_event(Event::Start(collection))?;
    for track in tracks {
        write_track(&mut xml, track)?;
    }
    xml.write_event(Event::End(BytesEnd::new("COLLECTION")))?;

    write_playlists(&mut xml, tracks, playlist_name)?;

    xml.write_event(Event::End(BytesEnd::new("DJ_PLAYLISTS")))?;
    Ok(())
}

fn write_track<W: Write>(xml: &mut Writer<W>, track: &AnalyzedTrack) -> io::Result<()> {
    let mut elem = BytesStart::new("TRACK");
    elem.push_attribute((attrs::TRACK_ID, track.track_id.to_string().as_str()));

    let name = track
        .metadata
        .title
        .clone()
        .or_else(|| {
            track
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Unknown".to_string());
    elem.push_attribute((attrs::NAME, name.as_str()));

    let optional = [
        (attrs::ARTIST, &track.metadata.artist),
        (attrs::ALBUM, &track.metadata.album),
        (attrs::GENRE, &track.metadata.genre),
    ];
    for (attr, value) in optional {
        if let Some(value) = value {
            elem.push_attribute((attr, value.as_str()));
        }
    }
    if let Some(year) = track.metadata.year {
        elem.push_attribute((attrs::YEAR, year.to_string().as_str()));
    }

    let location = path_to_rekordbox_uri(&track.path);
    elem.push_attribute((attrs::LOCATION, location.as_str()));

    // NaN and negative durations would produce an invalid integer attribute
    let total_time = if track.duration_seconds.is_finite() && track.duration_seconds >= 0.0 {
        track.duration_seconds.round() as u64
    } else {
        0
    };
    elem.push_attribute((attrs::TOTAL_TIME, total_time.to_string().as_str()));
    elem.push_attribute((attrs::TONALITY, track.key.camelot.as_str()));
    elem.push_attribute((
        attrs::DATE_ADDED,
        track.analyzed_at.format("%Y-%m-%d").to_string().as_str(),
    ));
    elem.push_attribute((attrs::SAMPLE_RATE, track.sample_rate.to_string().as_str()));
    elem.push_attribute((attrs::COMMENTS, comment_for(track).as_str()));

    if track.structure.mix_points.is_empty() {
        return xml.write_event(Event::Empty(elem));
    }

    xml.write_event(Event::Start(elem))?;
    for &time in &track.structure.mix_points {
        let name = track
            .structure
            .label_at(time)
            .map(|label| label.display_name())
            .unwrap_or(FALLBACK_CUE_NAME);

        let mut mark = BytesStart::new("POSITION_MARK");
        mark.push_attribute((marks::NAME, name));
        mark.push_attribute((marks::TYPE, marks::TYPE_CUE));
        mark.push_attribute((marks::START, format!("{:.3}", time.max(0.0)).as_str()));
        mark.push_attribute((marks::NUM, marks::NUM_MEMORY));
        xml.write_event(Event::Empty(mark))?;
    }
    xml.write_event(Event::End(BytesEnd::new("TRACK")))
}

fn comment_for(track: &AnalyzedTrack) -> String {
    let confidence = if track.key.confidence.is_finite() {
        (track.key.confidence * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    format!(
        "mixmap: {} ({}), key conf={:.0}%, {} mix points",
        track.key.label,
        track.key.open_key,
        confidence,
        track.structure.mix_points.len()
    )
}

/// PLAYLISTS section with the import playlist
///
/// Rekordbox only refreshes metadata of tracks already in its collection
/// when they are imported through a playlist.
fn write_playlists<W: Write>(
    xml: &mut Writer<W>,
    tracks: &[AnalyzedTrack],
    playlist_name: &str,
) -> io::Result<()> {
    xml.write_event(Event::Start(BytesStart::new("PLAYLISTS")))?;

    let mut root_node = BytesStart::new("NODE");
    root_node.push_attribute(("Type", node_types::FOLDER));
    root_node.push_attribute(("Name", "ROOT"));
    root_node.push_attribute(("Count", "1"));
    xml.write_event(Event::Start(root_node))?;

    let mut playlist = BytesStart::new("NODE");
    playlist.push_attribute(("Type", node_types::PLAYLIST));
    playlist.push_attribute(("Name", playlist_name));
    playlist.push_attribute(("KeyType", "0"));
    playlist.push_attribute(("Entries", tracks.len().to_string().as_str()));
    xml.write_event(Event::Start(playlist))?;

    for track in tracks {
        let mut track_ref = BytesStart::new("TRACK");
        track_ref.push_attribute(("Key", track.track_id.to_string().as_str()));
        xml.write_event(Event::Empty(track_ref))?;
    }

    xml.write_event(Event::End(BytesEnd::new("NODE")))?;
    xml.write_event(Event::End(BytesEnd::new("NODE")))?;
    xml.write_event(Event::End(BytesEnd::new("PLAYLISTS")))
}
