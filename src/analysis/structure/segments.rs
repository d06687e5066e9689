//! Fixed-interval segment classification

use super::round2;
use crate::types::{Segment, SegmentLabel};

/// Classify one sampled point from its normalized bass and loudness
///
/// Clauses are tried in order and the first match wins.
pub fn classify(bass: f64, loudness: f64) -> SegmentLabel {
    if bass > 0.6 {
        SegmentLabel::HighEnergy
    } else if bass < 0.3 && loudness > 0.3 {
        SegmentLabel::BreakdownBuild
    } else if bass < 0.2 && loudness < 0.2 {
        SegmentLabel::QuietIntroOutro
    } else {
        SegmentLabel::VerseMid
    }
}

/// Sample the energy curves every `interval` seconds and label each point
///
/// Sampling stops at the track duration or at the end of the curves,
/// whichever comes first.
pub fn classify_segments(
    bass_norm: &[f64],
    rms_norm: &[f64],
    duration: f64,
    frame_duration: f64,
    interval: f64,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    if !(interval > 0.0) || !(frame_duration > 0.0) {
        return segments;
    }

    let len = bass_norm.len().min(rms_norm.len());
    for k in 0.. {
        let time = k as f64 * interval;
        if time >= duration {
            break;
        }
        let idx = (time / frame_duration).floor() as usize;
        if idx >= len {
            break;
        }

        let bass = bass_norm[idx];
        let loudness = rms_norm[idx];
        segments.push(Segment {
            time,
            label: classify(bass, loudness),
            bass_level: round2(bass),
            energy_level: round2(loudness),
        });
    }
    segments
}
