//! Core data types for mixmap
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// Musical primitives
// =============================================================================

/// The 12 pitch classes in Western music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs, // C#/Db
    D,
    Ds, // D#/Eb
    E,
    F,
    Fs, // F#/Gb
    G,
    Gs, // G#/Ab
    A,
    As, // A#/Bb
    B,
}

impl PitchClass {
    /// All pitch classes in enumeration order (C first)
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Convert from numeric index (0 = C, 1 = C#, ..., 11 = B), wrapping at 12
    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index % 12) as usize]
    }

    /// Convert to numeric index (0 = C, 1 = C#, ..., 11 = B)
    pub fn to_index(self) -> u8 {
        self as u8
    }

    /// Standard sharp notation (e.g., "C", "F#")
    pub fn to_standard_notation(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Parse a pitch spelling, accepting the flat aliases of the black keys
    pub fn from_spelling(name: &str) -> Option<Self> {
        let pitch = match name {
            "C" => PitchClass::C,
            "C#" | "Db" => PitchClass::Cs,
            "D" => PitchClass::D,
            "D#" | "Eb" => PitchClass::Ds,
            "E" => PitchClass::E,
            "F" => PitchClass::F,
            "F#" | "Gb" => PitchClass::Fs,
            "G" => PitchClass::G,
            "G#" | "Ab" => PitchClass::Gs,
            "A" => PitchClass::A,
            "A#" | "Bb" => PitchClass::As,
            "B" => PitchClass::B,
            _ => return None,
        };
        Some(pitch)
    }
}

/// Major or Minor scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Major => "Major",
            Mode::Minor => "Minor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Major" => Some(Mode::Major),
            "Minor" => Some(Mode::Minor),
            _ => None,
        }
    }
}

/// Canonical key label, e.g. "C Major" or "F# Minor"
pub fn key_label(pitch: PitchClass, mode: Mode) -> String {
    format!("{} {}", pitch.to_standard_notation(), mode.as_str())
}

// =============================================================================
// Analysis results
// =============================================================================

/// Musical key analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyResult {
    /// Detected pitch class (C, C#, D, etc.)
    pub pitch_class: PitchClass,
    /// Major or Minor
    pub mode: Mode,
    /// Canonical label ("C Major", "A Minor", ...)
    pub label: String,
    /// Camelot notation ("1A" - "12B")
    pub camelot: String,
    /// Open Key notation ("1m" - "12d")
    pub open_key: String,
    /// Pearson correlation of the winning template
    pub correlation: f64,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
}

/// Coarse structural label of a sampled point in the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentLabel {
    #[serde(rename = "Drop/Chorus (High Energy)")]
    HighEnergy,
    #[serde(rename = "Breakdown/Build-up")]
    BreakdownBuild,
    #[serde(rename = "Intro/Outro (Quiet)")]
    QuietIntroOutro,
    #[serde(rename = "Verse/Mid-Energy")]
    VerseMid,
}

impl SegmentLabel {
    /// Human-readable name, identical to the serialized form
    pub fn display_name(self) -> &'static str {
        match self {
            SegmentLabel::HighEnergy => "Drop/Chorus (High Energy)",
            SegmentLabel::BreakdownBuild => "Breakdown/Build-up",
            SegmentLabel::QuietIntroOutro => "Intro/Outro (Quiet)",
            SegmentLabel::VerseMid => "Verse/Mid-Energy",
        }
    }
}

impl fmt::Display for SegmentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One sampled point of the structural map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Sample time in seconds (multiple of the sampling interval)
    pub time: f64,
    pub label: SegmentLabel,
    /// Normalized bass level at this time, rounded to 2 decimals
    pub bass_level: f64,
    /// Normalized loudness at this time, rounded to 2 decimals
    pub energy_level: f64,
}

/// Energy-based structural map of a track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureResult {
    /// Track duration in seconds, rounded to 2 decimals
    pub duration_sec: f64,
    /// Abrupt bass transitions in seconds, ascending and debounced
    pub mix_points: Vec<f64>,
    pub segments: Vec<Segment>,
}

impl StructureResult {
    /// Label of the last segment sampled at or before `time`
    pub fn label_at(&self, time: f64) -> Option<SegmentLabel> {
        self.segments
            .iter()
            .take_while(|s| s.time <= time)
            .last()
            .map(|s| s.label)
    }
}

// =============================================================================
// Track representation
// =============================================================================

/// Metadata extracted from audio file tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

/// Complete analysis result for a single track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedTrack {
    /// Deterministic ID derived from path (for Rekordbox)
    pub track_id: i32,
    /// Original file path
    pub path: PathBuf,
    /// File metadata from tags
    pub metadata: TrackMetadata,
    /// Key analysis
    pub key: KeyResult,
    /// Structure analysis
    pub structure: StructureResult,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Sample rate used for analysis
    pub sample_rate: u32,
    /// Timestamp of analysis
    pub analyzed_at: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded audio samples ready for analysis
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats supported by mixmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Aiff,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
