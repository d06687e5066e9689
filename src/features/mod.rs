//! Audio feature extraction
//!
//! Turns a decoded mono buffer into the frame-aligned features the analysis
//! core consumes: a 12 x T chroma matrix, an RMS envelope, and a magnitude
//! spectrogram with its frequency-bin vector.

pub mod chroma;
pub mod provider;
pub mod rms;
pub mod stft;

pub use provider::{FeatureProvider, SpectralFeatureProvider};

use crate::error::{MixmapError, Result};

/// Pitch-class energy per analysis frame
///
/// Stored frame-major so the 12-row invariant is carried by the type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromaMatrix {
    frames: Vec<[f64; 12]>,
}

impl ChromaMatrix {
    pub fn from_frames(frames: Vec<[f64; 12]>) -> Self {
        Self { frames }
    }

    /// Build from a row-major 12 x T matrix (row = pitch class)
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.len() != 12 {
            return Err(MixmapError::InvalidFeatures(format!(
                "chroma matrix must have 12 rows, got {}",
                rows.len()
            )));
        }
        let num_frames = rows[0].len();
        if let Some((pc, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != num_frames) {
            return Err(MixmapError::InvalidFeatures(format!(
                "chroma row {} has {} frames, expected {}",
                pc,
                row.len(),
                num_frames
            )));
        }

        let frames = (0..num_frames)
            .map(|t| std::array::from_fn(|pc| rows[pc][t]))
            .collect();
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[[f64; 12]] {
        &self.frames
    }

    /// Number of analysis frames (T)
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Average chroma vector across all frames, `None` when T = 0
    pub fn mean_vector(&self) -> Option<[f64; 12]> {
        if self.frames.is_empty() {
            return None;
        }
        let mut mean = [0.0f64; 12];
        for frame in &self.frames {
            for (acc, &v) in mean.iter_mut().zip(frame) {
                *acc += v;
            }
        }
        let n = self.frames.len() as f64;
        mean.iter_mut().for_each(|m| *m /= n);
        Some(mean)
    }
}

/// Magnitude spectrogram, frame-major: `frames[t][f]` pairs with `freqs[f]`
#[derive(Debug, Clone, Default)]
pub struct MagnitudeSpectrogram {
    pub frames: Vec<Vec<f32>>,
    pub freqs: Vec<f64>,
}

/// Everything the analysis core reads about one track
#[derive(Debug, Clone)]
pub struct AudioFeatures {
    pub chroma: ChromaMatrix,
    pub rms: Vec<f64>,
    pub magnitude: MagnitudeSpectrogram,
    /// Track duration in seconds
    pub duration: f64,
    /// Frame step in samples shared by all features
    pub hop_length: usize,
    pub sample_rate: u32,
}

impl AudioFeatures {
    /// Seconds between consecutive frames
    pub fn frame_duration(&self) -> f64 {
        self.hop_length as f64 / self.sample_rate as f64
    }
}
