//! Chroma (pitch-class energy) from STFT magnitude frames
//!
//! Each bin between [`MIN_FREQ`] and [`MAX_FREQ`] is folded onto its nearest
//! equal-tempered pitch class. Below that range bin spacing is coarser than a
//! semitone; above it harmonics outweigh fundamentals.

use super::ChromaMatrix;

/// Lowest frequency folded into chroma (~C2)
pub const MIN_FREQ: f64 = 65.0;

/// Highest frequency folded into chroma
pub const MAX_FREQ: f64 = 2000.0;

/// Pitch class (0 = C) of a frequency, by nearest MIDI note
pub fn pitch_class_of(freq_hz: f64) -> usize {
    let midi = 12.0 * (freq_hz / 440.0).log2() + 69.0;
    (midi.round() as i64).rem_euclid(12) as usize
}

/// Folds magnitude frames into 12-bin chroma vectors
pub struct ChromaFolder {
    bin_classes: Vec<Option<usize>>,
    frames: Vec<[f64; 12]>,
}

impl ChromaFolder {
    pub fn new(freqs: &[f64]) -> Self {
        let bin_classes = freqs
            .iter()
            .map(|&f| (MIN_FREQ..=MAX_FREQ).contains(&f).then(|| pitch_class_of(f)))
            .collect();
        Self {
            bin_classes,
            frames: Vec::new(),
        }
    }

    /// Add one magnitude frame; energy is the squared magnitude
    pub fn push_frame(&mut self, magnitude: &[f32]) {
        let mut chroma = [0.0f64; 12];
        for (class, &mag) in self.bin_classes.iter().zip(magnitude) {
            if let Some(pc) = class {
                chroma[*pc] += (mag as f64) * (mag as f64);
            }
        }

        // Max-normalize; silent frames stay all zero
        let peak = chroma.iter().cloned().fold(0.0f64, f64::max);
        if peak > 0.0 {
            chroma.iter_mut().for_each(|c| *c /= peak);
        }
        self.frames.push(chroma);
    }

    pub fn finish(self) -> ChromaMatrix {
        ChromaMatrix::from_frames(self.frames)
    }
}
