//! Smoothed, normalized energy curves
//!
//! Two per-frame curves drive the structural map: bass energy (magnitude
//! summed below the cutoff) and overall loudness (RMS). Both are median
//! filtered over roughly one second and min-max normalized to [0, 1].

use crate::config::AnalysisConfig;
use crate::error::{MixmapError, Result};
use crate::features::MagnitudeSpectrogram;

/// Normalized bass and loudness curves, one value per frame
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyProfile {
    pub bass: Vec<f64>,
    pub loudness: Vec<f64>,
}

impl EnergyProfile {
    pub fn len(&self) -> usize {
        self.bass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bass.is_empty()
    }
}

/// Build the energy profile from the RMS envelope and magnitude spectrogram
pub fn build_profile(
    rms: &[f64],
    magnitude: &MagnitudeSpectrogram,
    frame_duration: f64,
    config: &AnalysisConfig,
) -> Result<EnergyProfile> {
    if rms.is_empty() {
        return Err(MixmapError::InsufficientData(
            "loudness envelope has no frames".to_string(),
        ));
    }
    if magnitude.frames.len() != rms.len() {
        return Err(MixmapError::InvalidFeatures(format!(
            "spectrogram has {} frames but loudness envelope has {}",
            magnitude.frames.len(),
            rms.len()
        )));
    }
    if !(frame_duration > 0.0) {
        return Err(MixmapError::InvalidFeatures(format!(
            "frame duration must be positive, got {}",
            frame_duration
        )));
    }

    let bass = bass_energy(magnitude, config.bass_cutoff_hz)?;
    let window = smoothing_window(config.smoothing_secs, frame_duration);

    Ok(EnergyProfile {
        bass: normalize(&median_filter(&bass, window)),
        loudness: normalize(&median_filter(rms, window)),
    })
}

/// Per-frame sum of magnitudes in bins strictly below `cutoff_hz`
pub fn bass_energy(magnitude: &MagnitudeSpectrogram, cutoff_hz: f64) -> Result<Vec<f64>> {
    let num_bins = magnitude.freqs.len();
    let bass_bins = magnitude.freqs.iter().take_while(|&&f| f < cutoff_hz).count();

    magnitude
        .frames
        .iter()
        .enumerate()
        .map(|(t, frame)| {
            if frame.len() != num_bins {
                return Err(MixmapError::InvalidFeatures(format!(
                    "frame {} has {} bins, expected {}",
                    t,
                    frame.len(),
                    num_bins
                )));
            }
            Ok(frame[..bass_bins].iter().map(|&m| m as f64).sum())
        })
        .collect()
}

/// Median-filter length in frames for a span in seconds, always odd
pub fn smoothing_window(span_secs: f64, frame_duration: f64) -> usize {
    let frames = ((span_secs / frame_duration).round() as usize).max(1);
    if frames % 2 == 0 {
        frames + 1
    } else {
        frames
    }
}

/// Sliding median with zero-padded edges
///
/// `window` must be odd; the output has the same length as the input.
pub fn median_filter(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || values.is_empty() {
        return values.to_vec();
    }
    let half = window / 2;
    let mut scratch = Vec::with_capacity(window);

    (0..values.len())
        .map(|i| {
            scratch.clear();
            for offset in 0..window {
                let pos = (i + offset).checked_sub(half);
                scratch.push(pos.and_then(|p| values.get(p)).copied().unwrap_or(0.0));
            }
            scratch.sort_by(f64::total_cmp);
            scratch[half]
        })
        .collect()
}

/// Min-max normalize to [0, 1]; a constant sequence maps to all zeros
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !(range > 0.0) {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}
