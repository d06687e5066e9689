//! RMS loudness envelope

use super::stft::centered_frame_count;

/// Root-mean-square energy of centered frames of `frame_length` samples
///
/// Out-of-range samples count as zero, matching the STFT's padding, so the
/// envelope has exactly `1 + n / hop` entries.
pub fn rms_envelope(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    let num_frames = centered_frame_count(samples.len(), hop_length);
    let half = frame_length / 2;

    (0..num_frames)
        .map(|t| {
            let center = t * hop_length;
            let start = center.saturating_sub(half);
            let end = (center + frame_length - half).min(samples.len());
            let sum_sq: f64 = if start < end {
                samples[start..end].iter().map(|&s| (s as f64) * (s as f64)).sum()
            } else {
                0.0
            };
            (sum_sq / frame_length as f64).sqrt()
        })
        .collect()
}
