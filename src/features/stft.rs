//! Magnitude STFT for feature extraction
//!
//! Frames are centered: frame `t` covers samples around `t * hop`, with the
//! signal zero-padded by `n_fft / 2` on both sides. A signal of `n` samples
//! therefore yields `1 + n / hop` frames, the same count the RMS envelope
//! produces, so every feature shares one timebase.

use crate::cancel::CancelToken;
use crate::error::Result;
use rustfft::{num_complex::Complex, FftPlanner};

/// Frames processed between cancellation checks
const CANCEL_CHECK_FRAMES: usize = 256;

/// Number of frames a centered analysis produces for `num_samples`
pub fn centered_frame_count(num_samples: usize, hop_length: usize) -> usize {
    1 + num_samples / hop_length
}

/// Center frequency in Hz of every positive-frequency bin
pub fn bin_frequencies(n_fft: usize, sample_rate: u32) -> Vec<f64> {
    (0..n_fft / 2 + 1)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect()
}

/// Compute the magnitude spectrogram, one `Vec` of `n_fft / 2 + 1` bins per frame
///
/// `on_frame` sees every magnitude frame as it is produced so callers can
/// derive per-frame features without a second pass.
pub fn magnitude_stft<F>(
    samples: &[f32],
    n_fft: usize,
    hop_length: usize,
    cancel: &CancelToken,
    mut on_frame: F,
) -> Result<Vec<Vec<f32>>>
where
    F: FnMut(&[f32]),
{
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let window = hann_window(n_fft);

    let num_bins = n_fft / 2 + 1;
    let num_frames = centered_frame_count(samples.len(), hop_length);
    let half = (n_fft / 2) as isize;

    let mut spectrogram = Vec::with_capacity(num_frames);
    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); n_fft];

    for frame_idx in 0..num_frames {
        if frame_idx % CANCEL_CHECK_FRAMES == 0 {
            cancel.check("spectral analysis")?;
        }

        let start = (frame_idx * hop_length) as isize - half;
        for (i, (slot, &w)) in buffer.iter_mut().zip(window.iter()).enumerate() {
            let pos = start + i as isize;
            let sample = if pos >= 0 && (pos as usize) < samples.len() {
                samples[pos as usize]
            } else {
                0.0
            };
            *slot = Complex::new(sample * w, 0.0);
        }

        fft.process(&mut buffer);

        let frame: Vec<f32> = buffer[..num_bins].iter().map(|c| c.norm()).collect();
        on_frame(&frame);
        spectrogram.push(frame);
    }

    Ok(spectrogram)
}

/// Generate a periodic Hann window of given size
pub(crate) fn hann_window(size: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}
