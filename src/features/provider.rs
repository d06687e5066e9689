//! Feature provider backends

use super::chroma::ChromaFolder;
use super::rms::rms_envelope;
use super::stft::{bin_frequencies, magnitude_stft};
use super::{AudioFeatures, MagnitudeSpectrogram};
use crate::cancel::CancelToken;
use crate::config::AnalysisConfig;
use crate::error::{MixmapError, Result};
use crate::types::AudioBuffer;
use tracing::debug;

/// Source of frame-aligned features for the analysis core
pub trait FeatureProvider: Send + Sync {
    /// Extract chroma, RMS and magnitude features from decoded audio
    fn extract(&self, buffer: &AudioBuffer, cancel: &CancelToken) -> Result<AudioFeatures>;

    /// Get the name of this provider (for logging)
    fn name(&self) -> &'static str;
}

/// STFT-based provider: one centered FFT pass feeds chroma and the bass band
pub struct SpectralFeatureProvider {
    config: AnalysisConfig,
}

impl SpectralFeatureProvider {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl Default for SpectralFeatureProvider {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl FeatureProvider for SpectralFeatureProvider {
    fn extract(&self, buffer: &AudioBuffer, cancel: &CancelToken) -> Result<AudioFeatures> {
        if buffer.is_empty() || buffer.sample_rate == 0 {
            return Err(MixmapError::InsufficientData(
                "audio buffer is empty".to_string(),
            ));
        }

        let n_fft = self.config.n_fft;
        let hop_length = self.config.hop_length;

        debug!(
            "Extracting features ({} samples, {}Hz, n_fft={}, hop={})",
            buffer.len(),
            buffer.sample_rate,
            n_fft,
            hop_length
        );

        let freqs = bin_frequencies(n_fft, buffer.sample_rate);
        let mut folder = ChromaFolder::new(&freqs);

        let frames = magnitude_stft(&buffer.samples, n_fft, hop_length, cancel, |frame| {
            folder.push_frame(frame)
        })?;

        cancel.check("loudness envelope")?;
        let rms = rms_envelope(&buffer.samples, self.config.rms_frame_length, hop_length);

        debug!("Extracted {} frames", frames.len());

        Ok(AudioFeatures {
            chroma: folder.finish(),
            rms,
            magnitude: MagnitudeSpectrogram { frames, freqs },
            duration: buffer.duration,
            hop_length,
            sample_rate: buffer.sample_rate,
        })
    }

    fn name(&self) -> &'static str {
        "spectral"
    }
}
