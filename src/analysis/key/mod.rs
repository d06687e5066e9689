//! Key detection module

pub mod camelot;
pub mod estimator;
pub mod templates;

pub use estimator::{estimate_key, rank_candidates, Correlation, KeyCandidate};

use crate::analysis::traits::KeyDetector;
use crate::error::Result;
use crate::features::AudioFeatures;
use crate::types::KeyResult;
use tracing::debug;

/// Key detector correlating mean chroma with Krumhansl-Schmuckler profiles
pub struct TemplateKeyDetector;

impl TemplateKeyDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TemplateKeyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDetector for TemplateKeyDetector {
    fn detect(&self, features: &AudioFeatures) -> Result<KeyResult> {
        debug!(
            "Estimating key from {} chroma frames",
            features.chroma.num_frames()
        );

        let ranked = rank_candidates(&features.chroma)?;
        let best = ranked[0];

        let label = best.label();
        let camelot = camelot::to_camelot(best.pitch_class, best.mode).to_string();
        let open_key = camelot::to_open_key(best.pitch_class, best.mode).to_string();
        let correlation = best.correlation.value().unwrap_or(0.0);
        let confidence = estimator::ranking_confidence(&ranked);

        debug!(
            "Detected key: {} ({}) (r={:.3}, confidence: {:.2})",
            label, camelot, correlation, confidence
        );

        Ok(KeyResult {
            pitch_class: best.pitch_class,
            mode: best.mode,
            label,
            camelot,
            open_key,
            correlation,
            confidence,
        })
    }

    fn name(&self) -> &'static str {
        "krumhansl-schmuckler"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ChromaMatrix, MagnitudeSpectrogram};
    use crate::types::{Mode, PitchClass};

    fn features_with_chroma(chroma: ChromaMatrix) -> AudioFeatures {
        AudioFeatures {
            chroma,
            rms: vec![],
            magnitude: MagnitudeSpectrogram::default(),
            duration: 10.0,
            hop_length: 512,
            sample_rate: 22050,
        }
    }

    #[test]
    fn test_c_major_triad_end_to_end() {
        let mut frame = [0.0; 12];
        frame[0] = 1.0;
        frame[4] = 1.0;
        frame[7] = 1.0;
        let features = features_with_chroma(ChromaMatrix::from_frames(vec![frame; 50]));

        let key = TemplateKeyDetector::new().detect(&features).unwrap();
        assert_eq!(key.label, "C Major");
        assert_eq!(key.camelot, "8B");
        assert_eq!(key.open_key, "1d");
        assert_eq!(key.pitch_class, PitchClass::C);
        assert_eq!(key.mode, Mode::Major);
        assert!(key.correlation > 0.8);
        // Label and typed lookup agree
        assert_eq!(camelot::camelot_for_label(&key.label), key.camelot);
    }

    #[test]
    fn test_silence_is_degenerate() {
        let features = features_with_chroma(ChromaMatrix::from_frames(vec![[0.0; 12]; 8]));
        let err = TemplateKeyDetector::new().detect(&features).unwrap_err();
        assert!(matches!(err, crate::error::MixmapError::DegenerateSignal));
    }

    #[test]
    fn test_detector_name() {
        assert_eq!(TemplateKeyDetector::default().name(), "krumhansl-schmuckler");
    }
}
