//! Energy-based structure analysis
//!
//! Maps a track's bass and loudness curves to coarse sections (drop,
//! breakdown, intro/outro, verse) and finds the points where the bass
//! abruptly enters or leaves, which are the natural places to mix.

pub mod change_points;
pub mod energy;
pub mod segments;

pub use change_points::detect_change_points;
pub use energy::{build_profile, EnergyProfile};
pub use segments::{classify, classify_segments};

use crate::analysis::traits::StructureAnalyzer;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::features::AudioFeatures;
use crate::types::StructureResult;
use tracing::debug;

/// Round to two decimals for reporting
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Structure analyzer over smoothed bass and RMS curves
pub struct EnergyStructureAnalyzer {
    config: AnalysisConfig,
}

impl EnergyStructureAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl Default for EnergyStructureAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl StructureAnalyzer for EnergyStructureAnalyzer {
    fn analyze(&self, features: &AudioFeatures) -> Result<StructureResult> {
        let frame_duration = features.frame_duration();
        let profile = build_profile(
            &features.rms,
            &features.magnitude,
            frame_duration,
            &self.config,
        )?;

        let segments = classify_segments(
            &profile.bass,
            &profile.loudness,
            features.duration,
            frame_duration,
            self.config.segment_interval_secs,
        );
        let mix_points = detect_change_points(
            &profile.bass,
            frame_duration,
            self.config.jump_threshold,
            self.config.debounce_secs,
        );

        debug!(
            "Structure: {} segments, {} mix points over {:.1}s",
            segments.len(),
            mix_points.len(),
            features.duration
        );

        Ok(StructureResult {
            duration_sec: round2(features.duration),
            mix_points,
            segments,
        })
    }

    fn name(&self) -> &'static str {
        "energy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ChromaMatrix, MagnitudeSpectrogram};
    use crate::types::SegmentLabel;

    /// Features at 10 frames per second: `loud_secs` of heavy bass, then quiet
    fn step_features(loud_secs: usize, quiet_secs: usize) -> AudioFeatures {
        let loud = loud_secs * 10;
        let total = loud + quiet_secs * 10;
        let frames = (0..total)
            .map(|t| if t < loud { vec![8.0, 6.0, 1.0] } else { vec![0.05, 0.05, 0.05] })
            .collect();
        let rms = (0..total).map(|t| if t < loud { 0.5 } else { 0.01 }).collect();

        AudioFeatures {
            chroma: ChromaMatrix::default(),
            rms,
            magnitude: MagnitudeSpectrogram {
                frames,
                freqs: vec![60.0, 120.0, 800.0],
            },
            duration: total as f64 / 10.0,
            hop_length: 2205,
            sample_rate: 22050,
        }
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(29.954), 29.95);
        assert_eq!(round2(1.005e-3), 0.0);
        assert_eq!(round2(-1.256), -1.26);
    }

    #[test]
    fn test_loud_then_quiet_track() {
        let features = step_features(30, 60);
        let result = EnergyStructureAnalyzer::default().analyze(&features).unwrap();

        assert_eq!(result.duration_sec, 90.0);
        assert_eq!(result.segments.len(), 18);
        assert_eq!(result.segments[0].label, SegmentLabel::HighEnergy);
        assert_eq!(result.segments[3].label, SegmentLabel::HighEnergy);
        assert_eq!(result.segments[10].label, SegmentLabel::QuietIntroOutro);

        // The last loud frame is reported, one frame before the drop
        assert_eq!(result.mix_points, vec![29.9]);
    }

    #[test]
    fn test_constant_track_has_no_mix_points() {
        let mut features = step_features(0, 40);
        // Constant curves everywhere, including the padded edges
        features.rms = vec![0.0; 400];
        features.magnitude.frames = vec![vec![0.0, 0.0, 0.0]; 400];

        let result = EnergyStructureAnalyzer::default().analyze(&features).unwrap();
        assert!(result.mix_points.is_empty());
        assert!(result
            .segments
            .iter()
            .all(|s| s.label == SegmentLabel::QuietIntroOutro));
    }

    #[test]
    fn test_empty_features_fail() {
        let mut features = step_features(0, 0);
        features.duration = 0.0;
        assert!(EnergyStructureAnalyzer::default().analyze(&features).is_err());
    }
}
