//! Per-track analysis shared by the batch pipeline and the HTTP server

use crate::analysis::{
    EnergyStructureAnalyzer, KeyDetector, StructureAnalyzer, TemplateKeyDetector,
};
use crate::cancel::CancelToken;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::features::{FeatureProvider, SpectralFeatureProvider};
use crate::types::{AudioBuffer, KeyResult, StructureResult};
use std::sync::Arc;
use tracing::debug;

/// Feature extraction plus the two analysis backends
///
/// Cheap to clone; all backends are shared behind `Arc`.
#[derive(Clone)]
pub struct TrackAnalyzer {
    provider: Arc<dyn FeatureProvider>,
    key_detector: Arc<dyn KeyDetector>,
    structure_analyzer: Arc<dyn StructureAnalyzer>,
}

impl TrackAnalyzer {
    /// Default backends configured from `config`
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_backends(
            Arc::new(SpectralFeatureProvider::new(config.clone())),
            Arc::new(TemplateKeyDetector::new()),
            Arc::new(EnergyStructureAnalyzer::new(config.clone())),
        )
    }

    pub fn with_backends(
        provider: Arc<dyn FeatureProvider>,
        key_detector: Arc<dyn KeyDetector>,
        structure_analyzer: Arc<dyn StructureAnalyzer>,
    ) -> Self {
        debug!(
            "Track analyzer: features={}, key={}, structure={}",
            provider.name(),
            key_detector.name(),
            structure_analyzer.name()
        );
        Self {
            provider,
            key_detector,
            structure_analyzer,
        }
    }

    /// Key only
    pub fn analyze_key(&self, buffer: &AudioBuffer, cancel: &CancelToken) -> Result<KeyResult> {
        let features = self.provider.extract(buffer, cancel)?;
        self.key_detector.detect(&features)
    }

    /// Structure only
    pub fn analyze_structure(
        &self,
        buffer: &AudioBuffer,
        cancel: &CancelToken,
    ) -> Result<StructureResult> {
        let features = self.provider.extract(buffer, cancel)?;
        self.structure_analyzer.analyze(&features)
    }

    /// Key and structure from one feature pass
    ///
    /// Both backends only read the features, so they run side by side.
    pub fn analyze(
        &self,
        buffer: &AudioBuffer,
        cancel: &CancelToken,
    ) -> Result<(KeyResult, StructureResult)> {
        let features = self.provider.extract(buffer, cancel)?;
        cancel.check("analysis")?;

        let (key, structure) = rayon::join(
            || self.key_detector.detect(&features),
            || self.structure_analyzer.analyze(&features),
        );
        Ok((key?, structure?))
    }
}

impl Default for TrackAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}
