//! Analysis trait abstractions
//!
//! These traits define the interface for swappable analysis backends. Both
//! read the same immutable [`AudioFeatures`] and never write it, so the
//! pipeline runs them side by side.

use crate::error::Result;
use crate::features::AudioFeatures;
use crate::types::{KeyResult, StructureResult};

/// Musical key detection backend
pub trait KeyDetector: Send + Sync {
    /// Detect musical key from extracted features
    fn detect(&self, features: &AudioFeatures) -> Result<KeyResult>;

    /// Get the name of this detector (for logging)
    fn name(&self) -> &'static str;
}

/// Energy-structure analysis backend
pub trait StructureAnalyzer: Send + Sync {
    /// Build the segment map and mix points from extracted features
    fn analyze(&self, features: &AudioFeatures) -> Result<StructureResult>;

    /// Get the name of this analyzer (for logging)
    fn name(&self) -> &'static str;
}
