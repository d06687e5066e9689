//! Audio analysis modules
//!
//! Key detection and structure analysis sit behind traits so the pipeline
//! and the server can swap backends without touching their own code.

pub mod key;
pub mod metadata;
pub mod structure;
pub mod traits;

pub use traits::{KeyDetector, StructureAnalyzer};

pub use key::TemplateKeyDetector;
pub use structure::EnergyStructureAnalyzer;
