//! Batch analysis pipeline

pub mod analyzer;
pub mod orchestrator;

pub use analyzer::TrackAnalyzer;
pub use orchestrator::{run, PipelineResult, JSON_FILE_NAME, XML_FILE_NAME};
