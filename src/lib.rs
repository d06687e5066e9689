//! mixmap - musical key and energy-structure analysis for DJs
//!
//! Estimates each track's key (with Camelot and Open Key codes) and a coarse
//! structural map: sections sampled every few seconds and the mix points
//! where the bass drops in or out. Results go to JSON and Rekordbox XML, or
//! are served over HTTP.
//!
//! # Architecture
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: File scanning and track ID generation
//! - `audio`: Audio decoding using symphonia
//! - `features`: STFT, chroma and loudness extraction
//! - `analysis`: Key detection and structure analysis (swappable backends)
//! - `pipeline`: Parallel batch orchestration
//! - `export`: Rekordbox XML and JSON output
//! - `server`: HTTP endpoints over the same analysis
//!
//! # Example
//!
//! ```no_run
//! use mixmap::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let result = pipeline::run(&settings).expect("Analysis failed");
//! println!("Processed {} tracks", result.successful);
//! ```

pub mod analysis;
pub mod audio;
pub mod cancel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod features;
pub mod pipeline;
pub mod server;
pub mod types;

// Re-export key types at crate root
pub use cancel::CancelToken;
pub use error::{MixmapError, Result};
pub use types::{AnalyzedTrack, AudioBuffer, KeyResult, Segment, SegmentLabel, StructureResult};
