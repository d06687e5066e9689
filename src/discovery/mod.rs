//! Audio file discovery and track identity

pub mod scanner;

pub use scanner::{generate_track_id, scan, DiscoveredFile};
