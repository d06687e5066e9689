//! Export modules for Rekordbox XML and JSON

pub mod json;
pub mod rekordbox;

pub use json::{read_carried_tracks, read_existing_analysis, write_json};
pub use rekordbox::write_rekordbox_xml;
