//! Rekordbox collection export

pub mod schema;
pub mod uri;
pub mod xml;

pub use xml::{render_collection, write_rekordbox_xml};
