//! Audio decoding

pub mod decoder;

pub use decoder::{decode, decode_bytes, TARGET_SAMPLE_RATE};
