//! Document ingestion: text extraction from uploads and segmentation of long
//! text into bounded, overlapping chunks for generation.

pub mod document;
pub mod segment;

pub use document::{extract_text, ExtractedDocument};
pub use segment::{segment, SegmentParams};
