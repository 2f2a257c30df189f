//! Text segmentation for generation prompts.
//!
//! Splits long text into chunks of at most `chunk_size` characters, packing
//! whole paragraphs first and falling back to sentences (`". "`) for
//! paragraphs that do not fit. Adjacent chunks can be stitched with a trailing
//! overlap from their predecessor so cross-boundary context survives.
//!
//! Lengths are counted in characters, never bytes. A sentence longer than the
//! budget is emitted whole rather than cut.

mod helpers;
mod packer;
mod types;

pub use types::SegmentParams;

pub use helpers::char_len;
use packer::{pack_paragraphs, stitch_overlap};

/// Split `text` into ordered chunks of at most `chunk_size` characters.
///
/// Text that already fits is returned unchanged as a single chunk, so empty
/// input yields `[""]`. With `overlap > 0`, every chunk after the first starts
/// with the last `overlap` characters of the previous chunk (or all of it when
/// shorter). A `chunk_size` of zero is treated as one.
pub fn segment(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let chunks = pack_paragraphs(text, chunk_size);
    if overlap > 0 && chunks.len() > 1 {
        stitch_overlap(&chunks, overlap)
    } else {
        chunks
    }
}
