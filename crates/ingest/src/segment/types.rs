//! Segmentation parameters.

use studybot_core::config::SegmentConfig;

/// Chunk budget and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentParams {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl SegmentParams {
    pub const fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }

    /// General-purpose chunking (prompt context, previews).
    pub fn general(config: &SegmentConfig) -> Self {
        Self::new(config.chunk_size, config.overlap)
    }

    /// Chunking used by large-document summarization.
    pub fn summary(config: &SegmentConfig) -> Self {
        Self::new(config.summary_chunk_size, config.summary_overlap)
    }

    pub fn apply(&self, text: &str) -> Vec<String> {
        super::segment(text, self.chunk_size, self.overlap)
    }
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self::general(&SegmentConfig::default())
    }
}
