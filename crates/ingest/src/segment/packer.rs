//! Greedy paragraph/sentence packing and overlap stitching.

use super::helpers::{char_len, tail_chars, Buffer};

const PARAGRAPH_BREAK: &str = "\n";
const SENTENCE_BREAK: &str = ". ";

/// Pack `text` into chunks of at most `chunk_size` characters (pre-overlap).
///
/// Paragraphs are joined with `\n`. A paragraph longer than the budget first
/// seals whatever is buffered, is then packed sentence by sentence, and its
/// last sub-chunk stays open so following paragraphs can still join it.
/// Blank lines never start a chunk, and whitespace-only chunks are dropped.
pub(crate) fn pack_paragraphs(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = Buffer::default();

    for para in text.split(PARAGRAPH_BREAK) {
        let para_chars = char_len(para);

        if para_chars > chunk_size {
            current.seal_into(&mut chunks);
            current = pack_sentences(para, chunk_size, &mut chunks);
            continue;
        }

        if !current.fits(PARAGRAPH_BREAK, para_chars, chunk_size) {
            current.seal_into(&mut chunks);
        }
        // Blank lines only separate paragraphs; never open a chunk with one.
        if current.is_empty() && para.trim().is_empty() {
            continue;
        }
        current.join(PARAGRAPH_BREAK, para, para_chars);
    }

    current.seal_into(&mut chunks);
    chunks
}

/// Pack one oversized paragraph by sentences, sealing full sub-chunks into
/// `chunks` and returning the final, still-open sub-chunk.
///
/// Each sentence keeps its terminating period so no text is lost when a
/// sentence break falls on a chunk boundary.
fn pack_sentences(para: &str, chunk_size: usize, chunks: &mut Vec<String>) -> Buffer {
    let mut sub = Buffer::default();
    let mut sentences = para.split(SENTENCE_BREAK).peekable();

    while let Some(sentence) = sentences.next() {
        let piece = if sentences.peek().is_some() {
            format!("{sentence}.")
        } else {
            sentence.to_string()
        };
        let piece_chars = char_len(&piece);

        if !sub.fits(" ", piece_chars, chunk_size) {
            sub.seal_into(chunks);
        }
        sub.join(" ", &piece, piece_chars);
    }

    sub
}

/// Prefix every chunk after the first with the tail of its predecessor.
pub(crate) fn stitch_overlap(chunks: &[String], overlap: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(chunks.len());
    if let Some(first) = chunks.first() {
        out.push(first.clone());
    }
    for pair in chunks.windows(2) {
        let prefix = tail_chars(&pair[0], overlap);
        let mut stitched = String::with_capacity(prefix.len() + pair[1].len());
        stitched.push_str(prefix);
        stitched.push_str(&pair[1]);
        out.push(stitched);
    }
    out
}
