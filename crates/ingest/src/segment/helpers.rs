//! Character-counting helpers shared by the packer.

/// Length in characters.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The last `n` characters of `text`, or all of it when shorter.
pub(crate) fn tail_chars(text: &str, n: usize) -> &str {
    let len = char_len(text);
    if len <= n {
        return text;
    }
    match text.char_indices().nth(len - n) {
        Some((byte_idx, _)) => &text[byte_idx..],
        None => "",
    }
}

/// A growing chunk that tracks its own character count.
///
/// Pieces are joined with a separator that is only emitted between pieces,
/// never at the start of a chunk.
#[derive(Debug, Default)]
pub(crate) struct Buffer {
    text: String,
    chars: usize,
    pieces: usize,
}

impl Buffer {
    pub(crate) fn chars(&self) -> usize {
        self.chars
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pieces == 0
    }

    /// Whether joining a piece of `piece_chars` with `sep` stays within `budget`.
    pub(crate) fn fits(&self, sep: &str, piece_chars: usize, budget: usize) -> bool {
        let sep_chars = if self.pieces == 0 { 0 } else { char_len(sep) };
        self.chars + sep_chars + piece_chars <= budget
    }

    pub(crate) fn join(&mut self, sep: &str, piece: &str, piece_chars: usize) {
        if self.pieces > 0 {
            self.text.push_str(sep);
            self.chars += char_len(sep);
        }
        self.text.push_str(piece);
        self.chars += piece_chars;
        self.pieces += 1;
    }

    /// Move the buffer into `out` without trailing blank lines, leaving it
    /// empty. Whitespace-only buffers are discarded.
    pub(crate) fn seal_into(&mut self, out: &mut Vec<String>) {
        let mut sealed = std::mem::take(&mut self.text);
        if !sealed.trim().is_empty() {
            sealed.truncate(sealed.trim_end().len());
            out.push(sealed);
        }
        self.chars = 0;
        self.pieces = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_of_short_text_is_whole_text() {
        assert_eq!(tail_chars("abc", 5), "abc");
        assert_eq!(tail_chars("abc", 3), "abc");
    }

    #[test]
    fn tail_respects_char_boundaries() {
        assert_eq!(tail_chars("ação rápida", 6), "rápida");
        assert_eq!(char_len("ação"), 4);
    }

    #[test]
    fn separator_only_between_pieces() {
        let mut buf = Buffer::default();
        assert!(buf.fits("\n", 5, 5));
        buf.join("\n", "hello", 5);
        assert!(buf.fits("\n", 4, 10));
        assert!(!buf.fits("\n", 5, 10));
        buf.join("\n", "four", 4);

        let mut out = Vec::new();
        buf.seal_into(&mut out);
        assert_eq!(out, vec!["hello\nfour".to_string()]);
        assert_eq!(buf.chars(), 0);
    }

    #[test]
    fn seal_skips_empty_buffer() {
        let mut out = Vec::new();
        Buffer::default().seal_into(&mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn seal_skips_whitespace_only_buffer() {
        let mut buf = Buffer::default();
        buf.join("\n", " ", 1);
        buf.join("\n", "", 0);
        assert!(!buf.is_empty());

        let mut out = Vec::new();
        buf.seal_into(&mut out);
        assert!(out.is_empty());
        assert!(buf.is_empty());

        buf.join("\n", "text", 4);
        buf.join("\n", "", 0);
        buf.seal_into(&mut out);
        assert_eq!(out, vec!["text".to_string()]);
    }
}
