use std::sync::LazyLock;

use regex::Regex;

use super::ResponseParser;

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+\.|\*|-)\s*(.*)").unwrap());
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Sentences this short are usually list debris, not points.
const MIN_SENTENCE_CHARS: usize = 10;

/// Numbered (`1.`) or bulleted (`*`, `-`) lines.
pub struct ListItems;

/// Prose split into sentences.
pub struct Sentences;

impl ResponseParser for ListItems {
    type Output = Vec<String>;

    fn try_parse(&self, raw: &str) -> Option<Self::Output> {
        let points: Vec<String> = raw
            .trim()
            .lines()
            .filter_map(|line| LIST_ITEM.captures(line))
            .map(|caps| caps[2].trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        (!points.is_empty()).then_some(points)
    }
}

impl ResponseParser for Sentences {
    type Output = Vec<String>;

    fn try_parse(&self, raw: &str) -> Option<Self::Output> {
        let flat = NEWLINES.replace_all(raw, " ");
        let points: Vec<String> = split_sentences(flat.trim())
            .into_iter()
            .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
            .map(str::to_string)
            .collect();
        (!points.is_empty()).then_some(points)
    }
}

/// Split after `.`, `!` or `?` when followed by whitespace. The punctuation
/// stays with its sentence; the whitespace run is dropped.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        sentences.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

pub fn summary_parser() -> impl ResponseParser<Output = Vec<String>> {
    ListItems.or(Sentences)
}
