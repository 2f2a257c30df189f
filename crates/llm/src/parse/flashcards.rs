use std::sync::LazyLock;

use regex::Regex;

use super::ResponseParser;
use crate::task::FlashcardDraft;

static FIRST_ARRAY_OF_OBJECTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.*?\}\s*\]").unwrap());
static WIDEST_ARRAY_OF_OBJECTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").unwrap());

/// The response is nothing but a JSON array.
pub struct StrictJsonArray;

/// The array sits inside a ``` fenced block.
pub struct FencedJsonArray;

/// The array is embedded in surrounding prose.
pub struct EmbeddedJsonArray;

fn decode(json: &str) -> Option<Vec<FlashcardDraft>> {
    let cards: Vec<FlashcardDraft> = serde_json::from_str(json).ok()?;
    if cards.is_empty() {
        None
    } else {
        Some(cards)
    }
}

impl ResponseParser for StrictJsonArray {
    type Output = Vec<FlashcardDraft>;

    fn try_parse(&self, raw: &str) -> Option<Self::Output> {
        let trimmed = raw.trim();
        if !trimmed.starts_with('[') {
            return None;
        }
        decode(trimmed)
    }
}

impl ResponseParser for FencedJsonArray {
    type Output = Vec<FlashcardDraft>;

    fn try_parse(&self, raw: &str) -> Option<Self::Output> {
        let start = raw.find("```")? + 3;
        let after_tick = &raw[start..];
        // Skip past any language identifier on the same line
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        let end = after_tick[content_start..].find("```")?;
        StrictJsonArray.try_parse(&after_tick[content_start..content_start + end])
    }
}

impl ResponseParser for EmbeddedJsonArray {
    type Output = Vec<FlashcardDraft>;

    fn try_parse(&self, raw: &str) -> Option<Self::Output> {
        // The shortest span survives trailing `}]` in prose; the widest one
        // survives nested arrays of objects.
        [&FIRST_ARRAY_OF_OBJECTS, &WIDEST_ARRAY_OF_OBJECTS]
            .into_iter()
            .find_map(|re| decode(re.find(raw)?.as_str()))
    }
}

pub fn flashcard_parser() -> impl ResponseParser<Output = Vec<FlashcardDraft>> {
    StrictJsonArray.or(FencedJsonArray).or(EmbeddedJsonArray)
}
