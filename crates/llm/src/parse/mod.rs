//! Normalization of raw model output into structured results.
//!
//! Each parser tries one strategy and returns `None` when it does not apply;
//! strategies are stacked with [`ResponseParser::or`] so the first that
//! succeeds wins.

mod flashcards;
mod summary;

pub use flashcards::{flashcard_parser, EmbeddedJsonArray, FencedJsonArray, StrictJsonArray};
pub use summary::{summary_parser, ListItems, Sentences};

use crate::task::FlashcardDraft;

pub trait ResponseParser {
    type Output;

    fn try_parse(&self, raw: &str) -> Option<Self::Output>;

    /// Fall through to `next` when this parser yields nothing.
    fn or<P>(self, next: P) -> Layered<Self, P>
    where
        Self: Sized,
        P: ResponseParser<Output = Self::Output>,
    {
        Layered(self, next)
    }
}

/// Two parsers tried in order.
pub struct Layered<A, B>(pub A, pub B);

impl<A, B> ResponseParser for Layered<A, B>
where
    A: ResponseParser,
    B: ResponseParser<Output = A::Output>,
{
    type Output = A::Output;

    fn try_parse(&self, raw: &str) -> Option<Self::Output> {
        self.0.try_parse(raw).or_else(|| self.1.try_parse(raw))
    }
}

/// Parse flashcards, keeping at most `count`. `None` means nothing usable.
pub fn parse_flashcards(raw: &str, count: usize) -> Option<Vec<FlashcardDraft>> {
    let mut cards = flashcard_parser().try_parse(raw)?;
    cards.truncate(count);
    Some(cards)
}

/// Parse summary points, keeping at most `num_points`.
pub fn parse_summary(raw: &str, num_points: usize) -> Option<Vec<String>> {
    let mut points = summary_parser().try_parse(raw)?;
    points.truncate(num_points);
    Some(points)
}
