//! Deterministic placeholder results for failed or unusable generations.

use crate::task::FlashcardDraft;

/// Synthetic flashcards are capped so a failure never floods the deck.
const MAX_PLACEHOLDER_CARDS: usize = 3;

/// Synthetic summary points are capped the same way.
const MAX_PLACEHOLDER_POINTS: usize = 10;

pub fn simulated_text(err: &impl std::fmt::Display) -> String {
    format!("[Simulated response due to API error: {err}]")
}

/// Cards used when the model answered but no card could be parsed.
pub fn placeholder_flashcards(count: usize) -> Vec<FlashcardDraft> {
    (1..=count.min(MAX_PLACEHOLDER_CARDS))
        .map(|i| FlashcardDraft {
            question: format!("Generated question {i} about the text"),
            answer: format!("Generated answer {i} to the question"),
        })
        .collect()
}

/// Cards used when the backend could not be reached.
pub fn error_flashcards(count: usize, err: &impl std::fmt::Display) -> Vec<FlashcardDraft> {
    (1..=count.min(MAX_PLACEHOLDER_CARDS))
        .map(|i| FlashcardDraft {
            question: format!("Generated question {i} about the text"),
            answer: format!("Answer unavailable due to API error: {err}"),
        })
        .collect()
}

pub fn placeholder_points(num_points: usize) -> Vec<String> {
    (1..=num_points.min(MAX_PLACEHOLDER_POINTS))
        .map(|i| format!("Summary point {i} about the text"))
        .collect()
}

pub fn error_points(num_points: usize, err: &impl std::fmt::Display) -> Vec<String> {
    (1..=num_points.min(MAX_PLACEHOLDER_POINTS))
        .map(|i| format!("Summary point {i} unavailable due to API error: {err}"))
        .collect()
}
