//! Prompt templates, one per task kind.

use crate::task::TaskKind;

const NOT_FOUND_REPLY: &str = "I could not find that information in the available materials.";

/// Fill the template for `task` with the request text.
pub fn build(task: &TaskKind, text: &str) -> String {
    match task {
        TaskKind::Complete => text.to_string(),
        TaskKind::GenerateFlashcards { count } => flashcards(text, *count),
        TaskKind::Summarize { num_points } => summary(text, *num_points),
        TaskKind::AnswerQuestion { context } => answer(text, context.as_deref()),
    }
}

pub fn flashcards(text: &str, count: usize) -> String {
    format!(
        "Generate {count} educational flashcards from the text below.\n\
         Each flashcard must have a clear question and a concise answer.\n\
         Focus on the most important concepts.\n\
         \n\
         TEXT:\n\
         {text}\n\
         \n\
         RESPONSE FORMAT:\n\
         Return only a JSON array in the form:\n\
         [\n  \
           {{\"question\": \"Question 1?\", \"answer\": \"Answer 1\"}},\n  \
           {{\"question\": \"Question 2?\", \"answer\": \"Answer 2\"}}\n\
         ]\n"
    )
}

pub fn summary(text: &str, num_points: usize) -> String {
    format!(
        "Summarize the following text in {num_points} main points.\n\
         Each point must be concise and capture one important idea of the text.\n\
         \n\
         TEXT:\n\
         {text}\n\
         \n\
         RESPONSE FORMAT:\n\
         Return only a numbered list of the main points, with no additional text.\n\
         Example:\n\
         1. First important point\n\
         2. Second important point\n\
         ...\n"
    )
}

pub fn answer(question: &str, context: Option<&str>) -> String {
    match context.filter(|c| !c.trim().is_empty()) {
        Some(context) => format!(
            "Use only the information given in the CONTEXT below to answer the QUESTION.\n\
             If the answer cannot be found in the context, say \"{NOT_FOUND_REPLY}\"\n\
             \n\
             CONTEXT:\n\
             {context}\n\
             \n\
             QUESTION:\n\
             {question}\n\
             \n\
             ANSWER:\n"
        ),
        None => format!(
            "Answer the following question clearly and concisely:\n\
             \n\
             QUESTION:\n\
             {question}\n\
             \n\
             ANSWER:\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_passes_text_through() {
        assert_eq!(build(&TaskKind::Complete, "Say hi"), "Say hi");
    }

    #[test]
    fn flashcard_prompt_names_count_and_format() {
        let p = build(&TaskKind::GenerateFlashcards { count: 4 }, "Cells divide.");
        assert!(p.starts_with("Generate 4 educational flashcards"));
        assert!(p.contains("Cells divide."));
        assert!(p.contains(r#"{"question": "Question 1?", "answer": "Answer 1"}"#));
    }

    #[test]
    fn summary_prompt_asks_for_numbered_list() {
        let p = build(&TaskKind::Summarize { num_points: 3 }, "Long text");
        assert!(p.contains("in 3 main points"));
        assert!(p.contains("1. First important point"));
    }

    #[test]
    fn answer_uses_context_when_present() {
        let grounded = answer("What is ATP?", Some("ATP stores energy."));
        assert!(grounded.contains("CONTEXT:\nATP stores energy."));
        assert!(grounded.contains(NOT_FOUND_REPLY));

        let plain = answer("What is ATP?", Some("   "));
        assert!(!plain.contains("CONTEXT"));
        assert!(plain.contains("QUESTION:\nWhat is ATP?"));
    }
}
