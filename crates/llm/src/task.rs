//! Request and result types for the generation gateway.

use serde::{Deserialize, Serialize};

use crate::provider::SamplingParams;
use crate::providers::ProviderKind;

/// What the caller wants generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    Complete,
    GenerateFlashcards { count: usize },
    Summarize { num_points: usize },
    /// The request text is the question; `context` grounds the answer.
    AnswerQuestion { context: Option<String> },
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::Complete => "complete",
            TaskKind::GenerateFlashcards { .. } => "generate_flashcards",
            TaskKind::Summarize { .. } => "summarize",
            TaskKind::AnswerQuestion { .. } => "answer_question",
        }
    }
}

/// Per-request overrides. Unset fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub provider: Option<String>,
}

impl GenerationParams {
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn sampling(&self, defaults: &SamplingParams) -> SamplingParams {
        SamplingParams {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub task: TaskKind,
    pub text: String,
    #[serde(default)]
    pub params: GenerationParams,
}

impl GenerationRequest {
    pub fn complete(prompt: impl Into<String>) -> Self {
        Self::new(TaskKind::Complete, prompt)
    }

    pub fn flashcards(notes: impl Into<String>, count: usize) -> Self {
        Self::new(TaskKind::GenerateFlashcards { count }, notes)
    }

    pub fn summary(text: impl Into<String>, num_points: usize) -> Self {
        Self::new(TaskKind::Summarize { num_points }, text)
    }

    pub fn question(question: impl Into<String>, context: Option<String>) -> Self {
        Self::new(TaskKind::AnswerQuestion { context }, question)
    }

    fn new(task: TaskKind, text: impl Into<String>) -> Self {
        Self {
            task,
            text: text.into(),
            params: GenerationParams::default(),
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }
}

/// A question/answer pair as produced by the model, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardDraft {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GenerationResult {
    Text(String),
    Flashcards(Vec<FlashcardDraft>),
    Summary(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationKind {
    /// The backend could not be reached or answered with an error.
    Transient,
    /// The backend answered but the response had no usable structure.
    Parse,
}

/// Why a result is a placeholder rather than model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degradation {
    pub kind: DegradationKind,
    pub message: String,
}

impl Degradation {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: DegradationKind::Transient,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: DegradationKind::Parse,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub result: GenerationResult,
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

impl Generation {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.result {
            GenerationResult::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn flashcards(&self) -> &[FlashcardDraft] {
        match &self.result {
            GenerationResult::Flashcards(cards) => cards,
            _ => &[],
        }
    }

    pub fn points(&self) -> &[String] {
        match &self.result {
            GenerationResult::Summary(points) => points,
            _ => &[],
        }
    }

    pub fn into_text(self) -> String {
        match self.result {
            GenerationResult::Text(t) => t,
            GenerationResult::Summary(points) => points.join("\n"),
            GenerationResult::Flashcards(cards) => cards
                .into_iter()
                .map(|c| format!("Q: {}\nA: {}", c.question, c.answer))
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}
