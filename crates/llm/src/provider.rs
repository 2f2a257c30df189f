use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling knobs sent with every generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Nucleus sampling; only some backends accept it.
    pub top_p: Option<f32>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
            top_p: Some(0.9),
        }
    }
}

/// Trait for text-generation backends. Each provider implements this.
///
/// One call is one outbound request: implementations must not retry.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a single prompt and return the generated text.
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<String, LlmError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    ParseError(String),
}
