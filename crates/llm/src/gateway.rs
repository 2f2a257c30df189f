//! Provider routing, prompt filling and response normalization.
//!
//! Only configuration errors escape [`Gateway::generate`]. Backend failures and
//! unparseable responses become placeholder results tagged with a
//! [`Degradation`].

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use studybot_core::config::{LlmConfig, SegmentConfig};
use studybot_ingest::segment::{char_len, SegmentParams};
use tracing::{debug, info, warn};

use crate::fallback;
use crate::parse;
use crate::prompt;
use crate::provider::{LlmError, LlmProvider, SamplingParams};
use crate::providers::{create_providers, credential_var, ConfigError, ProviderKind};
use crate::task::{
    Degradation, DegradationKind, Generation, GenerationParams, GenerationRequest,
    GenerationResult, TaskKind,
};

/// Map/reduce rounds before the reduced text is summarized as is.
const MAX_REDUCE_DEPTH: usize = 3;

/// Chunk summaries in flight at once against a single provider.
const MAX_CONCURRENT_CHUNKS: usize = 4;

pub struct Gateway {
    providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
    default_provider: String,
    defaults: SamplingParams,
    summary_segment: SegmentParams,
}

impl Gateway {
    /// A gateway with no providers registered; add them with [`Gateway::with_provider`].
    pub fn new(default_provider: impl Into<String>, defaults: SamplingParams) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
            defaults,
            summary_segment: SegmentParams::summary(&SegmentConfig::default()),
        }
    }

    /// Build from config, creating every provider that has credentials.
    pub fn from_config(llm: &LlmConfig, segment: &SegmentConfig) -> Result<Self, ConfigError> {
        let defaults = SamplingParams {
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            top_p: Some(llm.top_p),
        };
        let mut gateway = Self::new(llm.default_provider.clone(), defaults)
            .with_summary_segment(SegmentParams::summary(segment));
        gateway.providers = create_providers(llm)?;

        info!(
            "LLM gateway ready: default={}, providers={:?}",
            gateway.default_provider,
            gateway.available()
        );
        Ok(gateway)
    }

    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    pub fn with_summary_segment(mut self, params: SegmentParams) -> Self {
        self.summary_segment = params;
        self
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    /// Registered providers, in a stable order.
    pub fn available(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|k| self.providers.contains_key(k))
            .collect()
    }

    /// Pick the provider for a request: the explicit name, else the default.
    pub fn resolve(
        &self,
        name: Option<&str>,
    ) -> Result<(ProviderKind, Arc<dyn LlmProvider>), ConfigError> {
        let kind: ProviderKind = name.unwrap_or(&self.default_provider).parse()?;
        match self.providers.get(&kind) {
            Some(provider) => Ok((kind, Arc::clone(provider))),
            None => Err(ConfigError::MissingCredential {
                provider: kind,
                var: credential_var(kind).unwrap_or("provider"),
            }),
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<Generation, ConfigError> {
        let (kind, provider) = self.resolve(request.params.provider.as_deref())?;
        let sampling = request.params.sampling(&self.defaults);

        let generation = match request.task {
            TaskKind::Summarize { num_points } => {
                self.summarize_large(kind, provider, request.text.clone(), num_points, sampling, 0)
                    .await
            }
            _ => run_task(kind, provider.as_ref(), &request.task, &request.text, &sampling).await,
        };
        Ok(generation)
    }

    pub async fn complete(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Generation, ConfigError> {
        self.generate(&GenerationRequest::complete(prompt).with_params(params))
            .await
    }

    pub async fn generate_flashcards(
        &self,
        notes: &str,
        count: usize,
        params: GenerationParams,
    ) -> Result<Generation, ConfigError> {
        self.generate(&GenerationRequest::flashcards(notes, count).with_params(params))
            .await
    }

    /// Summarize `text`; long inputs go through chunked map/reduce.
    pub async fn summarize(
        &self,
        text: &str,
        num_points: usize,
        params: GenerationParams,
    ) -> Result<Generation, ConfigError> {
        self.generate(&GenerationRequest::summary(text, num_points).with_params(params))
            .await
    }

    pub async fn answer_question(
        &self,
        question: &str,
        context: Option<String>,
        params: GenerationParams,
    ) -> Result<Generation, ConfigError> {
        self.generate(&GenerationRequest::question(question, context).with_params(params))
            .await
    }

    fn summarize_large(
        &self,
        kind: ProviderKind,
        provider: Arc<dyn LlmProvider>,
        text: String,
        num_points: usize,
        sampling: SamplingParams,
        depth: usize,
    ) -> BoxFuture<'_, Generation> {
        Box::pin(async move {
            let task = TaskKind::Summarize { num_points };

            if char_len(&text) <= self.summary_segment.chunk_size || depth >= MAX_REDUCE_DEPTH {
                return run_task(kind, provider.as_ref(), &task, &text, &sampling).await;
            }

            let chunks = self.summary_segment.apply(&text);
            if chunks.len() <= 1 {
                return run_task(kind, provider.as_ref(), &task, &text, &sampling).await;
            }

            debug!(
                "summarizing {} chars as {} chunks (depth {})",
                char_len(&text),
                chunks.len(),
                depth
            );

            // Results stay in chunk order.
            let pending: Vec<_> = chunks
                .iter()
                .map(|chunk| run_task(kind, provider.as_ref(), &task, chunk, &sampling))
                .collect();
            let partials: Vec<Generation> = stream::iter(pending)
                .buffered(MAX_CONCURRENT_CHUNKS)
                .collect()
                .await;

            let usable: Vec<&Generation> = partials.iter().filter(|g| !g.is_degraded()).collect();
            if usable.is_empty() {
                warn!("all {} summary chunks degraded", partials.len());
                // chunks.len() > 1, so there is a first partial.
                return partials.into_iter().next().unwrap_or_else(|| Generation {
                    result: GenerationResult::Summary(fallback::placeholder_points(num_points)),
                    provider: kind,
                    degraded: Some(Degradation::parse("no summary chunks")),
                });
            }
            if usable.len() < partials.len() {
                warn!(
                    "{} of {} summary chunks degraded, reducing the rest",
                    partials.len() - usable.len(),
                    partials.len()
                );
            }

            let combined = usable
                .iter()
                .copied()
                .flat_map(Generation::points)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n");

            self.summarize_large(kind, provider, combined, num_points, sampling, depth + 1)
                .await
        })
    }
}

/// One prompt, one request, one normalized result.
async fn run_task(
    kind: ProviderKind,
    provider: &dyn LlmProvider,
    task: &TaskKind,
    text: &str,
    sampling: &SamplingParams,
) -> Generation {
    let prompt = prompt::build(task, text);
    let (result, degraded) = match provider.generate(&prompt, sampling).await {
        Ok(raw) => normalize(task, &raw),
        Err(e) => {
            warn!("{} via {} failed, using placeholder: {}", task.name(), kind, e);
            transport_fallback(task, &e)
        }
    };

    if let Some(d) = &degraded {
        if d.kind == DegradationKind::Parse {
            warn!("{} via {} unparseable: {}", task.name(), kind, d.message);
        }
    }

    Generation {
        result,
        provider: kind,
        degraded,
    }
}

fn normalize(task: &TaskKind, raw: &str) -> (GenerationResult, Option<Degradation>) {
    match task {
        TaskKind::Complete | TaskKind::AnswerQuestion { .. } => {
            (GenerationResult::Text(raw.trim().to_string()), None)
        }
        TaskKind::GenerateFlashcards { count } => match parse::parse_flashcards(raw, *count) {
            Some(cards) => (GenerationResult::Flashcards(cards), None),
            None => (
                GenerationResult::Flashcards(fallback::placeholder_flashcards(*count)),
                Some(Degradation::parse("no flashcard JSON array in response")),
            ),
        },
        TaskKind::Summarize { num_points } => match parse::parse_summary(raw, *num_points) {
            Some(points) => (GenerationResult::Summary(points), None),
            None => (
                GenerationResult::Summary(fallback::placeholder_points(*num_points)),
                Some(Degradation::parse("no summary points in response")),
            ),
        },
    }
}

fn transport_fallback(task: &TaskKind, err: &LlmError) -> (GenerationResult, Option<Degradation>) {
    let result = match task {
        TaskKind::Complete | TaskKind::AnswerQuestion { .. } => {
            GenerationResult::Text(fallback::simulated_text(err))
        }
        TaskKind::GenerateFlashcards { count } => {
            GenerationResult::Flashcards(fallback::error_flashcards(*count, err))
        }
        TaskKind::Summarize { num_points } => {
            GenerationResult::Summary(fallback::error_points(*num_points, err))
        }
    };
    (result, Some(Degradation::transient(err.to_string())))
}

#[cfg(test)]
mod tests;
