//! Gateway tests against a scripted in-process provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Gateway, MAX_CONCURRENT_CHUNKS};
use crate::provider::{LlmError, LlmProvider, SamplingParams};
use crate::providers::{ConfigError, ProviderKind};
use crate::task::{DegradationKind, GenerationParams, GenerationResult};
use studybot_ingest::SegmentParams;

type Reply = Box<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

struct Scripted {
    reply: Reply,
    calls: Mutex<Vec<(String, SamplingParams)>>,
}

impl Scripted {
    fn new(reply: impl Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn text(reply: &'static str) -> Arc<Self> {
        Self::new(move |_| Ok(reply.to_string()))
    }

    fn failing() -> Arc<Self> {
        Self::new(|_| Err(server_error()))
    }

    fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }
}

#[async_trait]
impl LlmProvider for Scripted {
    async fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((prompt.to_string(), *params));
        (self.reply)(prompt)
    }
}

fn server_error() -> LlmError {
    LlmError::ApiError {
        status: 500,
        body: "model overloaded".into(),
    }
}

fn gateway(provider: Arc<Scripted>) -> Gateway {
    Gateway::new("mistral", SamplingParams::default())
        .with_provider(ProviderKind::Mistral, provider)
}

fn no_params() -> GenerationParams {
    GenerationParams::default()
}

// ── Provider selection ──────────────────────────────────────────────

#[tokio::test]
async fn unknown_provider_is_a_config_error() {
    let mock = Scripted::text("unused");
    let gw = gateway(mock.clone());

    let err = gw
        .answer_question("What is ATP?", None, no_params().with_provider("unknown_provider"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::UnknownProvider(ref n) if n == "unknown_provider"));
    assert!(mock.prompts().is_empty(), "no request may be sent");
}

#[tokio::test]
async fn claude_without_key_is_missing_credential() {
    let gw = gateway(Scripted::text("unused"));
    let err = gw
        .complete("hi", no_params().with_provider("Claude"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::MissingCredential { provider: ProviderKind::Claude, var: "ANTHROPIC_API_KEY" }
    ));
}

#[tokio::test]
async fn invalid_default_fails_at_call_time() {
    let gw = Gateway::new("gpt", SamplingParams::default())
        .with_provider(ProviderKind::Mistral, Scripted::text("x"));
    assert!(gw.complete("hi", no_params()).await.is_err());
    assert!(gw.complete("hi", no_params().with_provider("mistral")).await.is_ok());
}

#[tokio::test]
async fn explicit_provider_overrides_default() {
    let mistral = Scripted::text("from mistral");
    let claude = Scripted::text("from claude");
    let gw = gateway(mistral.clone()).with_provider(ProviderKind::Claude, claude.clone());

    let generation = gw.complete("hi", no_params().with_provider("CLAUDE")).await.unwrap();
    assert_eq!(generation.provider, ProviderKind::Claude);
    assert_eq!(generation.text(), Some("from claude"));
    assert!(mistral.prompts().is_empty());
    assert_eq!(gw.available(), vec![ProviderKind::Mistral, ProviderKind::Claude]);
}

#[tokio::test]
async fn overrides_reach_the_provider() {
    let mock = Scripted::text("ok");
    let gw = gateway(mock.clone());
    gw.complete("hi", no_params().with_temperature(0.1).with_max_tokens(64))
        .await
        .unwrap();

    let calls = mock.calls.lock().unwrap();
    assert_eq!(calls[0].1.temperature, 0.1);
    assert_eq!(calls[0].1.max_tokens, 64);
    assert_eq!(calls[0].1.top_p, SamplingParams::default().top_p);
}

// ── Completion & question answering ─────────────────────────────────

#[tokio::test]
async fn completion_is_trimmed_text() {
    let mock = Scripted::text("  Hello there.\n");
    let generation = gateway(mock.clone()).complete("Say hello", no_params()).await.unwrap();

    assert_eq!(generation.result, GenerationResult::Text("Hello there.".into()));
    assert!(!generation.is_degraded());
    assert_eq!(mock.prompts(), vec!["Say hello"]);
}

#[tokio::test]
async fn completion_failure_is_simulated_text() {
    let generation = gateway(Scripted::failing()).complete("hi", no_params()).await.unwrap();

    assert_eq!(
        generation.text(),
        Some("[Simulated response due to API error: API error: 500: model overloaded]")
    );
    let degraded = generation.degraded.unwrap();
    assert_eq!(degraded.kind, DegradationKind::Transient);
}

#[tokio::test]
async fn answer_uses_grounding_context() {
    let mock = Scripted::text("ATP stores energy.");
    let generation = gateway(mock.clone())
        .answer_question("What is ATP?", Some("ATP is the energy currency.".into()), no_params())
        .await
        .unwrap();

    assert_eq!(generation.text(), Some("ATP stores energy."));
    let prompt = &mock.prompts()[0];
    assert!(prompt.contains("CONTEXT:\nATP is the energy currency."));
    assert!(prompt.contains("QUESTION:\nWhat is ATP?"));
}

// ── Flashcards ──────────────────────────────────────────────────────

#[tokio::test]
async fn flashcards_from_prose_wrapped_json() {
    let mock = Scripted::text(
        "Here you go:\n[{\"question\": \"What is DNA?\", \"answer\": \"Genetic code\"}, \
         {\"question\": \"What is RNA?\", \"answer\": \"A messenger\"}, \
         {\"question\": \"What is ATP?\", \"answer\": \"Energy\"}]",
    );
    let generation = gateway(mock)
        .generate_flashcards("notes", 2, no_params())
        .await
        .unwrap();

    assert!(!generation.is_degraded());
    let cards = generation.flashcards();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].question, "What is DNA?");
}

#[tokio::test]
async fn malformed_flashcards_fall_back_to_placeholders() {
    let mock = Scripted::text("[{\"question\": \"What is DNA?\", \"answer\": ");
    let generation = gateway(mock)
        .generate_flashcards("notes", 2, no_params())
        .await
        .unwrap();

    let cards = generation.flashcards();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| !c.question.is_empty() && !c.answer.is_empty()));
    assert!(cards[1].question.contains('2'));
    assert_eq!(generation.degraded.unwrap().kind, DegradationKind::Parse);
}

#[tokio::test]
async fn flashcard_transport_failure_caps_at_three() {
    let generation = gateway(Scripted::failing())
        .generate_flashcards("notes", 5, no_params())
        .await
        .unwrap();

    let cards = generation.flashcards();
    assert_eq!(cards.len(), 3);
    assert!(cards.iter().all(|c| c.answer.contains("model overloaded")));
    assert_eq!(generation.degraded.unwrap().kind, DegradationKind::Transient);
}

// ── Summaries ───────────────────────────────────────────────────────

#[tokio::test]
async fn numbered_summary_is_truncated() {
    let mock = Scripted::text("1. Point one\n2. Point two\n3. Point three\n4. Point four");
    let generation = gateway(mock).summarize("text", 3, no_params()).await.unwrap();

    assert_eq!(generation.points(), ["Point one", "Point two", "Point three"]);
    assert!(!generation.is_degraded());
}

#[tokio::test]
async fn unusable_summary_gives_placeholders() {
    let generation = gateway(Scripted::text("Nope."))
        .summarize("text", 4, no_params())
        .await
        .unwrap();

    assert_eq!(generation.points().len(), 4);
    assert_eq!(generation.degraded.unwrap().kind, DegradationKind::Parse);
}

#[tokio::test]
async fn summary_failure_gives_error_points() {
    let generation = gateway(Scripted::failing())
        .summarize("text", 2, no_params())
        .await
        .unwrap();

    assert_eq!(generation.points().len(), 2);
    assert!(generation.points()[0].contains("model overloaded"));
}

#[tokio::test]
async fn huge_point_count_keeps_placeholders_bounded() {
    let generation = gateway(Scripted::failing())
        .summarize("text", usize::MAX, no_params())
        .await
        .unwrap();
    assert_eq!(generation.points().len(), 10);
    assert_eq!(generation.degraded.unwrap().kind, DegradationKind::Transient);

    let generation = gateway(Scripted::text("Nope."))
        .summarize("text", usize::MAX, no_params())
        .await
        .unwrap();
    assert_eq!(generation.points().len(), 10);
    assert_eq!(generation.degraded.unwrap().kind, DegradationKind::Parse);

    let generation = gateway(Scripted::failing())
        .generate_flashcards("notes", usize::MAX, no_params())
        .await
        .unwrap();
    assert_eq!(generation.flashcards().len(), 3);
}

// ── Large-document summaries ────────────────────────────────────────

const PARAGRAPHS: [&str; 4] = [
    "Paragraph one is about cell membranes.",
    "Paragraph two is about mitochondria.",
    "Paragraph three is about ribosomes too.",
    "Paragraph four is about the nucleus.",
];

fn small_chunk_gateway(provider: Arc<Scripted>) -> Gateway {
    gateway(provider).with_summary_segment(SegmentParams::new(50, 0))
}

#[tokio::test]
async fn large_text_is_mapped_then_reduced() {
    let mock = Scripted::text("- Key idea");
    let generation = small_chunk_gateway(mock.clone())
        .summarize(&PARAGRAPHS.join("\n"), 3, no_params())
        .await
        .unwrap();

    assert_eq!(generation.points(), ["Key idea"]);
    assert!(!generation.is_degraded());

    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 5, "four chunk calls and one reduce call");
    assert!(prompts[4].contains("Key idea\nKey idea\nKey idea\nKey idea"));
}

#[tokio::test]
async fn degraded_chunks_are_left_out_of_the_reduce() {
    let mock = Scripted::new(|prompt| {
        if prompt.contains("mitochondria") {
            Err(server_error())
        } else {
            Ok("- Key idea".to_string())
        }
    });
    let generation = small_chunk_gateway(mock.clone())
        .summarize(&PARAGRAPHS.join("\n"), 3, no_params())
        .await
        .unwrap();

    assert!(!generation.is_degraded());
    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 5);
    let reduce = &prompts[4];
    assert!(reduce.contains("Key idea\nKey idea\nKey idea"));
    assert!(!reduce.contains("Key idea\nKey idea\nKey idea\nKey idea"));
    assert!(!reduce.contains("model overloaded"));
}

#[tokio::test]
async fn all_chunks_degraded_returns_first_failure() {
    let mock = Scripted::failing();
    let generation = small_chunk_gateway(mock.clone())
        .summarize(&PARAGRAPHS.join("\n"), 2, no_params())
        .await
        .unwrap();

    assert_eq!(mock.prompts().len(), 4, "no reduce call");
    assert_eq!(generation.points().len(), 2);
    assert_eq!(generation.degraded.unwrap().kind, DegradationKind::Transient);
}

#[tokio::test]
async fn short_text_is_a_single_call() {
    let mock = Scripted::text("1. Only");
    small_chunk_gateway(mock.clone())
        .summarize(PARAGRAPHS[0], 3, no_params())
        .await
        .unwrap();
    assert_eq!(mock.prompts().len(), 1);
}

/// Counts how many requests are in flight at once.
#[derive(Default)]
struct Gauge {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for Gauge {
    async fn generate(&self, _prompt: &str, _params: &SamplingParams) -> Result<String, LlmError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok("- Key idea".to_string())
    }
}

#[tokio::test]
async fn chunk_requests_are_bounded() {
    let gauge = Arc::new(Gauge::default());
    let gw = Gateway::new("mistral", SamplingParams::default())
        .with_provider(ProviderKind::Mistral, gauge.clone())
        .with_summary_segment(SegmentParams::new(50, 0));

    let text = (0..12)
        .map(|i| format!("Paragraph {i} covers one cell organelle."))
        .collect::<Vec<_>>()
        .join("\n");
    let generation = gw.summarize(&text, 3, no_params()).await.unwrap();

    assert_eq!(generation.points(), ["Key idea"]);
    assert!(gauge.calls.load(Ordering::SeqCst) > MAX_CONCURRENT_CHUNKS);
    assert_eq!(gauge.peak.load(Ordering::SeqCst), MAX_CONCURRENT_CHUNKS);
}
