pub mod fallback;
pub mod gateway;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod task;

pub use gateway::Gateway;
pub use provider::{LlmError, LlmProvider, SamplingParams};
pub use providers::{ConfigError, ProviderKind};
pub use task::{
    Degradation, DegradationKind, FlashcardDraft, Generation, GenerationParams,
    GenerationRequest, GenerationResult, TaskKind,
};
