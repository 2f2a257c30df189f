//! Free-form text completion.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use studybot_llm::{Degradation, GenerationParams};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CompletionRequest {
    pub prompt: String,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// `mistral` or `claude`; defaults to the configured provider.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompletionResponse {
    pub text: String,
    pub provider: String,
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

/// Generate a completion
#[utoipa::path(
    post,
    path = "/api/generate/completion",
    tag = "Generate",
    request_body = CompletionRequest,
    responses(
        (status = 200, description = "Generated text (possibly a placeholder)", body = CompletionResponse),
        (status = 400, description = "Unknown or unconfigured provider", body = ErrorResponse)
    )
)]
pub async fn completion(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".into()));
    }

    let params = GenerationParams {
        max_tokens: req.max_tokens,
        temperature: req.temperature,
        top_p: None,
        provider: req.provider,
    };
    let generation = state.gateway.complete(&req.prompt, params).await?;

    Ok(Json(CompletionResponse {
        provider: generation.provider.to_string(),
        degraded: generation.degraded.clone(),
        text: generation.into_text(),
    }))
}
