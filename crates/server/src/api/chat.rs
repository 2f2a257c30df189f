//! Study chat: questions answered from the caller's materials.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use studybot_core::{from_record, ChatMessage, Material, NewChatMessage, Sender};
use studybot_ingest::SegmentParams;
use studybot_llm::GenerationParams;
use studybot_storage::Collection;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

use super::decode_all;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChatRequest {
    pub content: String,
    /// Materials whose text grounds the answer.
    #[serde(default)]
    pub material_ids: Vec<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChatHistory {
    #[schema(value_type = Vec<Object>)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClearedHistory {
    pub message: String,
    pub deleted: usize,
}

/// Concatenate the referenced materials, bounded to one summary-sized chunk.
///
/// Unknown ids are skipped.
async fn material_context(
    state: &AppState,
    user_id: &str,
    material_ids: &[String],
) -> Result<Option<String>, ApiError> {
    let mut sections = Vec::new();
    for id in material_ids {
        match state.store.get(Collection::Materials, user_id, id).await? {
            Some(record) => {
                let material: Material = from_record(record)?;
                if !material.text_content.trim().is_empty() {
                    sections.push(format!("## {}\n{}", material.title, material.text_content));
                }
            }
            None => warn!("chat context: material {} not found for {}", id, user_id),
        }
    }
    if sections.is_empty() {
        return Ok(None);
    }

    let params = SegmentParams::new(state.config.segment.summary_chunk_size, 0);
    let context = sections.join("\n\n");
    let chunks = params.apply(&context);
    if chunks.len() > 1 {
        debug!("chat context truncated to the first of {} chunks", chunks.len());
    }
    Ok(chunks.into_iter().next())
}

async fn record_message(
    state: &AppState,
    user_id: &str,
    message: NewChatMessage,
) -> Result<ChatMessage, ApiError> {
    let stored = state
        .store
        .put(Collection::ChatMessages, user_id, message.into_record(Utc::now())?)
        .await?;
    Ok(from_record(stored)?)
}

/// Send a chat message
///
/// Stores the question, answers it (grounded in `material_ids` when given)
/// and returns the stored assistant reply.
#[utoipa::path(
    post,
    path = "/api/chat/message",
    tag = "Chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = Object),
        (status = 400, description = "Empty message or invalid provider", body = ErrorResponse)
    )
)]
pub async fn message(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatMessage>, ApiError> {
    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest("message content must not be empty".into()));
    }
    // Reject a bad provider before anything is recorded.
    state.gateway.resolve(req.provider.as_deref())?;

    record_message(
        &state,
        user.id(),
        NewChatMessage {
            content: req.content.clone(),
            sender: Sender::User,
            degraded: false,
        },
    )
    .await?;

    let context = material_context(&state, user.id(), &req.material_ids).await?;
    let params = GenerationParams {
        provider: req.provider,
        ..GenerationParams::default()
    };
    let generation = state
        .gateway
        .answer_question(&req.content, context, params)
        .await?;

    let reply = record_message(
        &state,
        user.id(),
        NewChatMessage {
            degraded: generation.is_degraded(),
            content: generation.into_text(),
            sender: Sender::Assistant,
        },
    )
    .await?;
    Ok(Json(reply))
}

/// Chat history
#[utoipa::path(
    get,
    path = "/api/chat/history",
    tag = "Chat",
    responses((status = 200, description = "Messages in send order", body = ChatHistory))
)]
pub async fn history(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ChatHistory>, ApiError> {
    let records = state.store.list(Collection::ChatMessages, user.id()).await?;
    Ok(Json(ChatHistory {
        messages: decode_all(records)?,
    }))
}

/// Clear chat history
#[utoipa::path(
    delete,
    path = "/api/chat/history",
    tag = "Chat",
    responses((status = 200, description = "History cleared", body = ClearedHistory))
)]
pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<ClearedHistory>, ApiError> {
    let deleted = state.store.clear(Collection::ChatMessages, user.id()).await?;
    Ok(Json(ClearedHistory {
        message: "Chat history cleared".to_string(),
        deleted,
    }))
}
