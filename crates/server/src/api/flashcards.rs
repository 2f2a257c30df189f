//! Flashcard generation, CRUD and review tracking.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use studybot_core::{from_record, to_record, Flashcard, NewFlashcard, Record, StudyError, Tags};
use studybot_llm::{Degradation, FlashcardDraft, Generation, GenerationParams};
use studybot_storage::Collection;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

use super::{check_item_count, decode_all, default_count, fetch, MessageResponse};

const KIND: &str = "Flashcard";

// ── Request/Response types ────────────────────────

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GenerateFlashcardsRequest {
    pub notes: String,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub provider: Option<String>,
    #[schema(value_type = Vec<String>)]
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GeneratedFlashcards {
    #[schema(value_type = Vec<Object>)]
    pub flashcards: Vec<Flashcard>,
    pub provider: String,
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

/// Store generated drafts for `user_id` and wrap them for the response.
///
/// Placeholder cards are stored too; `degraded` tells the client so.
pub(crate) async fn store_generated(
    state: &AppState,
    user_id: &str,
    generation: Generation,
    tags: &Tags,
) -> Result<GeneratedFlashcards, ApiError> {
    if let Some(d) = &generation.degraded {
        warn!("storing {} placeholder flashcards ({:?})", generation.flashcards().len(), d.kind);
    }

    let now = Utc::now();
    let mut flashcards = Vec::with_capacity(generation.flashcards().len());
    for FlashcardDraft { question, answer } in generation.flashcards().iter().cloned() {
        let record = NewFlashcard {
            question,
            answer,
            tags: tags.clone(),
        }
        .into_record(now)?;
        let stored = state.store.put(Collection::Flashcards, user_id, record).await?;
        flashcards.push(from_record(stored)?);
    }

    Ok(GeneratedFlashcards {
        flashcards,
        provider: generation.provider.to_string(),
        degraded: generation.degraded,
    })
}

fn validate(card: &NewFlashcard) -> Result<(), ApiError> {
    if card.question.trim().is_empty() || card.answer.trim().is_empty() {
        return Err(StudyError::InvalidInput("question and answer are required".into()).into());
    }
    Ok(())
}

// ── POST /api/flashcards/generate ─────────────────

/// Generate flashcards from notes
///
/// The generated cards are stored for the caller and returned. When the
/// provider fails or answers with unusable output, placeholder cards are
/// returned with a `degraded` marker instead of an error.
#[utoipa::path(
    post,
    path = "/api/flashcards/generate",
    tag = "Flashcards",
    request_body = GenerateFlashcardsRequest,
    responses(
        (status = 200, description = "Generated and stored flashcards", body = GeneratedFlashcards),
        (status = 400, description = "Empty notes, count out of range or invalid provider", body = ErrorResponse)
    )
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(req): Json<GenerateFlashcardsRequest>,
) -> Result<Json<GeneratedFlashcards>, ApiError> {
    if req.notes.trim().is_empty() {
        return Err(ApiError::BadRequest("notes must not be empty".into()));
    }
    check_item_count("count", req.count)?;

    let params = GenerationParams {
        temperature: req.temperature,
        provider: req.provider,
        ..GenerationParams::default()
    };
    let generation = state
        .gateway
        .generate_flashcards(&req.notes, req.count, params)
        .await?;

    let response = store_generated(&state, user.id(), generation, &req.tags).await?;
    info!("generated {} flashcards for {}", response.flashcards.len(), user.id());
    Ok(Json(response))
}

// ── CRUD ──────────────────────────────────────────

/// Create a flashcard
#[utoipa::path(
    post,
    path = "/api/flashcards",
    tag = "Flashcards",
    request_body(content = Object, description = "Question, answer and optional tags"),
    responses(
        (status = 201, description = "Flashcard created", body = Object),
        (status = 400, description = "Missing question or answer", body = ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Json(card): Json<NewFlashcard>,
) -> Result<(StatusCode, Json<Flashcard>), ApiError> {
    validate(&card)?;
    let stored = state
        .store
        .put(Collection::Flashcards, user.id(), card.into_record(Utc::now())?)
        .await?;
    Ok((StatusCode::CREATED, Json(from_record(stored)?)))
}

/// List the caller's flashcards
#[utoipa::path(
    get,
    path = "/api/flashcards",
    tag = "Flashcards",
    responses((status = 200, description = "Flashcards in creation order", body = Vec<Object>))
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<Vec<Flashcard>>, ApiError> {
    let records = state.store.list(Collection::Flashcards, user.id()).await?;
    Ok(Json(decode_all(records)?))
}

/// Replace a flashcard's question, answer and tags
#[utoipa::path(
    put,
    path = "/api/flashcards/{id}",
    tag = "Flashcards",
    params(("id" = String, Path, description = "Flashcard id")),
    request_body(content = Object, description = "Question, answer and optional tags"),
    responses(
        (status = 200, description = "Flashcard updated", body = Object),
        (status = 404, description = "Flashcard not found", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(card): Json<NewFlashcard>,
) -> Result<Json<Flashcard>, ApiError> {
    validate(&card)?;
    let updated = state
        .store
        .update(Collection::Flashcards, user.id(), &id, to_record(&card)?)
        .await?
        .ok_or_else(|| StudyError::not_found(KIND, &id))?;
    Ok(Json(from_record(updated)?))
}

/// Delete a flashcard
#[utoipa::path(
    delete,
    path = "/api/flashcards/{id}",
    tag = "Flashcards",
    params(("id" = String, Path, description = "Flashcard id")),
    responses(
        (status = 200, description = "Flashcard deleted", body = MessageResponse),
        (status = 404, description = "Flashcard not found", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete(Collection::Flashcards, user.id(), &id).await? {
        return Err(StudyError::not_found(KIND, id).into());
    }
    Ok(Json(MessageResponse::new("Flashcard deleted")))
}

/// Record a review
///
/// Increments `review_count` and stamps `last_reviewed`.
#[utoipa::path(
    post,
    path = "/api/flashcards/{id}/review",
    tag = "Flashcards",
    params(("id" = String, Path, description = "Flashcard id")),
    responses(
        (status = 200, description = "Review recorded", body = Object),
        (status = 404, description = "Flashcard not found", body = ErrorResponse)
    )
)]
pub async fn review(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Flashcard>, ApiError> {
    let card: Flashcard = fetch(&state, Collection::Flashcards, KIND, user.id(), &id).await?;

    let mut partial = Record::new();
    partial.insert("review_count".into(), (card.review_count + 1).into());
    partial.insert("last_reviewed".into(), serde_json::to_value(Utc::now()).map_err(StudyError::from)?);

    let updated = state
        .store
        .update(Collection::Flashcards, user.id(), &id, partial)
        .await?
        .ok_or_else(|| StudyError::not_found(KIND, &id))?;
    Ok(Json(from_record(updated)?))
}
