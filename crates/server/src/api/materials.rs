//! Study material upload, management, summarization and flashcard generation.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use studybot_core::{
    from_record, to_record, Material, MaterialUpdate, NewMaterial, StudyError, Tags,
};
use studybot_ingest::extract_text;
use studybot_llm::{Degradation, GenerationParams};
use studybot_storage::Collection;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

use super::flashcards::{store_generated, GeneratedFlashcards};
use super::{check_item_count, decode_all, default_count, fetch, MessageResponse};

const KIND: &str = "Material";

// ── Request/Response types ────────────────────────

#[derive(Serialize, utoipa::ToSchema)]
pub struct MaterialList {
    #[schema(value_type = Vec<Object>)]
    pub materials: Vec<Material>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct SummarizeRequest {
    #[serde(default = "default_count")]
    pub num_points: usize,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SummaryResponse {
    pub material_id: String,
    pub summary: Vec<String>,
    pub provider: String,
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct MaterialFlashcardsRequest {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub provider: Option<String>,
}

/// Comma-separated tag list from a form field.
fn parse_tags(raw: &str) -> Tags {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn require_text(material: &Material) -> Result<(), ApiError> {
    if material.text_content.trim().is_empty() {
        return Err(StudyError::InvalidInput(format!(
            "material '{}' has no extractable text",
            material.id
        ))
        .into());
    }
    Ok(())
}

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

// ── POST /api/materials/upload ────────────────────

/// Upload a study material
///
/// Accepts multipart/form-data with a `file` field and optional `title`,
/// `description` and comma-separated `tags`. Text is extracted from PDF,
/// DOCX and plain-text files and stored with the material.
#[utoipa::path(
    post,
    path = "/api/materials/upload",
    tag = "Materials",
    request_body(content_type = "multipart/form-data", description = "File upload"),
    responses(
        (status = 201, description = "Material stored", body = Object),
        (status = 400, description = "Missing file or disallowed extension", body = ErrorResponse),
        (status = 413, description = "File exceeds the upload limit", body = ErrorResponse)
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Material>), ApiError> {
    let limits = &state.config.upload;

    let mut file: Option<UploadedFile> = None;
    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut tags = Tags::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "title" | "description" | "tags" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {name}: {e}")))?;
                match name.as_str() {
                    "title" => title = Some(value).filter(|t| !t.trim().is_empty()),
                    "description" => description = value,
                    _ => tags = parse_tags(&value),
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;

    if file.bytes.len() > limits.max_upload_size {
        return Err(ApiError::PayloadTooLarge(format!(
            "File exceeds the {} byte upload limit",
            limits.max_upload_size
        )));
    }
    if !limits.allows(&file.filename) {
        return Err(ApiError::BadRequest(format!(
            "File type not allowed: '{}' (allowed: {})",
            file.filename,
            limits.allowed_extensions.join(", ")
        )));
    }

    let doc = extract_text(&file.bytes, &file.filename);
    info!(
        "Extracted '{}' (type={}): {} chars{}",
        doc.filename,
        doc.file_type,
        doc.total_chars(),
        if doc.is_error() { ", with errors" } else { "" }
    );

    let material = NewMaterial {
        title: title.unwrap_or_else(|| file.filename.clone()),
        filename: file.filename,
        description,
        content_type: file.content_type,
        size: file.bytes.len() as u64,
        text_content: doc.text,
        metadata: doc.metadata,
        tags,
    };
    let stored = state
        .store
        .put(Collection::Materials, user.id(), material.into_record(Utc::now())?)
        .await?;
    Ok((StatusCode::CREATED, Json(from_record(stored)?)))
}

// ── CRUD ──────────────────────────────────────────

/// List the caller's materials
#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Materials",
    responses((status = 200, description = "Materials in upload order", body = MaterialList))
)]
pub async fn list(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<Json<MaterialList>, ApiError> {
    let records = state.store.list(Collection::Materials, user.id()).await?;
    Ok(Json(MaterialList {
        materials: decode_all(records)?,
    }))
}

/// Get a material
#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    tag = "Materials",
    params(("id" = String, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material details", body = Object),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn get(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Material>, ApiError> {
    Ok(Json(fetch(&state, Collection::Materials, KIND, user.id(), &id).await?))
}

/// Update a material's title, description, tags or metadata
#[utoipa::path(
    patch,
    path = "/api/materials/{id}",
    tag = "Materials",
    params(("id" = String, Path, description = "Material id")),
    request_body(content = Object, description = "Fields to change"),
    responses(
        (status = 200, description = "Material updated", body = Object),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(changes): Json<MaterialUpdate>,
) -> Result<Json<Material>, ApiError> {
    let updated = state
        .store
        .update(Collection::Materials, user.id(), &id, to_record(&changes)?)
        .await?
        .ok_or_else(|| StudyError::not_found(KIND, &id))?;
    Ok(Json(from_record(updated)?))
}

/// Delete a material
#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    tag = "Materials",
    params(("id" = String, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material deleted", body = MessageResponse),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete(Collection::Materials, user.id(), &id).await? {
        return Err(StudyError::not_found(KIND, id).into());
    }
    Ok(Json(MessageResponse::new("Material deleted")))
}

// ── Generation over a material ────────────────────

/// Summarize a material
///
/// Long materials are summarized chunk by chunk and the partial summaries
/// reduced into the final list of points.
#[utoipa::path(
    post,
    path = "/api/materials/{id}/summarize",
    tag = "Materials",
    params(("id" = String, Path, description = "Material id")),
    request_body(content = SummarizeRequest, description = "Optional; defaults to 5 points"),
    responses(
        (status = 200, description = "Summary points", body = SummaryResponse),
        (status = 400, description = "No text, count out of range or invalid provider", body = ErrorResponse),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Option<Json<SummarizeRequest>>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_else(|| SummarizeRequest {
        num_points: default_count(),
        ..SummarizeRequest::default()
    });
    check_item_count("num_points", req.num_points)?;
    let material: Material = fetch(&state, Collection::Materials, KIND, user.id(), &id).await?;
    require_text(&material)?;

    let params = GenerationParams {
        temperature: req.temperature,
        provider: req.provider,
        ..GenerationParams::default()
    };
    let generation = state
        .gateway
        .summarize(&material.text_content, req.num_points, params)
        .await?;

    Ok(Json(SummaryResponse {
        material_id: material.id,
        summary: generation.points().to_vec(),
        provider: generation.provider.to_string(),
        degraded: generation.degraded,
    }))
}

/// Generate flashcards from a material
///
/// Cards are stored for the caller and tagged with the material's title.
#[utoipa::path(
    post,
    path = "/api/materials/{id}/flashcards",
    tag = "Materials",
    params(("id" = String, Path, description = "Material id")),
    request_body(content = MaterialFlashcardsRequest, description = "Optional; defaults to 5 cards"),
    responses(
        (status = 200, description = "Generated and stored flashcards", body = GeneratedFlashcards),
        (status = 400, description = "No text, count out of range or invalid provider", body = ErrorResponse),
        (status = 404, description = "Material not found", body = ErrorResponse)
    )
)]
pub async fn flashcards(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(id): Path<String>,
    body: Option<Json<MaterialFlashcardsRequest>>,
) -> Result<Json<GeneratedFlashcards>, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_else(|| MaterialFlashcardsRequest {
        count: default_count(),
        ..MaterialFlashcardsRequest::default()
    });
    check_item_count("count", req.count)?;
    let material: Material = fetch(&state, Collection::Materials, KIND, user.id(), &id).await?;
    require_text(&material)?;

    let params = GenerationParams {
        temperature: req.temperature,
        provider: req.provider,
        ..GenerationParams::default()
    };
    let generation = state
        .gateway
        .generate_flashcards(&material.text_content, req.count, params)
        .await?;

    let tags: Tags = std::iter::once(material.title).collect();
    Ok(Json(store_generated(&state, user.id(), generation, &tags).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_from_form_field() {
        let tags = parse_tags(" biology, cells ,, biology ");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["biology", "cells"]);
    }
}
